//! Worker actor for processing PDF jobs.

use std::sync::Arc;

use ractor::{Actor, ActorProcessingErr, ActorRef};

use crate::messages::{WorkerMessage, WorkerStats};
use crate::JobProcessor;

/// State for the worker actor.
pub struct PdfWorkerState {
    processor: Arc<JobProcessor>,
    stats: WorkerStats,
}

/// Worker actor that processes deliveries one at a time.
///
/// The actor mailbox serializes processing; the broker prefetch bounds how
/// many deliveries can be waiting in it.
pub struct PdfWorkerActor;

impl Actor for PdfWorkerActor {
    type Msg = WorkerMessage;
    type State = PdfWorkerState;
    type Arguments = Arc<JobProcessor>;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        processor: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting PDF worker");

        Ok(PdfWorkerState {
            processor,
            stats: WorkerStats::default(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            WorkerMessage::Deliver {
                payload,
                attempt,
                reply,
            } => {
                let outcome = state.processor.process(&payload, attempt).await;
                state.stats.record(&outcome);
                let _ = reply.send(outcome.disposition());
            }

            WorkerMessage::GetStats { reply } => {
                let _ = reply.send(state.stats.clone());
            }

            WorkerMessage::Shutdown => {
                tracing::info!(
                    "Shutting down PDF worker after {} deliveries",
                    state.stats.processed()
                );
                myself.stop(None);
            }
        }

        Ok(())
    }
}
