#![allow(clippy::disallowed_methods)]

mod common;

use std::error::Error;
use std::sync::Arc;

use actors::{Actor, JobOutcome, PdfWorkerActor, WorkerError, WorkerMailbox, WorkerStats};
use broker::{BrokerError, ConsumeOptions, DeliveryHandler, Settlement, settlement_for_result};
use chrono::{TimeDelta, Utc};
use kyc_core::Disposition;

use common::{Harness, MemoryStore, StubRenderer, applicant, job_payload};

#[tokio::test]
async fn stale_pdf_is_rendered_and_recorded() -> Result<(), Box<dyn Error>> {
    let mut record = applicant("k1");
    record.pdf_path = Some("kyc/k1.pdf".into());
    record.pdf_generated_at = Some(Utc::now() - TimeDelta::hours(2));
    record.pdf_error = Some("earlier failure".into());
    let h = Harness::new(MemoryStore::with([record]), StubRenderer::default()).await;

    let outcome = h.processor().process(&job_payload("k1"), 1).await;

    assert!(matches!(&outcome, JobOutcome::Rendered { pdf_path } if pdf_path == "kyc/k1.pdf"));
    assert_eq!(outcome.disposition(), Disposition::Ack);
    assert_eq!(h.renderer.call_count(), 1);

    let stored = h.store.get("k1").unwrap();
    assert!(stored.has_fresh_pdf(Utc::now(), kyc_core::DEFAULT_FRESHNESS));
    assert!(stored.pdf_error.is_none());
    assert_eq!(stored.name.as_deref(), Some("Jane Doe"));

    let pdf = h.documents.get_pdf("kyc/k1.pdf").await?;
    let text = String::from_utf8(pdf.to_vec())?;
    assert!(text.contains("Initial Risk Level: LOW"));
    Ok(())
}

#[tokio::test]
async fn fresh_pdf_is_acked_without_render() -> Result<(), Box<dyn Error>> {
    let mut record = applicant("k1");
    record.pdf_path = Some("kyc/k1.pdf".into());
    record.pdf_generated_at = Some(Utc::now() - TimeDelta::minutes(30));
    let h = Harness::new(MemoryStore::with([record]), StubRenderer::default()).await;

    let outcome = h.processor().process(&job_payload("k1"), 1).await;

    assert!(matches!(outcome, JobOutcome::Fresh));
    assert_eq!(outcome.disposition(), Disposition::Ack);
    assert_eq!(h.renderer.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn malformed_payload_is_dropped() -> Result<(), Box<dyn Error>> {
    let h = Harness::new(MemoryStore::default(), StubRenderer::default()).await;

    let outcome = h.processor().process(b"{\"requestedBy\":\"admin\"}", 1).await;

    assert!(matches!(outcome, JobOutcome::Failed(WorkerError::MalformedJob(_))));
    assert!(matches!(outcome.disposition(), Disposition::Drop { .. }));
    Ok(())
}

#[tokio::test]
async fn missing_record_is_dropped() -> Result<(), Box<dyn Error>> {
    let h = Harness::new(MemoryStore::default(), StubRenderer::default()).await;

    let outcome = h.processor().process(&job_payload("ghost"), 1).await;

    assert!(matches!(outcome, JobOutcome::Failed(WorkerError::RecordNotFound(_))));
    assert!(matches!(outcome.disposition(), Disposition::Drop { .. }));
    assert_eq!(h.renderer.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn render_error_is_requeued_and_recorded() -> Result<(), Box<dyn Error>> {
    let h = Harness::new(MemoryStore::with([applicant("k1")]), StubRenderer::failing()).await;

    let outcome = h.processor().process(&job_payload("k1"), 1).await;

    assert!(matches!(outcome, JobOutcome::Failed(WorkerError::Render(_))));
    assert!(matches!(outcome.disposition(), Disposition::Requeue { .. }));

    let stored = h.store.get("k1").unwrap();
    assert!(stored.pdf_error.as_deref().is_some_and(|e| e.contains("page overflow")));
    assert!(stored.pdf_error_at.is_some());
    assert!(stored.pdf_path.is_none());
    Ok(())
}

#[tokio::test]
async fn store_outage_is_requeued() -> Result<(), Box<dyn Error>> {
    let h = Harness::new(MemoryStore::failing_loads(), StubRenderer::default()).await;

    let outcome = h.processor().process(&job_payload("k1"), 2).await;

    assert!(matches!(outcome, JobOutcome::Failed(WorkerError::Store(_))));
    assert!(matches!(outcome.disposition(), Disposition::Requeue { .. }));
    Ok(())
}

#[tokio::test]
async fn actor_answers_deliveries_and_counts_them() -> Result<(), Box<dyn Error>> {
    let mut fresh = applicant("fresh");
    fresh.pdf_path = Some("kyc/fresh.pdf".into());
    fresh.pdf_generated_at = Some(Utc::now());
    let h = Harness::new(
        MemoryStore::with([applicant("k1"), fresh]),
        StubRenderer::default(),
    )
    .await;

    let (actor, handle) = Actor::spawn(None, PdfWorkerActor, Arc::new(h.processor())).await?;
    let mailbox = WorkerMailbox::new(actor.clone());

    assert_eq!(mailbox.handle(&job_payload("k1"), 1).await?, Disposition::Ack);
    assert_eq!(mailbox.handle(&job_payload("fresh"), 1).await?, Disposition::Ack);
    assert!(matches!(
        mailbox.handle(b"garbage", 1).await?,
        Disposition::Drop { .. }
    ));

    let stats = mailbox.stats().await.unwrap();
    assert_eq!(
        stats,
        WorkerStats {
            acked: 2,
            skipped: 1,
            retryable_failures: 0,
            dropped: 1,
            last_error: stats.last_error.clone(),
        }
    );
    assert!(stats.last_error.is_some());

    actor.send_message(actors::WorkerMessage::Shutdown)?;
    handle.await?;
    Ok(())
}

#[tokio::test]
async fn retryable_failures_are_counted_separately() -> Result<(), Box<dyn Error>> {
    let h = Harness::new(MemoryStore::with([applicant("k1")]), StubRenderer::failing()).await;
    let (actor, handle) = Actor::spawn(None, PdfWorkerActor, Arc::new(h.processor())).await?;
    let mailbox = WorkerMailbox::new(actor.clone());

    let disposition = mailbox.handle(&job_payload("k1"), 1).await?;
    assert!(matches!(disposition, Disposition::Requeue { .. }));

    let stats = mailbox.stats().await.unwrap();
    assert_eq!(stats.retryable_failures, 1);
    assert_eq!(stats.acked, 0);
    assert_eq!(stats.processed(), 1);

    actor.send_message(actors::WorkerMessage::Shutdown)?;
    handle.await?;
    Ok(())
}

#[tokio::test]
async fn stopped_actor_never_drops_a_valid_job() -> Result<(), Box<dyn Error>> {
    let h = Harness::new(MemoryStore::with([applicant("k1")]), StubRenderer::default()).await;
    let (actor, handle) = Actor::spawn(None, PdfWorkerActor, Arc::new(h.processor())).await?;
    let mailbox = WorkerMailbox::new(actor.clone());

    actor.send_message(actors::WorkerMessage::Shutdown)?;
    handle.await?;

    let options = ConsumeOptions::default();
    for attempt in 1..=6 {
        let result = mailbox.handle(&job_payload("k1"), attempt).await;
        assert!(matches!(result, Err(BrokerError::HandlerUnavailable(_))));
        assert_eq!(
            settlement_for_result(&result, attempt, &options),
            Settlement::Nack { requeue: true }
        );
    }

    assert_eq!(h.renderer.call_count(), 0);
    let stored = h.store.get("k1").unwrap();
    assert!(stored.pdf_error.is_none());
    assert!(mailbox.stats().await.is_none());
    Ok(())
}
