//! PDF worker built on Ractor.
//!
//! # Architecture
//!
//! - `broker::consume` pulls deliveries off the queue (prefetch bounded)
//! - [`WorkerMailbox`] hands each one to the [`PdfWorkerActor`] and waits for
//!   its [`Disposition`](kyc_core::Disposition)
//! - [`JobProcessor`] runs the freshness check, summary, render, storage
//!   and persistence steps for one job
//!
//! # Usage
//!
//! ```ignore
//! let processor = JobProcessor::new(store, renderer, documents, summaries);
//! let worker = start_worker(processor, broker, ConsumeOptions::from_env()).await?;
//! // ...
//! let errors = worker.stop().await;
//! ```

mod config;
mod error;
mod messages;
mod processor;
mod render;
mod worker;
mod worker_actor;

pub use config::{DEFAULT_FONT_DIR, DEFAULT_FONT_NAME, WorkerConfig};
pub use error::{RenderError, ShutdownError, WorkerError};
pub use messages::{WorkerMessage, WorkerStats};
pub use processor::{JobOutcome, JobProcessor};
pub use render::{GenPdfRenderer, PdfRenderer};
pub use worker::{PdfWorker, WorkerMailbox, start_worker};
pub use worker_actor::PdfWorkerActor;

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef};
