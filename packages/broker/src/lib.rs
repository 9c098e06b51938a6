//! RabbitMQ plumbing for the PDF generation queue.
//!
//! - [`BrokerConnection`] owns the one connection and channel a process uses
//! - [`Producer`] publishes [`PdfJob`](kyc_core::PdfJob)s with priority and persistence
//! - [`consume`] drives the receive loop and settles each delivery with the
//!   [`Disposition`](kyc_core::Disposition) its handler returns

mod config;
mod connection;
mod consumer;
mod error;
mod producer;

pub use config::{BrokerConfig, ConsumeOptions, DEFAULT_AMQP_URL};
pub use connection::{BrokerConnection, JobPublisher};
pub use consumer::{
    ATTEMPT_HEADER, DeliveryHandler, Settlement, consume, settlement_for, settlement_for_result,
};
pub use error::BrokerError;
pub use producer::Producer;
