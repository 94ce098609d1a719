//! Conversion queue: the per-file lifecycle and the single active run.
//!
//! Files move `pending → converting → {completed | failed}`. A run visits the
//! files that were pending when it started, one at a time, and reports its
//! progress as [`QueueEvent`]s over an unbounded channel.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fileshift_core::converter::{ConverterConfig, StandardConverter};
//! use fileshift_core::queue::{ConversionQueue, QueueConfig, SubmittedFile};
//!
//! let queue = Arc::new(ConversionQueue::new(
//!     QueueConfig::default(),
//!     StandardConverter::new(ConverterConfig::default()),
//! ));
//! queue.enqueue(vec![SubmittedFile::new("photo.jpg", bytes)]).await;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let artifacts = queue.start_run("png", Some(tx)).await?;
//! ```

mod config;
mod error;
mod manager;
mod types;

pub use config::QueueConfig;
pub use error::QueueError;
pub use manager::{ActiveRun, ConversionQueue};
pub use types::{
    EnqueueOutcome, FileStatus, QueueEvent, QueueStats, QueuedFile, RejectedFile, SubmittedFile,
    ValidationError,
};
