//! Converter module: the injected conversion capability.
//!
//! This module provides the `Converter` trait the queue calls for every file,
//! plus three implementations:
//!
//! - `RasterConverter`: real conversion between raster image formats
//! - `SimulatedConverter`: paced progress and a placeholder payload
//! - `StandardConverter`: raster pairs go to the real codec, everything else
//!   is simulated
//!
//! # Example
//!
//! ```ignore
//! use fileshift_core::converter::{ConversionJob, Converter, ConverterConfig, StandardConverter};
//!
//! let converter = StandardConverter::new(ConverterConfig::default());
//! let (tx, mut rx) = tokio::sync::mpsc::channel(32);
//!
//! let job = ConversionJob {
//!     file_id: "f-1".to_string(),
//!     file_name: "photo.png".to_string(),
//!     source_format: "png".to_string(),
//!     target_format: "jpg".to_string(),
//!     quality: None,
//!     content: std::fs::read("photo.png")?.into(),
//! };
//!
//! let output = converter.convert(job, tx).await?;
//! println!("{} bytes of {}", output.content.len(), output.mime_type);
//! ```

mod config;
mod error;
mod raster;
mod simulated;
mod standard;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use raster::RasterConverter;
pub use simulated::SimulatedConverter;
pub use standard::StandardConverter;
pub use traits::Converter;
pub use types::{mime_type_for, ConversionJob, ConversionOutput, ConversionProgress};
