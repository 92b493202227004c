//! Client for delegating document OCR to a remote REST service.
//!
//! ```no_run
//! use rest_ocr::{ClientConfig, OcrEngine, RestOcrEngine};
//! use std::path::Path;
//!
//! let engine = RestOcrEngine::new(ClientConfig::new("https://ocr.example.com/v1/ocr"))?;
//! let document = engine.process(Path::new("scan.pdf"), "application/pdf")?;
//! println!("{}", document.text);
//! # Ok::<(), rest_ocr::OcrError>(())
//! ```

pub mod checks;
pub mod client;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;
#[cfg(feature = "pdf")]
pub mod xmp;

pub use client::RestOcrClient;
pub use config::{AuthConfig, ClientConfig, OcrBackend, Settings};
pub use engine::{MetadataEntry, OcrEngine, ParsedDocument};
pub use engines::rest::RestOcrEngine;
pub use error::OcrError;
pub use response::OcrResult;
