//! REST engine implementation
//!
//! Delegates OCR to a remote service through [`RestOcrClient`]. PDF page
//! counts and XMP metadata are read locally when the `pdf` feature is
//! enabled.

use crate::client::RestOcrClient;
use crate::config::ClientConfig;
use crate::engine::{MetadataEntry, OcrEngine, ParsedDocument};
use crate::error::OcrError;
use std::path::Path;
use std::time::Instant;

pub const ENGINE_NAME: &str = "rest_api";

/// OCR engine backed by a remote REST service
pub struct RestOcrEngine {
    client: RestOcrClient,
}

impl RestOcrEngine {
    pub fn new(config: ClientConfig) -> Result<Self, OcrError> {
        let client = RestOcrClient::new(config)?;
        tracing::info!(
            "REST OCR engine initialized (endpoint: {}, auth: {}, language: {})",
            client.config().endpoint,
            client.config().auth.method_name(),
            client.config().effective_language()
        );
        Ok(Self { client })
    }

    pub fn from_client(client: RestOcrClient) -> Self {
        Self { client }
    }
}

impl OcrEngine for RestOcrEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn description(&self) -> &'static str {
        "Remote OCR service over a JSON/HTTP API"
    }

    fn process(&self, path: &Path, mime_type: &str) -> Result<ParsedDocument, OcrError> {
        tracing::info!("Starting REST OCR parsing for {:?}", path);
        let start = Instant::now();

        let result = self.client.extract(path, mime_type)?;

        let text = result.text.trim().to_string();
        if text.is_empty() {
            tracing::warn!("REST OCR returned empty text");
        } else {
            tracing::info!(
                "Successfully extracted {} characters via REST OCR in {}ms",
                text.len(),
                start.elapsed().as_millis()
            );
        }

        let page_count = local_page_count(path, mime_type).or_else(|| result.page_count());

        Ok(ParsedDocument {
            text,
            metadata: result.metadata,
            page_count,
            xmp_metadata: extract_metadata(path, mime_type),
        })
    }

    fn supported_formats(&self) -> Vec<String> {
        super::SUPPORTED_MIME_TYPES
            .iter()
            .map(|(mime, _)| mime.to_string())
            .collect()
    }
}

#[cfg(feature = "pdf")]
fn local_page_count(path: &Path, mime_type: &str) -> Option<usize> {
    if mime_type != "application/pdf" {
        return None;
    }

    match lopdf::Document::load(path) {
        Ok(doc) => Some(doc.get_pages().len()),
        Err(e) => {
            tracing::warn!("Unable to determine PDF page count {:?}: {}", path, e);
            None
        }
    }
}

#[cfg(not(feature = "pdf"))]
fn local_page_count(_path: &Path, _mime_type: &str) -> Option<usize> {
    None
}

/// XMP properties of a PDF; other documents have none
#[cfg(feature = "pdf")]
fn extract_metadata(path: &Path, mime_type: &str) -> Vec<MetadataEntry> {
    if mime_type != "application/pdf" {
        return Vec::new();
    }
    crate::xmp::read_pdf(path)
}

#[cfg(not(feature = "pdf"))]
fn extract_metadata(_path: &Path, _mime_type: &str) -> Vec<MetadataEntry> {
    Vec::new()
}
