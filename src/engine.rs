use crate::error::OcrError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Text extracted from one document
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    pub text: String,
    pub metadata: Map<String, Value>,
    pub page_count: Option<usize>,
    /// XMP properties embedded in a PDF
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub xmp_metadata: Vec<MetadataEntry>,
}

/// One XMP property, keyed by namespace URI and local name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    pub namespace: String,
    pub prefix: String,
    pub key: String,
    pub value: String,
}

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "rest_api")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Process a file (image or PDF) of the given MIME type and return the extracted text
    fn process(&self, path: &Path, mime_type: &str) -> Result<ParsedDocument, OcrError>;

    /// Get supported MIME types
    fn supported_formats(&self) -> Vec<String>;
}
