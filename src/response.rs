//! Response interpretation
//!
//! OCR services disagree on where they put the text. Each accepted shape is a
//! small extractor; they are tried in order and the first hit wins.

use crate::error::OcrError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Text extracted from a successful response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrResult {
    pub text: String,
    /// The service's `metadata` object, passed through untouched
    pub metadata: Map<String, Value>,
}

impl OcrResult {
    /// `metadata.page_count`, when the service reports one
    pub fn page_count(&self) -> Option<usize> {
        self.metadata
            .get("page_count")
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    }

    /// `metadata.confidence`, when the service reports one
    pub fn confidence(&self) -> Option<f64> {
        self.metadata.get("confidence").and_then(Value::as_f64)
    }
}

type Extractor = fn(&Map<String, Value>) -> Option<&str>;

/// Accepted response shapes, highest priority first
const EXTRACTORS: [(&str, Extractor); 5] = [
    ("text", text_field),
    ("content", content_field),
    ("ocr_text", ocr_text_field),
    ("result", result_string),
    ("result.text", result_object_text),
];

fn string_field<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

fn text_field(body: &Map<String, Value>) -> Option<&str> {
    string_field(body, "text")
}

fn content_field(body: &Map<String, Value>) -> Option<&str> {
    string_field(body, "content")
}

fn ocr_text_field(body: &Map<String, Value>) -> Option<&str> {
    string_field(body, "ocr_text")
}

fn result_string(body: &Map<String, Value>) -> Option<&str> {
    string_field(body, "result")
}

fn result_object_text(body: &Map<String, Value>) -> Option<&str> {
    body.get("result")
        .and_then(Value::as_object)
        .and_then(|result| string_field(result, "text"))
}

/// Extract text and metadata from a parsed JSON body
pub fn parse(body: &Value) -> Result<OcrResult, OcrError> {
    let object = body
        .as_object()
        .ok_or_else(|| OcrError::UnrecognizedResponseFormat { keys: Vec::new() })?;

    let (shape, text) = EXTRACTORS
        .iter()
        .find_map(|(shape, extract)| extract(object).map(|text| (*shape, text)))
        .ok_or_else(|| OcrError::UnrecognizedResponseFormat {
            keys: object.keys().cloned().collect(),
        })?;

    tracing::debug!("Extracted text from '{}' field of REST OCR response", shape);

    let metadata = object
        .get("metadata")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    Ok(OcrResult {
        text: text.to_string(),
        metadata,
    })
}

/// Interpret a raw 2xx body.
///
/// Bodies that are not JSON at all are taken verbatim as the text.
pub fn parse_body(body: &str) -> Result<OcrResult, OcrError> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => parse(&value),
        Err(_) => {
            tracing::debug!("REST OCR response is not JSON, using raw body as text");
            Ok(OcrResult {
                text: body.to_string(),
                metadata: Map::new(),
            })
        }
    }
}
