//! Start-up configuration checks
//!
//! Run once before processing documents so a misconfigured deployment is
//! reported up front instead of failing on the first document.

use crate::config::{OcrBackend, Settings};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub id: &'static str,
    pub message: &'static str,
    pub hint: &'static str,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        };
        write!(f, "{} {}: {} (hint: {})", level, self.id, self.message, self.hint)
    }
}

/// Check `settings`; nothing is reported unless the REST backend is selected
pub fn run(settings: &Settings) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if settings.backend != OcrBackend::RestApi {
        return diagnostics;
    }

    if settings
        .endpoint
        .as_deref()
        .map_or(true, |e| e.trim().is_empty())
    {
        diagnostics.push(Diagnostic {
            level: Level::Error,
            id: "rest_ocr.E001",
            message: "REST OCR backend is selected but REST_OCR_ENDPOINT is not configured",
            hint: "Set the REST_OCR_ENDPOINT environment variable",
        });
    }

    if !settings.has_credentials() {
        diagnostics.push(Diagnostic {
            level: Level::Warning,
            id: "rest_ocr.W001",
            message: "REST OCR backend is configured but no authentication is set",
            hint: "Consider setting REST_OCR_API_KEY or REST_OCR_AUTH_TOKEN for secure API access",
        });
    }

    if !settings.verify_ssl {
        diagnostics.push(Diagnostic {
            level: Level::Warning,
            id: "rest_ocr.W002",
            message: "SSL verification is disabled for REST OCR endpoint",
            hint: "This is insecure. Enable REST_OCR_VERIFY_SSL in production",
        });
    }

    diagnostics
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.level == Level::Error)
}
