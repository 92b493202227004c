//! REST OCR client: request builder, retrying transport and response
//! interpreter run in sequence for each call.

use crate::config::ClientConfig;
use crate::error::OcrError;
use crate::request::OcrRequest;
use crate::response::{self, OcrResult};
use crate::transport::Transport;
use std::path::Path;
use std::time::Duration;

pub struct RestOcrClient {
    config: ClientConfig,
    transport: Transport,
}

impl RestOcrClient {
    /// Validate `config` and prepare a client for it
    pub fn new(config: ClientConfig) -> Result<Self, OcrError> {
        config.validate()?;
        let transport = Transport::new(&config);
        Ok(Self { config, transport })
    }

    /// Override the one-second backoff base
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.transport = self.transport.with_backoff_base(base);
        self
    }

    /// Override the 64 MiB response body limit
    pub fn with_max_response_bytes(mut self, limit: u64) -> Self {
        self.transport = self.transport.with_max_response_bytes(limit);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send the document at `path` to the OCR service and return its text
    pub fn extract(&self, path: &Path, mime_type: &str) -> Result<OcrResult, OcrError> {
        let request = OcrRequest::build(path, mime_type, &self.config)?;
        let response = self.transport.send(&request)?;
        tracing::debug!(
            "REST OCR responded with HTTP {} ({} bytes)",
            response.status,
            response.body.len()
        );
        response::parse_body(&response.body)
    }
}
