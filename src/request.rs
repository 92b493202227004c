//! Request construction: payload and headers for one OCR call

use crate::config::{AuthConfig, ClientConfig};
use crate::error::OcrError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const API_KEY_HEADER: &str = "X-API-Key";

/// A fully built OCR request, ready to be sent any number of times
#[derive(Debug, Clone)]
pub struct OcrRequest {
    pub payload: OcrPayload,
    pub headers: Vec<(String, String)>,
}

/// JSON body expected by the OCR service
#[derive(Debug, Clone, Serialize)]
pub struct OcrPayload {
    /// Base64-encoded document bytes
    pub document: String,
    pub mime_type: String,
    pub language: String,
    pub options: Map<String, Value>,
}

impl OcrRequest {
    /// Read `path` and build the request for it
    pub fn build(path: &Path, mime_type: &str, config: &ClientConfig) -> Result<Self, OcrError> {
        let bytes = std::fs::read(path).map_err(|source| OcrError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if bytes.is_empty() {
            return Err(OcrError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "document is empty"),
            });
        }

        tracing::debug!(
            "Encoding {} bytes from {:?} as {}",
            bytes.len(),
            path,
            mime_type
        );

        Ok(Self {
            payload: OcrPayload {
                document: STANDARD.encode(&bytes),
                mime_type: mime_type.to_string(),
                language: config.effective_language().to_string(),
                options: Map::new(),
            },
            headers: build_headers(config),
        })
    }

    /// Serialized JSON body
    pub fn body(&self) -> Result<Vec<u8>, OcrError> {
        serde_json::to_vec(&self.payload)
            .map_err(|e| OcrError::InvalidRequest(format!("Failed to encode payload: {}", e)))
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Content type, authentication, then custom headers that do not collide
/// with either.
pub fn build_headers(config: &ClientConfig) -> Vec<(String, String)> {
    let mut headers = vec![(CONTENT_TYPE.to_string(), "application/json".to_string())];

    if let Some(auth) = auth_header(&config.auth) {
        headers.push(auth);
    }

    for (name, value) in &config.custom_headers {
        if headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name)) {
            tracing::warn!("Ignoring custom header {} that would override a fixed header", name);
            continue;
        }
        headers.push((name.clone(), value.clone()));
    }

    headers
}

fn auth_header(auth: &AuthConfig) -> Option<(String, String)> {
    match auth {
        AuthConfig::None => None,
        AuthConfig::Bearer { token } => Some((AUTHORIZATION.to_string(), format!("Bearer {}", token))),
        AuthConfig::ApiKey { key } => Some((API_KEY_HEADER.to_string(), key.clone())),
        AuthConfig::Basic { username, password } => {
            let encoded = STANDARD.encode(format!("{}:{}", username, password));
            Some((AUTHORIZATION.to_string(), format!("Basic {}", encoded)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn document(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn test_payload_encodes_document() {
        let file = document(b"Test content");
        let config = ClientConfig::new("http://localhost:8080/ocr");

        let request = OcrRequest::build(file.path(), "image/png", &config).unwrap();

        assert_eq!(request.payload.mime_type, "image/png");
        assert_eq!(request.payload.language, "eng");
        assert_eq!(
            STANDARD.decode(&request.payload.document).unwrap(),
            b"Test content"
        );

        let body: Value = serde_json::from_slice(&request.body().unwrap()).unwrap();
        assert_eq!(body["options"], serde_json::json!({}));
        assert_eq!(body["mime_type"], "image/png");
        assert!(body["document"].is_string());
    }

    #[test]
    fn test_configured_language_is_sent() {
        let file = document(b"x");
        let mut config = ClientConfig::new("http://localhost:8080/ocr");
        config.language = "deu+eng".to_string();

        let request = OcrRequest::build(file.path(), "application/pdf", &config).unwrap();
        assert_eq!(request.payload.language, "deu+eng");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let config = ClientConfig::new("http://localhost:8080/ocr");
        let err = OcrRequest::build(Path::new("/nonexistent/scan.pdf"), "application/pdf", &config)
            .unwrap_err();
        assert!(matches!(err, OcrError::Io { .. }));
    }

    #[test]
    fn test_empty_file_is_io_error() {
        let file = document(b"");
        let config = ClientConfig::new("http://localhost:8080/ocr");
        let err = OcrRequest::build(file.path(), "image/png", &config).unwrap_err();
        assert!(matches!(err, OcrError::Io { .. }));
        assert_eq!(err.code(), "IO_ERROR");
    }

    #[test]
    fn test_no_auth_sends_only_content_type() {
        let config = ClientConfig::new("http://localhost:8080/ocr");
        let headers = build_headers(&config);
        assert_eq!(
            headers,
            vec![(CONTENT_TYPE.to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn test_bearer_header() {
        let mut config = ClientConfig::new("http://localhost:8080/ocr");
        config.auth = AuthConfig::Bearer {
            token: "test-bearer-token".to_string(),
        };
        let file = document(b"x");
        let request = OcrRequest::build(file.path(), "image/png", &config).unwrap();
        assert_eq!(
            request.header("authorization"),
            Some("Bearer test-bearer-token")
        );
    }

    #[test]
    fn test_api_key_header() {
        let mut config = ClientConfig::new("http://localhost:8080/ocr");
        config.auth = AuthConfig::ApiKey {
            key: "test-api-key".to_string(),
        };
        let headers = build_headers(&config);
        assert!(headers.contains(&(API_KEY_HEADER.to_string(), "test-api-key".to_string())));
        assert!(!headers.iter().any(|(k, _)| k == AUTHORIZATION));
    }

    #[test]
    fn test_basic_header_encodes_username_and_password() {
        let mut config = ClientConfig::new("http://localhost:8080/ocr");
        config.auth = AuthConfig::basic_from_credentials("alice:secret").unwrap();
        let headers = build_headers(&config);

        let (_, value) = headers.iter().find(|(k, _)| k == AUTHORIZATION).unwrap();
        let encoded = value.strip_prefix("Basic ").unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"alice:secret");
    }

    #[test]
    fn test_custom_headers_cannot_override_fixed_headers() {
        let mut config = ClientConfig::new("http://localhost:8080/ocr");
        config.auth = AuthConfig::Bearer {
            token: "real".to_string(),
        };
        config
            .custom_headers
            .insert("authorization".to_string(), "Bearer forged".to_string());
        config
            .custom_headers
            .insert("Content-Type".to_string(), "text/plain".to_string());
        config
            .custom_headers
            .insert("X-Request-Source".to_string(), "scanner".to_string());

        let headers = build_headers(&config);

        assert_eq!(headers.len(), 3);
        assert!(headers.contains(&(AUTHORIZATION.to_string(), "Bearer real".to_string())));
        assert!(headers.contains(&(CONTENT_TYPE.to_string(), "application/json".to_string())));
        assert!(headers.contains(&("X-Request-Source".to_string(), "scanner".to_string())));
    }
}
