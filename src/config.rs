//! Client configuration
//!
//! [`Settings`] holds values as the configuration source supplied them
//! (flags, environment, a settings store). [`ClientConfig`] is the validated
//! form the client runs on; every configuration error surfaces during the
//! conversion, before any file or network I/O.

use crate::error::OcrError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ureq::http::{HeaderName, HeaderValue};

pub const DEFAULT_LANGUAGE: &str = "eng";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Which OCR backend the surrounding pipeline should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrBackend {
    /// Local Tesseract engine (not provided by this crate)
    Tesseract,
    /// Remote REST OCR service
    #[default]
    RestApi,
}

impl OcrBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tesseract => "tesseract",
            Self::RestApi => "rest_api",
        }
    }
}

impl FromStr for OcrBackend {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tesseract" => Ok(Self::Tesseract),
            "rest_api" => Ok(Self::RestApi),
            other => Err(OcrError::Config(format!("unknown OCR backend '{}'", other))),
        }
    }
}

/// Authentication applied to every request
#[derive(Clone, PartialEq, Eq, Default)]
pub enum AuthConfig {
    #[default]
    None,
    Bearer {
        token: String,
    },
    ApiKey {
        key: String,
    },
    Basic {
        username: String,
        password: String,
    },
}

impl AuthConfig {
    /// Resolve a configured method name and its credentials.
    ///
    /// Method names are case-insensitive: `bearer`, `api_key`, `basic`, or
    /// `none`/empty. Bearer uses `auth_token`; `api_key` and `basic` use
    /// `api_key`, the latter as a `username:password` pair.
    pub fn from_method(
        method: &str,
        auth_token: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Self, OcrError> {
        let method = method.trim().to_lowercase();
        match method.as_str() {
            "" | "none" => Ok(Self::None),
            "bearer" => {
                let token = required(auth_token, "bearer", "auth token")?;
                Ok(Self::Bearer { token })
            }
            "api_key" => {
                let key = required(api_key, "api_key", "API key")?;
                Ok(Self::ApiKey { key })
            }
            "basic" => {
                let credentials = required(api_key, "basic", "username:password credentials")?;
                Self::basic_from_credentials(&credentials)
            }
            other => Err(OcrError::Config(format!(
                "unrecognized auth method '{}' (expected bearer, api_key, basic or none)",
                other
            ))),
        }
    }

    /// Split `username:password` on the first colon.
    ///
    /// Usernames containing a colon cannot be expressed in this format;
    /// everything after the first colon belongs to the password.
    pub fn basic_from_credentials(credentials: &str) -> Result<Self, OcrError> {
        let (username, password) = credentials.split_once(':').ok_or_else(|| {
            OcrError::Config(
                "basic auth credentials must be formatted as 'username:password'".to_string(),
            )
        })?;
        Ok(Self::Basic {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer { .. } => "bearer",
            Self::ApiKey { .. } => "api_key",
            Self::Basic { .. } => "basic",
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer { .. } => f.write_str("Bearer { token: \"***\" }"),
            Self::ApiKey { .. } => f.write_str("ApiKey { key: \"***\" }"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

fn required(value: Option<&str>, method: &str, what: &str) -> Result<String, OcrError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(OcrError::Config(format!(
            "auth method '{}' selected but no {} configured",
            method, what
        ))),
    }
}

/// Validated configuration for one OCR client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub auth: AuthConfig,
    pub timeout_secs: u64,
    pub retry_count: u32,
    pub verify_ssl: bool,
    pub language: String,
    pub custom_headers: BTreeMap<String, String>,
}

impl ClientConfig {
    /// Configuration for `endpoint` with defaults everywhere else
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth: AuthConfig::None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_count: DEFAULT_RETRY_COUNT,
            verify_ssl: true,
            language: DEFAULT_LANGUAGE.to_string(),
            custom_headers: BTreeMap::new(),
        }
    }

    /// Check the invariants the client relies on
    pub fn validate(&self) -> Result<(), OcrError> {
        validate_endpoint(&self.endpoint)?;
        if self.timeout_secs == 0 {
            return Err(OcrError::Config(
                "timeout must be at least 1 second".to_string(),
            ));
        }
        for (name, value) in &self.custom_headers {
            validate_header(name, value)?;
        }
        Ok(())
    }

    /// Language hint sent to the service, `eng` when unset
    pub fn effective_language(&self) -> &str {
        let language = self.language.trim();
        if language.is_empty() {
            DEFAULT_LANGUAGE
        } else {
            language
        }
    }
}

/// Reject header names and values the HTTP layer would refuse on every attempt
fn validate_header(name: &str, value: &str) -> Result<(), OcrError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| OcrError::Config(format!("invalid custom header name '{}'", name)))?;
    HeaderValue::from_str(value).map_err(|_| {
        OcrError::Config(format!("invalid value for custom header '{}'", name))
    })?;
    Ok(())
}

fn validate_endpoint(endpoint: &str) -> Result<(), OcrError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(OcrError::Config(
            "REST OCR endpoint is not configured. Set REST_OCR_ENDPOINT.".to_string(),
        ));
    }

    let url = url::Url::parse(endpoint)
        .map_err(|e| OcrError::Config(format!("invalid endpoint URL '{}': {}", endpoint, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(OcrError::Config(format!(
            "endpoint URL must use http or https, got '{}'",
            scheme
        ))),
    }
}

/// Raw configuration values as supplied by the configuration source
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: OcrBackend,
    pub endpoint: Option<String>,
    pub auth_method: Option<String>,
    pub auth_token: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub retry_count: u32,
    pub verify_ssl: bool,
    pub language: Option<String>,
    /// JSON object of header name to value
    pub custom_headers: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: OcrBackend::default(),
            endpoint: None,
            auth_method: None,
            auth_token: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_count: DEFAULT_RETRY_COUNT,
            verify_ssl: true,
            language: None,
            custom_headers: None,
        }
    }
}

impl Settings {
    pub fn has_credentials(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.api_key) || set(&self.auth_token)
    }
}

impl TryFrom<Settings> for ClientConfig {
    type Error = OcrError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let auth = AuthConfig::from_method(
            settings.auth_method.as_deref().unwrap_or_default(),
            settings.auth_token.as_deref(),
            settings.api_key.as_deref(),
        )?;

        let custom_headers: BTreeMap<String, String> = match settings.custom_headers.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw).map_err(|e| {
                OcrError::Config(format!(
                    "custom headers must be a JSON object of strings: {}",
                    e
                ))
            })?,
            _ => BTreeMap::new(),
        };

        let config = ClientConfig {
            endpoint: settings.endpoint.unwrap_or_default().trim().to_string(),
            auth,
            timeout_secs: settings.timeout_secs,
            retry_count: settings.retry_count,
            verify_ssl: settings.verify_ssl,
            language: settings.language.unwrap_or_default(),
            custom_headers,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(endpoint: &str) -> Settings {
        Settings {
            endpoint: Some(endpoint.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_auth_method_is_case_insensitive() {
        let auth = AuthConfig::from_method("Bearer", Some("tok"), None).unwrap();
        assert_eq!(
            auth,
            AuthConfig::Bearer {
                token: "tok".to_string()
            }
        );
    }

    #[test]
    fn test_empty_method_means_no_auth() {
        assert_eq!(
            AuthConfig::from_method("", Some("tok"), Some("key")).unwrap(),
            AuthConfig::None
        );
        assert_eq!(
            AuthConfig::from_method("none", None, None).unwrap(),
            AuthConfig::None
        );
    }

    #[test]
    fn test_unrecognized_method_is_config_error() {
        let err = AuthConfig::from_method("oauth2", Some("tok"), None).unwrap_err();
        assert!(matches!(err, OcrError::Config(_)));
        assert!(err.to_string().contains("oauth2"));
    }

    #[test]
    fn test_method_without_credentials_is_config_error() {
        let err = AuthConfig::from_method("api_key", None, None).unwrap_err();
        assert!(matches!(err, OcrError::Config(_)));
        let err = AuthConfig::from_method("bearer", Some("   "), None).unwrap_err();
        assert!(matches!(err, OcrError::Config(_)));
    }

    #[test]
    fn test_basic_credentials_split_on_first_colon() {
        assert_eq!(
            AuthConfig::basic_from_credentials("alice:secret").unwrap(),
            AuthConfig::Basic {
                username: "alice".to_string(),
                password: "secret".to_string()
            }
        );
        assert_eq!(
            AuthConfig::basic_from_credentials("bob:pa:ss").unwrap(),
            AuthConfig::Basic {
                username: "bob".to_string(),
                password: "pa:ss".to_string()
            }
        );
    }

    #[test]
    fn test_basic_credentials_without_colon_rejected() {
        let err = AuthConfig::basic_from_credentials("no-colon-here").unwrap_err();
        assert!(matches!(err, OcrError::Config(_)));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let auth = AuthConfig::Basic {
            username: "alice".to_string(),
            password: "secret".to_string(),
        };
        let debug = format!("{:?}", auth);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_settings_convert_to_client_config() {
        let mut s = settings("https://ocr.example.com/v1/ocr");
        s.auth_method = Some("api_key".to_string());
        s.api_key = Some("test-api-key".to_string());
        s.custom_headers = Some(r#"{"X-Tenant": "acme"}"#.to_string());

        let config = ClientConfig::try_from(s).unwrap();
        assert_eq!(config.endpoint, "https://ocr.example.com/v1/ocr");
        assert_eq!(
            config.auth,
            AuthConfig::ApiKey {
                key: "test-api-key".to_string()
            }
        );
        assert_eq!(config.custom_headers.get("X-Tenant").unwrap(), "acme");
        assert_eq!(config.retry_count, DEFAULT_RETRY_COUNT);
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let err = ClientConfig::try_from(Settings::default()).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("not configured"));

        let err = ClientConfig::try_from(settings("   ")).unwrap_err();
        assert!(matches!(err, OcrError::Config(_)));
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let err = ClientConfig::try_from(settings("ftp://ocr.example.com")).unwrap_err();
        assert!(matches!(err, OcrError::Config(_)));
        let err = ClientConfig::try_from(settings("not a url")).unwrap_err();
        assert!(matches!(err, OcrError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut s = settings("http://localhost:8080/ocr");
        s.timeout_secs = 0;
        assert!(matches!(
            ClientConfig::try_from(s),
            Err(OcrError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_custom_headers_rejected() {
        let mut s = settings("http://localhost:8080/ocr");
        s.custom_headers = Some(r#"{"X-Count": 3}"#.to_string());
        assert!(matches!(
            ClientConfig::try_from(s),
            Err(OcrError::Config(_))
        ));
    }

    #[test]
    fn test_custom_header_with_newline_rejected() {
        let mut s = settings("http://localhost:8080/ocr");
        s.custom_headers = Some(r#"{"X-Trace": "abc\nInjected: yes"}"#.to_string());
        match ClientConfig::try_from(s) {
            Err(OcrError::Config(msg)) => assert!(msg.contains("X-Trace")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_header_with_invalid_name_rejected() {
        let mut s = settings("http://localhost:8080/ocr");
        s.custom_headers = Some(r#"{"X Bad Name": "value"}"#.to_string());
        assert!(matches!(
            ClientConfig::try_from(s),
            Err(OcrError::Config(_))
        ));

        let mut config = ClientConfig::new("http://localhost:8080/ocr");
        config
            .custom_headers
            .insert(String::new(), "value".to_string());
        assert!(matches!(config.validate(), Err(OcrError::Config(_))));
    }

    #[test]
    fn test_valid_custom_headers_accepted() {
        let mut s = settings("http://localhost:8080/ocr");
        s.custom_headers = Some(r#"{"X-Tenant": "acme", "X-Empty": ""}"#.to_string());
        let config = ClientConfig::try_from(s).unwrap();
        assert_eq!(config.custom_headers.len(), 2);
    }

    #[test]
    fn test_effective_language_defaults_to_eng() {
        let mut config = ClientConfig::new("http://localhost/ocr");
        config.language = "  ".to_string();
        assert_eq!(config.effective_language(), "eng");
        config.language = "deu".to_string();
        assert_eq!(config.effective_language(), "deu");
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("rest_api".parse::<OcrBackend>().unwrap(), OcrBackend::RestApi);
        assert_eq!(
            "Tesseract".parse::<OcrBackend>().unwrap(),
            OcrBackend::Tesseract
        );
        assert!("azure".parse::<OcrBackend>().is_err());
    }

    #[test]
    fn test_has_credentials() {
        let mut s = Settings::default();
        assert!(!s.has_credentials());
        s.auth_token = Some("".to_string());
        assert!(!s.has_credentials());
        s.api_key = Some("key".to_string());
        assert!(s.has_credentials());
    }
}
