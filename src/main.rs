use clap::{Parser, Subcommand};
use rest_ocr::config::Settings;
use rest_ocr::engines;
use rest_ocr::error::ErrorResponse;
use rest_ocr::{checks, ClientConfig, OcrEngine, RestOcrEngine};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "rest-ocr")]
#[command(about = "Extract text from documents with a remote REST OCR service")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// OCR backend (tesseract, rest_api)
    #[arg(long, global = true, env = "REST_OCR_BACKEND", default_value = "rest_api")]
    pub backend: String,

    /// OCR service endpoint URL
    #[arg(long, global = true, env = "REST_OCR_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Authentication method (bearer, api_key, basic, none)
    #[arg(long, global = true, env = "REST_OCR_AUTH_METHOD")]
    pub auth_method: Option<String>,

    /// Bearer token
    #[arg(long, global = true, env = "REST_OCR_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// API key, or "username:password" for basic auth
    #[arg(long, global = true, env = "REST_OCR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-attempt connect, upload and read timeout in seconds
    #[arg(long, global = true, env = "REST_OCR_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    /// Retries after the first attempt on timeouts and 5xx responses
    #[arg(long, global = true, env = "REST_OCR_RETRY_COUNT", default_value = "3")]
    pub retry_count: u32,

    /// Verify the endpoint's TLS certificate
    #[arg(
        long,
        global = true,
        env = "REST_OCR_VERIFY_SSL",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub verify_ssl: bool,

    /// Language hint for the OCR service (e.g., "eng", "deu")
    #[arg(long, global = true, env = "REST_OCR_LANGUAGE", default_value = "eng")]
    pub language: String,

    /// Extra request headers as a JSON object
    #[arg(long, global = true, env = "REST_OCR_CUSTOM_HEADERS")]
    pub custom_headers: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract text from a document
    Parse {
        /// PDF or image to process
        file: PathBuf,

        /// MIME type of the file (guessed from the extension when omitted)
        #[arg(long)]
        mime_type: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the configuration and report problems
    Check,
}

fn settings_from(args: &Args) -> anyhow::Result<Settings> {
    Ok(Settings {
        backend: args.backend.parse()?,
        endpoint: args.endpoint.clone(),
        auth_method: args.auth_method.clone(),
        auth_token: args.auth_token.clone(),
        api_key: args.api_key.clone(),
        timeout_secs: args.timeout,
        retry_count: args.retry_count,
        verify_ssl: args.verify_ssl,
        language: Some(args.language.clone()),
        custom_headers: args.custom_headers.clone(),
    })
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Initialize tracing; stdout is reserved for extracted text
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = settings_from(&args)?;

    match &args.command {
        Command::Check => Ok(check(&settings)),
        Command::Parse {
            file,
            mime_type,
            json,
        } => parse(settings, file, mime_type.as_deref(), *json),
    }
}

fn check(settings: &Settings) -> ExitCode {
    let diagnostics = checks::run(settings);
    for diagnostic in &diagnostics {
        println!("{}", diagnostic);
    }

    if checks::has_errors(&diagnostics) {
        ExitCode::FAILURE
    } else {
        if diagnostics.is_empty() {
            println!("No issues found");
        }
        ExitCode::SUCCESS
    }
}

fn parse(
    settings: Settings,
    file: &Path,
    mime_type: Option<&str>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    for diagnostic in checks::run(&settings) {
        tracing::warn!("{}", diagnostic);
    }

    let declaration = engines::declaration(settings.backend).ok_or_else(|| {
        anyhow::anyhow!(
            "backend '{}' is not provided by rest-ocr; set REST_OCR_BACKEND=rest_api",
            settings.backend.as_str()
        )
    })?;

    let mime_type = match mime_type {
        Some(mime) => mime.to_string(),
        None => file
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| declaration.mime_type_for_extension(ext))
            .ok_or_else(|| {
                anyhow::anyhow!("cannot determine MIME type of {:?}; pass --mime-type", file)
            })?
            .to_string(),
    };
    if !declaration.supports(&mime_type) {
        tracing::warn!("Received file with content type: {}", mime_type);
    }

    let config = ClientConfig::try_from(settings)?;
    let engine: Box<dyn OcrEngine> = Box::new(RestOcrEngine::new(config)?);

    match engine.process(file, &mime_type) {
        Ok(document) if json => {
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(document) => {
            println!("{}", document.text);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if json => {
            println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&e))?);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
