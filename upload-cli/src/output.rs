// upload-cli/src/output.rs
use serde::Serialize;
use std::fmt;
use std::io::IsTerminal;
use upload_client::{Diagnostics, HttpError, UploadError};

/// Output format option
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Auto-detect based on TTY
    Auto,
    /// Force JSON output
    Json,
    /// Force human-readable output
    Human,
}

impl OutputFormat {
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto if std::io::stdout().is_terminal() => Self::Human,
            Self::Auto => Self::Json,
            other => other,
        }
    }
}

/// Standard JSON response envelope
#[derive(Debug, Serialize)]
pub struct Response<T> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
}

impl<T> Response<T> {
    pub fn ok(result: T, meta: Option<Meta>) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
            meta,
        }
    }

    pub fn error(error: ErrorResponse, meta: Option<Meta>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error),
            meta,
        }
    }
}

/// Payload returned by the endpoint
#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    type_: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
}

impl ErrorResponse {
    pub fn transport(err: &HttpError) -> Self {
        Self {
            type_: "transport",
            message: err.to_string(),
            retryable: Some(true),
        }
    }

    pub fn validation_failed(message: String) -> Self {
        Self {
            type_: "validation_failed",
            message,
            retryable: Some(false),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.type_ {
            "transport" => ExitCode::TransientError,
            "file_access" | "validation_failed" => ExitCode::Rejected,
            _ => ExitCode::PermanentError,
        }
    }
}

impl From<&UploadError> for ErrorResponse {
    fn from(err: &UploadError) -> Self {
        let type_ = match err {
            UploadError::FileAccess { .. } => "file_access",
            UploadError::TransportConfiguration(_) => "transport_configuration",
            UploadError::NotConfigured => "not_configured",
        };
        Self {
            type_,
            message: err.to_string(),
            retryable: Some(false),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

impl Meta {
    /// `None` unless there is something to report
    pub fn from_diagnostics(diagnostics: Option<&Diagnostics>) -> Option<Self> {
        diagnostics.cloned().map(|d| Self {
            diagnostics: Some(d),
        })
    }
}

/// Exit codes for script decision making
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    TransientError = 1,
    PermanentError = 2,
    Rejected = 3,
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::TransientError => write!(f, "transient_error"),
            Self::PermanentError => write!(f, "permanent_error"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Print a response in the requested format and return its exit code
pub fn emit(resp: &Response<UploadResult>, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let code = match &resp.error {
        Some(err) => err.exit_code(),
        None => ExitCode::Success,
    };

    match format.resolve() {
        OutputFormat::Human => print_human(resp),
        _ => println!("{}", serde_json::to_string(resp)?),
    }
    Ok(code)
}

fn print_human(resp: &Response<UploadResult>) {
    if let Some(diagnostics) = resp.meta.as_ref().and_then(|m| m.diagnostics.as_ref()) {
        print_diagnostics(diagnostics);
    }
    if let Some(result) = &resp.result {
        println!("{}", result.response);
    }
    if let Some(err) = &resp.error {
        print_error(&err.message);
    }
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    print_header("URL", &diagnostics.url);
    if let Some(status) = diagnostics.status {
        print_header("Status", &status.to_string());
    }
    print_header("Time", &format!("{} ms", diagnostics.elapsed_ms));
    print_header(
        "Transferred",
        &format!(
            "{} bytes sent, {} bytes received",
            diagnostics.bytes_sent, diagnostics.bytes_received
        ),
    );
    for (name, value) in &diagnostics.request_headers {
        print_header(&format!("> {}", name), value);
    }
    for (name, value) in &diagnostics.response_headers {
        print_header(&format!("< {}", name), value);
    }
}

/// Print a styled error message
pub fn print_error(message: &str) {
    let term = console::Term::stderr();
    let _ = term.write_str(&format!("{} {}\n", console::style("Error:").red(), message));
}

/// Print a styled info/header
pub fn print_header(key: &str, value: &str) {
    let term = console::Term::stderr();
    let _ = term.write_str(&format!("{}: {}\n", console::style(key).bold(), value));
}
