// upload-client/src/http/mod.rs
use crate::types::Credentials;
use serde::Serialize;

/// Error from HTTP transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: Option<u16>,
    pub message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(status) = self.status {
            write!(f, "HTTP error {}: {}", status, self.message)
        } else {
            write!(f, "HTTP error: {}", self.message)
        }
    }
}

impl std::error::Error for HttpError {}

/// Everything a transport needs to issue one request.
///
/// Built fresh for every send from the session configuration, so nothing
/// leaks from one request into the next.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub url: String,
    pub method: http::Method,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
    /// Ready-made `Cookie` header value
    pub cookie: Option<String>,
    pub basic_auth: Option<Credentials>,
    pub verbose: bool,
}

impl RequestConfig {
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            method: http::Method::POST,
            body,
            headers: Vec::new(),
            cookie: None,
            basic_auth: None,
            verbose: false,
        }
    }

    /// First header value with the given name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Transport details collected for a request made in verbose mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub url: String,
    pub status: Option<u16>,
    pub elapsed_ms: u64,
    pub bytes_sent: usize,
    pub bytes_received: usize,
    pub request_headers: Vec<(String, String)>,
    pub response_headers: Vec<(String, String)>,
}

/// Generic HTTP transport - users can implement their own.
///
/// A handle is opened for a single request and dropped when the request is
/// done, whatever the outcome.
pub trait HttpTransport {
    type Handle: TransportHandle;

    fn open(&self) -> Result<Self::Handle, HttpError>;
}

/// One request in flight
pub trait TransportHandle {
    /// Apply the request options; fails if any of them cannot be applied
    fn configure(&mut self, request: RequestConfig) -> Result<(), HttpError>;

    /// Perform the configured request and return the response body
    fn execute(&mut self) -> Result<Vec<u8>, HttpError>;

    /// Diagnostics for the last execution, when verbose was requested
    fn diagnostics(&self) -> Option<Diagnostics> {
        None
    }
}

#[cfg(feature = "reqwest")]
pub mod reqwest;

#[cfg(feature = "reqwest")]
pub use self::reqwest::ReqwestTransport;
