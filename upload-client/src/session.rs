// upload-client/src/session.rs
use crate::error::UploadError;
use crate::fs::{FileAccess, LocalFs};
use crate::http::{Diagnostics, HttpTransport, RequestConfig, TransportHandle};
use crate::types::{Cookie, Credentials, FileField, FormField, UploadResponse};
use crate::{multipart, raw, response};
use std::path::Path;
use tracing::{info, warn};

/// Session-level settings applied to every request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub bootstrap_url: Option<String>,
    pub cookie: Option<Cookie>,
    pub auth: Option<Credentials>,
    pub verbose: bool,
}

impl SessionConfig {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }
}

/// Uploads content to endpoints below a bootstrap URL.
///
/// Each send performs exactly one request through `T` and replaces the
/// stored response. Errors returned from a send leave the previous response
/// and all configuration untouched.
pub struct UploadSession<T: HttpTransport, F: FileAccess = LocalFs> {
    transport: T,
    fs: F,
    config: SessionConfig,
    last_response: Option<UploadResponse>,
    diagnostics: Option<Diagnostics>,
}

impl<T: HttpTransport> UploadSession<T> {
    pub fn new(transport: T, verbose: bool) -> Self {
        Self::with_config(transport, LocalFs, SessionConfig::new(verbose))
    }
}

impl<T: HttpTransport, F: FileAccess> UploadSession<T, F> {
    pub fn with_config(transport: T, fs: F, config: SessionConfig) -> Self {
        Self {
            transport,
            fs,
            config,
            last_response: None,
            diagnostics: None,
        }
    }

    pub fn set_bootstrap_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.config.bootstrap_url = Some(url.into());
        self
    }

    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.config.cookie = Some(Cookie::new(name, value));
        self
    }

    pub fn set_auth(&mut self, login: impl Into<String>, password: impl Into<String>) -> &mut Self {
        self.config.auth = Some(Credentials::new(login, password));
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.config.bootstrap_url.is_some()
    }

    /// POST `fields` and `files` as `multipart/form-data` to `bootstrap_url + uri`
    pub fn send_multipart(
        &mut self,
        uri: &str,
        fields: &[FormField],
        files: &[FileField],
    ) -> Result<&mut Self, UploadError> {
        self.diagnostics = None;
        let url = self.target_url(uri)?;
        let encoded = multipart::encode(&self.fs, fields, files)?;

        let headers = encoded.headers();
        let request = self.request_config(url, encoded.into_body(), headers);
        self.dispatch(request)
    }

    /// POST the bytes of `path` unchanged to `bootstrap_url + uri`
    pub fn send_raw(&mut self, uri: &str, path: impl AsRef<Path>) -> Result<&mut Self, UploadError> {
        self.diagnostics = None;
        let url = self.target_url(uri)?;
        let body = raw::encode(&self.fs, path.as_ref())?;

        let request = self.request_config(url, body, Vec::new());
        self.dispatch(request)
    }

    /// Response of the last completed send, `None` before the first one
    pub fn response(&self) -> Option<&UploadResponse> {
        self.last_response.as_ref()
    }

    /// Transport diagnostics of the last send in verbose mode, including a
    /// send whose request failed. Cleared when a send starts.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    fn target_url(&self, uri: &str) -> Result<String, UploadError> {
        let base = self
            .config
            .bootstrap_url
            .as_deref()
            .ok_or(UploadError::NotConfigured)?;
        Ok(format!("{}{}", base, uri))
    }

    fn request_config(
        &self,
        url: String,
        body: Vec<u8>,
        headers: Vec<(String, String)>,
    ) -> RequestConfig {
        RequestConfig {
            headers,
            cookie: self.config.cookie.as_ref().map(Cookie::header_value),
            basic_auth: self.config.auth.clone(),
            verbose: self.config.verbose,
            ..RequestConfig::post(url, body)
        }
    }

    fn dispatch(&mut self, request: RequestConfig) -> Result<&mut Self, UploadError> {
        let url = request.url.clone();
        let size = request.body.len();

        let mut handle = self
            .transport
            .open()
            .map_err(UploadError::TransportConfiguration)?;
        handle
            .configure(request)
            .map_err(UploadError::TransportConfiguration)?;

        info!(url = %url, size, "sending upload request");
        let outcome = match handle.execute() {
            Ok(bytes) => response::from_bytes(bytes),
            Err(e) => {
                warn!(url = %url, error = %e, "upload request failed");
                UploadResponse::Failed(e)
            }
        };

        let diagnostics = if self.config.verbose {
            handle.diagnostics()
        } else {
            None
        };
        drop(handle);

        if let Some(diag) = &diagnostics {
            info!(
                url = %diag.url,
                status = ?diag.status,
                elapsed_ms = diag.elapsed_ms,
                bytes_sent = diag.bytes_sent,
                bytes_received = diag.bytes_received,
                request_headers = ?diag.request_headers,
                response_headers = ?diag.response_headers,
                "transport diagnostics"
            );
        }

        self.diagnostics = diagnostics;
        self.last_response = Some(outcome);
        Ok(self)
    }
}
