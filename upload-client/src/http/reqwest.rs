// upload-client/src/http/reqwest.rs
use super::{Diagnostics, HttpError, HttpTransport, RequestConfig, TransportHandle};
use ::reqwest::blocking::{Client, Request};
use ::reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, COOKIE, EXPECT};
use ::reqwest::Url;
use base64::prelude::*;
use std::time::{Duration, Instant};
use tracing::debug;

/// Blocking transport built on reqwest. Each `open` creates a fresh client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl HttpTransport for ReqwestTransport {
    type Handle = ReqwestHandle;

    fn open(&self) -> Result<ReqwestHandle, HttpError> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| HttpError::new(e.to_string()))?;

        Ok(ReqwestHandle {
            client,
            pending: None,
            diagnostics: None,
        })
    }
}

struct Pending {
    request: Request,
    verbose: bool,
    bytes_sent: usize,
    request_headers: Vec<(String, String)>,
}

pub struct ReqwestHandle {
    client: Client,
    pending: Option<Pending>,
    diagnostics: Option<Diagnostics>,
}

impl TransportHandle for ReqwestHandle {
    fn configure(&mut self, request: RequestConfig) -> Result<(), HttpError> {
        let url = Url::parse(&request.url)
            .map_err(|e| HttpError::new(format!("invalid URL {}: {}", request.url, e)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            // hyper does not wait for 100 Continue, so the hint is dropped
            if name.eq_ignore_ascii_case(EXPECT.as_str()) {
                debug!(value = %value, "ignoring Expect header");
                continue;
            }
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HttpError::new(format!("invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| HttpError::new(format!("invalid value for {}: {}", name, e)))?;
            headers.append(name, value);
        }

        if let Some(cookie) = &request.cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| HttpError::new(format!("invalid cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        if let Some(creds) = &request.basic_auth {
            let encoded = BASE64_STANDARD.encode(creds.user_pass());
            let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))
                .map_err(|e| HttpError::new(format!("invalid credentials: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let request_headers = header_pairs(&headers);
        let bytes_sent = request.body.len();
        let built = self
            .client
            .request(request.method, url)
            .headers(headers)
            .body(request.body)
            .build()
            .map_err(|e| HttpError::new(e.to_string()))?;

        self.pending = Some(Pending {
            request: built,
            verbose: request.verbose,
            bytes_sent,
            request_headers,
        });
        self.diagnostics = None;
        Ok(())
    }

    fn execute(&mut self) -> Result<Vec<u8>, HttpError> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| HttpError::new("request was not configured"))?;

        // filled in on every exit path so failed requests are diagnosable too
        let mut diagnostics = Diagnostics {
            url: pending.request.url().to_string(),
            bytes_sent: pending.bytes_sent,
            request_headers: pending.request_headers,
            ..Diagnostics::default()
        };

        let started = Instant::now();
        let result = receive(&self.client, pending.request, &mut diagnostics);
        diagnostics.elapsed_ms = started.elapsed().as_millis() as u64;

        if pending.verbose {
            self.diagnostics = Some(diagnostics);
        }
        result
    }

    fn diagnostics(&self) -> Option<Diagnostics> {
        self.diagnostics.clone()
    }
}

/// Send `request` and read the body, recording response details as they arrive
fn receive(
    client: &Client,
    request: Request,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<u8>, HttpError> {
    let resp = client.execute(request).map_err(|e| HttpError {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    })?;

    let status_code = resp.status().as_u16();
    diagnostics.status = Some(status_code);
    diagnostics.url = resp.url().to_string();
    diagnostics.response_headers = header_pairs(resp.headers());

    let bytes = resp
        .bytes()
        .map_err(|e| HttpError {
            status: Some(status_code),
            message: e.to_string(),
        })?
        .to_vec();

    diagnostics.bytes_received = bytes.len();
    Ok(bytes)
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if value.is_sensitive() {
                "<redacted>".to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.as_str().to_string(), value)
        })
        .collect()
}
