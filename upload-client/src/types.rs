// upload-client/src/types.rs
use crate::http::HttpError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;
use std::path::PathBuf;

/// Characters left unescaped in cookie values; space is written as `+`
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// A plain form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

impl FormField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for FormField {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// A file attached to a multipart body, read when the body is encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileField {
    pub name: String,
    pub source_path: PathBuf,
}

impl FileField {
    pub fn new(name: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
        }
    }
}

impl<N: Into<String>, P: Into<PathBuf>> From<(N, P)> for FileField {
    fn from((name, path): (N, P)) -> Self {
        Self::new(name, path)
    }
}

/// Session cookie sent with every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// `name=value` with the value form-urlencoded
    pub fn header_value(&self) -> String {
        // a literal `%` is escaped to `%25`, so every `%20` came from a space
        let encoded = utf8_percent_encode(&self.value, COOKIE_VALUE)
            .to_string()
            .replace("%20", "+");
        format!("{}={}", self.name, encoded)
    }
}

/// Basic-auth credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    /// `login:password`, the form basic auth encodes
    pub fn user_pass(&self) -> String {
        format!("{}:{}", self.login, self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of the last send: the (sanitized) payload or the transport failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResponse {
    Payload(String),
    Failed(HttpError),
}

impl UploadResponse {
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Payload(body) => Some(body),
            Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn as_result(&self) -> Result<&str, &HttpError> {
        match self {
            Self::Payload(body) => Ok(body),
            Self::Failed(err) => Err(err),
        }
    }
}
