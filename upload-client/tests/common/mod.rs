// Shared test doubles for upload-client integration tests
#![allow(dead_code)]

use bytes::Bytes;
use futures_util::stream;
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use upload_client::{Diagnostics, FileAccess, HttpError, HttpTransport, RequestConfig, TransportHandle};

/// What the recording transport has seen
#[derive(Default)]
pub struct TransportLog {
    pub opened: usize,
    pub released: usize,
    pub executed: usize,
    pub requests: Vec<RequestConfig>,
}

/// Transport that records every request and replies with a canned result
#[derive(Clone)]
pub struct RecordingTransport {
    pub log: Rc<RefCell<TransportLog>>,
    reply: Result<Vec<u8>, HttpError>,
}

impl RecordingTransport {
    pub fn replying(body: &[u8]) -> Self {
        Self {
            log: Rc::default(),
            reply: Ok(body.to_vec()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            log: Rc::default(),
            reply: Err(HttpError::new(message)),
        }
    }

    pub fn last_request(&self) -> RequestConfig {
        self.log
            .borrow()
            .requests
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

pub struct RecordingHandle {
    log: Rc<RefCell<TransportLog>>,
    reply: Result<Vec<u8>, HttpError>,
}

impl HttpTransport for RecordingTransport {
    type Handle = RecordingHandle;

    fn open(&self) -> Result<RecordingHandle, HttpError> {
        self.log.borrow_mut().opened += 1;
        Ok(RecordingHandle {
            log: Rc::clone(&self.log),
            reply: self.reply.clone(),
        })
    }
}

impl TransportHandle for RecordingHandle {
    fn configure(&mut self, request: RequestConfig) -> Result<(), HttpError> {
        self.log.borrow_mut().requests.push(request);
        Ok(())
    }

    fn execute(&mut self) -> Result<Vec<u8>, HttpError> {
        self.log.borrow_mut().executed += 1;
        self.reply.clone()
    }

    fn diagnostics(&self) -> Option<Diagnostics> {
        None
    }
}

impl Drop for RecordingHandle {
    fn drop(&mut self) {
        self.log.borrow_mut().released += 1;
    }
}

/// In-memory files keyed by absolute path
#[derive(Default, Clone)]
pub struct MemoryFs {
    files: HashMap<PathBuf, Vec<u8>>,
    unreadable: Vec<PathBuf>,
}

impl MemoryFs {
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: &[u8]) -> Self {
        self.files.insert(path.into(), content.to_vec());
        self
    }

    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.files.insert(path.clone(), Vec::new());
        self.unreadable.push(path);
        self
    }
}

impl FileAccess for MemoryFs {
    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        self.files.contains_key(path).then(|| path.to_path_buf())
    }

    fn is_regular_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_readable(&self, path: &Path) -> bool {
        !self.unreadable.iter().any(|p| p == path)
    }

    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

/// One part recovered from an encoded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Parse an encoded body with `multer`, driving it on a throwaway runtime
pub fn parse_multipart(body: &[u8], boundary: &str) -> Vec<ParsedPart> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("test runtime");
    let chunk = Bytes::copy_from_slice(body);
    let stream = stream::once(async move { Ok::<Bytes, Infallible>(chunk) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    runtime.block_on(async move {
        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await.expect("well-formed part") {
            let name = field.name().expect("part without name").to_string();
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(|mime| mime.to_string());
            let data = field.bytes().await.expect("part data").to_vec();
            parts.push(ParsedPart {
                name,
                filename,
                content_type,
                data,
            });
        }
        parts
    })
}

pub fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return Vec::new();
    }
    (0..=haystack.len() - needle.len())
        .filter(|&i| &haystack[i..i + needle.len()] == needle)
        .collect()
}
