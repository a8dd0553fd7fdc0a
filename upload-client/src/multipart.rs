// upload-client/src/multipart.rs
//! `multipart/form-data` body construction.
//!
//! Fields come first, then files, each as one part. The boundary is chosen
//! after all parts are built and is regenerated until it occurs in none of
//! them.

use crate::error::UploadError;
use crate::field::sanitize_name;
use crate::fs::{read_file, resolve_readable, FileAccess};
use crate::types::{FileField, FormField};
use md5::{Digest, Md5};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const BOUNDARY_PREFIX: &str = "---------------------";
const CRLF: &[u8] = b"\r\n";

/// An encoded multipart body and the boundary that delimits it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    body: Vec<u8>,
    boundary: String,
}

impl MultipartBody {
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Headers to send with the body. `Expect` is a hint the transport may drop.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Expect".to_string(), "100-continue".to_string()),
            ("Content-Type".to_string(), self.content_type()),
        ]
    }
}

/// Build a multipart body from form fields and files.
///
/// Every file must resolve to a readable regular file; otherwise
/// `UploadError::FileAccess` is returned and nothing else happens.
pub fn encode<F: FileAccess + ?Sized>(
    fs: &F,
    fields: &[FormField],
    files: &[FileField],
) -> Result<MultipartBody, UploadError> {
    let mut parts = Vec::with_capacity(fields.len() + files.len());

    for field in fields {
        parts.push(field_part(&field.name, &field.value));
    }

    for file in files {
        let path = resolve_readable(fs, &file.source_path)?;
        let data = read_file(fs, &path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        parts.push(file_part(&file.name, &filename, &data));
    }

    let boundary = choose_boundary(&parts, generate_boundary);
    let body = assemble(&parts, &boundary);

    debug!(
        parts = parts.len(),
        boundary = %boundary,
        size = body.len(),
        "encoded multipart body"
    );

    Ok(MultipartBody { body, boundary })
}

fn field_part(name: &str, value: &str) -> Vec<u8> {
    let mut part = format!(
        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
        sanitize_name(name)
    )
    .into_bytes();
    part.extend_from_slice(value.as_bytes());
    part
}

fn file_part(name: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut part = format!(
        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n",
        sanitize_name(name),
        sanitize_name(filename)
    )
    .into_bytes();
    part.extend_from_slice(data);
    part
}

/// Prefix plus the hex MD5 of a random seed and the current time
fn generate_boundary() -> String {
    let seed: u64 = rand::random();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let digest = Md5::digest(format!("{}{}", seed, nanos).as_bytes());
    format!("{}{:x}", BOUNDARY_PREFIX, digest)
}

/// Draw boundaries from `generate` until one is absent from every part.
/// Terminates because each draw is independently randomized.
fn choose_boundary(parts: &[Vec<u8>], mut generate: impl FnMut() -> String) -> String {
    loop {
        let boundary = generate();
        if !parts.iter().any(|part| contains(part, boundary.as_bytes())) {
            return boundary;
        }
        debug!(boundary = %boundary, "boundary collides with body content, regenerating");
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}

/// `--boundary\r\n<part>` joined by CRLF, then `--boundary--` and a final CRLF
fn assemble(parts: &[Vec<u8>], boundary: &str) -> Vec<u8> {
    let delimiter = format!("--{}\r\n", boundary);
    let size = parts
        .iter()
        .map(|p| delimiter.len() + p.len() + CRLF.len())
        .sum::<usize>()
        + boundary.len()
        + 6;

    let mut body = Vec::with_capacity(size);
    for part in parts {
        body.extend_from_slice(delimiter.as_bytes());
        body.extend_from_slice(part);
        body.extend_from_slice(CRLF);
    }
    body.extend_from_slice(b"--");
    body.extend_from_slice(boundary.as_bytes());
    body.extend_from_slice(b"--");
    body.extend_from_slice(CRLF);
    body
}
