// upload-client/src/response.rs
use crate::types::UploadResponse;
use tracing::warn;

/// Strip a leading BOM from a payload; failures pass through untouched
pub fn sanitize(response: UploadResponse) -> UploadResponse {
    match response {
        UploadResponse::Payload(text) => match text.strip_prefix('\u{FEFF}') {
            Some(rest) => UploadResponse::Payload(rest.to_string()),
            None => UploadResponse::Payload(text),
        },
        failed @ UploadResponse::Failed(_) => failed,
    }
}

/// Turn raw transport bytes into a sanitized payload
pub(crate) fn from_bytes(bytes: Vec<u8>) -> UploadResponse {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("response is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    sanitize(UploadResponse::Payload(text))
}
