// upload-client/src/lib.rs
pub mod error;
pub mod field;
pub mod fs;
pub mod http;
pub mod multipart;
pub mod raw;
pub mod response;
pub mod session;
pub mod types;

pub use error::UploadError;
pub use field::sanitize_name;
pub use fs::{FileAccess, LocalFs};
pub use self::http::{Diagnostics, HttpError, HttpTransport, RequestConfig, TransportHandle};
pub use multipart::MultipartBody;
pub use session::{SessionConfig, UploadSession};
pub use types::{Cookie, Credentials, FileField, FormField, UploadResponse};

// Re-export reqwest transport when feature is enabled
#[cfg(feature = "reqwest")]
pub use self::http::ReqwestTransport;
