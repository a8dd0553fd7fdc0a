// upload-client/src/field.rs

/// Characters that may not appear inside a quoted `name` or `filename`
const DISALLOWED: [char; 4] = ['\0', '"', '\r', '\n'];

/// Replace NUL, double quote, CR and LF with `_` so the name can be embedded
/// in a `Content-Disposition` header line.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if DISALLOWED.contains(&c) { '_' } else { c })
        .collect()
}
