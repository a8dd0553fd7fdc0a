//! Property-based tests for multipart encoding and name sanitization

mod common;

use common::{find_all, parse_multipart, MemoryFs};
use proptest::prelude::*;
use upload_client::multipart;
use upload_client::{sanitize_name, FileField, FormField};

/// Values that try hard to look like boundaries
fn adversarial_value() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "-{0,30}[0-9a-f]{0,32}",
        "(--)?-{21}[0-9a-f]{32}(--)?(\r\n)?",
    ]
}

/// Single path components, including ones full of quotes and line breaks
fn file_name() -> impl Strategy<Value = String> {
    any::<String>().prop_filter("must be one normal path component", |name| {
        !name.is_empty() && !name.contains('/') && name != "." && name != ".."
    })
}

fn ascii_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}"
}

#[test]
fn test_file_name_with_quote_and_crlf_is_sanitized() {
    let path = "/d/x\"y\r\nz.bin";
    let fs = MemoryFs::default().with_file(path, b"payload");
    let encoded = multipart::encode(&fs, &[], &[FileField::new("up\nload", path)]).unwrap();

    let text = String::from_utf8(encoded.body().to_vec()).unwrap();
    assert!(text.contains(
        "Content-Disposition: form-data; name=\"up_load\"; filename=\"x_y__z.bin\"\r\n"
    ));

    let parts = parse_multipart(encoded.body(), encoded.boundary());
    assert_eq!(parts[0].filename.as_deref(), Some("x_y__z.bin"));
    assert_eq!(parts[0].data, b"payload");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: sanitizing twice equals sanitizing once
    #[test]
    fn prop_sanitize_idempotent(name in any::<String>()) {
        let once = sanitize_name(&name);
        prop_assert_eq!(sanitize_name(&once), once);
    }

    /// Property: sanitized names contain none of NUL, quote, CR, LF
    #[test]
    fn prop_sanitize_removes_disallowed(name in any::<String>()) {
        let clean = sanitize_name(&name);
        prop_assert!(!clean.contains(['\0', '"', '\r', '\n']));
        prop_assert_eq!(clean.chars().count(), name.chars().count());
    }

    /// Property: the boundary only appears in delimiter lines
    #[test]
    fn prop_boundary_never_inside_content(
        values in prop::collection::vec(adversarial_value(), 0..6),
        contents in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..256), 0..3),
    ) {
        let fields: Vec<FormField> = values
            .iter()
            .enumerate()
            .map(|(i, v)| FormField::new(format!("field{}", i), v.clone()))
            .collect();

        let mut fs = MemoryFs::default();
        let mut files = Vec::new();
        for (i, content) in contents.iter().enumerate() {
            let path = format!("/upload/file{}.bin", i);
            fs = fs.with_file(path.clone(), content);
            files.push(FileField::new(format!("file{}", i), path));
        }

        let encoded = multipart::encode(&fs, &fields, &files).unwrap();
        let occurrences = find_all(encoded.body(), encoded.boundary().as_bytes()).len();
        prop_assert_eq!(occurrences, fields.len() + files.len() + 1);
    }

    /// Property: header lines never carry raw disallowed characters from
    /// field names or derived file names
    #[test]
    fn prop_header_names_are_sanitized(
        names in prop::collection::vec(any::<String>(), 1..5),
        files in prop::collection::vec((any::<String>(), file_name()), 0..3),
    ) {
        let fields: Vec<FormField> = names
            .iter()
            .map(|n| FormField::new(n.clone(), "v"))
            .collect();

        let mut fs = MemoryFs::default();
        let mut file_fields = Vec::new();
        for (i, (name, filename)) in files.iter().enumerate() {
            let path = format!("/dir{}/{}", i, filename);
            fs = fs.with_file(path.clone(), b"x");
            file_fields.push(FileField::new(name.clone(), path));
        }

        let encoded = multipart::encode(&fs, &fields, &file_fields).unwrap();
        let body = encoded.body();
        let delimiter = format!("--{}\r\n", encoded.boundary());

        let expected_headers = names
            .iter()
            .map(|name| {
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    sanitize_name(name)
                )
            })
            .chain(files.iter().map(|(name, filename)| {
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    sanitize_name(name),
                    sanitize_name(filename)
                )
            }));

        let starts = find_all(body, delimiter.as_bytes());
        prop_assert_eq!(starts.len(), names.len() + files.len());
        for (start, expected) in starts.iter().zip(expected_headers) {
            let header_start = start + delimiter.len();
            prop_assert!(body[header_start..].starts_with(expected.as_bytes()));
        }
    }

    /// Property: ordinary ASCII fields and files survive a parse
    #[test]
    fn prop_ascii_round_trip(
        fields in prop::collection::vec((ascii_name(), "[ -~]{0,40}"), 0..5),
        files in prop::collection::vec((ascii_name(), "[a-z]{1,8}\\.txt", "[ -~]{0,64}"), 0..3),
    ) {
        let form: Vec<FormField> = fields.iter().cloned().map(FormField::from).collect();

        let mut fs = MemoryFs::default();
        let mut file_fields = Vec::new();
        for (i, (name, filename, content)) in files.iter().enumerate() {
            let path = format!("/dir{}/{}", i, filename);
            fs = fs.with_file(path.clone(), content.as_bytes());
            file_fields.push(FileField::new(name.clone(), path));
        }

        let encoded = multipart::encode(&fs, &form, &file_fields).unwrap();
        let parts = parse_multipart(encoded.body(), encoded.boundary());
        prop_assert_eq!(parts.len(), form.len() + file_fields.len());

        for (part, (name, value)) in parts.iter().zip(&fields) {
            prop_assert_eq!(&part.name, name);
            prop_assert_eq!(part.filename.as_deref(), None);
            prop_assert_eq!(&part.data, &value.as_bytes().to_vec());
        }
        for (part, (name, filename, content)) in parts[form.len()..].iter().zip(&files) {
            prop_assert_eq!(&part.name, name);
            prop_assert_eq!(part.filename.as_deref(), Some(filename.as_str()));
            prop_assert_eq!(&part.data, &content.as_bytes().to_vec());
        }
    }
}
