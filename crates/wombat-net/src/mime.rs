//! MIME types from file extensions and back.

/// Extensions of the formats the document model reads. The first extension
/// listed for a MIME type is the one used when saving.
const KNOWN: &[(&str, &str)] = &[
    ("css", "text/css"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("xhtml", "application/xhtml+xml"),
    ("xml", "application/xml"),
    ("svg", "image/svg+xml"),
    ("json", "application/json"),
    ("js", "text/javascript"),
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("bin", OCTET_STREAM),
];

/// MIME type of unknown binary data.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME type for a file extension; unknown extensions are binary data.
#[must_use]
pub fn mime_for_extension(extension: &str) -> String {
    let extension = extension.to_ascii_lowercase();
    KNOWN
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, mime)| (*mime).to_owned())
        .or_else(|| {
            mime_guess::from_ext(&extension)
                .first_raw()
                .map(str::to_owned)
        })
        .unwrap_or_else(|| OCTET_STREAM.to_owned())
}

/// File extension for a MIME type, ignoring parameters.
#[must_use]
pub fn extension_for_mime(mime: &str) -> String {
    let essence = essence(mime);
    KNOWN
        .iter()
        .find(|(_, known)| *known == essence)
        .map(|(extension, _)| *extension)
        .or_else(|| {
            mime_guess::get_mime_extensions_str(&essence)
                .and_then(|extensions| extensions.first().copied())
        })
        .unwrap_or("bin")
        .to_owned()
}

/// `text/html; charset=utf-8` becomes `text/html`.
#[must_use]
pub fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types_round_trip() {
        for (_, mime) in KNOWN {
            assert_eq!(mime_for_extension(&extension_for_mime(mime)), *mime);
        }
    }

    #[test]
    fn test_parameters_and_case() {
        assert_eq!(extension_for_mime("Text/CSS; charset=utf-8"), "css");
        assert_eq!(mime_for_extension("SVG"), "image/svg+xml");
        assert_eq!(mime_for_extension("nonsense-ext"), OCTET_STREAM);
    }
}
