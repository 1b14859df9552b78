//! URL resolution utilities.
//!
//! URLs are opaque strings with a scheme prefix. Equality is textual and no
//! percent-encoding normalization is performed; the only normalization done
//! here is collapsing `.` and `..` path segments after a join.
//!
//! [RFC 3986 § 5.2 Relative Resolution](https://www.rfc-editor.org/rfc/rfc3986#section-5.2)

/// Resolve a potentially relative reference against an absolute base URL.
///
/// # Algorithm
///
/// STEP 1: `data:` references are returned unchanged.
///
/// STEP 2: A reference with a `:` before any `/` is already absolute.
///
/// STEP 3: Scheme-relative (`//host/x`) and origin-relative (`/x`)
///         references take the scheme or origin of the base.
///
/// STEP 4: If the base ends with `/`, the reference is appended.
///
/// STEP 5: A `#fragment` reference replaces the base's fragment, or is
///         appended when the base has none.
///
/// STEP 6: Otherwise the base's last path segment is replaced.
///
/// The base is trusted to be absolute.
#[must_use]
pub fn resolve_url(href: &str, base: &str) -> String {
    // STEP 1
    if href.starts_with("data:") {
        return href.to_owned();
    }

    // STEP 2
    if has_scheme(href) {
        return href.to_owned();
    }

    // STEP 3
    if href.starts_with("//") {
        let scheme = base.split_once(':').map_or("http", |(scheme, _)| scheme);
        return remove_dot_segments(&format!("{scheme}:{href}"));
    }
    if href.starts_with('/') {
        return remove_dot_segments(&format!("{}{href}", origin(base)));
    }

    // STEP 4
    if base.ends_with('/') {
        return remove_dot_segments(&format!("{base}{href}"));
    }

    // STEP 5
    if href.starts_with('#') {
        let root = base.rsplit_once('#').map_or(base, |(root, _)| root);
        return format!("{root}{href}");
    }

    // STEP 6
    let dir = base.rsplit_once('/').map_or(base, |(dir, _)| dir);
    remove_dot_segments(&format!("{dir}/{href}"))
}

/// Strip the fragment from a URL, giving its key in the document cache.
///
/// `data:` URLs are returned whole, since `#` is a legal payload character.
#[must_use]
pub fn url_root(url: &str) -> &str {
    if url.starts_with("data:") {
        return url;
    }
    split_fragment(url).0
}

/// Split a URL into the part before `#` and the fragment after it.
#[must_use]
pub fn split_fragment(url: &str) -> (&str, Option<&str>) {
    match url.split_once('#') {
        Some((root, fragment)) => (root, Some(fragment)),
        None => (url, None),
    }
}

/// Whether `url` starts with a scheme, i.e. has a `:` before any `/`.
#[must_use]
pub fn has_scheme(url: &str) -> bool {
    match (url.find(':'), url.find('/')) {
        (Some(colon), Some(slash)) => colon < slash,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// The `scheme://authority` prefix of a URL, or `scheme:` when it has no
/// authority component.
fn origin(base: &str) -> &str {
    if let Some(scheme_end) = base.find("://") {
        let after_scheme = scheme_end + 3;
        return base[after_scheme..]
            .find('/')
            .map_or(base, |path_start| &base[..after_scheme + path_start]);
    }
    base.find(':').map_or("", |colon| &base[..=colon])
}

/// Index at which the path component of `url` begins, if it has one.
fn path_start(url: &str) -> Option<usize> {
    if let Some(scheme_end) = url.find("://") {
        let after_scheme = scheme_end + 3;
        return url[after_scheme..].find('/').map(|i| after_scheme + i);
    }
    Some(url.find(':').map_or(0, |colon| colon + 1))
}

/// [RFC 3986 § 5.2.4 Remove Dot Segments](https://www.rfc-editor.org/rfc/rfc3986#section-5.2.4)
///
/// Only the path is touched; query and fragment are carried over verbatim.
fn remove_dot_segments(url: &str) -> String {
    let Some(start) = path_start(url) else {
        return url.to_owned();
    };
    let end = url[start..].find(['?', '#']).map_or(url.len(), |i| start + i);
    let path = &url[start..end];

    if !path.split('/').any(|segment| segment == "." || segment == "..") {
        return url.to_owned();
    }

    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len() - 1;
    let mut output: Vec<&str> = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {
                if i == last {
                    output.push("");
                }
            }
            ".." => {
                if output.last().is_some_and(|s| !s.is_empty()) {
                    let _ = output.pop();
                }
                if i == last {
                    output.push("");
                }
            }
            other => output.push(other),
        }
    }

    format!("{}{}{}", &url[..start], output.join("/"), &url[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        assert_eq!(origin("http://h/a/b"), "http://h");
        assert_eq!(origin("http://h"), "http://h");
        assert_eq!(origin("file:///tmp/x"), "file://");
        assert_eq!(origin("chrome:html.css"), "chrome:");
    }

    #[test]
    fn test_remove_dot_segments_keeps_query() {
        assert_eq!(
            remove_dot_segments("http://h/a/./b/../c?x=../y"),
            "http://h/a/c?x=../y"
        );
        assert_eq!(remove_dot_segments("http://h/.."), "http://h/");
        assert_eq!(remove_dot_segments("http://h"), "http://h");
    }
}
