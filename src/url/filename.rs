use url::Url;

/// Name used when a URL has no usable final path segment
pub const FALLBACK_FILE_NAME: &str = "download";

/// Derives the desired file name of a resource from its URL
///
/// The final non-empty path segment is used; the query string and fragment are
/// never part of the name. Characters that are invalid on common filesystems are
/// replaced by `_`.
///
/// # Examples
///
/// ```
/// use media_harvester::url::file_name_from_url;
/// use url::Url;
///
/// let url = Url::parse("https://cdn.example/img/cat.png?v=3").unwrap();
/// assert_eq!(file_name_from_url(&url), "cat.png");
/// ```
pub fn file_name_from_url(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last());

    match last {
        Some(segment) => sanitize_file_name(segment),
        None => FALLBACK_FILE_NAME.to_string(),
    }
}

/// Replaces characters that cannot appear in a file name
///
/// Covers `/ \ : * ? " < > |` and control characters. Names made only of dots
/// would address the directory itself and fall back to the default name.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        return FALLBACK_FILE_NAME.to_string();
    }

    sanitized
}
