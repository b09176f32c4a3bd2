use crate::url::ResolvedResource;
use crate::UrlError;
use url::Url;

/// Resolves a raw reference against the page URL
///
/// Follows the standard base + relative joining algorithm:
/// - absolute references pass through unchanged
/// - scheme-relative references (`//host/path`) inherit the base scheme
/// - path-relative references are joined against the base path, with dot-segment
///   removal and query/fragment handling
///
/// Surrounding whitespace is stripped first, as browsers do for attribute values.
///
/// # Arguments
///
/// * `raw` - The reference as found in markup
/// * `base` - The URL of the page the reference was found on
///
/// # Returns
///
/// * `Ok(ResolvedResource)` - An absolute http(s) URL
/// * `Err(UrlError::InvalidUrl)` - The reference could not be joined
/// * `Err(UrlError::UnsupportedScheme)` - The result is not fetchable over HTTP
///
/// # Examples
///
/// ```
/// use media_harvester::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://site.example/a/b").unwrap();
/// let resolved = resolve("images/x.png", &base).unwrap();
/// assert_eq!(resolved.as_str(), "https://site.example/a/images/x.png");
/// ```
pub fn resolve(raw: &str, base: &Url) -> Result<ResolvedResource, UrlError> {
    let reference = raw.trim();

    let url = base.join(reference).map_err(|e| UrlError::InvalidUrl {
        reference: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(ResolvedResource { url }),
        other => Err(UrlError::UnsupportedScheme(other.to_string())),
    }
}
