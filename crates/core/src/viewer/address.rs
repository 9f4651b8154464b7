//! Page-relative URL resolution for viewer media

use url::Url;

/// Resolve `src` against the page `base` URL. A base that isn't a valid
/// absolute URL leaves `src` as given.
pub fn resolve_url(base: &str, src: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(src)) {
        Ok(resolved) => resolved.into(),
        Err(e) => {
            tracing::debug!(base, src, error = %e, "Could not resolve media URL");
            src.to_string()
        }
    }
}

/// Directory URL of the page (`new URL('.', base)`)
pub fn base_dir(base: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(".")) {
        Ok(dir) => dir.into(),
        Err(_) => base.to_string(),
    }
}
