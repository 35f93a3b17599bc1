//! Deployment root detection.
//!
//! Sites served from a sub-directory (`/portfolio/`) either declare it with a
//! `<base href>` tag or are detected from the first path segment.

/// Resolves the site root from an optional `<base href>` value and the current path.
///
/// The result never ends with `/`; the empty string means the site is served from `/`.
pub fn resolve_base_url(base_href: Option<&str>, pathname: &str) -> String {
    if let Some(href) = base_href {
        return href.strip_suffix('/').unwrap_or(href).to_string();
    }
    match first_segment(pathname) {
        Some(segment) if segment != "/index.html" => segment.to_string(),
        _ => String::new(),
    }
}

/// True for `/` and for `<base>/`.
pub fn is_home_path(pathname: &str, base_url: &str) -> bool {
    pathname == "/" || pathname == format!("{base_url}/")
}

fn first_segment(pathname: &str) -> Option<&str> {
    let rest = pathname.strip_prefix('/')?;
    let end = rest.find('/').unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some(&pathname[..end + 1])
}

#[cfg(target_arch = "wasm32")]
pub fn current_base_url(document: &web_sys::Document, pathname: &str) -> String {
    let href = document
        .query_selector("base[href]")
        .ok()
        .flatten()
        .and_then(|base| base.get_attribute("href"));
    resolve_base_url(href.as_deref(), pathname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn base_tag_wins_and_loses_trailing_slash() {
        assert_eq!(resolve_base_url(Some("/portfolio/"), "/blog/post"), "/portfolio");
        assert_eq!(resolve_base_url(Some("/"), "/blog/post"), "");
        assert_eq!(resolve_base_url(Some("/docs"), "/"), "/docs");
    }

    #[test]
    fn falls_back_to_first_path_segment() {
        assert_eq!(resolve_base_url(None, "/portfolio/blog/"), "/portfolio");
        assert_eq!(resolve_base_url(None, "/portfolio"), "/portfolio");
    }

    #[test]
    fn root_and_index_resolve_to_empty() {
        assert_eq!(resolve_base_url(None, "/"), "");
        assert_eq!(resolve_base_url(None, ""), "");
        assert_eq!(resolve_base_url(None, "/index.html"), "");
        assert_eq!(resolve_base_url(None, "//double"), "");
    }

    #[test]
    fn home_detection() {
        assert!(is_home_path("/", ""));
        assert!(is_home_path("/portfolio/", "/portfolio"));
        assert!(!is_home_path("/portfolio/blog/", "/portfolio"));
        assert!(!is_home_path("/portfolio", "/portfolio"));
    }
}
