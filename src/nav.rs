pub const NAV_LINK_SELECTOR: &str = ".nav-links a, .mobile-sidebar-nav a";
pub const ACTIVE_CLASS: &str = "active";

/// Whether a navigation link points at the current page.
///
/// The deployment root is stripped from both sides first. A non-root href also
/// matches every page below it, so overlapping links (`/blog`, `/blog/tags`) can
/// both be active at once.
pub fn is_active(current_path: &str, href: &str, base_url: &str) -> bool {
    let path = strip_base(current_path, base_url);
    let href = strip_base(href, base_url);
    path == href || (path == "/" && href == "/") || (href != "/" && path.starts_with(&href))
}

fn strip_base(value: &str, base_url: &str) -> String {
    if base_url.is_empty() {
        return value.to_string();
    }
    value.replacen(base_url, "", 1)
}

#[cfg(target_arch = "wasm32")]
pub fn highlight_navigation(ctx: &crate::controller::PageContext) -> Result<usize, crate::error::BehaviorError> {
    use wasm_bindgen::JsCast;

    let links = ctx.document.query_selector_all(NAV_LINK_SELECTOR)?;
    let mut active = 0;
    for index in 0..links.length() {
        let Some(link) = links
            .get(index)
            .and_then(|node| node.dyn_into::<web_sys::Element>().ok())
        else {
            continue;
        };
        let classes = link.class_list();
        let _ = classes.remove_1(ACTIVE_CLASS);
        let Some(href) = link.get_attribute("href") else {
            continue;
        };
        if is_active(&ctx.pathname, &href, &ctx.base_url) {
            let _ = classes.add_1(ACTIVE_CLASS);
            active += 1;
        }
    }
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_after_stripping() {
        assert!(is_active("/portfolio/about/", "/portfolio/about/", "/portfolio"));
        assert!(is_active("/about/", "/about/", ""));
    }

    #[test]
    fn root_matches_only_root() {
        assert!(is_active("/portfolio/", "/portfolio/", "/portfolio"));
        assert!(!is_active("/portfolio/blog/", "/portfolio/", "/portfolio"));
        assert!(!is_active("/blog/", "/", ""));
    }

    #[test]
    fn non_root_prefix_marks_section_active() {
        assert!(is_active("/blog/my-post/", "/blog/", ""));
        assert!(is_active("/portfolio/projects/x/", "/portfolio/projects/", "/portfolio"));
        assert!(!is_active("/about/", "/blog/", ""));
    }

    #[test]
    fn overlapping_prefixes_are_both_active() {
        let path = "/blog/tags/rust/";
        assert!(is_active(path, "/blog", ""));
        assert!(is_active(path, "/blog/tags", ""));
    }

    #[test]
    fn deterministic() {
        for _ in 0..3 {
            assert!(is_active("/blog/x", "/blog", ""));
            assert!(!is_active("/x", "/blog", ""));
        }
    }
}
