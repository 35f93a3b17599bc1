//! Highlights code lines tagged with a trailing `hl` marker comment.
//!
//! Supported markers: `// hl`, `# hl`, `-- hl`, `<!-- hl -->` and `/* hl */`.

use std::sync::LazyLock;

use regex::Regex;

pub const CODE_SELECTOR: &str = ".post-full-content pre code";
pub const HIGHLIGHT_CLASS: &str = "highlighted-line";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s*(?://|#|--)\s*hl\s*$)|(\s*<!--\s*hl\s*-->)|(\s*/\*\s*hl\s*\*/)")
        .unwrap_or_else(|err| panic!("invalid highlight marker pattern: {err}"))
});

/// Rewrites highlighted-code HTML line by line.
///
/// `line_text` turns one line of markup into its visible text; the marker is
/// detected on the text and removed from the markup. Returns `None` when no line
/// carries a marker so callers can leave the DOM untouched.
pub fn highlight_lines<F>(html: &str, line_text: F) -> Option<String>
where
    F: Fn(&str) -> String,
{
    let mut modified = false;
    let lines: Vec<String> = html
        .split('\n')
        .map(|line| {
            if !MARKER_RE.is_match(&line_text(line)) {
                return line.to_string();
            }
            modified = true;
            let cleaned = MARKER_RE.replace(line, "");
            format!("<span class=\"{HIGHLIGHT_CLASS}\">{cleaned}</span>")
        })
        .collect();
    modified.then(|| lines.join("\n"))
}

#[cfg(target_arch = "wasm32")]
pub fn highlight_code_lines(ctx: &crate::controller::PageContext) -> Result<usize, crate::error::BehaviorError> {
    use wasm_bindgen::JsCast;

    let scratch = ctx.document.create_element("div")?;
    let line_text = |line: &str| {
        scratch.set_inner_html(line);
        scratch.text_content().unwrap_or_default()
    };
    let blocks = ctx.document.query_selector_all(CODE_SELECTOR)?;
    let mut rewritten = 0;
    for index in 0..blocks.length() {
        let Some(code) = blocks
            .get(index)
            .and_then(|node| node.dyn_into::<web_sys::Element>().ok())
        else {
            continue;
        };
        if let Some(html) = highlight_lines(&code.inner_html(), line_text) {
            code.set_inner_html(&html);
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(line: &str) -> String {
        line.to_string()
    }

    #[test]
    fn untouched_when_no_marker() {
        assert_eq!(highlight_lines("let a = 1;\nlet b = 2;", plain), None);
    }

    #[test]
    fn wraps_marked_lines_and_strips_marker() {
        let html = "let a = 1;\nlet b = 2; // hl\nlet c = 3;";
        assert_eq!(
            highlight_lines(html, plain).as_deref(),
            Some("let a = 1;\n<span class=\"highlighted-line\">let b = 2;</span>\nlet c = 3;")
        );
    }

    #[test]
    fn recognises_every_comment_style() {
        let cases = [
            ("x = 1 # hl", "x = 1"),
            ("select 1 -- hl", "select 1"),
            ("&lt;p&gt; <!-- hl -->", "&lt;p&gt;"),
            ("a { } /* hl */", "a { }"),
            ("f() //hl", "f()"),
        ];
        for (line, kept) in cases {
            assert_eq!(
                highlight_lines(line, plain),
                Some(format!("<span class=\"highlighted-line\">{kept}</span>")),
            );
        }
    }

    #[test]
    fn marker_must_end_the_line() {
        assert_eq!(highlight_lines("// hl is a marker", plain), None);
    }

    #[test]
    fn detects_on_text_but_edits_markup() {
        let markup = "<span class=\"kw\">let</span> a = 1; <span class=\"c\">// hl</span>";
        let strip_tags = |line: &str| {
            let mut text = String::new();
            let mut in_tag = false;
            for ch in line.chars() {
                match ch {
                    '<' => in_tag = true,
                    '>' => in_tag = false,
                    _ if !in_tag => text.push(ch),
                    _ => {}
                }
            }
            text
        };
        let output = highlight_lines(markup, strip_tags).unwrap();
        assert!(output.starts_with("<span class=\"highlighted-line\">"));
    }
}
