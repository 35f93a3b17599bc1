//! Table of contents for post pages.
//!
//! Headings inside the post body get synthetic ids (`heading-0`, `heading-1`, …)
//! and one outline is rendered into every TOC container on the page, so the
//! desktop and mobile copies always list the same entries. A scroll-spy marks
//! the entry for the last heading above the reading line.

use std::cell::Cell;

pub const CONTENT_SELECTOR: &str = ".post-full-content";
pub const CONTAINER_SELECTORS: [&str; 2] = [".toc-sticky-desktop", ".toc-sticky-mobile"];
pub const HEADING_SELECTOR: &str = "h1, h2, h3, h4";
pub const TITLE: &str = "Contents";
/// Distance below the viewport top at which a heading counts as "reached".
pub const SCROLL_LOOKAHEAD: f64 = 150.0;
pub const SCROLL_DEBOUNCE_MILLIS: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "h1" => Some(HeadingLevel::H1),
            "h2" => Some(HeadingLevel::H2),
            "h3" => Some(HeadingLevel::H3),
            "h4" => Some(HeadingLevel::H4),
            _ => None,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
        }
    }

    pub fn link_class(self) -> String {
        format!("toc-h{}", self.rank())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub level: HeadingLevel,
    pub text: String,
}

impl TocEntry {
    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }
}

/// Builds entries from `(tag name, text)` pairs in document order.
///
/// Ids follow the heading's position among all matched headings, so a skipped
/// element never shifts the ids of the others.
pub fn build_entries<'a, I>(headings: I) -> Vec<TocEntry>
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    headings
        .into_iter()
        .enumerate()
        .filter_map(|(index, (tag, text))| {
            HeadingLevel::from_tag(tag).map(|level| TocEntry {
                id: heading_id(index),
                level,
                text,
            })
        })
        .collect()
}

pub fn heading_id(index: usize) -> String {
    format!("heading-{index}")
}

/// Index of the last heading whose top is at or above `scroll_y + SCROLL_LOOKAHEAD`.
///
/// Defaults to the first heading when none has been reached yet.
pub fn active_index(heading_tops: &[f64], scroll_y: f64) -> usize {
    let reading_line = scroll_y + SCROLL_LOOKAHEAD;
    heading_tops
        .iter()
        .rposition(|top| *top <= reading_line)
        .unwrap_or(0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TocPlan {
    /// No headings: every container is hidden.
    Hide,
    Render,
}

impl TocPlan {
    /// Inline `display` applied to each container, if any.
    pub fn container_display(self) -> Option<&'static str> {
        match self {
            TocPlan::Hide => Some("none"),
            TocPlan::Render => None,
        }
    }
}

pub fn toc_plan(heading_count: usize) -> TocPlan {
    if heading_count == 0 {
        TocPlan::Hide
    } else {
        TocPlan::Render
    }
}

/// Collapses bursts of scroll events into one pending recomputation.
#[derive(Debug, Default)]
pub struct ScrollDebounce {
    pending: Cell<bool>,
}

impl ScrollDebounce {
    /// Returns `true` when the caller should schedule a recomputation.
    pub fn request(&self) -> bool {
        !self.pending.replace(true)
    }

    pub fn complete(&self) {
        self.pending.set(false);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::TableOfContents;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::rc::Rc;

    use serde_json::json;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{
        AddEventListenerOptions, Element, HtmlElement, ScrollBehavior, ScrollIntoViewOptions,
        ScrollLogicalPosition,
    };

    use super::*;
    use crate::controller::PageContext;
    use crate::error::BehaviorError;

    pub struct TableOfContents {
        ctx: Rc<PageContext>,
        containers: Vec<Element>,
        headings: Vec<HtmlElement>,
        debounce: ScrollDebounce,
    }

    impl TableOfContents {
        /// Returns `Ok(None)` on pages without a post body or TOC container.
        pub fn build(ctx: Rc<PageContext>) -> Result<Option<Rc<Self>>, BehaviorError> {
            let Some(content) = ctx.query(CONTENT_SELECTOR) else {
                return Ok(None);
            };
            let containers: Vec<Element> = CONTAINER_SELECTORS
                .iter()
                .filter_map(|selector| ctx.query(selector))
                .collect();
            if containers.is_empty() {
                return Ok(None);
            }

            let nodes = content.query_selector_all(HEADING_SELECTOR)?;
            let headings: Vec<HtmlElement> = (0..nodes.length())
                .filter_map(|index| nodes.get(index))
                .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
                .collect();

            let plan = toc_plan(headings.len());
            if let Some(display) = plan.container_display() {
                for container in &containers {
                    if let Some(container) = container.dyn_ref::<HtmlElement>() {
                        let _ = container.style().set_property("display", display);
                    }
                }
            }
            if plan == TocPlan::Hide {
                return Ok(None);
            }

            let tags: Vec<String> = headings.iter().map(|heading| heading.tag_name()).collect();
            let entries = build_entries(
                tags.iter()
                    .zip(&headings)
                    .map(|(tag, heading)| (tag.as_str(), heading.text_content().unwrap_or_default())),
            );
            for (heading, entry) in headings.iter().zip(&entries) {
                heading.set_id(&entry.id);
            }
            for container in &containers {
                render_outline(&ctx.document, container, &entries)?;
            }
            ctx.logger.debug(
                "toc.built",
                json!({ "entries": entries.len(), "containers": containers.len() }),
            );

            let toc = Rc::new(Self {
                ctx,
                containers,
                headings,
                debounce: ScrollDebounce::default(),
            });
            toc.clone().attach_click_handlers()?;
            toc.clone().attach_scroll_spy()?;
            Ok(Some(toc))
        }

        fn links(container: &Element) -> Vec<Element> {
            container
                .query_selector_all("a")
                .map(|links| {
                    (0..links.length())
                        .filter_map(|index| links.get(index))
                        .filter_map(|node| node.dyn_into::<Element>().ok())
                        .collect()
                })
                .unwrap_or_default()
        }

        fn mark_active(&self, active: usize) {
            for container in &self.containers {
                for (index, link) in Self::links(container).iter().enumerate() {
                    let _ = link.class_list().toggle_with_force("active", index == active);
                }
            }
        }

        fn attach_click_handlers(self: Rc<Self>) -> Result<(), BehaviorError> {
            for container in &self.containers {
                let toc = self.clone();
                let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                    let Some(link) = event
                        .target()
                        .and_then(|target| target.dyn_into::<Element>().ok())
                        .and_then(|target| target.closest("a").ok().flatten())
                    else {
                        return;
                    };
                    event.prevent_default();
                    toc.scroll_to(&link);
                }) as Box<dyn FnMut(_)>);
                container.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
                closure.forget();
            }
            Ok(())
        }

        fn scroll_to(&self, link: &Element) {
            let Some(target_id) = link
                .get_attribute("href")
                .and_then(|href| href.strip_prefix('#').map(str::to_string))
            else {
                return;
            };
            let Some(target) = self.ctx.document.get_element_by_id(&target_id) else {
                return;
            };
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            target.scroll_into_view_with_scroll_into_view_options(&options);

            let index = self.headings.iter().position(|heading| heading.id() == target_id);
            if let Some(index) = index {
                self.mark_active(index);
            }
        }

        fn recompute_active(&self) {
            let scroll_y = self.ctx.window.scroll_y().unwrap_or(0.0);
            let tops: Vec<f64> = self
                .headings
                .iter()
                .map(|heading| f64::from(heading.offset_top()))
                .collect();
            self.mark_active(active_index(&tops, scroll_y));
        }

        fn schedule_recompute(self: &Rc<Self>) {
            if !self.debounce.request() {
                return;
            }
            let toc = self.clone();
            self.ctx.timers.set_timeout(SCROLL_DEBOUNCE_MILLIS, move || {
                toc.recompute_active();
                toc.debounce.complete();
            });
        }

        fn attach_scroll_spy(self: Rc<Self>) -> Result<(), BehaviorError> {
            self.schedule_recompute();
            let toc = self.clone();
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                toc.schedule_recompute();
            }) as Box<dyn FnMut(_)>);
            let options = AddEventListenerOptions::new();
            options.set_passive(true);
            self.ctx.window.add_event_listener_with_callback_and_add_event_listener_options(
                "scroll",
                closure.as_ref().unchecked_ref(),
                &options,
            )?;
            closure.forget();
            Ok(())
        }
    }

    fn render_outline(
        document: &web_sys::Document,
        container: &Element,
        entries: &[TocEntry],
    ) -> Result<(), BehaviorError> {
        container.set_inner_html("");
        let title = document.create_element("div")?;
        title.set_class_name("toc-title");
        title.set_text_content(Some(TITLE));
        container.append_child(&title)?;

        let list = document.create_element("ul")?;
        list.set_class_name("toc-list");
        for entry in entries {
            let item = document.create_element("li")?;
            let link = document.create_element("a")?;
            link.set_attribute("href", &entry.href())?;
            link.set_class_name(&entry.level.link_class());
            link.set_text_content(Some(&entry.text));
            item.append_child(&link)?;
            list.append_child(&item)?;
        }
        container.append_child(&list)?;
        Ok(())
    }
}
