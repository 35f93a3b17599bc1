//! Copy-to-clipboard buttons for code and math blocks.

pub const COPY_ICON: &str = "copy";
pub const SUCCESS_MILLIS: u32 = 1200;
pub const FAILURE_MILLIS: u32 = 2000;
pub const TEX_ANNOTATION_SELECTOR: &str = "annotation[encoding=\"application/x-tex\"]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyTarget {
    Code,
    Math,
}

impl CopyTarget {
    pub fn block_selector(self) -> &'static str {
        match self {
            CopyTarget::Code => ".post-full-content pre",
            CopyTarget::Math => ".post-full-content .katex-display",
        }
    }

    pub fn wrapper_class(self) -> &'static str {
        match self {
            CopyTarget::Code => "code-block-container",
            CopyTarget::Math => "math-block-container",
        }
    }

    pub fn button_class(self) -> &'static str {
        match self {
            CopyTarget::Code => "copy-code-button",
            CopyTarget::Math => "copy-math-button",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
}

impl CopyOutcome {
    pub fn icon(self) -> &'static str {
        match self {
            CopyOutcome::Copied => "check",
            CopyOutcome::Failed => "x",
        }
    }

    /// How long the outcome icon stays before the copy icon returns.
    pub fn revert_after_millis(self) -> u32 {
        match self {
            CopyOutcome::Copied => SUCCESS_MILLIS,
            CopyOutcome::Failed => FAILURE_MILLIS,
        }
    }
}

pub fn icon_markup(icon: &str) -> String {
    format!("<i data-lucide=\"{icon}\" style=\"width:18px;height:18px;\"></i>")
}

/// Whether a block's wrapper parent (given by its `class` attribute) is already ours.
pub fn already_wrapped(parent_class: Option<&str>, target: CopyTarget) -> bool {
    parent_class.is_some_and(|classes| {
        classes
            .split_whitespace()
            .any(|class| class == target.wrapper_class())
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapPlan {
    Wrap,
    AlreadyWrapped,
    /// The node to wrap has no parent to insert the wrapper into.
    Detached,
}

/// `parent_class` is the class attribute of the wrapped node's parent, `None` when detached.
pub fn wrap_plan(target: CopyTarget, parent_class: Option<&str>) -> WrapPlan {
    match parent_class {
        None => WrapPlan::Detached,
        Some(classes) if already_wrapped(Some(classes), target) => WrapPlan::AlreadyWrapped,
        Some(_) => WrapPlan::Wrap,
    }
}

/// One injection pass: wraps every block whose plan is [`WrapPlan::Wrap`] and
/// returns how many were wrapped. Running it again over the same blocks wraps nothing.
pub fn inject_pass<B, E>(
    target: CopyTarget,
    blocks: impl IntoIterator<Item = B>,
    mut parent_class: impl FnMut(&B) -> Option<String>,
    mut wrap: impl FnMut(B) -> Result<(), E>,
) -> Result<usize, E> {
    let mut wrapped = 0;
    for block in blocks {
        let class = parent_class(&block);
        if wrap_plan(target, class.as_deref()) == WrapPlan::Wrap {
            wrap(block)?;
            wrapped += 1;
        }
    }
    Ok(wrapped)
}

/// Clipboard payload from a block's extracted text; blank text means nothing to copy.
pub fn clipboard_payload(target: CopyTarget, raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let text = match target {
        CopyTarget::Code => raw,
        CopyTarget::Math => raw.trim().to_string(),
    };
    if text.trim().is_empty() {
        return None;
    }
    Some(text)
}

#[cfg(target_arch = "wasm32")]
pub use web::inject_copy_buttons;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::rc::Rc;

    use serde_json::json;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::{spawn_local, JsFuture};
    use web_sys::{Element, HtmlElement};

    use super::*;
    use crate::controller::PageContext;
    use crate::error::BehaviorError;

    /// Wraps every matched block that is not wrapped yet; returns how many were wrapped.
    pub fn inject_copy_buttons(ctx: &Rc<PageContext>, target: CopyTarget) -> Result<usize, BehaviorError> {
        let nodes = ctx.document.query_selector_all(target.block_selector())?;
        // code wraps the <pre> itself; math wraps the element around .katex-display
        let blocks: Vec<(Element, Element)> = (0..nodes.length())
            .filter_map(|index| nodes.get(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|block| match target {
                CopyTarget::Code => Some((block.clone(), block)),
                CopyTarget::Math => block.parent_element().map(|parent| (block, parent)),
            })
            .collect();
        let wrapped = inject_pass(
            target,
            blocks,
            |(_, wrapped_node)| wrapped_node.parent_element().map(|parent| parent.class_name()),
            |(block, wrapped_node)| wrap_block(ctx, target, block, wrapped_node),
        )?;
        if wrapped > 0 {
            ctx.icons.refresh();
        }
        Ok(wrapped)
    }

    fn wrap_block(
        ctx: &Rc<PageContext>,
        target: CopyTarget,
        block: Element,
        wrapped_node: Element,
    ) -> Result<(), BehaviorError> {
        let parent = wrapped_node
            .parent_element()
            .ok_or(BehaviorError::MissingElement("copy block parent"))?;

        let container = ctx.document.create_element("div")?;
        container.class_list().add_1(target.wrapper_class())?;
        parent.insert_before(&container, Some(&wrapped_node))?;
        container.append_child(&wrapped_node)?;

        let button = ctx.document.create_element("button")?;
        button.class_list().add_1(target.button_class())?;
        button.set_attribute("type", "button")?;
        button.set_attribute("aria-label", "Copy to clipboard")?;
        button.set_inner_html(&icon_markup(COPY_ICON));
        container.append_child(&button)?;

        let handler_ctx = ctx.clone();
        let handler_button = button.clone();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let payload = clipboard_payload(target, extract_text(target, &block));
            copy_and_report(handler_ctx.clone(), handler_button.clone(), target, payload);
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn extract_text(target: CopyTarget, block: &Element) -> Option<String> {
        match target {
            CopyTarget::Code => {
                let source = block
                    .query_selector("code")
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| block.clone());
                source.dyn_into::<HtmlElement>().ok().map(|element| element.inner_text())
            }
            CopyTarget::Math => block
                .query_selector(TEX_ANNOTATION_SELECTOR)
                .ok()
                .flatten()
                .and_then(|annotation| annotation.text_content()),
        }
    }

    fn copy_and_report(ctx: Rc<PageContext>, button: Element, target: CopyTarget, payload: Option<String>) {
        spawn_local(async move {
            let outcome = match payload {
                Some(text) => match write_clipboard(&ctx, &text).await {
                    Ok(()) => CopyOutcome::Copied,
                    Err(err) => {
                        ctx.logger.warn(
                            "copy.failed",
                            json!({ "target": format!("{target:?}"), "error": err.to_string() }),
                        );
                        CopyOutcome::Failed
                    }
                },
                None => {
                    ctx.logger.warn("copy.empty_payload", json!({ "target": format!("{target:?}") }));
                    CopyOutcome::Failed
                }
            };
            show_outcome(&ctx, &button, outcome);
        });
    }

    async fn write_clipboard(ctx: &PageContext, text: &str) -> Result<(), BehaviorError> {
        let clipboard = ctx.window.navigator().clipboard();
        if clipboard.is_undefined() {
            return Err(BehaviorError::Clipboard("clipboard unavailable".to_string()));
        }
        JsFuture::from(clipboard.write_text(text))
            .await
            .map(|_| ())
            .map_err(|err| BehaviorError::Clipboard(BehaviorError::from(err).to_string()))
    }

    fn show_outcome(ctx: &Rc<PageContext>, button: &Element, outcome: CopyOutcome) {
        button.set_inner_html(&icon_markup(outcome.icon()));
        ctx.icons.refresh();
        let revert_ctx = ctx.clone();
        let revert_button = button.clone();
        ctx.timers.set_timeout(outcome.revert_after_millis(), move || {
            revert_button.set_inner_html(&icon_markup(COPY_ICON));
            revert_ctx.icons.refresh();
        });
    }
}
