//! Floating "back to top" button that keeps clear of the footer.

pub const BUTTON_CLASS: &str = "scroll-to-top";
pub const FOOTER_SELECTOR: &str = ".site-footer";
pub const SHOW_AFTER_PX: f64 = 300.0;
pub const DEFAULT_BOTTOM_PX: f64 = 32.0;
pub const BOTTOM_TRANSITION: &str = "bottom 0.6s cubic-bezier(0.16, 1, 0.3, 1)";

pub fn is_visible(scroll_y: f64) -> bool {
    scroll_y > SHOW_AFTER_PX
}

/// Distance from the viewport bottom; lifts the button by however much of the
/// footer has scrolled into view.
pub fn bottom_offset(viewport_height: f64, footer_top: f64) -> f64 {
    let overlap = viewport_height - footer_top;
    if overlap > 0.0 {
        overlap + DEFAULT_BOTTOM_PX
    } else {
        DEFAULT_BOTTOM_PX
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::ScrollToTop;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{HtmlElement, ScrollBehavior, ScrollToOptions};

    use super::*;
    use crate::controller::PageContext;
    use crate::error::BehaviorError;

    pub struct ScrollToTop {
        ctx: Rc<PageContext>,
        button: HtmlElement,
    }

    impl ScrollToTop {
        pub fn setup(ctx: Rc<PageContext>) -> Result<Rc<Self>, BehaviorError> {
            let body = ctx.document.body().ok_or(BehaviorError::MissingElement("body"))?;
            let button = ctx
                .document
                .create_element("button")?
                .dyn_into::<HtmlElement>()
                .map_err(|_| BehaviorError::Dom("scroll button is not an HTMLElement".to_string()))?;
            button.set_class_name(BUTTON_CLASS);
            button.set_inner_html("<i data-lucide=\"chevron-up\"></i>");
            button.set_attribute("title", "Scroll to top")?;
            button.set_attribute("aria-label", "Scroll to top")?;
            body.append_child(&button)?;
            ctx.icons.refresh();

            let scroll_top = Rc::new(Self { ctx, button });
            scroll_top.clone().attach_listeners()?;
            scroll_top.update_visibility();
            scroll_top.update_position();
            Ok(scroll_top)
        }

        fn update_visibility(&self) {
            let scroll_y = self.ctx.window.scroll_y().unwrap_or(0.0);
            let _ = self
                .button
                .class_list()
                .toggle_with_force("visible", is_visible(scroll_y));
        }

        fn update_position(&self) {
            let Some(footer) = self.ctx.query(FOOTER_SELECTOR) else {
                return;
            };
            let viewport_height = self
                .ctx
                .window
                .inner_height()
                .ok()
                .and_then(|height| height.as_f64())
                .unwrap_or(0.0);
            let bottom = bottom_offset(viewport_height, footer.get_bounding_client_rect().top());
            let style = self.button.style();
            let _ = style.set_property("transition", BOTTOM_TRANSITION);
            let _ = style.set_property("bottom", &format!("{bottom}px"));
        }

        fn attach_listeners(self: Rc<Self>) -> Result<(), BehaviorError> {
            let window = &self.ctx.window;

            let on_scroll = {
                let scroll_top = self.clone();
                Closure::wrap(Box::new(move |_event: web_sys::Event| {
                    scroll_top.update_visibility();
                    scroll_top.update_position();
                }) as Box<dyn FnMut(_)>)
            };
            window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;
            on_scroll.forget();

            let on_resize = {
                let scroll_top = self.clone();
                Closure::wrap(Box::new(move |_event: web_sys::Event| {
                    scroll_top.update_position();
                }) as Box<dyn FnMut(_)>)
            };
            window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
            on_resize.forget();

            let on_click = {
                let scroll_top = self.clone();
                Closure::wrap(Box::new(move |_event: web_sys::Event| {
                    let options = ScrollToOptions::new();
                    options.set_top(0.0);
                    options.set_behavior(ScrollBehavior::Smooth);
                    scroll_top.ctx.window.scroll_to_with_scroll_to_options(&options);
                }) as Box<dyn FnMut(_)>)
            };
            self.button
                .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            on_click.forget();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn appears_only_past_threshold() {
        assert!(!is_visible(0.0));
        assert!(!is_visible(300.0));
        assert!(is_visible(300.5));
    }

    #[test]
    fn stays_at_default_while_footer_is_offscreen() {
        assert_eq!(bottom_offset(800.0, 1200.0), 32.0);
        assert_eq!(bottom_offset(800.0, 800.0), 32.0);
    }

    #[test]
    fn lifts_by_visible_footer_height() {
        assert_eq!(bottom_offset(800.0, 650.0), 182.0);
        assert_eq!(bottom_offset(800.0, 799.0), 33.0);
    }
}
