//! Off-canvas navigation for small screens.
//!
//! Panel, overlay, hamburger button, close button and the body scroll lock form
//! one unit: every update derives all of them from a single open flag.

pub const PANEL_SELECTOR: &str = "#mobileSidebar";
pub const OVERLAY_SELECTOR: &str = ".mobile-sidebar-overlay";
pub const TOGGLE_SELECTOR: &str = ".mobile-menu-toggle";
pub const CLOSE_SELECTOR: &str = ".mobile-sidebar-close";
pub const HINT_CLEANUP_MILLIS: u32 = 300;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SidebarState {
    open: bool,
}

impl SidebarState {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn toggled(self) -> Self {
        Self { open: !self.open }
    }

    pub fn closed() -> Self {
        Self { open: false }
    }

    pub fn view(self) -> SidebarView {
        SidebarView {
            panel_open: self.open,
            overlay_active: self.open,
            toggle_open: self.open,
            close_spinning: self.open,
            scroll_locked: self.open,
            panel_will_change: if self.open { "transform" } else { "auto" },
            overlay_will_change: if self.open { "opacity" } else { "auto" },
        }
    }
}

/// Everything the DOM must reflect for one sidebar state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SidebarView {
    pub panel_open: bool,
    pub overlay_active: bool,
    pub toggle_open: bool,
    pub close_spinning: bool,
    pub scroll_locked: bool,
    pub panel_will_change: &'static str,
    pub overlay_will_change: &'static str,
}

impl SidebarView {
    pub fn is_consistent(&self) -> bool {
        let open = self.panel_open;
        self.overlay_active == open
            && self.toggle_open == open
            && self.close_spinning == open
            && self.scroll_locked == open
    }

    pub fn body_overflow(&self) -> &'static str {
        if self.scroll_locked {
            "hidden"
        } else {
            ""
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::MobileSidebar;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::Cell;
    use std::rc::Rc;

    use serde_json::json;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{Element, HtmlElement};

    use super::*;
    use crate::controller::PageContext;
    use crate::error::BehaviorError;

    pub struct MobileSidebar {
        ctx: Rc<PageContext>,
        panel: HtmlElement,
        overlay: Option<HtmlElement>,
        toggle: Option<Element>,
        close: Option<Element>,
        state: Cell<SidebarState>,
    }

    impl MobileSidebar {
        pub fn setup(ctx: Rc<PageContext>) -> Result<Rc<Self>, BehaviorError> {
            let panel = ctx
                .query(PANEL_SELECTOR)
                .and_then(|panel| panel.dyn_into::<HtmlElement>().ok())
                .ok_or(BehaviorError::MissingElement(PANEL_SELECTOR))?;
            let overlay = ctx
                .query(OVERLAY_SELECTOR)
                .and_then(|overlay| overlay.dyn_into::<HtmlElement>().ok());
            let toggle = ctx.query(TOGGLE_SELECTOR);
            let close = ctx.query(CLOSE_SELECTOR);
            let open = panel.class_list().contains("open");

            let sidebar = Rc::new(Self {
                ctx,
                panel,
                overlay,
                toggle,
                close,
                state: Cell::new(SidebarState::default()),
            });
            if open {
                sidebar.state.set(SidebarState::default().toggled());
            }
            sidebar.add_hamburger_bar()?;
            sidebar.prewarm();
            sidebar.clone().attach_listeners()?;
            Ok(sidebar)
        }

        pub fn state(&self) -> SidebarState {
            self.state.get()
        }

        pub fn toggle(&self) {
            let next = self.state.get().toggled();
            self.apply(next);
        }

        pub fn close(&self) {
            self.apply(SidebarState::closed());
            let panel = self.panel.clone();
            let overlay = self.overlay.clone();
            self.ctx.timers.set_timeout(HINT_CLEANUP_MILLIS, move || {
                let _ = panel.style().set_property("will-change", "auto");
                if let Some(overlay) = overlay {
                    let _ = overlay.style().set_property("will-change", "auto");
                }
            });
        }

        fn apply(&self, state: SidebarState) {
            let view = state.view();
            self.state.set(state);

            let _ = self.panel.class_list().toggle_with_force("open", view.panel_open);
            let _ = self.panel.style().set_property("will-change", view.panel_will_change);
            if let Some(overlay) = &self.overlay {
                let _ = overlay.class_list().toggle_with_force("active", view.overlay_active);
                let _ = overlay.style().set_property("will-change", view.overlay_will_change);
            }
            if let Some(toggle) = &self.toggle {
                let _ = toggle.class_list().toggle_with_force("open", view.toggle_open);
            }
            if let Some(close) = &self.close {
                let _ = close.class_list().toggle_with_force("spin", view.close_spinning);
            }
            if let Some(body) = self.ctx.document.body() {
                let _ = body.style().set_property("overflow", view.body_overflow());
            }
            self.ctx
                .logger
                .debug("sidebar.state", json!({ "open": state.is_open() }));
        }

        fn add_hamburger_bar(&self) -> Result<(), BehaviorError> {
            let Some(toggle) = &self.toggle else {
                return Ok(());
            };
            if toggle.query_selector(".hamburger-middle")?.is_some() {
                return Ok(());
            }
            let bar = self.ctx.document.create_element("span")?;
            bar.set_class_name("hamburger-middle");
            toggle.append_child(&bar)?;
            Ok(())
        }

        /// Forces one layout pass with the panel off-screen so the first open animates.
        fn prewarm(&self) {
            let style = self.panel.style();
            let _ = style.set_property("transform", "translateX(-100%)");
            let panel = self.panel.clone();
            let closure = Closure::once_into_js(move || {
                let _ = panel.style().remove_property("transform");
            });
            let _ = self
                .ctx
                .window
                .request_animation_frame(closure.unchecked_ref());
        }

        fn attach_listeners(self: Rc<Self>) -> Result<(), BehaviorError> {
            if let Some(toggle) = &self.toggle {
                let sidebar = self.clone();
                let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                    sidebar.toggle();
                }) as Box<dyn FnMut(_)>);
                toggle.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
                closure.forget();
            }
            let close_targets = [
                self.overlay.clone().map(Element::from),
                self.close.clone(),
            ];
            for target in close_targets.into_iter().flatten() {
                let sidebar = self.clone();
                let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                    sidebar.close();
                }) as Box<dyn FnMut(_)>);
                target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
                closure.forget();
            }
            Ok(())
        }
    }
}
