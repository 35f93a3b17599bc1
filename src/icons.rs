//! Re-renders `<i data-lucide>` placeholders after DOM changes.

use std::cell::Cell;

use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Window;

/// Calls `window.lucide.createIcons()` when the icon library is on the page.
///
/// Inside [`IconHook::batch`] refreshes are coalesced into a single call at the
/// end of the batch.
pub struct IconHook {
    window: Window,
    depth: Cell<u32>,
    pending: Cell<bool>,
}

impl IconHook {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            depth: Cell::new(0),
            pending: Cell::new(false),
        }
    }

    pub fn refresh(&self) {
        if self.depth.get() > 0 {
            self.pending.set(true);
            return;
        }
        self.create_icons();
    }

    pub fn batch<R>(&self, update: impl FnOnce() -> R) -> R {
        self.depth.set(self.depth.get() + 1);
        let result = update();
        self.depth.set(self.depth.get().saturating_sub(1));
        if self.depth.get() == 0 && self.pending.replace(false) {
            self.create_icons();
        }
        result
    }

    fn create_icons(&self) {
        let Ok(lucide) = Reflect::get(&self.window, &JsValue::from_str("lucide")) else {
            return;
        };
        if lucide.is_undefined() || lucide.is_null() {
            return;
        }
        let Some(create) = Reflect::get(&lucide, &JsValue::from_str("createIcons"))
            .ok()
            .and_then(|create| create.dyn_into::<Function>().ok())
        else {
            return;
        };
        let _ = create.call0(&lucide);
    }
}
