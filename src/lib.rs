pub mod base_url;
pub mod config;
pub mod contact;
pub mod copy_button;
pub mod dom_cache;
pub mod error;
pub mod gallery;
pub mod highlight;
pub mod intro;
pub mod lifecycle;
pub mod logger;
pub mod logo;
pub mod mascot;
pub mod nav;
pub mod random;
pub mod scroll_top;
pub mod sidebar;
pub mod tab_title;
pub mod theme;
pub mod timers;
pub mod toc;

#[cfg(target_arch = "wasm32")]
pub mod controller;
#[cfg(target_arch = "wasm32")]
pub mod icons;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(err) = controller::boot() {
        web_sys::console::error_1(&err.to_string().into());
    }
}
