use std::fmt;
use std::str::FromStr;

pub const THEME_STORAGE_KEY: &str = "theme";
pub const THEME_ATTRIBUTE: &str = "data-theme";
pub const SPIN_CLASS: &str = "spin-theme";
pub const SPIN_MILLIS: u32 = 500;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Night,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::Night];

    /// light → dark → night → light
    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Night,
            Theme::Night => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Night => "night",
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark | Theme::Night)
    }

    /// Icon advertising the theme a click switches to.
    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "moon",
            Theme::Dark => "star",
            Theme::Night => "sun",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Dark Mode",
            Theme::Dark => "Night Mode",
            Theme::Night => "Light Mode",
        }
    }

    /// Stored values that are missing or unrecognized fall back to the default.
    pub fn from_stored(value: Option<&str>) -> Self {
        value
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme: {}", self.0)
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "night" => Ok(Theme::Night),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::ThemeController;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::rc::Rc;

    use gloo_storage::{LocalStorage, Storage};
    use serde_json::json;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    use super::{Theme, SPIN_CLASS, SPIN_MILLIS, THEME_ATTRIBUTE, THEME_STORAGE_KEY};
    use crate::controller::PageContext;
    use crate::error::BehaviorError;

    const DESKTOP_ICON_ID: &str = "themeIcon";
    const MOBILE_ICON_ID: &str = "mobileSidebarThemeIcon";
    const MOBILE_LABEL_ID: &str = "mobileSidebarThemeText";
    const TOGGLE_SELECTORS: &str = ".theme-toggle, #mobileSidebarThemeToggle";

    pub struct ThemeController {
        ctx: Rc<PageContext>,
    }

    impl ThemeController {
        pub fn new(ctx: Rc<PageContext>) -> Self {
            Self { ctx }
        }

        pub fn stored_theme() -> Theme {
            let stored = LocalStorage::raw().get_item(THEME_STORAGE_KEY).ok().flatten();
            Theme::from_stored(stored.as_deref())
        }

        pub fn current_theme(&self) -> Theme {
            let attribute = self
                .ctx
                .document
                .document_element()
                .and_then(|root| root.get_attribute(THEME_ATTRIBUTE));
            match attribute {
                Some(value) => Theme::from_stored(Some(&value)),
                None => Self::stored_theme(),
            }
        }

        pub fn cycle_theme(&self) {
            let next = self.current_theme().next();
            self.apply_theme(next, true);
        }

        pub fn apply_theme(&self, theme: Theme, animate: bool) {
            let document = &self.ctx.document;
            if let Some(root) = document.document_element() {
                let _ = root.set_attribute(THEME_ATTRIBUTE, theme.as_str());
            }
            if let Some(body) = document.body() {
                let _ = body.class_list().toggle_with_force("dark", theme.is_dark());
            }

            for id in [DESKTOP_ICON_ID, MOBILE_ICON_ID] {
                let Some(icon) = document.get_element_by_id(id) else {
                    continue;
                };
                let _ = icon.set_attribute("data-lucide", theme.icon());
                if animate {
                    let _ = icon.class_list().add_1(SPIN_CLASS);
                    self.ctx.timers.set_timeout(SPIN_MILLIS, move || {
                        let _ = icon.class_list().remove_1(SPIN_CLASS);
                    });
                }
            }
            if let Some(label) = document.get_element_by_id(MOBILE_LABEL_ID) {
                label.set_text_content(Some(theme.label()));
            }

            if let Some(hero) = self.ctx.query(".hero-home-title") {
                let logo_text = self.ctx.query(".logo").and_then(|logo| logo.text_content());
                hero.set_text_content(Some(&self.ctx.config.owner_or(logo_text.as_deref())));
            }

            self.ctx.icons.refresh();
            if let Err(err) = LocalStorage::raw().set_item(THEME_STORAGE_KEY, theme.as_str()) {
                self.ctx.logger.warn(
                    "theme.persist_failed",
                    json!({ "error": BehaviorError::from(err).to_string() }),
                );
            }
            self.ctx
                .logger
                .debug("theme.applied", json!({ "theme": theme.as_str(), "animate": animate }));
        }

        /// Applies the stored theme without animation and wires the toggle buttons.
        pub fn setup(self: Rc<Self>) -> Result<(), BehaviorError> {
            self.apply_theme(Self::stored_theme(), false);

            let toggles = self.ctx.document.query_selector_all(TOGGLE_SELECTORS)?;
            for index in 0..toggles.length() {
                let Some(node) = toggles.get(index) else {
                    continue;
                };
                let controller = self.clone();
                let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                    event.prevent_default();
                    controller.cycle_theme();
                }) as Box<dyn FnMut(_)>);
                node.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
                closure.forget();
            }
            Ok(())
        }
    }
}
