use serde::Deserialize;

use crate::error::BehaviorError;
use crate::logger::LogLevel;

pub const CONFIG_ELEMENT_ID: &str = "site-config";
const ENDPOINT_PLACEHOLDER_MARKER: &str = "REPLACE_WITH";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    #[serde(rename = "contactEndpoint")]
    pub contact_endpoint: String,
    #[serde(rename = "siteEmail")]
    pub site_email: String,
    #[serde(rename = "siteOwner")]
    pub site_owner: Option<String>,
    #[serde(rename = "logLevel")]
    pub log_level: String,
    pub environment: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            contact_endpoint: "https://formspree.io/f/REPLACE_WITH_YOUR_FORM_ID".to_string(),
            site_email: "your-email@example.com".to_string(),
            site_owner: None,
            log_level: "info".to_string(),
            environment: "production".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> Result<Self, BehaviorError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Page globals (`window.SITE_EMAIL`, `window.SITE_OWNER`) win over the JSON block.
    pub fn with_overrides(mut self, site_email: Option<String>, site_owner: Option<String>) -> Self {
        if let Some(email) = site_email.filter(|value| !value.trim().is_empty()) {
            self.site_email = email.trim().to_string();
        }
        if let Some(owner) = site_owner.filter(|value| !value.trim().is_empty()) {
            self.site_owner = Some(owner.trim().to_string());
        }
        self
    }

    pub fn endpoint_is_placeholder(&self) -> bool {
        self.contact_endpoint.trim().is_empty()
            || self.contact_endpoint.contains(ENDPOINT_PLACEHOLDER_MARKER)
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level)
    }

    /// Owner name shown in the home hero, falling back to the logo text.
    pub fn owner_or(&self, logo_text: Option<&str>) -> String {
        self.site_owner
            .clone()
            .or_else(|| {
                logo_text
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Your Name".to_string())
    }
}

#[cfg(target_arch = "wasm32")]
pub fn load_site_config(window: &web_sys::Window) -> (SiteConfig, Option<BehaviorError>) {
    let mut failure = None;
    let embedded = window
        .document()
        .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|element| element.text_content());
    let config = match embedded {
        Some(raw) if !raw.trim().is_empty() => SiteConfig::from_json(&raw).unwrap_or_else(|err| {
            failure = Some(err);
            SiteConfig::default()
        }),
        _ => SiteConfig::default(),
    };
    let config = config.with_overrides(window_string(window, "SITE_EMAIL"), window_string(window, "SITE_OWNER"));
    (config, failure)
}

#[cfg(target_arch = "wasm32")]
fn window_string(window: &web_sys::Window, key: &str) -> Option<String> {
    js_sys::Reflect::get(window, &wasm_bindgen::JsValue::from_str(key))
        .ok()
        .and_then(|value| value.as_string())
}
