use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BehaviorError {
    #[error("element not found: {0}")]
    MissingElement(&'static str),
    #[error("dom operation failed: {0}")]
    Dom(String),
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
    #[error("request failed: {0}")]
    Network(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BehaviorError {
    /// A required element of a behavior is absent; the behavior is skipped.
    pub fn is_missing_element(&self) -> bool {
        matches!(self, BehaviorError::MissingElement(_))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for BehaviorError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &wasm_bindgen::JsValue::from_str("message"))
                    .ok()
                    .and_then(|message| message.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        BehaviorError::Dom(message)
    }
}

impl From<serde_json::Error> for BehaviorError {
    fn from(value: serde_json::Error) -> Self {
        BehaviorError::Config(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_missing_element() {
        let error = BehaviorError::MissingElement("#mobileSidebar");
        assert_eq!(error.to_string(), "element not found: #mobileSidebar");
        assert!(error.is_missing_element());
    }

    #[test]
    fn json_errors_become_config_errors() {
        let error: BehaviorError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(error, BehaviorError::Config(_)));
    }
}
