//! Contact form: Formspree submission with inline status, plus a `mailto:`
//! fallback button for visitors who would rather use their own mail client.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::config::SiteConfig;

pub const FORM_ID: &str = "contactForm";
pub const STATUS_ID: &str = "formStatus";
pub const NAME_ID: &str = "name";
pub const EMAIL_ID: &str = "email";
pub const MESSAGE_ID: &str = "message";
pub const HIDDEN_SUBJECT_ID: &str = "hiddenSubject";
pub const SEND_MAIL_ID: &str = "sendMailBtn";

pub const RESIZE_UNLOCK_MILLIS: u32 = 10;
pub const BLUR_UNLOCK_MILLIS: u32 = 50;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .unwrap_or_else(|err| panic!("invalid email pattern: {err}"))
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Subject Formspree files the message under.
pub fn hidden_subject(name: &str) -> String {
    match name.trim() {
        "" => "[Portfolio] New Message".to_string(),
        name => format!("[Portfolio] Message from {name}"),
    }
}

pub fn mailto_subject(name: &str) -> String {
    match name.trim() {
        "" => "[Portfolio Website] Mail from Visitor".to_string(),
        name => format!("[Portfolio Website] Mail from {name}"),
    }
}

/// `mailto:` link addressed to the site owner. The body parameter is left out
/// when the message is blank.
pub fn mailto_link(site_email: &str, name: &str, message: &str) -> String {
    let mut link = format!(
        "mailto:{site_email}?subject={}",
        urlencoding::encode(&mailto_subject(name))
    );
    let message = message.trim();
    if !message.is_empty() {
        link.push_str("&body=");
        link.push_str(&urlencoding::encode(message));
    }
    link
}

/// Whether the mailto button should be offered for the current email field value.
pub fn mail_button_visible(email: &str) -> bool {
    !email.trim().is_empty()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormStatus {
    Sending,
    NotConfigured,
    Sent,
    Rejected(Vec<String>),
    SubmitFailed,
    NetworkError,
    InvalidEmail,
    InvalidMailtoEmail,
}

impl FormStatus {
    pub fn class(&self) -> &'static str {
        match self {
            FormStatus::Sending => "loading-message",
            FormStatus::Sent => "success-message",
            _ => "error-message",
        }
    }

    /// Inner HTML of the status element. Server-provided text is escaped.
    pub fn inner_html(&self) -> String {
        match self {
            FormStatus::Sending => "Sending message...".to_string(),
            FormStatus::NotConfigured => "Contact form is not configured. Set <code>contactEndpoint</code> in the \
                 <code>#site-config</code> block to your Formspree form URL or remove the contact page."
                .to_string(),
            FormStatus::Sent => "Thanks for your message! I'll get back to you soon.".to_string(),
            FormStatus::Rejected(messages) => format!(
                "Oops! There was a problem: {}",
                escape_html(&messages.join(", "))
            ),
            FormStatus::SubmitFailed => "Oops! There was a problem submitting your form".to_string(),
            FormStatus::NetworkError => "Network error. Please try again later.".to_string(),
            FormStatus::InvalidEmail => "Please enter a valid email address.".to_string(),
            FormStatus::InvalidMailtoEmail => "Please enter a valid email address to use Send via Mail.".to_string(),
        }
    }

    pub fn markup(&self) -> String {
        format!("<div class=\"{}\">{}</div>", self.class(), self.inner_html())
    }
}

/// What a submit does before any request is made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitPlan {
    InvalidEmail,
    NotConfigured,
    Post,
}

impl SubmitPlan {
    /// Statuses shown synchronously, in order.
    pub fn immediate_statuses(self) -> Vec<FormStatus> {
        match self {
            SubmitPlan::InvalidEmail => vec![FormStatus::InvalidEmail],
            SubmitPlan::NotConfigured => vec![FormStatus::Sending, FormStatus::NotConfigured],
            SubmitPlan::Post => vec![FormStatus::Sending],
        }
    }

    pub fn sends_request(self) -> bool {
        self == SubmitPlan::Post
    }
}

/// Validation first, then the endpoint check. An empty email is left to the
/// browser's `required` check.
pub fn submit_plan(config: &SiteConfig, email: &str) -> SubmitPlan {
    let email = email.trim();
    if !email.is_empty() && !is_valid_email(email) {
        SubmitPlan::InvalidEmail
    } else if config.endpoint_is_placeholder() {
        SubmitPlan::NotConfigured
    } else {
        SubmitPlan::Post
    }
}

#[derive(Debug, Deserialize)]
struct FormspreeErrors {
    errors: Vec<FormspreeError>,
}

#[derive(Debug, Deserialize)]
struct FormspreeError {
    #[serde(default)]
    message: String,
}

/// Status for a non-2xx response body.
pub fn failure_status(body: &str) -> FormStatus {
    match serde_json::from_str::<FormspreeErrors>(body) {
        Ok(parsed) => FormStatus::Rejected(parsed.errors.into_iter().map(|error| error.message).collect()),
        Err(_) => FormStatus::SubmitFailed,
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(target_arch = "wasm32")]
pub use web::ContactForm;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::rc::Rc;

    use gloo_net::http::Request;
    use gloo_timers::future::TimeoutFuture;
    use serde_json::json;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{FormData, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement};

    use super::*;
    use crate::controller::PageContext;
    use crate::error::BehaviorError;
    use crate::logger::log_error;

    pub struct ContactForm {
        ctx: Rc<PageContext>,
        form: HtmlFormElement,
        name: Option<HtmlInputElement>,
        email: Option<HtmlInputElement>,
        message: Option<HtmlTextAreaElement>,
        hidden_subject: Option<HtmlInputElement>,
        send_mail: Option<HtmlElement>,
    }

    impl ContactForm {
        /// Wires the form when the page has one.
        pub fn setup(ctx: Rc<PageContext>) -> Result<Option<Rc<Self>>, BehaviorError> {
            let document = &ctx.document;
            let Some(form) = document
                .get_element_by_id(FORM_ID)
                .and_then(|form| form.dyn_into::<HtmlFormElement>().ok())
            else {
                return Ok(None);
            };
            let name = typed_by_id::<HtmlInputElement>(document, NAME_ID);
            let email = typed_by_id::<HtmlInputElement>(document, EMAIL_ID);
            let message = typed_by_id::<HtmlTextAreaElement>(document, MESSAGE_ID);
            let hidden_subject = typed_by_id::<HtmlInputElement>(document, HIDDEN_SUBJECT_ID);
            let send_mail = typed_by_id::<HtmlElement>(document, SEND_MAIL_ID);

            let contact = Rc::new(Self {
                ctx,
                form,
                name,
                email,
                message,
                hidden_subject,
                send_mail,
            });
            contact.clone().attach_submit()?;
            contact.clone().attach_subject_sync()?;
            contact.clone().attach_mail_button()?;
            contact.clone().attach_textarea_fix()?;
            Ok(Some(contact))
        }

        fn show(&self, status: &FormStatus) {
            match self.ctx.document.get_element_by_id(STATUS_ID) {
                Some(element) => element.set_inner_html(&status.markup()),
                None => self
                    .ctx
                    .logger
                    .error("contact.status_missing", json!({ "status": status.class() })),
            }
        }

        fn field_value(field: &Option<HtmlInputElement>) -> String {
            field
                .as_ref()
                .map(|field| field.value().trim().to_string())
                .unwrap_or_default()
        }

        fn focus_email(&self) {
            if let Some(email) = &self.email {
                let _ = email.focus();
            }
        }

        fn attach_submit(self: Rc<Self>) -> Result<(), BehaviorError> {
            let contact = self.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                event.prevent_default();
                contact.submit();
            }) as Box<dyn FnMut(_)>);
            self.form
                .add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;
            closure.forget();
            Ok(())
        }

        fn submit(self: &Rc<Self>) {
            let plan = submit_plan(&self.ctx.config, &Self::field_value(&self.email));
            for status in plan.immediate_statuses() {
                self.show(&status);
            }
            match plan {
                SubmitPlan::InvalidEmail => {
                    self.focus_email();
                    return;
                }
                SubmitPlan::NotConfigured => {
                    self.ctx.logger.warn("contact.not_configured", json!({}));
                    return;
                }
                SubmitPlan::Post => {}
            }
            let form_data = match FormData::new_with_form(&self.form) {
                Ok(data) => data,
                Err(err) => {
                    log_error(&self.ctx.logger, "contact.form_data", BehaviorError::from(err));
                    self.show(&FormStatus::SubmitFailed);
                    return;
                }
            };
            let contact = self.clone();
            spawn_local(async move {
                let status = contact.post(form_data).await;
                if status == FormStatus::Sent {
                    contact.form.reset();
                }
                contact.show(&status);
            });
        }

        async fn post(&self, form_data: FormData) -> FormStatus {
            let endpoint = self.ctx.config.contact_endpoint.as_str();
            let request = match Request::post(endpoint)
                .header("Accept", "application/json")
                .body(form_data)
            {
                Ok(request) => request,
                Err(err) => {
                    log_error(&self.ctx.logger, "contact.request", BehaviorError::Network(err.to_string()));
                    return FormStatus::NetworkError;
                }
            };
            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    log_error(&self.ctx.logger, "contact.send", BehaviorError::Network(err.to_string()));
                    return FormStatus::NetworkError;
                }
            };
            if response.ok() {
                self.ctx.logger.info("contact.sent", json!({ "status": response.status() }));
                return FormStatus::Sent;
            }
            let body = response.text().await.unwrap_or_default();
            self.ctx
                .logger
                .warn("contact.rejected", json!({ "status": response.status() }));
            failure_status(&body)
        }

        fn attach_subject_sync(self: Rc<Self>) -> Result<(), BehaviorError> {
            let (Some(name), Some(_)) = (&self.name, &self.hidden_subject) else {
                return Ok(());
            };
            let contact = self.clone();
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                if let Some(hidden) = &contact.hidden_subject {
                    hidden.set_value(&hidden_subject(&Self::field_value(&contact.name)));
                }
            }) as Box<dyn FnMut(_)>);
            name.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
            closure.forget();
            Ok(())
        }

        fn update_mail_button(&self) {
            let Some(button) = &self.send_mail else {
                return;
            };
            if mail_button_visible(&Self::field_value(&self.email)) {
                let _ = button.style().set_property("display", "");
                button.set_tab_index(0);
            } else {
                let _ = button.style().set_property("display", "none");
                button.set_tab_index(-1);
            }
        }

        fn attach_mail_button(self: Rc<Self>) -> Result<(), BehaviorError> {
            let (Some(email), Some(button)) = (&self.email, &self.send_mail) else {
                return Ok(());
            };
            let contact = self.clone();
            let on_input = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                contact.update_mail_button();
            }) as Box<dyn FnMut(_)>);
            email.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
            on_input.forget();
            self.update_mail_button();

            if self.message.is_none() {
                return Ok(());
            }
            let contact = self.clone();
            let on_click = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                contact.open_mail_client();
            }) as Box<dyn FnMut(_)>);
            button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            on_click.forget();
            Ok(())
        }

        fn open_mail_client(&self) {
            let email = Self::field_value(&self.email);
            if !is_valid_email(&email) {
                self.show(&FormStatus::InvalidMailtoEmail);
                self.focus_email();
                return;
            }
            let message = self
                .message
                .as_ref()
                .map(|message| message.value())
                .unwrap_or_default();
            let link = mailto_link(
                &self.ctx.config.site_email,
                &Self::field_value(&self.name),
                &message,
            );
            if let Err(err) = self.ctx.window.location().set_href(&link) {
                log_error(&self.ctx.logger, "contact.mailto", BehaviorError::from(err));
            }
        }

        /// Keeps the page from jumping after the textarea is resized.
        fn attach_textarea_fix(self: Rc<Self>) -> Result<(), BehaviorError> {
            let Some(textarea) = &self.message else {
                return Ok(());
            };
            for (event, lock_first, delay) in [
                ("mouseup", true, RESIZE_UNLOCK_MILLIS),
                ("blur", false, BLUR_UNLOCK_MILLIS),
            ] {
                let contact = self.clone();
                let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                    let Some(body) = contact.ctx.document.body() else {
                        return;
                    };
                    if lock_first {
                        let _ = body.style().set_property("overflow", "hidden");
                    }
                    let root = contact.ctx.document.document_element();
                    spawn_local(async move {
                        TimeoutFuture::new(delay).await;
                        let _ = body.style().set_property("overflow", "");
                        if let Some(root) = root {
                            root.set_scroll_top(root.scroll_top());
                        }
                    });
                }) as Box<dyn FnMut(_)>);
                textarea.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
                closure.forget();
            }
            Ok(())
        }
    }

    fn typed_by_id<T: JsCast>(document: &web_sys::Document, id: &str) -> Option<T> {
        document
            .get_element_by_id(id)
            .and_then(|element| element.dyn_into::<T>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("  jane.doe@example.org "));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("ja ne@example.org"));
        assert!(!is_valid_email("a@@b.co"));
    }

    #[test]
    fn mailto_with_name_and_message() {
        assert_eq!(
            mailto_link("your-email@example.com", "Jane", "Hi"),
            "mailto:your-email@example.com?subject=%5BPortfolio%20Website%5D%20Mail%20from%20Jane&body=Hi"
        );
    }

    #[test]
    fn mailto_without_name_or_message() {
        assert_eq!(
            mailto_link("me@site.dev", "  ", "   "),
            "mailto:me@site.dev?subject=%5BPortfolio%20Website%5D%20Mail%20from%20Visitor"
        );
    }

    #[test]
    fn mailto_encodes_reserved_characters() {
        let link = mailto_link("me@site.dev", "A&B", "line one\nline two?");
        assert!(link.contains("Mail%20from%20A%26B"));
        assert!(link.ends_with("&body=line%20one%0Aline%20two%3F"));
    }

    #[test]
    fn hidden_subject_follows_name() {
        assert_eq!(hidden_subject(" Jane "), "[Portfolio] Message from Jane");
        assert_eq!(hidden_subject(""), "[Portfolio] New Message");
    }

    #[test]
    fn mail_button_needs_any_email_text() {
        assert!(!mail_button_visible("   "));
        assert!(mail_button_visible("x"));
    }

    #[test]
    fn formspree_errors_are_joined() {
        let status = failure_status(r#"{"errors":[{"message":"email is invalid"},{"message":"too short"}]}"#);
        assert_eq!(
            status.inner_html(),
            "Oops! There was a problem: email is invalid, too short"
        );
    }

    #[test]
    fn unparsable_or_missing_errors_fall_back() {
        assert_eq!(failure_status("<html>502</html>"), FormStatus::SubmitFailed);
        assert_eq!(failure_status(r#"{"ok":false}"#), FormStatus::SubmitFailed);
        assert_eq!(failure_status(""), FormStatus::SubmitFailed);
    }

    #[test]
    fn server_text_is_escaped() {
        let status = FormStatus::Rejected(vec!["<b>bad</b>".to_string()]);
        assert_eq!(
            status.markup(),
            "<div class=\"error-message\">Oops! There was a problem: &lt;b&gt;bad&lt;/b&gt;</div>"
        );
    }

    fn configured() -> SiteConfig {
        SiteConfig {
            contact_endpoint: "https://formspree.io/f/abc123".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn invalid_email_wins_over_missing_endpoint() {
        let plan = submit_plan(&SiteConfig::default(), "jane@");
        assert_eq!(plan, SubmitPlan::InvalidEmail);
        assert_eq!(plan.immediate_statuses(), vec![FormStatus::InvalidEmail]);
        assert!(!plan.sends_request());
    }

    #[test]
    fn configured_form_posts_after_sending() {
        let plan = submit_plan(&configured(), " jane@example.org ");
        assert_eq!(plan, SubmitPlan::Post);
        assert_eq!(plan.immediate_statuses(), vec![FormStatus::Sending]);
        assert!(plan.sends_request());
        assert_eq!(submit_plan(&configured(), ""), SubmitPlan::Post);
    }

    #[test]
    fn status_classes() {
        assert_eq!(FormStatus::Sending.class(), "loading-message");
        assert_eq!(FormStatus::Sent.class(), "success-message");
        assert_eq!(FormStatus::NetworkError.class(), "error-message");
        assert!(FormStatus::NotConfigured
            .markup()
            .starts_with("<div class=\"error-message\">Contact form is not configured."));
    }
}
