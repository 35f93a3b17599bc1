//! Composition root: one `PageController` per page load.
//!
//! The controller owns everything behaviors share (DOM cache, timer registry,
//! icon hook, configuration, logger) through an `Rc<PageContext>` and runs each
//! setup routine independently, so one broken behavior never takes the others
//! down with it.

use std::rc::Rc;

use serde_json::json;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, PageTransitionEvent, Window};

use crate::base_url::{current_base_url, is_home_path};
use crate::config::{load_site_config, SiteConfig};
use crate::contact::ContactForm;
use crate::copy_button::{inject_copy_buttons, CopyTarget};
use crate::dom_cache::DomCache;
use crate::error::BehaviorError;
use crate::gallery::attach_skeletons;
use crate::highlight::highlight_code_lines;
use crate::icons::IconHook;
use crate::intro::play_intro;
use crate::lifecycle::{dom_is_parsed, release_timers, PageExit, EXIT_EVENT};
use crate::logger::{log_error, Logger};
use crate::logo::LogoScramble;
use crate::mascot::Mascot;
use crate::nav::highlight_navigation;
use crate::scroll_top::ScrollToTop;
use crate::sidebar::MobileSidebar;
use crate::tab_title::watch_visibility;
use crate::theme::ThemeController;
use crate::timers::TimerRegistry;
use crate::toc::TableOfContents;

/// Per-page state handed to every behavior.
pub struct PageContext {
    pub window: Window,
    pub document: Document,
    pub cache: DomCache<Element>,
    pub timers: TimerRegistry,
    pub icons: IconHook,
    pub config: SiteConfig,
    pub logger: Logger,
    pub base_url: String,
    pub pathname: String,
}

impl PageContext {
    pub fn new(window: Window) -> Result<Self, BehaviorError> {
        let document = window
            .document()
            .ok_or(BehaviorError::MissingElement("document"))?;
        let location = window.location();
        let pathname = location.pathname()?;
        let host = location.host().unwrap_or_default();

        let (config, config_error) = load_site_config(&window);
        let logger = Logger::new(&config.environment, &host, config.log_level());
        if let Some(err) = config_error {
            log_error(&logger, "config.invalid", err);
        }

        Ok(Self {
            base_url: current_base_url(&document, &pathname),
            icons: IconHook::new(window.clone()),
            cache: DomCache::new(),
            timers: TimerRegistry::new(),
            window,
            document,
            config,
            logger,
            pathname,
        })
    }

    /// Cached `querySelector`; misses are cached too.
    pub fn query(&self, selector: &str) -> Option<Element> {
        self.cache.query(&self.document, selector)
    }

    pub fn is_home(&self) -> bool {
        is_home_path(&self.pathname, &self.base_url)
    }
}

pub struct PageController {
    ctx: Rc<PageContext>,
}

impl PageController {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx: Rc::new(ctx) }
    }

    /// Runs one setup routine; failures are logged and the routine is skipped.
    fn run<T>(&self, routine: &'static str, setup: impl FnOnce(&Rc<PageContext>) -> Result<T, BehaviorError>) -> Option<T> {
        match setup(&self.ctx) {
            Ok(value) => {
                self.ctx.logger.debug("setup.done", json!({ "routine": routine }));
                Some(value)
            }
            Err(err) if err.is_missing_element() => {
                self.ctx
                    .logger
                    .warn("setup.skipped", json!({ "routine": routine, "error": err.to_string() }));
                None
            }
            Err(err) => {
                self.ctx
                    .logger
                    .error("setup.failed", json!({ "routine": routine, "error": err.to_string() }));
                None
            }
        }
    }

    pub fn start(&self) {
        self.run("intro", play_intro);
        self.run("theme", |ctx| Rc::new(ThemeController::new(ctx.clone())).setup());
        self.run("navigation", |ctx| highlight_navigation(ctx));
        self.run("logo", |ctx| LogoScramble::setup(ctx.clone()));
        self.run("scroll_to_top", |ctx| ScrollToTop::setup(ctx.clone()));
        self.run("toc", |ctx| TableOfContents::build(ctx.clone()));
        self.run("code_highlight", |ctx| highlight_code_lines(ctx));
        self.run("copy_buttons", |ctx| {
            ctx.icons.batch(|| -> Result<usize, BehaviorError> {
                let code = inject_copy_buttons(ctx, CopyTarget::Code)?;
                let math = inject_copy_buttons(ctx, CopyTarget::Math)?;
                Ok(code + math)
            })
        });
        self.run("sidebar", |ctx| MobileSidebar::setup(ctx.clone()));
        self.run("gallery", attach_skeletons);
        self.run("mascot", |ctx| Mascot::setup(ctx.clone()));
        self.run("tab_title", watch_visibility);
        self.run("contact", |ctx| ContactForm::setup(ctx.clone()));
        self.run("teardown", attach_teardown);

        self.ctx.logger.info(
            "page.ready",
            json!({ "path": self.ctx.pathname, "base": self.ctx.base_url, "home": self.ctx.is_home() }),
        );
    }
}

/// Releases page resources; a page entering the back/forward cache keeps them.
fn teardown(ctx: &PageContext, exit: PageExit) {
    let cancelled = release_timers(exit, &ctx.timers);
    if exit.clears_cache() {
        ctx.cache.clear();
    }
    ctx.logger.debug(
        "page.teardown",
        json!({ "exit": format!("{exit:?}"), "cancelled_timers": cancelled }),
    );
}

fn attach_teardown(ctx: &Rc<PageContext>) -> Result<(), BehaviorError> {
    let handler = ctx.clone();
    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        let persisted = event
            .dyn_ref::<PageTransitionEvent>()
            .is_some_and(|event| event.persisted());
        teardown(&handler, PageExit::from_persisted(persisted));
    }) as Box<dyn FnMut(_)>);
    ctx.window
        .add_event_listener_with_callback(EXIT_EVENT, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Starts the page behaviors once the DOM is parsed.
pub fn boot() -> Result<(), BehaviorError> {
    let window = web_sys::window().ok_or(BehaviorError::MissingElement("window"))?;
    let document = window
        .document()
        .ok_or(BehaviorError::MissingElement("document"))?;
    if dom_is_parsed(&document.ready_state()) {
        return start_page(window);
    }
    let closure = Closure::once_into_js(move || {
        if let Err(err) = start_page(window) {
            web_sys::console::error_1(&err.to_string().into());
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", closure.unchecked_ref())?;
    Ok(())
}

fn start_page(window: Window) -> Result<(), BehaviorError> {
    let controller = PageController::new(PageContext::new(window)?);
    controller.start();
    Ok(())
}
