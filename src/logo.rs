//! Hover effect on the site logo: the text decodes itself from random symbols.

use crate::random::RandomSource;

pub const LOGO_SELECTOR: &str = ".logo";
pub const SCRAMBLE_CHARS: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', ':', '{', '}', ';', '|', ',', '.', '<', '>', '/', '?',
];
pub const SCRAMBLE_MILLIS: f64 = 1024.0;

/// Number of leading characters already revealed `elapsed` ms into the animation.
pub fn reveal_count(elapsed: f64, char_count: usize) -> usize {
    if char_count == 0 {
        return 0;
    }
    let per_char = SCRAMBLE_MILLIS / char_count as f64;
    (elapsed.max(0.0) / per_char).floor() as usize
}

/// The original text with everything past `revealed` replaced by random symbols.
pub fn scramble(original: &[char], revealed: usize, rng: &mut impl RandomSource) -> String {
    original
        .iter()
        .enumerate()
        .map(|(index, ch)| {
            if index < revealed {
                *ch
            } else {
                SCRAMBLE_CHARS[rng.next_index(SCRAMBLE_CHARS.len())]
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Scrambled(String),
    Done,
}

pub fn frame(original: &[char], elapsed: f64, rng: &mut impl RandomSource) -> Frame {
    let revealed = reveal_count(elapsed, original.len());
    if revealed <= original.len() {
        Frame::Scrambled(scramble(original, revealed, rng))
    } else {
        Frame::Done
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LogoScramble;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlElement;

    use super::*;
    use crate::controller::PageContext;
    use crate::error::BehaviorError;
    use crate::random::MathRandom;

    type FrameCallback = Closure<dyn FnMut(f64)>;

    pub struct LogoScramble {
        ctx: Rc<PageContext>,
        text: HtmlElement,
        original: String,
        chars: Vec<char>,
        hovering: Cell<bool>,
        animating: Cell<bool>,
        started_at: Cell<Option<f64>>,
        frame_id: Cell<Option<i32>>,
        on_frame: RefCell<Option<FrameCallback>>,
    }

    impl LogoScramble {
        pub fn setup(ctx: Rc<PageContext>) -> Result<Option<Rc<Self>>, BehaviorError> {
            let Some(logo) = ctx.query(LOGO_SELECTOR) else {
                return Ok(None);
            };
            let original = logo.text_content().unwrap_or_default();
            if original.is_empty() {
                return Ok(None);
            }

            let text = ctx
                .document
                .create_element("span")?
                .dyn_into::<HtmlElement>()
                .map_err(|_| BehaviorError::Dom("logo text is not an HTMLElement".to_string()))?;
            text.set_class_name("logo-text");
            text.set_attribute("data-original", &original)?;
            text.set_text_content(Some(&original));
            logo.set_inner_html("");
            logo.append_child(&text)?;

            let scramble = Rc::new(Self {
                ctx,
                text,
                chars: original.chars().collect(),
                original,
                hovering: Cell::new(false),
                animating: Cell::new(false),
                started_at: Cell::new(None),
                frame_id: Cell::new(None),
                on_frame: RefCell::new(None),
            });

            let weak = Rc::downgrade(&scramble);
            *scramble.on_frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
                if let Some(scramble) = weak.upgrade() {
                    scramble.step(now);
                }
            }) as Box<dyn FnMut(f64)>));

            let on_enter = {
                let scramble = scramble.clone();
                Closure::wrap(Box::new(move |_event: web_sys::Event| {
                    scramble.hovering.set(true);
                    scramble.start();
                }) as Box<dyn FnMut(_)>)
            };
            let on_leave = {
                let scramble = scramble.clone();
                Closure::wrap(Box::new(move |_event: web_sys::Event| {
                    scramble.hovering.set(false);
                    scramble.stop();
                    scramble.unlock_width();
                }) as Box<dyn FnMut(_)>)
            };
            logo.add_event_listener_with_callback("mouseenter", on_enter.as_ref().unchecked_ref())?;
            logo.add_event_listener_with_callback("mouseleave", on_leave.as_ref().unchecked_ref())?;
            on_enter.forget();
            on_leave.forget();
            Ok(Some(scramble))
        }

        fn start(&self) {
            if self.animating.replace(true) {
                return;
            }
            self.started_at.set(None);
            self.lock_width();
            self.request_frame();
        }

        fn stop(&self) {
            if let Some(id) = self.frame_id.take() {
                let _ = self.ctx.window.cancel_animation_frame(id);
            }
            self.animating.set(false);
            self.text.set_text_content(Some(&self.original));
        }

        fn request_frame(&self) {
            let on_frame = self.on_frame.borrow();
            let Some(callback) = on_frame.as_ref() else {
                return;
            };
            match self
                .ctx
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref())
            {
                Ok(id) => self.frame_id.set(Some(id)),
                Err(_) => self.stop(),
            }
        }

        fn step(&self, now: f64) {
            self.frame_id.set(None);
            if !self.hovering.get() {
                self.stop();
                return;
            }
            let started = self.started_at.get().unwrap_or(now);
            self.started_at.set(Some(started));
            match frame(&self.chars, now - started, &mut MathRandom) {
                Frame::Scrambled(text) => {
                    self.text.set_text_content(Some(&text));
                    self.request_frame();
                }
                Frame::Done => {
                    self.text.set_text_content(Some(&self.original));
                    self.animating.set(false);
                }
            }
        }

        /// Pins the width so the random glyphs do not make the header jitter.
        fn lock_width(&self) {
            let style = self.text.style();
            let width = self.text.offset_width();
            let _ = style.set_property("width", &format!("{width}px"));
            let _ = style.set_property("display", "inline-block");
            let _ = style.set_property("white-space", "nowrap");
        }

        fn unlock_width(&self) {
            let style = self.text.style();
            for property in ["width", "display", "white-space"] {
                let _ = style.remove_property(property);
            }
        }
    }
}
