//! Swaps the document title for a guilt-trip while the tab is in the background.

use crate::random::{NonRepeatingPicker, RandomSource};

pub const TITLES: &[&str] = &[
    "Im telling ur other tabs about this",
    "Wait... where are you going?",
    "Lonely • Akon",
    "Do tabs dream too?",
    "The tab you left behind",
    "Don't worry I’ll just sit here",
    "Wow. Rude.",
    "If you loved me you'd stay",
    "I saved your seat!",
    "Gone but not forgotten...",
    "Hold up, where you goin'?",
    "You left me with the chores!",
    "Fine. I didn’t want you anyway.",
    "Leaving me for *that* tab?",
    "Your FBI agent is disappointed",
];

/// Title bookkeeping for one page: the original title is captured once and is
/// what every return to the tab restores.
#[derive(Clone, Debug)]
pub struct TitleDistractor {
    original: String,
    picker: NonRepeatingPicker<&'static str>,
}

impl TitleDistractor {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            picker: NonRepeatingPicker::new(TITLES),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Title to show while hidden.
    pub fn on_hidden(&mut self, rng: &mut impl RandomSource) -> &'static str {
        self.picker.pick(rng).copied().unwrap_or(TITLES[0])
    }

    /// Title to restore when the tab becomes visible again.
    pub fn on_visible(&self) -> &str {
        &self.original
    }
}

#[cfg(target_arch = "wasm32")]
pub fn watch_visibility(ctx: &std::rc::Rc<crate::controller::PageContext>) -> Result<(), crate::error::BehaviorError> {
    use std::cell::RefCell;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::VisibilityState;

    use crate::random::MathRandom;

    let distractor = RefCell::new(TitleDistractor::new(ctx.document.title()));
    let document = ctx.document.clone();
    let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        match document.visibility_state() {
            VisibilityState::Hidden => {
                let title = distractor.borrow_mut().on_hidden(&mut MathRandom);
                document.set_title(title);
            }
            _ => document.set_title(distractor.borrow().on_visible()),
        }
    }) as Box<dyn FnMut(_)>);
    ctx.document
        .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn hidden_title_comes_from_the_pool() {
        let mut distractor = TitleDistractor::new("Home | Portfolio");
        let title = distractor.on_hidden(&mut || 0.4_f64);
        assert!(TITLES.contains(&title));
        assert_ne!(title, "Home | Portfolio");
    }

    #[test]
    fn visible_restores_the_captured_title() {
        let mut seeded = StdRng::seed_from_u64(3);
        let mut rng = move || seeded.random::<f64>();
        let mut distractor = TitleDistractor::new("Blog | Portfolio");
        for _ in 0..20 {
            distractor.on_hidden(&mut rng);
            assert_eq!(distractor.on_visible(), "Blog | Portfolio");
        }
        assert_eq!(distractor.original(), "Blog | Portfolio");
    }

    #[test]
    fn consecutive_hides_use_different_titles() {
        let mut seeded = StdRng::seed_from_u64(11);
        let mut rng = move || seeded.random::<f64>();
        let mut distractor = TitleDistractor::new("t");
        let mut previous = distractor.on_hidden(&mut rng);
        for _ in 0..500 {
            let next = distractor.on_hidden(&mut rng);
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[test]
    fn pool_has_fifteen_entries() {
        assert_eq!(TITLES.len(), 15);
    }
}
