//! Once-per-session greeting overlay on the home page.

pub const INTRO_PLAYED_KEY: &str = "introPlayed";
pub const GREETINGS: &[&str] = &[
    "HELLO",
    "DIA DHUIT",
    "नमस्ते",
    "你好",
    "こんにちは",
    "안녕하세요",
    "BONJOUR",
];

pub const FIRST_CYCLE_MILLIS: u32 = 800;
pub const GREETING_MILLIS: u32 = 650;
pub const FADE_MILLIS: u32 = 180;
pub const FINAL_HOLD_MILLIS: u32 = 900;
pub const SCREEN_FADE_MILLIS: u32 = 700;

pub const TEXT_HIDDEN_TRANSFORM: &str = "translateY(15px) scale(0.95)";
pub const TEXT_SHOWN_TRANSFORM: &str = "translateY(0) scale(1)";

/// Plays only on the home route, and only if this session has not seen it yet.
pub fn should_play(is_home: bool, played_flag: Option<&str>) -> bool {
    let played = matches!(played_flag, Some(value) if !value.is_empty());
    is_home && !played
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntroStep {
    /// Fade the current greeting out.
    HideText,
    /// Swap in the greeting at this index and fade it in.
    ShowGreeting(usize),
    /// Fade the whole overlay and release the page.
    FadeScreen,
    /// Remove the overlay and record that the intro played.
    Finish,
}

/// Every intro step with its offset from setup, in firing order.
pub fn timeline(greeting_count: usize) -> Vec<(u32, IntroStep)> {
    let mut steps = Vec::with_capacity(greeting_count * 2 + 2);
    let mut at = FIRST_CYCLE_MILLIS;
    for index in 1..greeting_count {
        steps.push((at, IntroStep::HideText));
        steps.push((at + FADE_MILLIS, IntroStep::ShowGreeting(index)));
        at += GREETING_MILLIS;
    }
    let fade_at = at + FINAL_HOLD_MILLIS;
    steps.push((fade_at, IntroStep::FadeScreen));
    steps.push((fade_at + SCREEN_FADE_MILLIS, IntroStep::Finish));
    steps
}

#[cfg(target_arch = "wasm32")]
pub fn play_intro(ctx: &std::rc::Rc<crate::controller::PageContext>) -> Result<bool, crate::error::BehaviorError> {
    use gloo_storage::{SessionStorage, Storage};
    use wasm_bindgen::JsCast;

    use crate::error::BehaviorError;

    let document = &ctx.document;
    let body = document.body().ok_or(BehaviorError::MissingElement("body"))?;
    let played = SessionStorage::raw().get_item(INTRO_PLAYED_KEY).ok().flatten();
    if !should_play(ctx.is_home(), played.as_deref()) {
        body.class_list().remove_1("pre-intro")?;
        return Ok(false);
    }

    body.class_list().add_2("homepage", "pre-intro")?;
    let screen = document.create_element("div")?;
    screen.set_class_name("intro-screen");
    let content = document.create_element("div")?;
    content.set_class_name("intro-content");
    let text = document
        .create_element("div")?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| BehaviorError::Dom("intro text is not an HTMLElement".to_string()))?;
    text.set_class_name("intro-text");
    text.set_text_content(GREETINGS.first().copied());
    content.append_child(&text)?;
    screen.append_child(&content)?;
    body.append_child(&screen)?;
    body.class_list().add_1("intro-active")?;

    for (at, step) in timeline(GREETINGS.len()) {
        let (body, screen, text) = (body.clone(), screen.clone(), text.clone());
        ctx.timers.set_timeout(at, move || {
            let style = text.style();
            match step {
                IntroStep::HideText => {
                    let _ = style.set_property("opacity", "0");
                    let _ = style.set_property("transform", TEXT_HIDDEN_TRANSFORM);
                }
                IntroStep::ShowGreeting(index) => {
                    text.set_text_content(GREETINGS.get(index).copied());
                    let _ = style.set_property("opacity", "1");
                    let _ = style.set_property("transform", TEXT_SHOWN_TRANSFORM);
                }
                IntroStep::FadeScreen => {
                    let _ = screen.class_list().add_1("fade-out");
                    let _ = body.class_list().remove_1("intro-active");
                }
                IntroStep::Finish => {
                    screen.remove();
                    let _ = body.class_list().remove_1("pre-intro");
                    let _ = SessionStorage::raw().set_item(INTRO_PLAYED_KEY, "1");
                }
            }
        });
    }
    ctx.logger
        .debug("intro.started", serde_json::json!({ "greetings": GREETINGS.len() }));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plays_once_per_session_on_home_only() {
        assert!(should_play(true, None));
        assert!(should_play(true, Some("")));
        assert!(!should_play(true, Some("1")));
        assert!(!should_play(false, None));
    }

    #[test]
    fn timeline_for_three_greetings() {
        assert_eq!(
            timeline(3),
            vec![
                (800, IntroStep::HideText),
                (980, IntroStep::ShowGreeting(1)),
                (1450, IntroStep::HideText),
                (1630, IntroStep::ShowGreeting(2)),
                (3000, IntroStep::FadeScreen),
                (3700, IntroStep::Finish),
            ]
        );
    }

    #[test]
    fn every_greeting_is_shown_in_order() {
        let shown: Vec<usize> = timeline(GREETINGS.len())
            .into_iter()
            .filter_map(|(_, step)| match step {
                IntroStep::ShowGreeting(index) => Some(index),
                _ => None,
            })
            .collect();
        assert_eq!(shown, (1..GREETINGS.len()).collect::<Vec<_>>());
    }

    #[test]
    fn steps_are_time_ordered_and_end_with_finish() {
        let steps = timeline(GREETINGS.len());
        assert!(steps.windows(2).all(|pair| pair[0].0 <= pair[1].0));
        assert_eq!(steps.last().map(|(_, step)| *step), Some(IntroStep::Finish));
    }
}
