//! The smiley on the home page.
//!
//! Its eyes follow the pointer through a 3×3 zone grid, it grins while an
//! interactive element is hovered, and on wide screens it occasionally types out
//! a tip in a speech bubble while its mouth flaps.

use std::cell::Cell;

pub const WRAPPER_ID: &str = "smiley__wrapper";
pub const MOUTH_SELECTOR: &str = ".smiley__mouth";
pub const BUBBLE_ID: &str = "smiley__speech-bubble";
pub const SPEECH_TEXT_ID: &str = "smiley__speech-text";
pub const HOVER_TARGETS: &str = "a, button, .social-link, .nav-links a";
pub const MOUTH_BIG_CLASS: &str = "smiley__mouth--big";
pub const MOUTH_OPEN_CLASS: &str = "smiley__mouth--o";

pub const ZONE_THRESHOLD: f64 = 20.0;
pub const MOBILE_MAX_WIDTH: f64 = 768.0;

pub const SPEECH_MIN_DELAY_MILLIS: u32 = 8_000;
pub const SPEECH_DELAY_SPAN_MILLIS: u32 = 8_000;
pub const TYPE_MIN_MILLIS: u32 = 40;
pub const TYPE_MAX_MILLIS: u32 = 90;
const TYPE_BUDGET_MILLIS: f64 = 2_200.0;
pub const BOB_TICK_MILLIS: u32 = 33;
const BOB_STEP: f64 = 0.08;
const BOB_AMPLITUDE: f64 = 7.0;
const BOB_BASELINE: f64 = -10.0;
pub const BUBBLE_REST_TRANSFORM: &str = "translateY(-10px) scale(0.95)";
pub const FINISH_PAUSE_MILLIS: u32 = 1_200;
pub const WITHDRAW_MILLIS: u32 = 300;

pub const SPEECH_MESSAGES: &[&str] = &[
    "Hover over me to see a tip",
    "Try the Projects page to view examples",
    "Visit the Blog for longer posts and notes",
    "Use the Contact page to send feedback",
    "Explore tags to find related posts and projects",
    "This site works on desktop and mobile",
    "Icons show which technologies were used",
    "Try the site on desktop for extra effects",
    "Images and thumbnails are under assets/images/pics",
    "Looking for examples? Check the Projects page",
    "Thanks for visiting, enjoy exploring!",
    "If something looks off, open an issue with steps to reproduce",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Horizontal {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Vertical {
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Gaze {
    pub horizontal: Option<Horizontal>,
    pub vertical: Option<Vertical>,
}

impl Gaze {
    pub const ALL_CLASSES: [&'static str; 4] = [
        "smiley__wrapper--left",
        "smiley__wrapper--right",
        "smiley__wrapper--top",
        "smiley__wrapper--bottom",
    ];

    /// Zone for a pointer at `(x, y)` in a `width × height` viewport.
    pub fn from_pointer(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (center_x, center_y) = (width / 2.0, height / 2.0);
        let horizontal = if x > center_x + ZONE_THRESHOLD {
            Some(Horizontal::Right)
        } else if x < center_x - ZONE_THRESHOLD {
            Some(Horizontal::Left)
        } else {
            None
        };
        let vertical = if y > center_y + ZONE_THRESHOLD {
            Some(Vertical::Bottom)
        } else if y < center_y - ZONE_THRESHOLD {
            Some(Vertical::Top)
        } else {
            None
        };
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn classes(self) -> Vec<&'static str> {
        let horizontal = self.horizontal.map(|side| match side {
            Horizontal::Left => Self::ALL_CLASSES[0],
            Horizontal::Right => Self::ALL_CLASSES[1],
        });
        let vertical = self.vertical.map(|side| match side {
            Vertical::Top => Self::ALL_CLASSES[2],
            Vertical::Bottom => Self::ALL_CLASSES[3],
        });
        horizontal.into_iter().chain(vertical).collect()
    }
}

pub fn speech_enabled(viewport_width: f64) -> bool {
    viewport_width > MOBILE_MAX_WIDTH
}

/// Delay before the next unprompted tip, from a uniform sample in `[0, 1)`.
pub fn speech_delay_millis(unit: f64) -> u32 {
    let unit = unit.clamp(0.0, 1.0 - f64::EPSILON);
    SPEECH_MIN_DELAY_MILLIS + (unit * f64::from(SPEECH_DELAY_SPAN_MILLIS)).floor() as u32
}

/// Per-character typing interval: short messages type slowly, long ones fast.
pub fn typing_interval_millis(char_count: usize) -> u32 {
    if char_count == 0 {
        return TYPE_MAX_MILLIS;
    }
    let interval = TYPE_BUDGET_MILLIS / char_count as f64;
    interval.clamp(f64::from(TYPE_MIN_MILLIS), f64::from(TYPE_MAX_MILLIS)) as u32
}

pub fn bob_phase(tick: u32) -> f64 {
    f64::from(tick) * BOB_STEP
}

pub fn bob_transform(phase: f64) -> String {
    let offset = phase.sin() * BOB_AMPLITUDE + BOB_BASELINE;
    format!("translateY({offset}px) scale(1)")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeStep {
    /// Append `ch`; the mouth is open after this step when `mouth_open`.
    Char { ch: char, mouth_open: bool },
    Done,
}

/// Character-by-character reveal with an alternating mouth.
#[derive(Clone, Debug)]
pub struct Typewriter {
    chars: Vec<char>,
    index: usize,
    mouth_open: bool,
}

impl Typewriter {
    pub fn new(message: &str) -> Self {
        Self {
            chars: message.chars().collect(),
            index: 0,
            mouth_open: false,
        }
    }

    pub fn interval_millis(&self) -> u32 {
        typing_interval_millis(self.chars.len())
    }

    pub fn step(&mut self) -> TypeStep {
        let Some(ch) = self.chars.get(self.index).copied() else {
            self.mouth_open = false;
            return TypeStep::Done;
        };
        self.index += 1;
        self.mouth_open = !self.mouth_open;
        TypeStep::Char {
            ch,
            mouth_open: self.mouth_open,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpeechState {
    #[default]
    Idle,
    Speaking,
}

/// Idle → Speaking → Idle; a second start while speaking is refused.
#[derive(Debug, Default)]
pub struct SpeechMachine {
    state: Cell<SpeechState>,
}

impl SpeechMachine {
    pub fn state(&self) -> SpeechState {
        self.state.get()
    }

    pub fn is_speaking(&self) -> bool {
        self.state() == SpeechState::Speaking
    }

    pub fn try_begin(&self) -> bool {
        if self.is_speaking() {
            return false;
        }
        self.state.set(SpeechState::Speaking);
        true
    }

    pub fn finish(&self) {
        self.state.set(SpeechState::Idle);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::Mascot;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use serde_json::json;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{Element, HtmlElement, MouseEvent, TouchEvent, VisibilityState};

    use super::*;
    use crate::controller::PageContext;
    use crate::error::BehaviorError;
    use crate::random::{MathRandom, NonRepeatingPicker, RandomSource};
    use crate::timers::TimerId;

    struct SpeechParts {
        bubble: HtmlElement,
        text: Element,
    }

    pub struct Mascot {
        ctx: Rc<PageContext>,
        root: Element,
        mouth: Element,
        speech_parts: Option<SpeechParts>,
        picker: RefCell<NonRepeatingPicker<&'static str>>,
        speech: SpeechMachine,
        mouth_timer: Cell<Option<TimerId>>,
        bubble_timer: Cell<Option<TimerId>>,
    }

    impl Mascot {
        pub fn setup(ctx: Rc<PageContext>) -> Result<Option<Rc<Self>>, BehaviorError> {
            if !ctx.is_home() {
                return Ok(None);
            }
            let root = ctx
                .document
                .get_element_by_id(WRAPPER_ID)
                .ok_or(BehaviorError::MissingElement("#smiley__wrapper"))?;
            let mouth = root
                .query_selector(MOUTH_SELECTOR)?
                .ok_or(BehaviorError::MissingElement(MOUTH_SELECTOR))?;

            let viewport_width = ctx
                .window
                .inner_width()
                .ok()
                .and_then(|width| width.as_f64())
                .unwrap_or(0.0);
            let speech_parts = if speech_enabled(viewport_width) {
                let bubble = ctx
                    .document
                    .get_element_by_id(BUBBLE_ID)
                    .and_then(|bubble| bubble.dyn_into::<HtmlElement>().ok());
                let text = ctx.document.get_element_by_id(SPEECH_TEXT_ID);
                bubble.zip(text).map(|(bubble, text)| SpeechParts { bubble, text })
            } else {
                None
            };

            let mascot = Rc::new(Self {
                ctx,
                root,
                mouth,
                speech_parts,
                picker: RefCell::new(NonRepeatingPicker::new(SPEECH_MESSAGES)),
                speech: SpeechMachine::default(),
                mouth_timer: Cell::new(None),
                bubble_timer: Cell::new(None),
            });
            mascot.clone().attach_gaze()?;
            mascot.clone().attach_hover_smile()?;
            if mascot.speech_parts.is_some() {
                mascot.clone().attach_speech()?;
                mascot.schedule_random_speech();
            }
            mascot.ctx.logger.debug(
                "mascot.ready",
                json!({ "speech": mascot.speech_parts.is_some() }),
            );
            Ok(Some(mascot))
        }

        fn attach_gaze(self: Rc<Self>) -> Result<(), BehaviorError> {
            let mascot = self.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let (x, y) = pointer_position(&event);
                mascot.look_at(x, y);
            }) as Box<dyn FnMut(_)>);
            for event in ["mousemove", "touchstart"] {
                self.ctx
                    .window
                    .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            }
            closure.forget();
            Ok(())
        }

        fn look_at(&self, x: f64, y: f64) {
            let width = dimension(self.ctx.window.inner_width());
            let height = dimension(self.ctx.window.inner_height());
            let gaze = Gaze::from_pointer(x, y, width, height);
            let wanted = gaze.classes();
            let classes = self.root.class_list();
            for class in Gaze::ALL_CLASSES {
                let _ = classes.toggle_with_force(class, wanted.contains(&class));
            }
        }

        fn face_hovered(&self) -> bool {
            self.root.matches(":hover").unwrap_or(false)
        }

        fn reset_mouth(&self) {
            let _ = self
                .mouth
                .class_list()
                .remove_2(MOUTH_BIG_CLASS, MOUTH_OPEN_CLASS);
        }

        fn attach_hover_smile(self: Rc<Self>) -> Result<(), BehaviorError> {
            let targets = self.ctx.document.query_selector_all(HOVER_TARGETS)?;
            let mascot = self.clone();
            let on_enter = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                if mascot.face_hovered() {
                    return;
                }
                mascot.reset_mouth();
                let _ = mascot.mouth.class_list().add_1(MOUTH_BIG_CLASS);
            }) as Box<dyn FnMut(_)>);
            let mascot = self.clone();
            let on_leave = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                if !mascot.face_hovered() {
                    mascot.reset_mouth();
                }
            }) as Box<dyn FnMut(_)>);
            for index in 0..targets.length() {
                let Some(target) = targets.get(index) else {
                    continue;
                };
                target.add_event_listener_with_callback("mouseenter", on_enter.as_ref().unchecked_ref())?;
                target.add_event_listener_with_callback("mouseleave", on_leave.as_ref().unchecked_ref())?;
            }
            on_enter.forget();
            on_leave.forget();
            Ok(())
        }

        fn attach_speech(self: Rc<Self>) -> Result<(), BehaviorError> {
            let mascot = self.clone();
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                mascot.speak_random();
            }) as Box<dyn FnMut(_)>);
            self.root
                .add_event_listener_with_callback("mouseenter", closure.as_ref().unchecked_ref())?;
            closure.forget();
            Ok(())
        }

        fn schedule_random_speech(self: &Rc<Self>) {
            let delay = speech_delay_millis(MathRandom.next_unit());
            let mascot = self.clone();
            self.ctx.timers.set_timeout(delay, move || {
                let visible = mascot.ctx.document.visibility_state() == VisibilityState::Visible;
                if visible {
                    mascot.speak_random();
                }
                mascot.schedule_random_speech();
            });
        }

        fn speak_random(self: &Rc<Self>) {
            if self.speech.is_speaking() {
                return;
            }
            let message = self.picker.borrow_mut().pick(&mut MathRandom).copied();
            if let Some(message) = message {
                self.speak(message);
            }
        }

        fn speak(self: &Rc<Self>, message: &'static str) {
            let Some(parts) = &self.speech_parts else {
                return;
            };
            if !self.speech.try_begin() {
                return;
            }
            let _ = parts.bubble.class_list().add_1("show");
            let _ = parts.bubble.style().set_property("display", "block");
            self.start_bob();
            self.start_typing(message);
            self.ctx.logger.debug("mascot.speak", json!({ "message": message }));
        }

        fn replace_timer(&self, slot: &Cell<Option<TimerId>>, next: Option<TimerId>) {
            if let Some(previous) = slot.replace(next) {
                self.ctx.timers.cancel(previous);
            }
        }

        fn start_bob(self: &Rc<Self>) {
            let Some(parts) = &self.speech_parts else {
                return;
            };
            self.replace_timer(&self.bubble_timer, None);
            let bubble = parts.bubble.clone();
            let mut tick = 0u32;
            let id = self.ctx.timers.set_interval(BOB_TICK_MILLIS, move || {
                tick = tick.wrapping_add(1);
                let _ = bubble
                    .style()
                    .set_property("transform", &bob_transform(bob_phase(tick)));
            });
            self.bubble_timer.set(Some(id));
        }

        fn stop_bob(&self) {
            self.replace_timer(&self.bubble_timer, None);
            if let Some(parts) = &self.speech_parts {
                let _ = parts
                    .bubble
                    .style()
                    .set_property("transform", BUBBLE_REST_TRANSFORM);
            }
        }

        fn start_typing(self: &Rc<Self>, message: &'static str) {
            let Some(parts) = &self.speech_parts else {
                return;
            };
            self.replace_timer(&self.mouth_timer, None);
            parts.text.set_text_content(Some(""));
            let _ = self.mouth.class_list().remove_1(MOUTH_OPEN_CLASS);

            let mut typewriter = Typewriter::new(message);
            let interval = typewriter.interval_millis();
            let mut typed = String::with_capacity(message.len());
            let mascot = self.clone();
            let text = parts.text.clone();
            let id = self.ctx.timers.set_interval(interval, move || match typewriter.step() {
                TypeStep::Char { ch, mouth_open } => {
                    typed.push(ch);
                    text.set_text_content(Some(&typed));
                    let _ = mascot
                        .mouth
                        .class_list()
                        .toggle_with_force(MOUTH_OPEN_CLASS, mouth_open);
                }
                TypeStep::Done => {
                    let _ = mascot.mouth.class_list().remove_1(MOUTH_OPEN_CLASS);
                    mascot.replace_timer(&mascot.mouth_timer, None);
                    mascot.finish_speaking();
                }
            });
            self.mouth_timer.set(Some(id));
        }

        fn finish_speaking(self: &Rc<Self>) {
            let mascot = self.clone();
            self.ctx.timers.set_timeout(FINISH_PAUSE_MILLIS, move || {
                let Some(parts) = &mascot.speech_parts else {
                    return;
                };
                let _ = parts.bubble.class_list().remove_1("show");
                let withdrawn = mascot.clone();
                mascot.ctx.timers.set_timeout(WITHDRAW_MILLIS, move || {
                    if let Some(parts) = &withdrawn.speech_parts {
                        let _ = parts.bubble.style().set_property("display", "none");
                    }
                    withdrawn.stop_bob();
                    withdrawn.speech.finish();
                });
            });
        }
    }

    fn dimension(value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>) -> f64 {
        value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0)
    }

    fn pointer_position(event: &web_sys::Event) -> (f64, f64) {
        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
            return (f64::from(mouse.client_x()), f64::from(mouse.client_y()));
        }
        if let Some(touch) = event
            .dyn_ref::<TouchEvent>()
            .and_then(|touch| touch.touches().get(0))
        {
            return (f64::from(touch.client_x()), f64::from(touch.client_y()));
        }
        (0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const W: f64 = 1000.0;
    const H: f64 = 800.0;

    #[test]
    fn center_band_has_no_direction() {
        assert_eq!(Gaze::from_pointer(500.0, 400.0, W, H), Gaze::default());
        assert_eq!(Gaze::from_pointer(520.0, 380.0, W, H), Gaze::default());
        assert!(Gaze::from_pointer(480.0, 420.0, W, H).classes().is_empty());
    }

    #[test]
    fn corners_map_to_two_classes() {
        let gaze = Gaze::from_pointer(10.0, 10.0, W, H);
        assert_eq!(gaze.horizontal, Some(Horizontal::Left));
        assert_eq!(gaze.vertical, Some(Vertical::Top));
        assert_eq!(gaze.classes(), vec!["smiley__wrapper--left", "smiley__wrapper--top"]);

        let gaze = Gaze::from_pointer(990.0, 790.0, W, H);
        assert_eq!(
            gaze.classes(),
            vec!["smiley__wrapper--right", "smiley__wrapper--bottom"]
        );
    }

    #[test]
    fn edges_map_to_one_class() {
        assert_eq!(
            Gaze::from_pointer(521.0, 400.0, W, H).classes(),
            vec!["smiley__wrapper--right"]
        );
        assert_eq!(
            Gaze::from_pointer(500.0, 379.0, W, H).classes(),
            vec!["smiley__wrapper--top"]
        );
    }

    #[test]
    fn nine_zones() {
        let mut seen = std::collections::HashSet::new();
        for x in [0.0, 500.0, 1000.0] {
            for y in [0.0, 400.0, 800.0] {
                seen.insert(Gaze::from_pointer(x, y, W, H));
            }
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn speech_only_on_wide_viewports() {
        assert!(!speech_enabled(768.0));
        assert!(speech_enabled(769.0));
    }

    #[test]
    fn speech_delay_range() {
        assert_eq!(speech_delay_millis(0.0), 8_000);
        assert_eq!(speech_delay_millis(0.5), 12_000);
        assert!(speech_delay_millis(0.999_999) < 16_000);
        assert!(speech_delay_millis(1.0) < 16_000);
    }

    #[test]
    fn typing_interval_is_bounded_and_inverse_to_length() {
        assert_eq!(typing_interval_millis(10), 90);
        assert_eq!(typing_interval_millis(40), 55);
        assert_eq!(typing_interval_millis(100), 40);
        assert_eq!(typing_interval_millis(0), 90);
        for len in 1..200 {
            let interval = typing_interval_millis(len);
            assert!((TYPE_MIN_MILLIS..=TYPE_MAX_MILLIS).contains(&interval));
            assert!(typing_interval_millis(len + 1) <= interval);
        }
    }

    #[test]
    fn typewriter_alternates_mouth_and_closes_at_end() {
        let mut typewriter = Typewriter::new("Hey");
        assert_eq!(typewriter.step(), TypeStep::Char { ch: 'H', mouth_open: true });
        assert_eq!(typewriter.step(), TypeStep::Char { ch: 'e', mouth_open: false });
        assert_eq!(typewriter.step(), TypeStep::Char { ch: 'y', mouth_open: true });
        assert_eq!(typewriter.step(), TypeStep::Done);
        assert_eq!(typewriter.step(), TypeStep::Done);
    }

    #[test]
    fn typewriter_handles_multibyte_text() {
        let mut typewriter = Typewriter::new("héllo");
        let mut typed = String::new();
        while let TypeStep::Char { ch, .. } = typewriter.step() {
            typed.push(ch);
        }
        assert_eq!(typed, "héllo");
    }

    #[test]
    fn speaking_rejects_reentry() {
        let machine = SpeechMachine::default();
        assert_eq!(machine.state(), SpeechState::Idle);
        assert!(machine.try_begin());
        assert!(!machine.try_begin());
        assert!(machine.is_speaking());
        machine.finish();
        assert!(machine.try_begin());
    }

    #[test]
    fn bob_oscillates_around_baseline() {
        assert_eq!(bob_transform(0.0), "translateY(-10px) scale(1)");
        for tick in 0..200 {
            let offset = bob_phase(tick).sin() * 7.0 - 10.0;
            assert!((-17.0..=-3.0).contains(&offset));
        }
    }

    #[test]
    fn message_pool_never_repeats_back_to_back() {
        use crate::random::NonRepeatingPicker;
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut seeded = StdRng::seed_from_u64(42);
        let mut rng = move || seeded.random::<f64>();
        let mut picker = NonRepeatingPicker::new(SPEECH_MESSAGES);
        let mut previous: Option<&str> = None;
        for _ in 0..1000 {
            let message = picker.pick(&mut rng).copied();
            assert!(message.is_some());
            assert_ne!(message, previous);
            previous = message;
        }
    }
}
