use std::cell::RefCell;

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use site_behaviors::config::SiteConfig;
use site_behaviors::contact::{self, FormStatus, SubmitPlan};
use site_behaviors::copy_button::{inject_pass, CopyTarget};
use site_behaviors::mascot::SPEECH_MESSAGES;
use site_behaviors::nav::is_active;
use site_behaviors::random::NonRepeatingPicker;
use site_behaviors::sidebar::SidebarState;
use site_behaviors::tab_title::{TitleDistractor, TITLES};
use site_behaviors::theme::Theme;
use site_behaviors::toc::{build_entries, heading_id, toc_plan, TocPlan, CONTAINER_SELECTORS};

fn seeded(seed: u64) -> impl FnMut() -> f64 {
    let mut rng = StdRng::seed_from_u64(seed);
    move || rng.random::<f64>()
}

#[test]
fn theme_cycle_returns_after_three_steps() {
    for theme in Theme::ALL {
        assert_eq!(theme.next().next().next(), theme);
        assert_ne!(theme.next(), theme);
    }
    assert_eq!(Theme::from_stored(Some("sepia")), Theme::Night);
}

#[test]
fn navigation_predicate_under_a_sub_directory_deployment() {
    let base = "/portfolio";
    assert!(is_active("/portfolio/blog/", "/portfolio/blog/", base));
    assert!(is_active("/portfolio/blog/first-post/", "/portfolio/blog/", base));
    assert!(is_active("/portfolio/", "/portfolio/", base));
    assert!(!is_active("/portfolio/blog/", "/portfolio/", base));
    assert!(!is_active("/portfolio/projects/", "/portfolio/blog/", base));
}

#[test]
fn toc_ids_are_unique_and_ordered() {
    let headings = ["h2", "h3", "h2", "h4", "h1"]
        .into_iter()
        .enumerate()
        .map(|(index, tag)| (tag, format!("Heading {index}")));
    let entries = build_entries(headings);
    assert_eq!(entries.len(), 5);
    let ids: Vec<String> = entries.iter().map(|entry| entry.id.clone()).collect();
    let expected: Vec<String> = (0..5).map(heading_id).collect();
    assert_eq!(ids, expected);
    assert_eq!(entries[3].level.link_class(), "toc-h4");
}

#[test]
fn toc_without_headings_hides_every_container() {
    let entries = build_entries(Vec::<(&str, String)>::new());
    let plan = toc_plan(entries.len());
    assert_eq!(plan, TocPlan::Hide);
    let displays: Vec<Option<&str>> = CONTAINER_SELECTORS
        .iter().map(|_| plan.container_display()).collect();
    assert_eq!(displays, vec![Some("none"), Some("none")]);
}

#[test]
fn copy_wrapping_happens_once_per_block() {
    for target in [CopyTarget::Code, CopyTarget::Math] {
        let parents = RefCell::new(vec!["post-full-content".to_string(); 4]);
        let pass = || {
            inject_pass(
                target,
                0..4,
                |block: &usize| Some(parents.borrow()[*block].clone()),
                |block: usize| {
                    parents.borrow_mut()[block] = target.wrapper_class().to_string();
                    Ok::<(), String>(())
                },
            )
        };
        assert_eq!(pass(), Ok(4));
        assert_eq!(pass(), Ok(0));
        assert_eq!(pass(), Ok(0));
    }
}

#[test]
fn speech_picks_never_repeat_back_to_back() {
    let mut rng = seeded(2024);
    let mut picker = NonRepeatingPicker::new(SPEECH_MESSAGES);
    let picks: Vec<usize> = (0..1000)
        .filter_map(|_| picker.pick_index(&mut rng))
        .collect();
    assert_eq!(picks.len(), 1000);
    assert!(picks.windows(2).all(|pair| pair[0] != pair[1]));
}

#[test]
fn sidebar_double_toggle_restores_every_node() {
    let closed = SidebarState::default();
    let open = closed.toggled();
    assert_eq!(open.toggled().view(), closed.view());
    assert_eq!(open.toggled().toggled().view(), open.view());
    assert_eq!(closed.view().body_overflow(), "");
    assert_eq!(open.view().body_overflow(), "hidden");
}

#[test]
fn unset_endpoint_is_reported_before_any_request() {
    let config = SiteConfig::default();
    let plan = contact::submit_plan(&config, "jane@example.org");
    assert_eq!(plan, SubmitPlan::NotConfigured);
    assert!(!plan.sends_request());
    let statuses = plan.immediate_statuses();
    assert_eq!(statuses, vec![FormStatus::Sending, FormStatus::NotConfigured]);
    let last = &statuses[1];
    assert_eq!(last.class(), "error-message");
    assert!(last.inner_html().starts_with("Contact form is not configured."));
}

#[test]
fn mailto_fallback_for_jane() {
    let config = SiteConfig::default();
    assert!(contact::is_valid_email("a@b.co"));
    assert_eq!(
        contact::mailto_link(&config.site_email, "Jane", "Hi"),
        "mailto:your-email@example.com?subject=%5BPortfolio%20Website%5D%20Mail%20from%20Jane&body=Hi"
    );
}

#[test]
fn hidden_tab_title_is_restored_exactly() {
    let original = "Projects | Jane Doe";
    let mut rng = seeded(99);
    let mut distractor = TitleDistractor::new(original);
    let hidden = distractor.on_hidden(&mut rng);
    assert!(TITLES.contains(&hidden));
    assert_eq!(distractor.on_visible(), original);
}
