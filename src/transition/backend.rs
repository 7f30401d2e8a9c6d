//! Transition capability with a rich and a basic variant
//!
//! The composition root picks one backend at startup. Both produce plain step
//! lists for the [`TransitionScheduler`](super::TransitionScheduler); neither
//! touches the page directly.

use super::effect::{Cue, Display, Ease, Effect, Element, Pose, Tween};
use super::scheduler::Step;
use crate::book::PageEntered;
use crate::settings::Settings;

pub trait TransitionBackend {
    fn name(&self) -> &'static str;

    /// Cover-to-content handoff, ending with [`Cue::BookReady`]
    fn cover_sequence(&self) -> Vec<Step<Effect>>;

    /// Presentation played when a page is entered (may be empty)
    fn page_intro(&self, entered: &PageEntered) -> Vec<Step<Effect>>;
}

/// Pick the backend once, from user preferences
pub fn select_backend(settings: &Settings) -> Box<dyn TransitionBackend> {
    let backend: Box<dyn TransitionBackend> = if settings.wants_rich_transitions() {
        Box::new(RichTransitions)
    } else {
        Box::new(BasicTransitions)
    };
    log::info!("Using {} transitions", backend.name());
    backend
}

fn hidden() -> Pose {
    Pose::default().opacity(0.0)
}

fn shown() -> Pose {
    Pose::default().opacity(1.0)
}

/// Tweened timeline: cover zooms away, content slides in, book swings open
#[derive(Debug, Clone, Copy, Default)]
pub struct RichTransitions;

impl RichTransitions {
    const ABOUT_PAGE: usize = 0;
}

impl TransitionBackend for RichTransitions {
    fn name(&self) -> &'static str {
        "rich"
    }

    fn cover_sequence(&self) -> Vec<Step<Effect>> {
        let tween = |at: f64, t: Tween| (at, Effect::Tween(t));

        Step::timeline(vec![
            tween(
                0.0,
                Tween::to(Element::Cover, Pose::default().scale(0.8).rotate(2.0), 600).ease(Ease::InOut),
            ),
            tween(
                400.0,
                Tween::to(Element::Cover, hidden().scale(20.0), 1200).ease(Ease::InOut),
            ),
            tween(
                800.0,
                Tween::to(Element::MainContent, shown().scale(1.0), 1000).from(hidden().scale(0.9)),
            ),
            tween(
                1200.0,
                Tween::to(Element::MainNav, shown().y(0.0), 800).from(hidden().y(-100.0)),
            ),
            (2000.0, Effect::SetDisplay(Element::Cover, Display::None)),
            (2000.0, Effect::Cue(Cue::CoverGone)),
            tween(
                2000.0,
                Tween::to(Element::Welcome, shown().y(0.0).scale(1.0), 1000)
                    .from(hidden().y(50.0).scale(0.9)),
            ),
            // Welcome lingers 1.5s before fading up and out
            tween(4500.0, Tween::to(Element::Welcome, hidden().y(-30.0), 800)),
            (5300.0, Effect::SetDisplay(Element::Welcome, Display::None)),
            (5300.0, Effect::SetDisplay(Element::Book, Display::Flex)),
            (5300.0, Effect::RemoveClass(Element::MainNav, "hidden")),
            tween(
                5300.0,
                Tween::to(Element::Book, shown().scale(1.0).rotate_y(0.0), 1200)
                    .from(hidden().scale(0.8).rotate_y(-15.0)),
            ),
            tween(
                6000.0,
                Tween::to(Element::BookControls, shown().y(0.0), 800).from(hidden().y(50.0)),
            ),
            (6800.0, Effect::Cue(Cue::BookReady)),
        ])
    }

    fn page_intro(&self, entered: &PageEntered) -> Vec<Step<Effect>> {
        let page = entered.index;
        if page == Self::ABOUT_PAGE {
            if !entered.first_visit {
                return Vec::new();
            }
            return Step::timeline(vec![
                (
                    0.0,
                    Tween::to(Element::AboutNav, shown().y(0.0), 800)
                        .from(hidden().y(-50.0))
                        .into(),
                ),
                (
                    400.0,
                    Tween::to(Element::AboutGrid, shown().scale(1.0).y(0.0), 600)
                        .from(hidden().scale(0.6).y(30.0))
                        .ease(Ease::Back)
                        .stagger(100)
                        .into(),
                ),
                (
                    700.0,
                    Tween::to(Element::AboutFooter, shown().y(0.0), 800)
                        .from(hidden().y(50.0))
                        .into(),
                ),
            ]);
        }

        // Content pages replay their entrance on every visit
        let items = match entered.name.as_str() {
            "contact" => Tween::to(Element::PageItems(page), shown().x(0.0), 600)
                .from(hidden().x(-50.0))
                .stagger(100),
            "skills" => Tween::to(Element::PageItems(page), shown().y(0.0).scale(1.0), 800)
                .from(hidden().y(30.0).scale(0.8))
                .stagger(200),
            _ => Tween::to(Element::PageItems(page), shown().y(0.0).scale(1.0), 800)
                .from(hidden().y(50.0).scale(0.9))
                .stagger(150),
        };
        Step::timeline(vec![
            (
                0.0,
                Tween::to(Element::PageTitle(page), shown().y(0.0), 800)
                    .from(hidden().y(50.0))
                    .into(),
            ),
            (400.0, items.into()),
        ])
    }
}

/// Class-toggle chain with plain CSS fades
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicTransitions;

impl BasicTransitions {
    const HIDE_CLASS: &'static str = "about-animate-hide";
}

impl TransitionBackend for BasicTransitions {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn cover_sequence(&self) -> Vec<Step<Effect>> {
        use Element::{Book, Cover, MainContent, Welcome};

        vec![
            Step::now(Effect::AddClass(Cover, "anim-overflow")),
            Step::now(Effect::AddClass(Cover, "anim-rect")),
            Step::new(600.0, Effect::AddClass(Cover, "anim-rounded")),
            Step::new(500.0, Effect::AddClass(Cover, "anim-expand")),
            Step::new(800.0, Effect::AddClass(Cover, "anim-fadeout")),
            Step::now(Effect::AddClass(Welcome, "visible")),
            Step::new(600.0, Effect::SetDisplay(Cover, Display::None)),
            Step::now(Effect::AddClass(MainContent, "visible")),
            Step::now(Effect::Cue(Cue::CoverGone)),
            Step::new(800.0, Tween::to(Welcome, hidden(), 700).ease(Ease::Linear).into()),
            // Book starts fading in before the welcome is fully gone
            Step::new(400.0, Effect::SetDisplay(Book, Display::Flex)),
            Step::now(Tween::to(Book, hidden(), 0).into()),
            Step::new(100.0, Tween::to(Book, shown(), 800).ease(Ease::Snap).into()),
            Step::new(800.0, Effect::Cue(Cue::BookReady)),
            Step::new(200.0, Effect::SetDisplay(Welcome, Display::None)),
        ]
    }

    fn page_intro(&self, entered: &PageEntered) -> Vec<Step<Effect>> {
        if entered.index != 0 || !entered.first_visit {
            return Vec::new();
        }

        let reveal = |element: Element| {
            Tween::to(element, shown().y(0.0), 800).ease(Ease::Out)
        };
        let grid = |scale: f32| {
            Tween::to(Element::AboutGrid, shown().scale(scale).y(0.0), 500)
                .ease(Ease::Snap)
                .stagger(40)
        };

        Step::timeline(vec![
            (0.0, Effect::RemoveClass(Element::AboutNav, Self::HIDE_CLASS)),
            (0.0, reveal(Element::AboutNav).into()),
            (0.0, Effect::RemoveClass(Element::AboutGrid, Self::HIDE_CLASS)),
            (0.0, grid(1.0).into()),
            (60.0, Effect::RemoveClass(Element::AboutFooter, Self::HIDE_CLASS)),
            (60.0, reveal(Element::AboutFooter).into()),
            // Each item pops slightly once it has landed
            (180.0, grid(1.05).into()),
            (260.0, grid(1.0).into()),
        ])
    }
}
