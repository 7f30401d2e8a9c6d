//! Composition root
//!
//! `App` owns every controller (navigator, transition backend and schedules,
//! game session, particle background) and wires them to a [`Host`]. Nothing
//! lives in global state: the binary builds one `App`, calls `init`, feeds it
//! input and frames, and calls `teardown` when the page goes away.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec2;

use crate::book::{BookError, DEFAULT_PAGES, PageEntered, PageNavigator, SwipeTracker, key_command};
use crate::consts::RESTART_DELAY_MS;
use crate::platform::{ClickTarget, Host, InputEvent};
use crate::renderer::Scene;
use crate::settings::Settings;
use crate::sim::{Field, GameSession, Outcome, ParticleField, SessionPhase};
use crate::transition::{Cue, Effect, TransitionBackend, TransitionScheduler, select_backend};

/// Default label of the mini-game trigger
pub const TRIGGER_LABEL: &str = "BE CREATIVE";

/// Page hosting the mini-game
const GAME_PAGE: usize = 0;

pub struct App<H: Host> {
    host: H,
    settings: Settings,
    backend: Box<dyn TransitionBackend>,
    navigator: PageNavigator,
    /// Filled by the navigator callback, drained after every input/frame
    entered: Rc<RefCell<VecDeque<PageEntered>>>,
    swipe: SwipeTracker,
    cover: TransitionScheduler<Effect>,
    intros: Vec<TransitionScheduler<Effect>>,
    book_ready: bool,
    session: GameSession<H::Target>,
    background: Option<ParticleField>,
    restart_in_ms: Option<f64>,
    banner_in_ms: Option<f64>,
    initialized: bool,
}

impl<H: Host> App<H> {
    pub fn new(mut host: H, settings: Settings, viewport: Field, seed: u64) -> Result<Self, BookError> {
        let navigator = PageNavigator::new(DEFAULT_PAGES)?;
        let backend = select_backend(&settings);
        let cover = TransitionScheduler::new(backend.cover_sequence());

        let area = host.game_area();
        let session = GameSession::new(
            Field::new(area.width, area.height),
            settings.game.clone(),
            seed,
            host.session_overlay(),
        );

        let background = settings.effective_background().then(|| {
            ParticleField::new(viewport, settings.density_for(viewport.width), seed.rotate_left(17))
        });

        Ok(Self {
            host,
            swipe: SwipeTracker::new(settings.navigation.swipe_threshold),
            settings,
            backend,
            navigator,
            entered: Rc::new(RefCell::new(VecDeque::new())),
            cover,
            intros: Vec::new(),
            book_ready: false,
            session,
            background,
            restart_in_ms: None,
            banner_in_ms: None,
            initialized: false,
        })
    }

    /// Wire callbacks and start the background; only the first call counts
    pub fn init(&mut self) -> bool {
        if self.initialized {
            return false;
        }

        let queue = self.entered.clone();
        self.navigator.on_page_entered(Box::new(move |e: &PageEntered| {
            queue.borrow_mut().push_back(e.clone())
        }));

        self.host.sync_book(&self.navigator);
        self.host.set_trigger_label(TRIGGER_LABEL);
        if let Some(bg) = self.background.as_mut() {
            bg.start();
        }

        self.initialized = true;
        log::info!("App initialized ({} transitions)", self.backend.name());
        true
    }

    /// Abort any session, drop callbacks and stop the background
    pub fn teardown(&mut self) {
        if !self.initialized {
            return;
        }
        self.session.cleanup();
        self.navigator.teardown();
        self.entered.borrow_mut().clear();
        self.intros.clear();
        self.restart_in_ms = None;
        self.banner_in_ms = None;
        if let Some(bg) = self.background.as_mut() {
            bg.pause();
        }
        self.initialized = false;
        log::info!("App torn down");
    }

    /// Route one input event; returns whether it changed anything
    pub fn handle(&mut self, event: InputEvent) -> bool {
        if !self.initialized {
            return false;
        }

        let handled = match event {
            InputEvent::PointerMove { x, y } => {
                if let Some(bg) = self.background.as_mut() {
                    bg.pointer_moved(Vec2::new(x, y));
                }
                self.session.pointer_moved(x - self.host.game_area().x);
                true
            }
            InputEvent::Click(target) => self.click(target),
            InputEvent::KeyDown(key) => self.key(&key),
            InputEvent::DragStart { x } => {
                if !self.can_navigate() {
                    return false;
                }
                self.swipe.begin(x);
                true
            }
            InputEvent::DragEnd { x } => match self.swipe.end(x) {
                Some(cmd) if self.can_navigate() => self.navigator.apply(cmd),
                _ => false,
            },
            InputEvent::VisibilityChanged { hidden } => {
                if let Some(bg) = self.background.as_mut() {
                    if hidden { bg.pause() } else { bg.resume() }
                }
                if hidden && self.session.pause() {
                    log::info!("Auto-paused (tab hidden)");
                }
                true
            }
            InputEvent::Blur => {
                let paused = self.session.pause();
                if paused {
                    log::info!("Auto-paused (window blur)");
                }
                paused
            }
            InputEvent::Resize { width, height } => {
                let viewport = Field::new(width, height);
                let density = self.settings.density_for(width);
                if let Some(bg) = self.background.as_mut() {
                    bg.resize(viewport, density);
                }
                let area = self.host.game_area();
                self.session.set_field(Field::new(area.width, area.height));
                true
            }
        };

        self.process_entered();
        handled
    }

    /// Advance schedules, timers, the session and the background by one frame
    pub fn frame(&mut self, elapsed_ms: f64) {
        if !self.initialized {
            return;
        }
        let elapsed_ms = if elapsed_ms.is_finite() { elapsed_ms.max(0.0) } else { 0.0 };

        // Intros started below begin counting from the next frame
        let mut fired = Vec::new();
        for intro in &mut self.intros {
            fired.extend(intro.advance(elapsed_ms));
        }
        self.intros.retain(|s| !s.is_done());
        for effect in fired {
            self.dispatch(effect);
        }

        for effect in self.cover.advance(elapsed_ms) {
            self.dispatch(effect);
        }
        self.process_entered();

        self.advance_timers(elapsed_ms);

        if let Some(outcome) = self.session.tick(elapsed_ms as f32) {
            self.on_outcome(outcome);
        }

        if let Some(bg) = self.background.as_mut() {
            bg.update();
        }
    }

    /// Immutable view of the mini-game for this frame
    pub fn scene(&self) -> Scene {
        Scene::capture(&self.session)
    }

    pub fn background(&self) -> Option<&ParticleField> {
        self.background.as_ref()
    }

    pub fn navigator(&self) -> &PageNavigator {
        &self.navigator
    }

    pub fn session(&self) -> &GameSession<H::Target> {
        &self.session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_book_ready(&self) -> bool {
        self.book_ready
    }

    /// Start the mini-game from the about page
    pub fn start_game(&mut self) -> bool {
        if !self.book_ready || self.navigator.current() != GAME_PAGE {
            log::debug!("Game trigger ignored (book not on the game page)");
            return false;
        }
        if self.session.phase() != SessionPhase::Idle {
            return false;
        }

        let area = self.host.game_area();
        self.session.set_field(Field::new(area.width, area.height));
        let targets = self.host.breakable_targets();
        if !self.session.start(targets) {
            return false;
        }
        // The counter only has a rect once the overlay is attached
        let solids = self.host.solid_rects();
        self.session.set_solids(solids);

        self.banner_in_ms = None;
        self.host.set_trigger_label(TRIGGER_LABEL);
        true
    }

    fn click(&mut self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Cover => self.cover.trigger(),
            ClickTarget::PrevButton => self.can_navigate() && self.navigator.previous(),
            ClickTarget::NextButton => self.can_navigate() && self.navigator.next(),
            ClickTarget::NavLink(i) => self.can_navigate() && self.navigator.goto(i),
            ClickTarget::GameTrigger | ClickTarget::Counter => match self.session.phase() {
                SessionPhase::Ended(_) => self.request_restart(),
                SessionPhase::Idle if target == ClickTarget::GameTrigger => {
                    self.restart_in_ms.is_none() && self.start_game()
                }
                _ => false,
            },
            ClickTarget::GameCanvas => self.session.release(),
            ClickTarget::PauseButton => self.session.toggle_pause(),
            ClickTarget::ExitButton => self.exit_game(),
        }
    }

    /// Abandon the game from any phase, cancelling banners and pending restarts
    pub fn exit_game(&mut self) -> bool {
        let restart = self.restart_in_ms.take();
        let banner = self.banner_in_ms.take();
        let cleaned = self.session.cleanup();
        if !cleaned && restart.is_none() && banner.is_none() {
            return false;
        }
        self.host.set_trigger_label(TRIGGER_LABEL);
        log::info!("Game exited");
        true
    }

    fn key(&mut self, key: &str) -> bool {
        match key {
            " " | "Enter" => self.session.release(),
            "Escape" => self.session.toggle_pause(),
            // Debug: extra ball
            "+" | "=" => self.session.split_ball(),
            _ => match key_command(key) {
                Some(cmd) if self.can_navigate() => self.navigator.apply(cmd),
                _ => false,
            },
        }
    }

    /// Pages only turn once the book is showing and no game is running
    fn can_navigate(&self) -> bool {
        self.book_ready && self.session.phase() == SessionPhase::Idle
    }

    fn dispatch(&mut self, effect: Effect) {
        match effect {
            Effect::Cue(Cue::CoverGone) => log::info!("Cover dismissed"),
            Effect::Cue(Cue::BookReady) => {
                self.book_ready = true;
                self.navigator.init();
                log::info!("Book ready");
            }
            other => self.host.apply_effect(&other),
        }
    }

    fn process_entered(&mut self) {
        loop {
            let next = self.entered.borrow_mut().pop_front();
            let Some(entered) = next else { break };

            self.host.sync_book(&self.navigator);
            let steps = self.backend.page_intro(&entered);
            if steps.is_empty() {
                continue;
            }
            let mut intro = TransitionScheduler::new(steps);
            intro.trigger();
            for effect in intro.advance(0.0) {
                self.dispatch(effect);
            }
            if !intro.is_done() {
                self.intros.push(intro);
            }
        }
    }

    fn request_restart(&mut self) -> bool {
        if self.restart_in_ms.is_some() || !self.session.cleanup() {
            return false;
        }
        self.banner_in_ms = None;
        self.host.set_trigger_label(TRIGGER_LABEL);
        self.restart_in_ms = Some(f64::from(RESTART_DELAY_MS));
        true
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        self.host.set_trigger_label(outcome.banner());
        self.banner_in_ms = Some(f64::from(outcome.banner_ms()));
    }

    fn advance_timers(&mut self, elapsed_ms: f64) {
        if let Some(left) = self.restart_in_ms.as_mut() {
            *left -= elapsed_ms;
            if *left <= 0.0 {
                self.restart_in_ms = None;
                self.start_game();
            }
        }

        if let Some(left) = self.banner_in_ms.as_mut() {
            *left -= elapsed_ms;
            if *left <= 0.0 {
                self.banner_in_ms = None;
                self.host.set_trigger_label(TRIGGER_LABEL);
                // Nobody asked for a rematch: put the page back
                if matches!(self.session.phase(), SessionPhase::Ended(_)) {
                    self.session.cleanup();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rect;
    use crate::settings::TransitionPreference;
    use crate::sim::registry::mock::MockTarget;
    use crate::sim::{NoOverlay, SessionOverlay};
    use crate::transition::{Display, Element, total_ms};

    #[derive(Default)]
    struct TestHost {
        targets: Vec<Rect>,
        effects: Vec<Effect>,
        labels: Vec<String>,
        synced_pages: Vec<usize>,
    }

    impl Host for TestHost {
        type Target = MockTarget;

        fn breakable_targets(&mut self) -> Vec<MockTarget> {
            self.targets.iter().copied().map(MockTarget::new).collect()
        }

        fn solid_rects(&mut self) -> Vec<Rect> {
            Vec::new()
        }

        fn game_area(&self) -> Rect {
            Rect::new(0.0, 0.0, 400.0, 600.0)
        }

        fn session_overlay(&mut self) -> Box<dyn SessionOverlay> {
            Box::new(NoOverlay)
        }

        fn apply_effect(&mut self, effect: &Effect) {
            self.effects.push(effect.clone());
        }

        fn sync_book(&mut self, navigator: &PageNavigator) {
            self.synced_pages.push(navigator.current());
        }

        fn set_trigger_label(&mut self, text: &str) {
            self.labels.push(text.to_string());
        }
    }

    fn app_with(settings: Settings) -> App<TestHost> {
        let host = TestHost {
            targets: vec![Rect::new(100.0, 100.0, 40.0, 20.0), Rect::new(200.0, 100.0, 40.0, 20.0)],
            ..Default::default()
        };
        let mut app = App::new(host, settings, Field::new(1024.0, 768.0), 7).unwrap();
        app.init();
        app
    }

    fn basic_app() -> App<TestHost> {
        app_with(Settings {
            transitions: TransitionPreference::Basic,
            ..Settings::default()
        })
    }

    fn open_book(app: &mut App<TestHost>) {
        app.handle(InputEvent::Click(ClickTarget::Cover));
        let total = total_ms(&app.backend.cover_sequence());
        app.frame(total);
        assert!(app.is_book_ready());
    }

    #[test]
    fn test_init_once() {
        let mut app = basic_app();
        assert!(!app.init());
        assert_eq!(app.host().labels, vec![TRIGGER_LABEL.to_string()]);
        assert_eq!(app.host().synced_pages, vec![0]);
    }

    #[test]
    fn test_nothing_before_init() {
        let host = TestHost::default();
        let mut app = App::new(host, Settings::default(), Field::new(800.0, 600.0), 1).unwrap();
        assert!(!app.handle(InputEvent::Click(ClickTarget::Cover)));
        app.frame(10_000.0);
        assert!(app.host().effects.is_empty());
    }

    #[test]
    fn test_cover_runs_once() {
        let mut app = basic_app();
        assert!(app.handle(InputEvent::Click(ClickTarget::Cover)));
        app.frame(0.0);
        assert_eq!(
            app.host().effects[..2],
            [
                Effect::AddClass(Element::Cover, "anim-overflow"),
                Effect::AddClass(Element::Cover, "anim-rect"),
            ]
        );

        // Second click mid-sequence does not restart it
        app.frame(700.0);
        assert!(!app.handle(InputEvent::Click(ClickTarget::Cover)));
        app.frame(10_000.0);
        let rect_count = app
            .host()
            .effects
            .iter()
            .filter(|e| **e == Effect::AddClass(Element::Cover, "anim-rect"))
            .count();
        assert_eq!(rect_count, 1);
        assert!(app.host().effects.contains(&Effect::SetDisplay(Element::Welcome, Display::None)));
    }

    #[test]
    fn test_navigation_waits_for_book() {
        let mut app = basic_app();
        assert!(!app.handle(InputEvent::KeyDown("ArrowRight".into())));
        assert_eq!(app.navigator().current(), 0);

        open_book(&mut app);
        assert!(app.handle(InputEvent::KeyDown("ArrowRight".into())));
        assert!(app.handle(InputEvent::Click(ClickTarget::NavLink(3))));
        assert!(!app.handle(InputEvent::Click(ClickTarget::NextButton)));
        assert_eq!(app.navigator().current(), 3);

        // Swipe left on the last page goes nowhere
        app.handle(InputEvent::DragStart { x: 300.0 });
        assert!(!app.handle(InputEvent::DragEnd { x: 200.0 }));
        app.handle(InputEvent::DragStart { x: 200.0 });
        assert!(app.handle(InputEvent::DragEnd { x: 300.0 }));
        assert_eq!(app.navigator().current(), 2);
    }

    #[test]
    fn test_book_ready_plays_about_intro_once() {
        let mut app = basic_app();
        open_book(&mut app);
        app.frame(1000.0);

        let reveals = |app: &App<TestHost>| {
            app.host()
                .effects
                .iter()
                .filter(|e| **e == Effect::RemoveClass(Element::AboutNav, "about-animate-hide"))
                .count()
        };
        assert_eq!(reveals(&app), 1);

        app.handle(InputEvent::KeyDown("ArrowRight".into()));
        app.handle(InputEvent::KeyDown("ArrowLeft".into()));
        app.frame(1000.0);
        assert_eq!(reveals(&app), 1);
        assert_eq!(app.host().synced_pages, vec![0, 0, 1, 0]);
    }

    #[test]
    fn test_game_round_trip() {
        let mut app = basic_app();
        assert!(!app.start_game(), "book not open yet");

        open_book(&mut app);
        assert!(app.handle(InputEvent::Click(ClickTarget::GameTrigger)));
        assert_eq!(app.session().phase(), SessionPhase::Active);
        assert_eq!(app.scene().hud.total, 2);

        // No page turns mid-game
        assert!(!app.handle(InputEvent::KeyDown("ArrowRight".into())));

        assert!(app.handle(InputEvent::Blur));
        assert_eq!(app.session().phase(), SessionPhase::Paused);
        assert!(app.handle(InputEvent::KeyDown("Escape".into())));
        assert_eq!(app.session().phase(), SessionPhase::Active);

        app.teardown();
        assert_eq!(app.session().phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_exit_button_abandons_game() {
        let mut app = basic_app();
        open_book(&mut app);
        assert!(!app.handle(InputEvent::Click(ClickTarget::ExitButton)), "nothing to exit");

        // From Active
        assert!(app.handle(InputEvent::Click(ClickTarget::GameTrigger)));
        assert!(app.handle(InputEvent::Click(ClickTarget::GameCanvas)));
        app.frame(16.0);
        assert!(app.handle(InputEvent::Click(ClickTarget::ExitButton)));
        assert_eq!(app.session().phase(), SessionPhase::Idle);
        assert!(app.scene().balls.is_empty());
        assert!(app.handle(InputEvent::KeyDown("ArrowRight".into())));
        assert_eq!(app.navigator().current(), 1);

        // From Paused
        assert!(app.handle(InputEvent::KeyDown("ArrowLeft".into())));
        assert!(app.handle(InputEvent::Click(ClickTarget::GameTrigger)));
        assert!(app.handle(InputEvent::Click(ClickTarget::PauseButton)));
        assert_eq!(app.session().phase(), SessionPhase::Paused);
        assert!(app.handle(InputEvent::Click(ClickTarget::ExitButton)));
        assert_eq!(app.session().phase(), SessionPhase::Idle);
        assert!(app.handle(InputEvent::Click(ClickTarget::NavLink(2))));
        assert_eq!(app.navigator().current(), 2);
        assert_eq!(app.host().labels.last().map(String::as_str), Some(TRIGGER_LABEL));
    }

    #[test]
    fn test_exit_cancels_banner_and_restart() {
        let mut app = basic_app();
        open_book(&mut app);
        app.host_mut().targets = vec![Rect::new(0.0, 0.0, 400.0, 50.0)];
        app.handle(InputEvent::Click(ClickTarget::GameTrigger));
        app.handle(InputEvent::Click(ClickTarget::GameCanvas));
        let mut frames = 0;
        while app.session().phase() == SessionPhase::Active && frames < 2000 {
            app.frame(16.0);
            frames += 1;
        }
        assert_eq!(app.session().phase(), SessionPhase::Ended(Outcome::Won));

        // Rematch requested, then abandoned before it starts
        assert!(app.handle(InputEvent::Click(ClickTarget::Counter)));
        assert!(app.handle(InputEvent::Click(ClickTarget::ExitButton)));
        app.frame(f64::from(RESTART_DELAY_MS) + 1.0);
        assert_eq!(app.session().phase(), SessionPhase::Idle);
        assert!(!app.handle(InputEvent::Click(ClickTarget::ExitButton)));
    }

    #[test]
    fn test_win_banner_then_restart() {
        let mut app = basic_app();
        open_book(&mut app);
        // One target spanning the whole top: the first climb breaks it
        app.host_mut().targets = vec![Rect::new(0.0, 0.0, 400.0, 50.0)];
        assert!(app.handle(InputEvent::Click(ClickTarget::GameTrigger)));
        assert!(app.handle(InputEvent::Click(ClickTarget::GameCanvas)));

        let mut frames = 0;
        while app.session().phase() == SessionPhase::Active && frames < 2000 {
            app.frame(16.0);
            frames += 1;
        }
        assert_eq!(app.session().phase(), SessionPhase::Ended(Outcome::Won));
        assert_eq!(
            app.host().labels.last().map(String::as_str),
            Some(Outcome::Won.banner())
        );
        // Trigger is ignored while a restart is pending
        assert!(app.handle(InputEvent::Click(ClickTarget::Counter)));
        assert!(!app.handle(InputEvent::Click(ClickTarget::GameTrigger)));
        assert_eq!(app.session().phase(), SessionPhase::Idle);
        assert_eq!(app.host().labels.last().map(String::as_str), Some(TRIGGER_LABEL));

        app.frame(299.0);
        assert_eq!(app.session().phase(), SessionPhase::Idle);
        app.frame(1.0);
        assert_eq!(app.session().phase(), SessionPhase::Active);
    }

    #[test]
    fn test_banner_expiry_cleans_up() {
        let mut app = basic_app();
        open_book(&mut app);
        app.host_mut().targets = vec![Rect::new(0.0, 0.0, 400.0, 50.0)];
        app.start_game();
        app.session.release();
        while app.session().phase() == SessionPhase::Active {
            app.frame(16.0);
        }

        // Banner stays up, then the label and the page come back on their own
        app.frame(2900.0);
        assert!(matches!(app.session().phase(), SessionPhase::Ended(_)));
        app.frame(100.0);
        assert_eq!(app.host().labels.last().map(String::as_str), Some(TRIGGER_LABEL));
        assert_eq!(app.session().phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_background_follows_visibility() {
        let mut app = basic_app();
        assert!(app.background().is_some_and(|bg| bg.is_running()));
        app.handle(InputEvent::VisibilityChanged { hidden: true });
        assert!(app.background().is_some_and(|bg| !bg.is_running()));
        app.handle(InputEvent::VisibilityChanged { hidden: false });
        assert!(app.background().is_some_and(|bg| bg.is_running()));

        app.handle(InputEvent::Resize { width: 400.0, height: 800.0 });
        assert_eq!(app.background().map(|bg| bg.particles().len()), Some(20));
    }

    #[test]
    fn test_reduced_motion() {
        let app = app_with(Settings {
            reduced_motion: true,
            ..Settings::default()
        });
        assert!(app.background().is_none());
        assert_eq!(app.backend.name(), "basic");
    }

    #[test]
    fn test_rich_cover_reaches_book() {
        let mut app = app_with(Settings::default());
        assert_eq!(app.backend.name(), "rich");
        open_book(&mut app);
        app.frame(2000.0);
        assert!(app.intros.is_empty());
        assert!(app.host().effects.iter().any(|e| e.element() == Some(Element::AboutGrid)));
    }
}
