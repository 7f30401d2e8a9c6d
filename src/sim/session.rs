//! Mini-game session lifecycle
//!
//! `Idle → Active ⇄ Paused → Ended(Won|Lost) → (cleanup) → Idle`
//!
//! Every operation is a silent no-op when its precondition doesn't hold, so
//! duplicate user input (double-clicking the trigger, clicking after the game
//! ended) can never corrupt a session.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::physics::{self, PaddleResponse, frame_scale, substeps};
use super::registry::{BreakableRegistry, PresentationTarget};
use super::state::{Ball, BallState, Field, GameEvent, Outcome, Paddle, SessionPhase};
use crate::Rect;
use crate::consts::HELD_BALL_GAP;
use crate::settings::GameTuning;

/// Per-session visual chrome owned by the host (canvas, counter, pause and exit buttons)
pub trait SessionOverlay {
    /// Create the overlay for a new session
    fn attach(&mut self, field: Field);
    fn update_counter(&mut self, broken: usize, total: usize);
    fn show_outcome(&mut self, outcome: Outcome);
    fn set_paused(&mut self, paused: bool);
    /// Remove everything `attach` created
    fn detach(&mut self);
}

/// Overlay that draws nothing (headless runs)
#[derive(Debug, Default)]
pub struct NoOverlay;

impl SessionOverlay for NoOverlay {
    fn attach(&mut self, _field: Field) {}
    fn update_counter(&mut self, _broken: usize, _total: usize) {}
    fn show_outcome(&mut self, _outcome: Outcome) {}
    fn set_paused(&mut self, _paused: bool) {}
    fn detach(&mut self) {}
}

/// One brick-breaker play-through over a set of breakable targets
pub struct GameSession<T> {
    phase: SessionPhase,
    field: Field,
    tuning: GameTuning,
    registry: BreakableRegistry<T>,
    paddle: Paddle,
    /// Active balls (sorted by id)
    balls: Vec<Ball>,
    /// Indestructible rectangles the ball bounces off (HUD counter)
    solids: Vec<Rect>,
    pointer_x: Option<f32>,
    /// Milliseconds of Active time since start
    clock_ms: f64,
    rng: Pcg32,
    next_id: u32,
    events: Vec<GameEvent>,
    overlay: Box<dyn SessionOverlay>,
}

impl<T: PresentationTarget> GameSession<T> {
    pub fn new(field: Field, tuning: GameTuning, seed: u64, overlay: Box<dyn SessionOverlay>) -> Self {
        Self {
            phase: SessionPhase::Idle,
            paddle: Paddle::centered(&field, &tuning),
            field,
            tuning,
            registry: BreakableRegistry::new(),
            balls: Vec::new(),
            solids: Vec::new(),
            pointer_x: None,
            clock_ms: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            events: Vec::new(),
            overlay,
        }
    }

    /// Begin a session over `targets`
    ///
    /// No-op unless Idle. Aborts (staying Idle) when none of the targets is
    /// rendered. Returns whether a session started.
    pub fn start<I>(&mut self, targets: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        if self.phase != SessionPhase::Idle {
            log::debug!("start ignored: session is {:?}", self.phase);
            return false;
        }

        let total = self.registry.snapshot(targets);
        if total == 0 {
            log::warn!("No breakable targets on screen, not starting");
            return false;
        }

        self.paddle = Paddle::centered(&self.field, &self.tuning);
        self.balls.clear();
        self.spawn_held_ball();
        self.pointer_x = None;
        self.clock_ms = 0.0;
        self.events.clear();

        self.overlay.attach(self.field);
        self.overlay.update_counter(0, total);
        self.phase = SessionPhase::Active;
        log::info!("Session started with {} targets", total);
        true
    }

    /// Launch every held ball with a random horizontal component
    pub fn release(&mut self) -> bool {
        if self.phase != SessionPhase::Active || !self.balls.iter().any(Ball::is_held) {
            return false;
        }

        let spread = self.tuning.launch_spread_x;
        let vy = -self.tuning.launch_speed_y.abs();
        for ball in &mut self.balls {
            if ball.is_held() {
                let vx = (self.rng.random::<f32>() - 0.5) * spread;
                ball.release(Vec2::new(vx, vy));
            }
        }
        self.events.push(GameEvent::Released);
        true
    }

    /// Latest pointer x in field coordinates
    pub fn pointer_moved(&mut self, x: f32) {
        self.pointer_x = Some(x);
    }

    /// Advance one display frame; returns the outcome if the session ended
    ///
    /// Long frames are integrated in nominal-sized substeps so ball speed is
    /// the same at any refresh rate.
    pub fn tick(&mut self, elapsed_ms: f32) -> Option<Outcome> {
        if self.phase != SessionPhase::Active {
            return None;
        }

        self.clock_ms += f64::from(elapsed_ms.max(0.0));

        if let Some(x) = self.pointer_x {
            self.paddle.track_pointer(x, &self.field);
        }
        self.registry.advance(self.clock_ms);

        let broken_before = self.registry.broken_count();
        let mut outcome = None;
        for scale in substeps(frame_scale(elapsed_ms)) {
            self.substep(scale);
            if self.registry.all_broken() {
                outcome = Some(Outcome::Won);
            } else if self.balls.is_empty() {
                outcome = Some(Outcome::Lost);
            }
            if outcome.is_some() {
                break;
            }
        }
        // Held balls still track the paddle on zero-length frames
        for ball in self.balls.iter_mut().filter(|b| b.is_held()) {
            ball.follow(&self.paddle, HELD_BALL_GAP);
        }

        let broken = self.registry.broken_count();
        if broken != broken_before {
            self.overlay.update_counter(broken, self.registry.len());
        }

        if let Some(outcome) = outcome {
            self.end(outcome);
        }
        outcome
    }

    fn substep(&mut self, scale: f32) {
        let response = PaddleResponse {
            steer_factor: self.tuning.steer_factor,
            band_slack: self.tuning.paddle_band_slack,
        };

        let mut lost = Vec::new();
        for ball in self.balls.iter_mut().filter(|b| !b.is_held()) {
            let result = physics::step(ball, &self.field, &self.paddle, response, scale);
            if result.hit_wall() {
                self.events.push(GameEvent::WallHit);
            }
            if result.paddle_hit {
                self.events.push(GameEvent::PaddleHit);
            }
            if result.exited {
                lost.push(ball.id);
            }
        }

        if !lost.is_empty() {
            self.balls.retain(|b| !lost.contains(&b.id));
            for id in lost {
                log::debug!("Ball {} left the field", id);
                self.events.push(GameEvent::BallLost { id });
            }
        }

        for ball in self.balls.iter_mut().filter(|b| b.state == BallState::Free) {
            for index in self.registry.hit_test(ball) {
                if self.registry.mark_broken(index, self.clock_ms) {
                    physics::reflect_vertical(ball);
                    self.events.push(GameEvent::TargetBroken { index });
                }
            }
            let bounds = ball.bounds();
            if self.solids.iter().any(|s| s.intersects(&bounds)) {
                physics::push_down(ball);
                self.events.push(GameEvent::SolidHit);
            }
        }
    }

    /// Spawn a mirrored copy of the first free ball
    pub fn split_ball(&mut self) -> bool {
        if self.phase != SessionPhase::Active || self.balls.len() >= self.tuning.max_balls {
            return false;
        }
        let Some(source) = self.balls.iter().find(|b| b.state == BallState::Free) else {
            return false;
        };

        let mut copy = source.clone();
        copy.id = self.next_entity_id();
        copy.vel.x = if copy.vel.x == 0.0 {
            self.tuning.launch_spread_x / 2.0
        } else {
            -copy.vel.x
        };
        let id = copy.id;
        self.balls.push(copy);
        self.events.push(GameEvent::BallSplit { id });
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != SessionPhase::Active {
            return false;
        }
        self.phase = SessionPhase::Paused;
        self.overlay.set_paused(true);
        log::info!("Session paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }
        self.phase = SessionPhase::Active;
        self.overlay.set_paused(false);
        log::info!("Session resumed");
        true
    }

    /// Pause if active, resume if paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            SessionPhase::Active => self.pause(),
            SessionPhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Restore every target, drop the overlay and return to Idle
    ///
    /// Works from any non-Idle phase (from Active/Paused it is an abort).
    /// Returns `false` when already Idle.
    pub fn cleanup(&mut self) -> bool {
        if self.phase == SessionPhase::Idle {
            return false;
        }

        let restored = self.registry.restore_all();
        self.overlay.detach();
        self.balls.clear();
        self.solids.clear();
        self.pointer_x = None;
        log::info!(
            "Session cleaned up from {:?} ({} targets restored)",
            self.phase,
            restored
        );
        self.phase = SessionPhase::Idle;
        true
    }

    /// Replace the indestructible rectangles for the current session
    pub fn set_solids(&mut self, solids: Vec<Rect>) {
        self.solids = solids;
    }

    /// Resize the field (only between sessions, geometry is frozen while playing)
    pub fn set_field(&mut self, field: Field) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.field = field;
        self.paddle = Paddle::centered(&field, &self.tuning);
        true
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, SessionPhase::Active | SessionPhase::Paused)
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn solids(&self) -> &[Rect] {
        &self.solids
    }

    pub fn broken_count(&self) -> usize {
        self.registry.broken_count()
    }

    pub fn target_count(&self) -> usize {
        self.registry.len()
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn spawn_held_ball(&mut self) {
        let id = self.next_entity_id();
        let mut ball = Ball::new(id, self.tuning.ball_radius);
        ball.follow(&self.paddle, HELD_BALL_GAP);
        self.balls.push(ball);
    }

    fn end(&mut self, outcome: Outcome) {
        self.phase = SessionPhase::Ended(outcome);
        self.events.push(GameEvent::Ended(outcome));
        self.overlay.show_outcome(outcome);
        log::info!(
            "Session ended: {:?} ({}/{} broken)",
            outcome,
            self.registry.broken_count(),
            self.registry.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::consts::NOMINAL_FRAME_MS;
    use crate::sim::registry::mock::{Call, MockTarget};

    #[derive(Clone, Default)]
    struct RecordingOverlay {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl SessionOverlay for RecordingOverlay {
        fn attach(&mut self, _field: Field) {
            self.log.borrow_mut().push("attach".into());
        }
        fn update_counter(&mut self, broken: usize, total: usize) {
            self.log.borrow_mut().push(format!("{}/{}", broken, total));
        }
        fn show_outcome(&mut self, outcome: Outcome) {
            self.log.borrow_mut().push(format!("{:?}", outcome));
        }
        fn set_paused(&mut self, paused: bool) {
            self.log.borrow_mut().push(format!("paused={}", paused));
        }
        fn detach(&mut self) {
            self.log.borrow_mut().push("detach".into());
        }
    }

    const FIELD: Field = Field::new(400.0, 600.0);

    fn session() -> (GameSession<MockTarget>, RecordingOverlay) {
        let overlay = RecordingOverlay::default();
        let session = GameSession::new(FIELD, GameTuning::default(), 7, Box::new(overlay.clone()));
        (session, overlay)
    }

    fn run_until_end(session: &mut GameSession<MockTarget>, max_frames: usize) -> Option<Outcome> {
        for _ in 0..max_frames {
            if let Some(outcome) = session.tick(NOMINAL_FRAME_MS) {
                return Some(outcome);
            }
        }
        None
    }

    #[test]
    fn test_start_holds_ball_on_paddle() {
        let (mut session, overlay) = session();
        assert_eq!(session.phase(), SessionPhase::Idle);

        assert!(session.start(vec![MockTarget::new(Rect::new(0.0, 0.0, 50.0, 20.0))]));
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.balls().len(), 1);
        assert!(session.balls()[0].is_held());
        assert_eq!(*overlay.log.borrow(), vec!["attach", "0/1"]);

        // Held ball tracks the paddle
        session.pointer_moved(60.0);
        session.tick(NOMINAL_FRAME_MS);
        assert_eq!(session.paddle().pos.x, 20.0);
        assert_eq!(session.balls()[0].center().x, 60.0);
    }

    #[test]
    fn test_double_start_is_noop() {
        let (mut session, overlay) = session();
        let first = MockTarget::new(Rect::new(0.0, 0.0, 50.0, 20.0));
        assert!(session.start(vec![first.clone()]));
        assert!(!session.start(vec![
            MockTarget::new(Rect::new(100.0, 0.0, 50.0, 20.0)),
            MockTarget::new(Rect::new(200.0, 0.0, 50.0, 20.0)),
        ]));

        assert_eq!(session.target_count(), 1);
        assert_eq!(first.count(&Call::Save), 1);
        assert_eq!(overlay.log.borrow().iter().filter(|l| *l == "attach").count(), 1);
    }

    #[test]
    fn test_start_without_targets_stays_idle() {
        let (mut session, overlay) = session();
        assert!(!session.start(vec![MockTarget::unrendered()]));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(overlay.log.borrow().is_empty());
    }

    #[test]
    fn test_release_only_once() {
        let (mut session, _) = session();
        assert!(!session.release());
        session.start(vec![MockTarget::new(Rect::new(0.0, 0.0, 50.0, 20.0))]);

        assert!(session.release());
        let ball = &session.balls()[0];
        assert_eq!(ball.state, BallState::Free);
        assert_eq!(ball.vel.y, -3.0);
        assert!(ball.vel.x.abs() <= 2.0);

        assert!(!session.release());
        assert_eq!(session.drain_events(), vec![GameEvent::Released]);
    }

    #[test]
    fn test_win_exactly_once() {
        let (mut session, overlay) = session();
        let targets = vec![
            MockTarget::new(Rect::new(0.0, 0.0, 200.0, 100.0)),
            MockTarget::new(Rect::new(200.0, 0.0, 200.0, 100.0)),
        ];
        session.start(targets.clone());
        session.release();
        // Aim the ball at the seam so it clears both halves in one hit
        session.balls[0].pos.x = 196.0;
        session.balls[0].vel = Vec2::new(0.0, -3.0);

        assert_eq!(run_until_end(&mut session, 1000), Some(Outcome::Won));
        assert_eq!(session.phase(), SessionPhase::Ended(Outcome::Won));

        // Ended sessions don't tick
        assert_eq!(session.tick(NOMINAL_FRAME_MS), None);
        let ended = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Ended(_)))
            .count();
        assert_eq!(ended, 1);
        assert!(overlay.log.borrow().contains(&"2/2".to_string()));
        assert_eq!(overlay.log.borrow().last().map(String::as_str), Some("Won"));
    }

    #[test]
    fn test_speed_independent_of_refresh_rate() {
        let travel = |hz: f32| {
            let (mut session, _) = session();
            session.start(vec![MockTarget::new(Rect::new(0.0, 0.0, 50.0, 20.0))]);
            session.release();
            session.balls[0].vel = Vec2::new(0.0, -3.0);
            let start_y = session.balls()[0].pos.y;
            for _ in 0..hz as usize {
                session.tick(1000.0 / hz);
            }
            start_y - session.balls()[0].pos.y
        };

        let at_60 = travel(60.0);
        assert!((at_60 - 180.0).abs() < 0.5, "60 Hz moved {}", at_60);
        assert!((travel(30.0) - at_60).abs() < 0.5);
        assert!((travel(20.0) - at_60).abs() < 0.5);
    }

    #[test]
    fn test_long_frame_breaks_target_in_its_path() {
        let (mut session, _) = session();
        let target = MockTarget::new(Rect::new(180.0, 412.0, 40.0, 2.0));
        session.start(vec![target, MockTarget::new(Rect::new(0.0, 0.0, 20.0, 20.0))]);
        session.release();
        session.balls[0].pos = Vec2::new(196.0, 420.0);
        session.balls[0].vel = Vec2::new(0.0, -3.0);

        // One 100 ms frame moves the ball 18 px, past the thin target
        session.tick(100.0);
        assert_eq!(session.broken_count(), 1);
        assert!(session.balls()[0].vel.y > 0.0);
    }

    #[test]
    fn test_last_ball_lost() {
        let (mut session, _) = session();
        session.start(vec![MockTarget::new(Rect::new(0.0, 0.0, 50.0, 20.0))]);
        session.release();
        session.balls[0].vel = Vec2::new(0.0, 3.0);
        // Move the paddle out of the way
        session.pointer_moved(0.0);

        assert_eq!(run_until_end(&mut session, 100), Some(Outcome::Lost));
        assert!(session.balls().is_empty());
        assert!(session.drain_events().contains(&GameEvent::BallLost { id: 1 }));
    }

    #[test]
    fn test_split_ball_survives_single_loss() {
        let (mut session, _) = session();
        session.start(vec![MockTarget::new(Rect::new(0.0, 0.0, 50.0, 20.0))]);
        assert!(!session.split_ball(), "held balls can't split");
        session.release();
        session.balls[0].vel = Vec2::new(2.0, -3.0);
        assert!(session.split_ball());
        assert!(session.split_ball());
        assert!(!session.split_ball(), "capped at max_balls");
        assert_eq!(session.balls().len(), 3);
        assert_eq!(session.balls()[1].vel.x, -2.0);

        // Drop one ball straight down past the paddle
        session.pointer_moved(400.0);
        session.balls[0].pos = Vec2::new(10.0, 590.0);
        session.balls[0].vel = Vec2::new(0.0, 5.0);
        assert_eq!(session.tick(NOMINAL_FRAME_MS), None);
        assert_eq!(session.balls().len(), 2);
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let (mut session, overlay) = session();
        session.start(vec![MockTarget::new(Rect::new(0.0, 0.0, 50.0, 20.0))]);
        session.release();
        let before = session.balls()[0].pos;

        assert!(session.pause());
        assert!(!session.pause());
        assert!(!session.release());
        assert_eq!(session.tick(NOMINAL_FRAME_MS), None);
        assert_eq!(session.balls()[0].pos, before);

        assert!(session.toggle_pause());
        assert_eq!(session.phase(), SessionPhase::Active);
        session.tick(NOMINAL_FRAME_MS);
        assert_ne!(session.balls()[0].pos, before);
        assert!(overlay.log.borrow().contains(&"paused=true".to_string()));
    }

    #[test]
    fn test_solid_pushes_ball_down() {
        let (mut session, _) = session();
        session.start(vec![MockTarget::new(Rect::new(0.0, 0.0, 50.0, 20.0))]);
        session.set_solids(vec![Rect::new(150.0, 200.0, 100.0, 30.0)]);
        session.release();
        session.balls[0].pos = Vec2::new(196.0, 232.0);
        session.balls[0].vel = Vec2::new(0.0, -3.0);

        session.tick(NOMINAL_FRAME_MS);
        assert_eq!(session.balls()[0].vel.y, 3.0);
        assert!(session.drain_events().contains(&GameEvent::SolidHit));
    }

    #[test]
    fn test_cleanup_idempotent() {
        let (mut session, overlay) = session();
        let target = MockTarget::new(Rect::new(0.0, 0.0, 50.0, 20.0));
        assert!(!session.cleanup());

        session.start(vec![target.clone()]);
        assert!(session.cleanup());
        assert!(!session.cleanup());

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(target.count(&Call::Restore), 1);
        assert_eq!(overlay.log.borrow().iter().filter(|l| *l == "detach").count(), 1);

        // A fresh session can start after cleanup
        assert!(session.start(vec![target.clone()]));
        assert_eq!(target.count(&Call::Save), 2);
    }

    #[test]
    fn test_set_field_only_when_idle() {
        let (mut session, _) = session();
        assert!(session.set_field(Field::new(800.0, 600.0)));
        assert_eq!(session.paddle().pos.x, 360.0);

        session.start(vec![MockTarget::new(Rect::new(0.0, 0.0, 50.0, 20.0))]);
        assert!(!session.set_field(FIELD));
        assert_eq!(session.field().width, 800.0);
    }
}
