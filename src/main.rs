//! Folio entry point
//!
//! Boots the app in the browser, or runs a short headless demo natively.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use folio::platform::web::WebHost;
    use folio::platform::{ClickTarget, InputEvent};
    use folio::renderer::{CanvasRenderer, render_background, render_scene};
    use folio::sim::Field;
    use folio::{App, Settings};

    struct Runtime {
        app: App<WebHost>,
        game_renderer: Option<CanvasRenderer>,
        background_renderer: Option<CanvasRenderer>,
        last_time: f64,
    }

    impl Runtime {
        fn frame(&mut self, time: f64) {
            let elapsed = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                0.0
            };
            self.last_time = time;

            self.app.frame(elapsed);

            if let Some(renderer) = self.game_renderer.as_mut() {
                render_scene(&self.app.scene(), renderer);
            }
            if let (Some(renderer), Some(bg)) =
                (self.background_renderer.as_mut(), self.app.background())
            {
                render_background(bg, renderer);
            }
        }

        fn resize(&mut self, width: f32, height: f32) {
            if let Some(renderer) = self.background_renderer.as_ref() {
                renderer.resize(width as u32, height as u32);
            }
            self.app.handle(InputEvent::Resize { width, height });
        }
    }

    fn canvas_renderer(document: &web_sys::Document, id: &str) -> Option<CanvasRenderer> {
        let canvas: HtmlCanvasElement = document.get_element_by_id(id)?.dyn_into().ok()?;
        CanvasRenderer::new(canvas)
    }

    fn viewport() -> (f32, f32) {
        let window = web_sys::window().unwrap();
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (w as f32, h as f32)
    }

    fn prefers_reduced_motion() -> bool {
        web_sys::window()
            .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok().flatten())
            .is_some_and(|mq| mq.matches())
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Folio starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let mut settings = Settings::load();
        if prefers_reduced_motion() {
            settings.reduced_motion = true;
        }

        let Some(host) = WebHost::new(document.clone()) else {
            log::warn!("About page missing, nothing to run");
            return;
        };

        let (width, height) = viewport();
        let seed = js_sys::Date::now() as u64;
        let mut app = match App::new(host, settings, Field::new(width, height), seed) {
            Ok(app) => app,
            Err(e) => {
                log::error!("Failed to build app: {}", e);
                return;
            }
        };
        app.init();

        let background_renderer = canvas_renderer(&document, "bg-canvas");
        if let Some(renderer) = background_renderer.as_ref() {
            renderer.resize(width as u32, height as u32);
        }

        let runtime = Rc::new(RefCell::new(Runtime {
            app,
            game_renderer: canvas_renderer(&document, "game-canvas"),
            background_renderer,
            last_time: 0.0,
        }));

        setup_click_handlers(&document, &runtime);
        setup_input_handlers(&document, &runtime);
        setup_auto_pause(&document, &runtime);

        request_animation_frame(runtime);

        log::info!("Folio running with seed {}", seed);
    }

    /// Forward a DOM event to the app when `map` turns it into input
    fn listen(
        target: &EventTarget,
        name: &str,
        runtime: &Rc<RefCell<Runtime>>,
        map: impl Fn(&web_sys::Event) -> Option<InputEvent> + 'static,
    ) {
        let runtime = runtime.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            if let Some(input) = map(&event) {
                runtime.borrow_mut().app.handle(input);
            }
        });
        let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_click_handlers(document: &web_sys::Document, runtime: &Rc<RefCell<Runtime>>) {
        let buttons = [
            ("cover", ClickTarget::Cover),
            ("prevBtn", ClickTarget::PrevButton),
            ("nextBtn", ClickTarget::NextButton),
            ("gameTrigger", ClickTarget::GameTrigger),
            ("game-canvas", ClickTarget::GameCanvas),
            ("game-counter", ClickTarget::Counter),
            ("game-pause", ClickTarget::PauseButton),
            ("game-exit", ClickTarget::ExitButton),
        ];
        for (id, target) in buttons {
            if let Some(el) = document.get_element_by_id(id) {
                listen(&el, "click", runtime, move |_| Some(InputEvent::Click(target)));
            } else {
                log::warn!("#{} not found", id);
            }
        }

        if let Ok(links) = document.query_selector_all(".nav-link") {
            for i in 0..links.length() {
                if let Some(link) = links.get(i) {
                    let index = i as usize;
                    listen(&link, "click", runtime, move |event| {
                        event.prevent_default();
                        Some(InputEvent::Click(ClickTarget::NavLink(index)))
                    });
                }
            }
        }
    }

    fn setup_input_handlers(document: &web_sys::Document, runtime: &Rc<RefCell<Runtime>>) {
        let window = web_sys::window().unwrap();

        listen(&window, "mousemove", runtime, |event| {
            let event = event.dyn_ref::<MouseEvent>()?;
            Some(InputEvent::PointerMove {
                x: event.client_x() as f32,
                y: event.client_y() as f32,
            })
        });

        listen(&window, "keydown", runtime, |event| {
            let event = event.dyn_ref::<KeyboardEvent>()?;
            Some(InputEvent::KeyDown(event.key()))
        });

        // Swipe or mouse drag across the book turns one page
        if let Some(book) = document.get_element_by_id("bookFlip") {
            listen(&book, "touchstart", runtime, |event| {
                let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
                Some(InputEvent::DragStart {
                    x: touch.client_x() as f32,
                })
            });
            listen(&book, "touchend", runtime, |event| {
                let touch = event.dyn_ref::<TouchEvent>()?.changed_touches().get(0)?;
                Some(InputEvent::DragEnd {
                    x: touch.client_x() as f32,
                })
            });
            listen(&book, "mousedown", runtime, |event| {
                let event = event.dyn_ref::<MouseEvent>()?;
                Some(InputEvent::DragStart {
                    x: event.client_x() as f32,
                })
            });
            listen(&book, "mouseup", runtime, |event| {
                let event = event.dyn_ref::<MouseEvent>()?;
                Some(InputEvent::DragEnd {
                    x: event.client_x() as f32,
                })
            });
        }

        // Resize also sizes the background canvas, so it bypasses `listen`
        let runtime = runtime.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (w, h) = viewport();
            runtime.borrow_mut().resize(w, h);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(document: &web_sys::Document, runtime: &Rc<RefCell<Runtime>>) {
        let window = web_sys::window().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let document_clone = document.clone();
            listen(document, "visibilitychange", runtime, move |_| {
                Some(InputEvent::VisibilityChanged {
                    hidden: document_clone.visibility_state() == web_sys::VisibilityState::Hidden,
                })
            });
        }

        // Window blur (click outside)
        listen(&window, "blur", runtime, |_| Some(InputEvent::Blur));
    }

    fn request_animation_frame(runtime: Rc<RefCell<Runtime>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame_loop(runtime, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(runtime: Rc<RefCell<Runtime>>, time: f64) {
        runtime.borrow_mut().frame(time);
        request_animation_frame(runtime);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Folio (native) starting...");
    log::info!("The page itself needs a browser - run with `trunk serve`; playing a headless round");

    demo::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use folio::platform::{ClickTarget, Host, InputEvent};
    use folio::renderer::{RecordingRenderer, render_background, render_scene};
    use folio::sim::{Field, NoOverlay, PresentationTarget, SessionOverlay, SessionPhase, TargetError, TransientStyle};
    use folio::transition::Effect;
    use folio::book::PageNavigator;
    use folio::{App, Rect, Settings};

    /// A row of bricks standing in for page elements
    struct Brick {
        rect: Rect,
        visible: bool,
    }

    impl PresentationTarget for Brick {
        fn rect(&self) -> Option<Rect> {
            self.visible.then_some(self.rect)
        }

        fn save_original_style(&mut self) -> Result<(), TargetError> {
            Ok(())
        }

        fn set_visible(&mut self, visible: bool) -> Result<(), TargetError> {
            self.visible = visible;
            Ok(())
        }

        fn apply_transient_style(&mut self, _style: TransientStyle, _ms: u32) -> Result<(), TargetError> {
            Ok(())
        }

        fn restore_original_style(&mut self) -> Result<(), TargetError> {
            self.visible = true;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Headless {
        effects: usize,
    }

    impl Host for Headless {
        type Target = Brick;

        fn breakable_targets(&mut self) -> Vec<Brick> {
            (0..8)
                .map(|i| Brick {
                    rect: Rect::new(10.0 + i as f32 * 48.0, 60.0, 40.0, 16.0),
                    visible: true,
                })
                .collect()
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

        fn apply_effect(&mut self, _effect: &Effect) {
            self.effects += 1;
        }

        fn sync_book(&mut self, navigator: &PageNavigator) {
            let (page, count) = navigator.indicator();
            log::info!("Book at page {} / {}", page, count);
        }

        fn set_trigger_label(&mut self, text: &str) {
            log::info!("Trigger: {}", text);
        }
    }

    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn run() {
        let mut app = match App::new(Headless::default(), Settings::default(), Field::new(1280.0, 800.0), 42) {
            Ok(app) => app,
            Err(e) => {
                log::error!("Failed to build app: {}", e);
                return;
            }
        };
        app.init();

        app.handle(InputEvent::Click(ClickTarget::Cover));
        let mut frames = 0;
        while !app.is_book_ready() && frames < 1_000 {
            app.frame(FRAME_MS);
            frames += 1;
        }
        log::info!("Cover sequence done after {} frames ({} effects)", frames, app.host().effects);

        app.handle(InputEvent::Click(ClickTarget::GameTrigger));
        app.handle(InputEvent::Click(ClickTarget::GameCanvas));

        // Let the paddle chase the first ball
        let mut frames = 0;
        while matches!(app.session().phase(), SessionPhase::Active) && frames < 36_000 {
            if let Some(ball) = app.session().balls().first() {
                let x = ball.center().x;
                app.handle(InputEvent::PointerMove { x, y: 0.0 });
            }
            app.frame(FRAME_MS);
            frames += 1;
        }

        let mut renderer = RecordingRenderer::default();
        render_scene(&app.scene(), &mut renderer);
        if let Some(bg) = app.background() {
            render_background(bg, &mut renderer);
        }

        let hud = app.scene().hud;
        println!(
            "{} after {} frames ({}), {} draw calls",
            hud.counter_text(),
            frames,
            match hud.phase {
                SessionPhase::Ended(outcome) => outcome.banner(),
                _ => "still playing",
            },
            renderer.ops.len()
        );

        app.teardown();
    }
}
