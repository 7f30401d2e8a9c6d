//! Browser adapters: DOM targets, session overlay, effect application

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement, HtmlElement};

use super::Host;
use crate::Rect;
use crate::book::PageNavigator;
use crate::renderer::Hud;
use crate::sim::{Field, Outcome, PresentationTarget, SessionOverlay, SessionPhase, TargetError, TransientStyle};
use crate::transition::{Ease, Effect, Element, Pose, Tween};

const BREAKABLE_SELECTOR: &str =
    ".about-nav-left span, .about-nav-right span, .about-newsletter, .about-center-grid > *, .about-photo";

fn backend_err(e: JsValue) -> TargetError {
    TargetError::Backend(format!("{:?}", e))
}

/// Every element matching `selector`, as `HtmlElement`s
fn select_all(document: &Document, selector: &str) -> Vec<HtmlElement> {
    let Ok(list) = document.query_selector_all(selector) else {
        log::warn!("Bad selector: {}", selector);
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    document.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
}

/// Rectangle of `el` relative to `origin`'s top-left corner
fn relative_rect(el: &HtmlElement, origin: &HtmlElement) -> Rect {
    let r = el.get_bounding_client_rect();
    let o = origin.get_bounding_client_rect();
    Rect::new(
        (r.left() - o.left()) as f32,
        (r.top() - o.top()) as f32,
        r.width() as f32,
        r.height() as f32,
    )
}

/// A breakable element on the about page
pub struct DomTarget {
    element: HtmlElement,
    field: HtmlElement,
    original_style: Option<Option<String>>,
}

impl DomTarget {
    pub fn new(element: HtmlElement, field: HtmlElement) -> Self {
        Self {
            element,
            field,
            original_style: None,
        }
    }

    fn attached(&self) -> Result<&HtmlElement, TargetError> {
        if self.element.is_connected() {
            Ok(&self.element)
        } else {
            Err(TargetError::Detached)
        }
    }
}

impl PresentationTarget for DomTarget {
    fn rect(&self) -> Option<Rect> {
        let el = self.attached().ok()?;
        let rect = relative_rect(el, &self.field);
        (!rect.is_empty()).then_some(rect)
    }

    fn save_original_style(&mut self) -> Result<(), TargetError> {
        let style = self.attached()?.get_attribute("style");
        self.original_style = Some(style);
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), TargetError> {
        let style = self.attached()?.style();
        if visible {
            style.remove_property("display").map_err(backend_err)?;
        } else {
            style.set_property("display", "none").map_err(backend_err)?;
        }
        Ok(())
    }

    fn apply_transient_style(&mut self, s: TransientStyle, duration_ms: u32) -> Result<(), TargetError> {
        let style = self.attached()?.style();
        let ease = Ease::Snap.css();
        style
            .set_property(
                "transition",
                &format!("transform {0}ms {1}, opacity {0}ms {1}", duration_ms, ease),
            )
            .map_err(backend_err)?;
        style
            .set_property(
                "transform",
                &format!("scale({}) rotate({}deg)", s.scale, s.rotate_deg),
            )
            .map_err(backend_err)?;
        style
            .set_property("opacity", &s.opacity.to_string())
            .map_err(backend_err)?;
        Ok(())
    }

    fn restore_original_style(&mut self) -> Result<(), TargetError> {
        let el = self.attached()?;
        match self.original_style.take() {
            Some(Some(style)) => el.set_attribute("style", &style).map_err(backend_err)?,
            Some(None) => el.remove_attribute("style").map_err(backend_err)?,
            None => {}
        }
        Ok(())
    }
}

/// Canvas, counter badge, pause and exit buttons shown while a session runs
pub struct DomOverlay {
    document: Document,
}

impl DomOverlay {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn each(&self, f: impl Fn(&HtmlElement)) {
        for id in ["game-canvas", "game-counter", "game-pause", "game-exit"] {
            if let Some(el) = by_id(&self.document, id) {
                f(&el);
            }
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = by_id(&self.document, id) {
            el.set_text_content(Some(text));
        }
    }
}

impl SessionOverlay for DomOverlay {
    fn attach(&mut self, field: Field) {
        if let Some(canvas) = self
            .document
            .get_element_by_id("game-canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        {
            canvas.set_width(field.width.max(0.0) as u32);
            canvas.set_height(field.height.max(0.0) as u32);
        }
        self.each(|el| {
            let _ = el.class_list().remove_1("hidden");
            let _ = el.class_list().remove_2("won", "lost");
        });
        self.set_text("game-pause", "⏸️");
    }

    fn update_counter(&mut self, broken: usize, total: usize) {
        let hud = Hud {
            broken,
            total,
            phase: SessionPhase::Active,
        };
        self.set_text("game-counter", &hud.counter_text());
    }

    fn show_outcome(&mut self, outcome: Outcome) {
        if let Some(el) = by_id(&self.document, "game-counter") {
            let class = match outcome {
                Outcome::Won => "won",
                Outcome::Lost => "lost",
            };
            let _ = el.class_list().add_1(class);
            el.set_text_content(Some(outcome.banner()));
        }
    }

    fn set_paused(&mut self, paused: bool) {
        self.set_text("game-pause", if paused { "▶️" } else { "⏸️" });
    }

    fn detach(&mut self) {
        self.each(|el| {
            let _ = el.class_list().add_1("hidden");
        });
    }
}

/// The live page
pub struct WebHost {
    document: Document,
    /// Element whose box is the game field
    field: HtmlElement,
}

impl WebHost {
    /// `None` without the about page; the game canvas is laid over it
    pub fn new(document: Document) -> Option<Self> {
        let field = by_id(&document, "page1")?;
        Some(Self { document, field })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn apply_pose(el: &HtmlElement, pose: &Pose) {
        let style = el.style();
        if let Some(opacity) = pose.opacity {
            let _ = style.set_property("opacity", &opacity.to_string());
        }
        if let Some(transform) = pose.transform() {
            let _ = style.set_property("transform", &transform);
        }
    }

    fn apply_tween(&self, tween: &Tween) {
        for (i, el) in select_all(&self.document, &tween.element.selector())
            .iter()
            .enumerate()
        {
            let style = el.style();
            if let Some(from) = &tween.from {
                let _ = style.set_property("transition", "none");
                Self::apply_pose(el, from);
                // Flush so the start pose is committed before transitioning
                let _ = el.offset_width();
            }
            let _ = style.set_property("transition", &tween.transition_css());
            let delay = tween.stagger_ms as usize * i;
            let _ = style.set_property("transition-delay", &format!("{}ms", delay));
            Self::apply_pose(el, &tween.to);
        }
    }

    fn elements(&self, element: Element) -> Vec<HtmlElement> {
        let found = select_all(&self.document, &element.selector());
        if found.is_empty() {
            log::debug!("No element for {:?}", element);
        }
        found
    }
}

impl Host for WebHost {
    type Target = DomTarget;

    fn breakable_targets(&mut self) -> Vec<DomTarget> {
        select_all(&self.document, BREAKABLE_SELECTOR)
            .into_iter()
            .map(|el| DomTarget::new(el, self.field.clone()))
            .collect()
    }

    fn solid_rects(&mut self) -> Vec<Rect> {
        by_id(&self.document, "game-counter")
            .map(|el| relative_rect(&el, &self.field))
            .filter(|r| !r.is_empty())
            .into_iter()
            .collect()
    }

    fn game_area(&self) -> Rect {
        let r = self.field.get_bounding_client_rect();
        Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
    }

    fn session_overlay(&mut self) -> Box<dyn SessionOverlay> {
        Box::new(DomOverlay::new(self.document.clone()))
    }

    fn apply_effect(&mut self, effect: &Effect) {
        match effect {
            Effect::AddClass(element, class) => {
                for el in self.elements(*element) {
                    let _ = el.class_list().add_1(class);
                }
            }
            Effect::RemoveClass(element, class) => {
                for el in self.elements(*element) {
                    let _ = el.class_list().remove_1(class);
                }
            }
            Effect::SetDisplay(element, display) => {
                for el in self.elements(*element) {
                    let _ = el.style().set_property("display", display.css());
                }
            }
            Effect::Tween(tween) => self.apply_tween(tween),
            Effect::Cue(_) => {}
        }
    }

    fn sync_book(&mut self, navigator: &PageNavigator) {
        for page in navigator.pages() {
            if let Some(el) = by_id(&self.document, &format!("page{}", page.index + 1)) {
                let classes = el.class_list();
                let _ = classes.remove_3("left", "active", "right");
                let _ = classes.add_1(page.state.class_name());
            }
        }

        let controls = navigator.controls();
        for (id, enabled) in [
            ("prevBtn", controls.previous_enabled),
            ("nextBtn", controls.next_enabled),
        ] {
            if let Some(btn) = self
                .document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<web_sys::HtmlButtonElement>().ok())
            {
                btn.set_disabled(!enabled);
            }
        }

        let (page, count) = navigator.indicator();
        if let Some(el) = by_id(&self.document, "pageIndicator") {
            el.set_text_content(Some(&format!("{} / {}", page, count)));
        }

        for (i, link) in select_all(&self.document, ".nav-link").iter().enumerate() {
            let _ = link
                .class_list()
                .toggle_with_force("active", i == navigator.current());
        }
    }

    fn set_trigger_label(&mut self, text: &str) {
        if let Some(el) = by_id(&self.document, "gameTrigger") {
            el.set_text_content(Some(text));
        }
    }
}
