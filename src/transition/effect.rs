//! Backend-neutral presentation effects
//!
//! Transition backends describe what should happen to the page as values of
//! [`Effect`]; the platform layer turns them into DOM/CSS changes.

/// Page elements the transitions touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Cover,
    Welcome,
    MainContent,
    MainNav,
    Book,
    BookControls,
    AboutNav,
    /// All children of the about grid
    AboutGrid,
    AboutFooter,
    /// Title of page `n`
    PageTitle(usize),
    /// Animated items on page `n` (cards, stats, contact rows)
    PageItems(usize),
}

impl Element {
    /// CSS selector matching the element(s)
    pub fn selector(&self) -> String {
        match self {
            Element::Cover => "#cover".into(),
            Element::Welcome => "#welcome".into(),
            Element::MainContent => "#mainContent".into(),
            Element::MainNav => "#mainNav".into(),
            Element::Book => "#bookFlip".into(),
            Element::BookControls => ".book-controls".into(),
            Element::AboutNav => ".about-nav".into(),
            Element::AboutGrid => ".about-center-grid > *".into(),
            Element::AboutFooter => ".about-footer".into(),
            Element::PageTitle(n) => format!("#page{} .page-title", n + 1),
            Element::PageItems(n) => format!(
                "#page{0} .project-card, #page{0} .stat-item, #page{0} .contact-item",
                n + 1
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    None,
    Block,
    Flex,
}

impl Display {
    pub fn css(&self) -> &'static str {
        match self {
            Display::None => "none",
            Display::Block => "block",
            Display::Flex => "flex",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    #[default]
    Out,
    InOut,
    /// Slight overshoot
    Back,
    /// Strong ease-in-out used by the class-toggle transitions
    Snap,
}

impl Ease {
    pub fn css(&self) -> &'static str {
        match self {
            Ease::Linear => "linear",
            Ease::Out => "cubic-bezier(0.215,0.61,0.355,1)",
            Ease::InOut => "cubic-bezier(0.455,0.03,0.515,0.955)",
            Ease::Back => "cubic-bezier(0.34,1.56,0.64,1)",
            Ease::Snap => "cubic-bezier(.77,0,.18,1)",
        }
    }
}

/// Visual properties to animate from or to; unset fields are left alone
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub opacity: Option<f32>,
    pub scale: Option<f32>,
    pub rotate_deg: Option<f32>,
    pub rotate_y_deg: Option<f32>,
    pub translate_x: Option<f32>,
    pub translate_y: Option<f32>,
}

impl Pose {
    pub fn opacity(mut self, v: f32) -> Self {
        self.opacity = Some(v);
        self
    }

    pub fn scale(mut self, v: f32) -> Self {
        self.scale = Some(v);
        self
    }

    pub fn rotate(mut self, deg: f32) -> Self {
        self.rotate_deg = Some(deg);
        self
    }

    pub fn rotate_y(mut self, deg: f32) -> Self {
        self.rotate_y_deg = Some(deg);
        self
    }

    pub fn x(mut self, px: f32) -> Self {
        self.translate_x = Some(px);
        self
    }

    pub fn y(mut self, px: f32) -> Self {
        self.translate_y = Some(px);
        self
    }

    /// CSS `transform` value, `None` if no transform field is set
    pub fn transform(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.translate_x.is_some() || self.translate_y.is_some() {
            parts.push(format!(
                "translate({}px, {}px)",
                self.translate_x.unwrap_or(0.0),
                self.translate_y.unwrap_or(0.0)
            ));
        }
        if let Some(s) = self.scale {
            parts.push(format!("scale({})", s));
        }
        if let Some(r) = self.rotate_deg {
            parts.push(format!("rotate({}deg)", r));
        }
        if let Some(r) = self.rotate_y_deg {
            parts.push(format!("rotateY({}deg)", r));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// A timed move of one element (or group) to a pose
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub element: Element,
    /// Applied instantly before animating
    pub from: Option<Pose>,
    pub to: Pose,
    pub duration_ms: u32,
    pub ease: Ease,
    /// Extra delay per matched node, for groups
    pub stagger_ms: u32,
}

impl Tween {
    pub fn to(element: Element, to: Pose, duration_ms: u32) -> Self {
        Self {
            element,
            from: None,
            to,
            duration_ms,
            ease: Ease::default(),
            stagger_ms: 0,
        }
    }

    pub fn from(mut self, pose: Pose) -> Self {
        self.from = Some(pose);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn stagger(mut self, ms: u32) -> Self {
        self.stagger_ms = ms;
        self
    }

    /// CSS `transition` value for the animated properties
    pub fn transition_css(&self) -> String {
        let mut props = Vec::new();
        if self.to.opacity.is_some() {
            props.push("opacity");
        }
        if self.to.transform().is_some() {
            props.push("transform");
        }
        if props.is_empty() {
            return "none".into();
        }
        props
            .iter()
            .map(|p| format!("{} {}ms {}", p, self.duration_ms, self.ease.css()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Milestones the composition root reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// The cover is gone and the main content is showing
    CoverGone,
    /// The book is fully visible; the first page may play its intro
    BookReady,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AddClass(Element, &'static str),
    RemoveClass(Element, &'static str),
    SetDisplay(Element, Display),
    Tween(Tween),
    Cue(Cue),
}

impl From<Tween> for Effect {
    fn from(t: Tween) -> Self {
        Effect::Tween(t)
    }
}

impl Effect {
    pub fn element(&self) -> Option<Element> {
        match self {
            Effect::AddClass(e, _) | Effect::RemoveClass(e, _) | Effect::SetDisplay(e, _) => {
                Some(*e)
            }
            Effect::Tween(t) => Some(t.element),
            Effect::Cue(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_transform() {
        assert_eq!(Pose::default().opacity(1.0).transform(), None);
        assert_eq!(
            Pose::default().y(-30.0).scale(0.9).transform().as_deref(),
            Some("translate(0px, -30px) scale(0.9)")
        );
        assert_eq!(
            Pose::default().rotate_y(-15.0).transform().as_deref(),
            Some("rotateY(-15deg)")
        );
    }

    #[test]
    fn test_transition_css() {
        let t = Tween::to(Element::Book, Pose::default().opacity(1.0), 800).ease(Ease::Snap);
        assert_eq!(t.transition_css(), "opacity 800ms cubic-bezier(.77,0,.18,1)");

        let t = Tween::to(Element::Cover, Pose::default(), 100);
        assert_eq!(t.transition_css(), "none");

        let t = Tween::to(Element::MainNav, Pose::default().opacity(1.0).y(0.0), 800)
            .ease(Ease::Linear);
        assert_eq!(
            t.transition_css(),
            "opacity 800ms linear, transform 800ms linear"
        );
    }

    #[test]
    fn test_selectors() {
        assert_eq!(Element::Book.selector(), "#bookFlip");
        assert_eq!(Element::PageTitle(1).selector(), "#page2 .page-title");
        assert_eq!(Effect::Cue(Cue::BookReady).element(), None);
        assert_eq!(
            Effect::AddClass(Element::Cover, "anim-rect").element(),
            Some(Element::Cover)
        );
    }
}
