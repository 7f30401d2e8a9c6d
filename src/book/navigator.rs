//! Book-style page navigator
//!
//! Pages sit in a fixed order. Pages before the current one are flipped to
//! the left, pages after it wait on the right. Navigation outside the book or
//! onto the current page is ignored rather than reported: user input and
//! programmatic navigation may race and neither should ever fail.

use super::gesture::NavCommand;

/// Display state of one page relative to the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Left,
    Active,
    Right,
}

impl PageState {
    /// CSS class applied to the page element
    pub fn class_name(&self) -> &'static str {
        match self {
            PageState::Left => "left",
            PageState::Active => "active",
            PageState::Right => "right",
        }
    }

    fn relative_to(index: usize, current: usize) -> Self {
        if index < current {
            PageState::Left
        } else if index == current {
            PageState::Active
        } else {
            PageState::Right
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub index: usize,
    pub name: String,
    pub state: PageState,
}

/// Passed to the page-entered callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntered {
    pub index: usize,
    pub name: String,
    pub previous: Option<usize>,
    /// First time this page has been entered (one-time intro animations)
    pub first_visit: bool,
}

/// Enabled state of the previous/next buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
    #[error("a book needs at least one page")]
    NoPages,
}

pub type PageEnteredCallback = Box<dyn FnMut(&PageEntered)>;

pub struct PageNavigator {
    pages: Vec<Page>,
    current: usize,
    visited: Vec<bool>,
    initialized: bool,
    on_enter: Option<PageEnteredCallback>,
}

impl std::fmt::Debug for PageNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageNavigator")
            .field("pages", &self.pages)
            .field("current", &self.current)
            .field("visited", &self.visited)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl PageNavigator {
    /// Build a navigator over the named pages, starting on the first
    pub fn new<I, S>(names: I) -> Result<Self, BookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages: Vec<Page> = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Page {
                index,
                name: name.into(),
                state: PageState::relative_to(index, 0),
            })
            .collect();

        if pages.is_empty() {
            return Err(BookError::NoPages);
        }

        let visited = vec![false; pages.len()];
        Ok(Self {
            pages,
            current: 0,
            visited,
            initialized: false,
            on_enter: None,
        })
    }

    /// Register the page-entered callback (replaces any previous one)
    pub fn on_page_entered(&mut self, callback: PageEnteredCallback) {
        self.on_enter = Some(callback);
    }

    /// Announce the starting page once the book is visible
    ///
    /// Only the first call does anything.
    pub fn init(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        self.relayout();
        self.enter(None);
        true
    }

    /// Drop the callback; the navigator can be initialized again
    pub fn teardown(&mut self) {
        self.on_enter = None;
        self.initialized = false;
    }

    /// Jump to page `index`; ignored when out of range or already there
    pub fn goto(&mut self, index: usize) -> bool {
        if index == self.current || index >= self.pages.len() {
            log::debug!("goto({}) ignored (current {}, {} pages)", index, self.current, self.pages.len());
            return false;
        }

        let previous = self.current;
        self.current = index;
        self.relayout();
        log::info!("Page {} -> {} ({})", previous, index, self.pages[index].name);
        self.enter(Some(previous));
        true
    }

    pub fn next(&mut self) -> bool {
        self.goto(self.current + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(index) => self.goto(index),
            None => false,
        }
    }

    /// Apply a discrete navigation command from any input source
    pub fn apply(&mut self, command: NavCommand) -> bool {
        match command {
            NavCommand::Previous => self.previous(),
            NavCommand::Next => self.next(),
            NavCommand::Goto(index) => self.goto(index),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn state(&self, index: usize) -> Option<PageState> {
        self.pages.get(index).map(|p| p.state)
    }

    pub fn page_index(&self, name: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.name == name)
    }

    pub fn controls(&self) -> Controls {
        Controls {
            previous_enabled: self.current > 0,
            next_enabled: self.current + 1 < self.pages.len(),
        }
    }

    /// `(current page number, page count)`, 1-based for display
    pub fn indicator(&self) -> (usize, usize) {
        (self.current + 1, self.pages.len())
    }

    fn relayout(&mut self) {
        let current = self.current;
        for page in &mut self.pages {
            page.state = PageState::relative_to(page.index, current);
        }
    }

    fn enter(&mut self, previous: Option<usize>) {
        let index = self.current;
        let first_visit = !self.visited[index];
        self.visited[index] = true;

        let event = PageEntered {
            index,
            name: self.pages[index].name.clone(),
            previous,
            first_visit,
        };
        if let Some(callback) = self.on_enter.as_mut() {
            callback(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use proptest::prelude::*;

    const NAMES: [&str; 4] = ["about", "projects", "skills", "contact"];

    fn book() -> PageNavigator {
        PageNavigator::new(NAMES).unwrap()
    }

    fn states(nav: &PageNavigator) -> Vec<PageState> {
        nav.pages().iter().map(|p| p.state).collect()
    }

    fn recorded(nav: &mut PageNavigator) -> Rc<RefCell<Vec<PageEntered>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        nav.on_page_entered(Box::new(move |e: &PageEntered| sink.borrow_mut().push(e.clone())));
        log
    }

    #[test]
    fn test_initial_layout() {
        let nav = book();
        assert_eq!(nav.current(), 0);
        assert_eq!(
            states(&nav),
            vec![PageState::Active, PageState::Right, PageState::Right, PageState::Right]
        );
        assert_eq!(
            nav.controls(),
            Controls {
                previous_enabled: false,
                next_enabled: true
            }
        );
        assert_eq!(nav.indicator(), (1, 4));
    }

    #[test]
    fn test_previous_then_next_twice() {
        let mut nav = book();
        nav.goto(1);
        assert!(nav.previous());
        assert!(nav.next());
        assert!(nav.next());

        assert_eq!(nav.current(), 2);
        assert_eq!(
            states(&nav),
            vec![PageState::Left, PageState::Left, PageState::Active, PageState::Right]
        );
    }

    #[test]
    fn test_boundaries_are_noops() {
        let mut nav = book();
        assert!(!nav.previous());
        nav.goto(3);
        assert!(!nav.next());
        assert_eq!(
            nav.controls(),
            Controls {
                previous_enabled: true,
                next_enabled: false
            }
        );
        assert!(!nav.goto(3));
        assert!(!nav.goto(4));
        assert!(!nav.apply(NavCommand::Goto(usize::MAX)));
        assert_eq!(nav.current(), 3);
    }

    #[test]
    fn test_callback_tracks_first_visit() {
        let mut nav = book();
        let log = recorded(&mut nav);

        assert!(nav.init());
        assert!(!nav.init());
        nav.next();
        nav.previous();
        nav.goto(0); // no-op, no callback

        let log = log.borrow();
        assert_eq!(log.len(), 3);
        assert_eq!(
            log[0],
            PageEntered {
                index: 0,
                name: "about".into(),
                previous: None,
                first_visit: true
            }
        );
        assert!(log[1].first_visit);
        assert_eq!(log[1].previous, Some(0));
        assert_eq!(log[2].index, 0);
        assert!(!log[2].first_visit);
    }

    #[test]
    fn test_teardown_drops_callback() {
        let mut nav = book();
        let log = recorded(&mut nav);
        nav.init();
        nav.teardown();
        nav.next();
        assert_eq!(log.borrow().len(), 1);
        assert!(nav.init());
    }

    #[test]
    fn test_empty_book_rejected() {
        let err = PageNavigator::new(Vec::<String>::new()).unwrap_err();
        assert_eq!(err, BookError::NoPages);
    }

    #[test]
    fn test_page_lookup() {
        let nav = book();
        assert_eq!(nav.page_index("skills"), Some(2));
        assert_eq!(nav.page_index("blog"), None);
        assert_eq!(PageState::Left.class_name(), "left");
    }

    proptest! {
        #[test]
        fn prop_goto_partitions_pages(
            n in 1usize..12,
            moves in proptest::collection::vec(0usize..16, 1..20),
        ) {
            let mut nav = PageNavigator::new((0..n).map(|i| format!("p{}", i))).unwrap();
            for target in moves {
                let before = nav.current();
                let changed = nav.goto(target);
                prop_assert_eq!(changed, target < n && target != before);
                if !changed {
                    prop_assert_eq!(nav.current(), before);
                }

                let c = nav.current();
                prop_assert!(c < n);
                let active = nav.pages().iter().filter(|p| p.state == PageState::Active).count();
                prop_assert_eq!(active, 1);
                for page in nav.pages() {
                    let expected = if page.index < c {
                        PageState::Left
                    } else if page.index == c {
                        PageState::Active
                    } else {
                        PageState::Right
                    };
                    prop_assert_eq!(page.state, expected);
                }
            }
        }
    }
}
