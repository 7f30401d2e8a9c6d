//! Paged "book" content view

pub mod gesture;
pub mod navigator;

pub use gesture::{NavCommand, SwipeTracker, key_command};
pub use navigator::{
    BookError, Controls, Page, PageEntered, PageEnteredCallback, PageNavigator, PageState,
};

/// Default page order
pub const DEFAULT_PAGES: [&str; 4] = ["about", "projects", "skills", "contact"];
