//! Skycast dashboard: page regions, rendering and event handling.
//!
//! [`AppContext`] is built once from the configuration and handed to the
//! [`Dashboard`], which turns [`UiEvent`]s into provider lookups and
//! writes the results into a [`Page`].

pub mod context;
pub mod controller;
pub mod dashboard;
pub mod page;
pub mod render;

pub use context::AppContext;
pub use controller::{choose_submission, Field, InputError, Intent, Submission, UiEvent};
pub use dashboard::Dashboard;
pub use page::{MarineLabels, Page};
