//! Input/event controller: maps raw UI events to intents and picks which
//! lookup a submission runs.

use thiserror::Error;

pub const ENTER_KEY: &str = "Enter";

/// The two text inputs of the search form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    City,
    Zip,
}

/// Raw events from the page controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Search button
    SearchClicked,
    /// Key released while a text input has focus
    KeyUp { field: Field, key: String },
    /// "Use current location" button
    LocateClicked,
    /// Text input edited
    Input { field: Field, value: String },
}

/// What the dashboard should do in response to an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Submit,
    Locate,
    Edit { field: Field, value: String },
    Ignore,
}

impl From<UiEvent> for Intent {
    fn from(event: UiEvent) -> Self {
        match event {
            UiEvent::SearchClicked => Intent::Submit,
            UiEvent::KeyUp { key, .. } if key == ENTER_KEY => Intent::Submit,
            UiEvent::KeyUp { .. } => Intent::Ignore,
            UiEvent::LocateClicked => Intent::Locate,
            UiEvent::Input { field, value } => Intent::Edit { field, value },
        }
    }
}

/// Lookup chosen for a form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Zip(String),
    City(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a city name or ZIP code!")]
    Empty,
}

/// Pick the lookup for the current form values. A ZIP code always wins
/// over a city name; both are trimmed first.
pub fn choose_submission(city: &str, zip: &str) -> Result<Submission, InputError> {
    let city = city.trim();
    let zip = zip.trim();

    if !zip.is_empty() {
        Ok(Submission::Zip(zip.to_string()))
    } else if !city.is_empty() {
        Ok(Submission::City(city.to_string()))
    } else {
        Err(InputError::Empty)
    }
}
