//! Dashboard orchestration.
//!
//! A submission resolves a place, then runs three independent branches
//! concurrently: forecast (followed by the background photo), marine and
//! UV. Each branch owns its failure domain. Every page write is guarded by
//! the submission's request token so a superseded lookup never touches the
//! page.

use std::sync::Arc;

use parking_lot::Mutex;
use skycast_core::{RequestToken, RequestTokens, SubmissionState};
use skycast_weather::{Coordinate, LocationError, ResolvedPlace, WeatherError};
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::controller::{choose_submission, Field, Intent, Submission, UiEvent};
use crate::page::Page;
use crate::render::{render_forecast, render_marine, render_uv};

const CITY_LOOKUP_FAILED: &str = "An error occurred while fetching the coordinates!";
const ZIP_LOOKUP_FAILED: &str = "An error occurred while fetching the weather by ZIP code!";
const REVERSE_LOOKUP_FAILED: &str = "An error occurred while fetching the city name!";
const LOCATION_DENIED: &str =
    "Geolocation request denied. Please reset location permission to grant access again.";
const LOCATION_FAILED: &str = "Geolocation request error. Please reset location permission.";
const FORECAST_FAILED: &str = "An error occurred while fetching the weather forecast!";

/// Notification for a failed device lookup, `None` when the user cancelled.
fn device_failure_message(err: &WeatherError) -> Option<&'static str> {
    match err {
        WeatherError::DeviceCapability(LocationError::Cancelled) => None,
        WeatherError::DeviceCapability(LocationError::PermissionDenied) => Some(LOCATION_DENIED),
        WeatherError::DeviceCapability(_) => Some(LOCATION_FAILED),
        _ => Some(REVERSE_LOOKUP_FAILED),
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    ctx: AppContext,
    page: Arc<Mutex<Page>>,
    tokens: RequestTokens,
    state: Arc<Mutex<SubmissionState>>,
}

impl Dashboard {
    pub fn new(ctx: AppContext) -> Self {
        let page = Page::new(ctx.photos.default_background());
        Self {
            ctx,
            page: Arc::new(Mutex::new(page)),
            tokens: RequestTokens::new(),
            state: Arc::new(Mutex::new(SubmissionState::Idle)),
        }
    }

    /// Snapshot of the page
    pub fn page(&self) -> Page {
        self.page.lock().clone()
    }

    pub fn take_notifications(&self) -> Vec<String> {
        self.page.lock().take_notifications()
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.lock()
    }

    /// Page load: replace the default background with a photo for the
    /// initial query. Any submission started meanwhile takes precedence.
    pub async fn start(&self) {
        let query = self.ctx.photos.initial_query().trim().to_string();
        if query.is_empty() {
            tracing::debug!("No initial background query, keeping the default background");
            return;
        }
        let token = self.tokens.latest();
        tracing::info!("Loading initial background for {:?}", query);
        self.update_background(token, &query).await;
    }

    pub async fn handle(&self, event: UiEvent, cancel: &CancellationToken) {
        match Intent::from(event) {
            Intent::Submit => self.submit().await,
            Intent::Locate => self.locate(cancel).await,
            Intent::Edit { field, value } => {
                self.page.lock().set_input(field, value);
            }
            Intent::Ignore => {}
        }
    }

    /// Submit the search form
    pub async fn submit(&self) {
        let (city, zip) = {
            let page = self.page.lock();
            (
                page.input(Field::City).to_string(),
                page.input(Field::Zip).to_string(),
            )
        };

        let submission = match choose_submission(&city, &zip) {
            Ok(submission) => submission,
            Err(e) => {
                tracing::debug!("Submission rejected: {}", e);
                self.page.lock().notify(e.to_string());
                return;
            }
        };

        let token = self.begin();
        let (resolved, failure) = match &submission {
            Submission::Zip(zip) => (self.ctx.geocoder.resolve_zip(zip).await, ZIP_LOOKUP_FAILED),
            Submission::City(city) => {
                (self.ctx.geocoder.resolve_city(city).await, CITY_LOOKUP_FAILED)
            }
        };

        match resolved {
            Ok(place) => self.on_resolved(token, place).await,
            Err(e) => {
                tracing::error!("Location lookup {:?} failed: {}", submission, e);
                self.apply(token, |page| page.notify(failure));
            }
        }
        self.finish(token);
    }

    /// Resolve the device position and look it up
    pub async fn locate(&self, cancel: &CancellationToken) {
        let token = self.begin();
        let result = self
            .ctx
            .geocoder
            .resolve_device(self.ctx.locator.as_ref(), cancel)
            .await;

        match result {
            Ok(place) => self.on_resolved(token, place).await,
            Err(e) => match device_failure_message(&e) {
                Some(message) => {
                    tracing::error!("Device lookup failed: {}", e);
                    self.apply(token, |page| page.notify(message));
                }
                None => tracing::info!("Device lookup cancelled"),
            },
        }
        self.finish(token);
    }

    fn begin(&self) -> RequestToken {
        let token = self.tokens.issue();
        let mut state = self.state.lock();
        *state = state.on_submit(token);
        tracing::debug!("Submission {} started", token);
        token
    }

    fn finish(&self, token: RequestToken) {
        let mut state = self.state.lock();
        *state = state.on_finished(token);
    }

    /// Run `update` against the page only if `token` is still the latest.
    /// The check and the write happen under the same lock.
    fn apply(&self, token: RequestToken, update: impl FnOnce(&mut Page)) -> bool {
        let mut page = self.page.lock();
        if !self.tokens.is_current(token) {
            tracing::debug!("Discarding result of superseded submission {}", token);
            return false;
        }
        update(&mut page);
        true
    }

    async fn on_resolved(&self, token: RequestToken, place: ResolvedPlace) {
        if !self.apply(token, |page| page.city_input.clear()) {
            return;
        }
        tracing::info!("Resolved {} at {}", place.name, place.coordinate);

        tokio::join!(
            self.forecast_branch(token, &place),
            self.marine_branch(token, place.coordinate),
            self.uv_branch(token, place.coordinate),
        );
    }

    async fn forecast_branch(&self, token: RequestToken, place: &ResolvedPlace) {
        let daily = match self.ctx.forecast.fetch_daily(place.coordinate).await {
            Ok(daily) => daily,
            Err(e) => {
                tracing::error!("Error fetching forecast for {}: {}", place.name, e);
                self.apply(token, |page| page.notify(FORECAST_FAILED));
                return;
            }
        };

        let markup = render_forecast(&place.name, &daily, &self.ctx.icon_url);
        let applied = self.apply(token, |page| {
            page.current_weather = markup.current;
            page.weather_cards = markup.cards;
        });

        if !applied {
            return;
        }
        if let Some(first) = daily.current() {
            self.update_background(token, &first.description).await;
        }
    }

    async fn marine_branch(&self, token: RequestToken, coordinate: Coordinate) {
        match self.ctx.marine.fetch_observation(coordinate).await {
            Ok(obs) => {
                let labels = render_marine(&obs);
                self.apply(token, |page| page.marine = labels);
            }
            Err(e) => tracing::warn!("Error fetching or updating marine forecast: {}", e),
        }
    }

    async fn uv_branch(&self, token: RequestToken, coordinate: Coordinate) {
        if !self.ctx.uv.is_enabled() {
            tracing::debug!("UV lookup disabled, no API key configured");
            return;
        }
        match self.ctx.uv.fetch_uv_index(coordinate).await {
            Ok(index) => {
                let label = render_uv(index);
                self.apply(token, |page| page.uv_index = label);
            }
            Err(e) => tracing::warn!("Error fetching UV index: {}", e),
        }
    }

    async fn update_background(&self, token: RequestToken, query: &str) {
        match self.ctx.photos.search_background(query).await {
            Ok(Some(url)) => {
                self.apply(token, |page| page.background = url);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Error fetching background image: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_core::Config;

    #[test]
    fn test_device_failure_messages() {
        assert_eq!(
            device_failure_message(&WeatherError::from(LocationError::PermissionDenied)),
            Some(LOCATION_DENIED)
        );
        assert_eq!(
            device_failure_message(&WeatherError::from(LocationError::ServiceUnavailable)),
            Some(LOCATION_FAILED)
        );
        assert_eq!(device_failure_message(&WeatherError::from(LocationError::Cancelled)), None);
        assert_eq!(
            device_failure_message(&WeatherError::EmptyResult("nothing".into())),
            Some(REVERSE_LOOKUP_FAILED)
        );
    }

    #[tokio::test]
    async fn test_empty_form_notifies_without_token() {
        let dashboard = Dashboard::new(AppContext::from_config(&Config::default()).unwrap());
        dashboard.submit().await;

        assert_eq!(
            dashboard.take_notifications(),
            vec!["Please enter a city name or ZIP code!"]
        );
        assert!(dashboard.state().is_idle());
    }

    #[tokio::test]
    async fn test_non_enter_key_is_ignored() {
        let dashboard = Dashboard::new(AppContext::from_config(&Config::default()).unwrap());
        dashboard
            .handle(
                UiEvent::KeyUp {
                    field: Field::City,
                    key: "x".into(),
                },
                &CancellationToken::new(),
            )
            .await;
        assert!(dashboard.page().notifications().is_empty());
    }
}
