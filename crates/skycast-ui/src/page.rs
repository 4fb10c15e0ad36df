//! The rendering surface: fixed regions that the dashboard overwrites.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use skycast_weather::MarineObservation;

use crate::controller::Field;
use crate::render::{escape_html, render_marine};

/// Characters that would end or escape a quoted CSS `url()`
const CSS_URL: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'\\')
    .add(b'<')
    .add(b'>');

/// Background URL as it may appear inside `url('...')` in a style attribute
fn css_url(url: &str) -> String {
    utf8_percent_encode(url, CSS_URL).to_string()
}

/// Text of the four marine regions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarineLabels {
    pub wave_height: String,
    pub wave_period: String,
    pub wind_wave_height: String,
    pub wave_direction: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Markup of the current-conditions region
    pub current_weather: String,
    /// Markup of the forecast-cards region
    pub weather_cards: String,
    pub marine: MarineLabels,
    pub uv_index: String,
    /// Background image URL
    pub background: String,
    pub city_input: String,
    pub zip_input: String,
    notifications: Vec<String>,
}

impl Page {
    pub fn new(background: impl Into<String>) -> Self {
        Self {
            current_weather: String::new(),
            weather_cards: String::new(),
            marine: render_marine(&MarineObservation::default()),
            uv_index: String::new(),
            background: background.into(),
            city_input: String::new(),
            zip_input: String::new(),
            notifications: Vec::new(),
        }
    }

    pub fn input(&self, field: Field) -> &str {
        match field {
            Field::City => &self.city_input,
            Field::Zip => &self.zip_input,
        }
    }

    pub fn set_input(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::City => self.city_input = value,
            Field::Zip => self.zip_input = value,
        }
    }

    /// Raise a blocking notification
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notifications.push(message.into());
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    /// Acknowledge and remove all pending notifications
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    /// Whole document with the current region contents
    pub fn to_html(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Weather Dashboard</title>
</head>
<body style="background-image: url('{background}')">
  <h1>Weather Dashboard</h1>
  <div class="container">
    <div class="weather-input">
      <h3>Enter a City Name</h3>
      <input class="city-input" type="text" placeholder="E.g., New York, London, Tokyo" value="{city}">
      <h3>Or Enter a ZIP Code</h3>
      <input class="zip-input" type="text" placeholder="E.g., 10001" value="{zip}">
      <button class="search-btn">Search</button>
      <div class="separator"></div>
      <button class="location-btn">Use Current Location</button>
    </div>
    <div class="weather-data">
      <div class="current-weather">
{current}      </div>
      <div class="marine-forecast">
        <p id="current-wave-height">{wave_height}</p>
        <p id="current-wave-period">{wave_period}</p>
        <p id="current-wind-wave-height">{wind_wave_height}</p>
        <p id="current-wave-direction">{wave_direction}</p>
        <p><span id="uv-index">{uv}</span></p>
      </div>
      <div class="days-forecast">
        <h2>5-Day Forecast</h2>
        <ul class="weather-cards">
{cards}        </ul>
      </div>
    </div>
  </div>
</body>
</html>
"#,
            background = escape_html(&css_url(&self.background)),
            city = escape_html(&self.city_input),
            zip = escape_html(&self.zip_input),
            current = self.current_weather,
            wave_height = escape_html(&self.marine.wave_height),
            wave_period = escape_html(&self.marine.wave_period),
            wind_wave_height = escape_html(&self.marine.wind_wave_height),
            wave_direction = escape_html(&self.marine.wave_direction),
            uv = escape_html(&self.uv_index),
            cards = self.weather_cards,
        )
    }
}
