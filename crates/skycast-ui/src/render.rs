//! View renderer: pure projection of fetched records into markup.
//!
//! Every value is converted from provider units exactly once, here.

use skycast_weather::units::{kelvin_to_fahrenheit, meters_per_second_to_mph, meters_to_feet};
use skycast_weather::{DailyForecast, ForecastPeriod, MarineObservation, Measurement};

use crate::page::MarineLabels;

const NOT_AVAILABLE: &str = "N/A";
const DATE_FORMAT: &str = "%A, %b %-d";

/// Markup for the two forecast regions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastMarkup {
    pub current: String,
    pub cards: String,
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn formatted_date(period: &ForecastPeriod) -> String {
    period.timestamp.format(DATE_FORMAT).to_string()
}

fn icon_src(icon_url: &str, icon: &str) -> String {
    format!(
        "{}/{}.png",
        icon_url.trim_end_matches('/'),
        escape_html(icon)
    )
}

/// Expanded layout for the first day
pub fn render_current(place_name: &str, period: &ForecastPeriod, icon_url: &str) -> String {
    format!(
        r#"<div class="details">
  <h2>{name} ({date})</h2>
  <h6>Temperature: {temp:.2}°F</h6>
  <h6>Feels Like: {feels:.2}°F</h6>
  <h6>Wind: {wind:.2} MPH</h6>
  <h6>Humidity: {humidity}%</h6>
</div>
<div class="icon">
  <img src="{icon}" alt="weather-icon">
  <h6>{description}</h6>
</div>
"#,
        name = escape_html(place_name),
        date = formatted_date(period),
        temp = kelvin_to_fahrenheit(period.temperature_k),
        feels = kelvin_to_fahrenheit(period.feels_like_k),
        wind = meters_per_second_to_mph(period.wind_speed_ms),
        humidity = period.humidity,
        icon = icon_src(icon_url, &period.icon),
        description = escape_html(&period.description),
    )
}

/// Compact card for every later day
pub fn render_card(period: &ForecastPeriod, icon_url: &str) -> String {
    format!(
        r#"<li class="card">
  <h3>{date}</h3>
  <img src="{icon}" alt="weather-icon">
  <h6>Temp: {temp:.2}°F</h6>
  <h6>Feels Like: {feels:.2}°F</h6>
  <h6>Wind: {wind:.2} MPH</h6>
  <h6>Humidity: {humidity}%</h6>
</li>
"#,
        date = formatted_date(period),
        icon = icon_src(icon_url, &period.icon),
        temp = kelvin_to_fahrenheit(period.temperature_k),
        feels = kelvin_to_fahrenheit(period.feels_like_k),
        wind = meters_per_second_to_mph(period.wind_speed_ms),
        humidity = period.humidity,
    )
}

/// Render both forecast regions. Each region is produced whole so the
/// caller can replace the previous content in one step.
pub fn render_forecast(place_name: &str, daily: &DailyForecast, icon_url: &str) -> ForecastMarkup {
    let current = daily
        .current()
        .map(|p| render_current(place_name, p, icon_url))
        .unwrap_or_default();
    let cards = daily
        .upcoming()
        .iter()
        .map(|p| render_card(p, icon_url))
        .collect();
    ForecastMarkup { current, cards }
}

fn height_in_feet(m: &Measurement) -> String {
    let feet = if m.is_meters() {
        meters_to_feet(m.value)
    } else {
        m.value
    };
    format!("{feet:.2}")
}

fn value_or_na(m: Option<&Measurement>, show: impl Fn(&Measurement) -> String) -> String {
    m.map(show).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// The four marine labels; an absent layer shows "N/A"
pub fn render_marine(obs: &MarineObservation) -> MarineLabels {
    let plain = |m: &Measurement| m.value.to_string();
    MarineLabels {
        wave_height: format!(
            "Wave Height: {} ft",
            value_or_na(obs.wave_height.as_ref(), height_in_feet)
        ),
        wave_period: format!(
            "Wave Period: {} s",
            value_or_na(obs.wave_period.as_ref(), plain)
        ),
        wind_wave_height: format!(
            "Wind Wave Height: {} ft",
            value_or_na(obs.wind_wave_height.as_ref(), height_in_feet)
        ),
        wave_direction: format!(
            "Wave Direction: {}°",
            value_or_na(obs.wave_direction.as_ref(), plain)
        ),
    }
}

pub fn render_uv(index: f64) -> String {
    format!("UV Index: {index:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use skycast_weather::first_per_day;

    fn period(day: u32, temp_k: f64, description: &str) -> ForecastPeriod {
        ForecastPeriod {
            timestamp: NaiveDate::from_ymd_opt(2024, 6, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            temperature_k: temp_k,
            feels_like_k: temp_k,
            wind_speed_ms: 10.0,
            humidity: 55,
            description: description.to_string(),
            icon: "10d".to_string(),
        }
    }

    #[test]
    fn test_current_layout() {
        let html = render_current("Santa Cruz", &period(1, 273.15, "light rain"), "https://icons");
        assert!(html.contains("<h2>Santa Cruz (Saturday, Jun 1)</h2>"));
        assert!(html.contains("Temperature: 32.00°F"));
        assert!(html.contains("Wind: 22.37 MPH"));
        assert!(html.contains("Humidity: 55%"));
        assert!(html.contains(r#"<img src="https://icons/10d.png" alt="weather-icon">"#));
        assert!(html.contains("<h6>light rain</h6>"));
    }

    #[test]
    fn test_card_layout() {
        let html = render_card(&period(2, 373.15, "clear sky"), "https://icons/");
        assert!(html.starts_with(r#"<li class="card">"#));
        assert!(html.contains("<h3>Sunday, Jun 2</h3>"));
        assert!(html.contains("Temp: 212.00°F"));
        assert!(html.contains("https://icons/10d.png"));
    }

    #[test]
    fn test_forecast_split_between_regions() {
        let daily = first_per_day(vec![
            period(1, 280.0, "a"),
            period(2, 281.0, "b"),
            period(3, 282.0, "c"),
        ]);
        let markup = render_forecast("Here", &daily, "https://icons");
        assert!(markup.current.contains("Here (Saturday, Jun 1)"));
        assert_eq!(markup.cards.matches(r#"<li class="card">"#).count(), 2);
        assert!(!markup.cards.contains("Saturday"));
    }

    #[test]
    fn test_empty_forecast_renders_nothing() {
        let markup = render_forecast("Here", &first_per_day(Vec::new()), "https://icons");
        assert_eq!(markup, ForecastMarkup::default());
    }

    #[test]
    fn test_provider_text_is_escaped() {
        let html = render_current("<b>Town</b>", &period(1, 280.0, "rain & \"wind\""), "x");
        assert!(html.contains("&lt;b&gt;Town&lt;/b&gt;"));
        assert!(html.contains("rain &amp; &quot;wind&quot;"));
    }

    #[test]
    fn test_marine_partial_presence() {
        let obs = MarineObservation {
            wave_height: None,
            wave_period: Some(Measurement {
                value: 8.0,
                unit: Some("wmoUnit:s".into()),
            }),
            wind_wave_height: Some(Measurement {
                value: 1.0,
                unit: Some("wmoUnit:m".into()),
            }),
            wave_direction: Some(Measurement {
                value: 270.0,
                unit: None,
            }),
        };
        let labels = render_marine(&obs);
        assert_eq!(labels.wave_height, "Wave Height: N/A ft");
        assert_eq!(labels.wave_period, "Wave Period: 8 s");
        assert_eq!(labels.wind_wave_height, "Wind Wave Height: 3.28 ft");
        assert_eq!(labels.wave_direction, "Wave Direction: 270°");
    }

    #[test]
    fn test_marine_all_absent() {
        let labels = render_marine(&MarineObservation::default());
        assert_eq!(labels.wave_period, "Wave Period: N/A s");
        assert_eq!(labels.wave_direction, "Wave Direction: N/A°");
    }

    #[test]
    fn test_uv_label() {
        assert_eq!(render_uv(6.24), "UV Index: 6.2");
    }
}
