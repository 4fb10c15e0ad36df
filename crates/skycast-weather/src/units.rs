//! Conversions from provider units to display units.

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    (kelvin - 273.15) * 9.0 / 5.0 + 32.0
}

pub fn meters_per_second_to_mph(meters_per_second: f64) -> f64 {
    meters_per_second * 2.237
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters * 3.28084
}
