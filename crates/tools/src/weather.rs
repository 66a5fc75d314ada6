//! Current weather by city.
//!
//! Two HTTP steps: resolve the city to coordinates with the geocoding
//! endpoint, then fetch current conditions for those coordinates. The
//! conditions endpoint answers in one of two shapes (nested `current.*` or
//! flat `main.*` plus `weather[0]`); both are normalized once into
//! [`Conditions`] here.

use anyhow::Result;
use reqwest::{Client, StatusCode};
use runtime::{Capability, Param};
use serde::Deserialize;
use std::{fmt, time::Duration};

/// Default geocoding endpoint.
pub const GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";

/// Default current conditions endpoint.
pub const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Default per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Weather lookup failures. The display text is what the user sees.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Geocoding returned no match.
    #[error("Unable to find coordinates for {0}")]
    NotFound(String),

    /// Geocoding answered with a non-200 status.
    #[error("Error fetching coordinates for {city}: {}", .status.as_u16())]
    Geocoding { city: String, status: StatusCode },

    /// The conditions endpoint answered with a non-200 status.
    #[error("Error fetching weather data: {}", .0.as_u16())]
    Status(StatusCode),

    /// The request never produced a response.
    #[error("Error fetching weather data: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response lacks the fields a report needs.
    #[error("Error: Could not retrieve some weather data.")]
    MissingData,
}

/// Normalized current conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    /// Temperature in °C.
    pub temperature: f64,
    /// Capitalized description, e.g. "Light rain".
    pub description: Option<String>,
    /// Relative humidity in %.
    pub humidity: Option<f64>,
}

impl Conditions {
    /// Normalize a raw conditions response. The nested shape wins; its
    /// description falls back to the top-level `weather` list.
    pub fn from_raw(raw: RawConditions) -> Result<Self, WeatherError> {
        let (temperature, humidity, weather) = match (raw.current, raw.main) {
            (Some(current), _) if current.weather.is_empty() => {
                (current.temp, current.humidity, raw.weather)
            }
            (Some(current), _) => (current.temp, current.humidity, current.weather),
            (None, Some(main)) => (main.temp, main.humidity, raw.weather),
            (None, None) => return Err(WeatherError::MissingData),
        };

        Ok(Self {
            temperature: temperature.ok_or(WeatherError::MissingData)?,
            description: weather
                .into_iter()
                .next()
                .map(|w| capitalize(&w.description)),
            humidity,
        })
    }

    /// Render the report shown to the engine.
    pub fn report(&self, city: &str) -> String {
        let mut report = format!("Weather in {city}:\n- Temperature: {}°C", self.temperature);
        if let Some(description) = &self.description {
            report.push_str(&format!("\n- Description: {description}"));
        }
        if let Some(humidity) = self.humidity {
            report.push_str(&format!("\n- Humidity: {humidity}%"));
        }
        report
    }
}

/// The conditions endpoint response, in either shape.
#[derive(Debug, Default, Deserialize)]
pub struct RawConditions {
    #[serde(default)]
    current: Option<Block>,
    #[serde(default)]
    main: Option<Block>,
    #[serde(default)]
    weather: Vec<Weather>,
}

#[derive(Debug, Default, Deserialize)]
struct Block {
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    humidity: Option<f64>,
    #[serde(default)]
    weather: Vec<Weather>,
}

#[derive(Debug, Deserialize)]
struct Weather {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CityArgs {
    city: String,
}

/// Client for the geocoding and current conditions endpoints.
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    key: String,
    geocoding_url: String,
    current_url: String,
}

impl fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient")
            .field("geocoding_url", &self.geocoding_url)
            .field("current_url", &self.current_url)
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    /// Create a client whose every request is bounded by `timeout`.
    pub fn new(key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            key: key.into(),
            geocoding_url: GEOCODING_URL.into(),
            current_url: CURRENT_URL.into(),
        })
    }

    /// Override the endpoints.
    pub fn with_endpoints(
        mut self,
        geocoding_url: impl Into<String>,
        current_url: impl Into<String>,
    ) -> Self {
        self.geocoding_url = geocoding_url.into();
        self.current_url = current_url.into();
        self
    }

    /// Resolve a city to `(lat, lon)`.
    pub async fn coordinates(&self, city: &str) -> Result<(f64, f64), WeatherError> {
        let response = self
            .client
            .get(&self.geocoding_url)
            .query(&[("q", city), ("limit", "1"), ("appid", self.key.as_str())])
            .send()
            .await?;
        tracing::debug!("geocoding {city}: {}", response.status());
        if response.status() != StatusCode::OK {
            return Err(WeatherError::Geocoding {
                city: city.to_owned(),
                status: response.status(),
            });
        }

        let places: Vec<Place> = response.json().await?;
        places
            .first()
            .map(|p| (p.lat, p.lon))
            .ok_or_else(|| WeatherError::NotFound(city.to_owned()))
    }

    /// Fetch normalized current conditions for a city.
    pub async fn conditions(&self, city: &str) -> Result<Conditions, WeatherError> {
        let (lat, lon) = self.coordinates(city).await?;
        let response = self
            .client
            .get(&self.current_url)
            .query(&[
                ("lat", lat.to_string().as_str()),
                ("lon", lon.to_string().as_str()),
                ("appid", self.key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;
        tracing::debug!("conditions {city}: {}", response.status());
        if response.status() != StatusCode::OK {
            return Err(WeatherError::Status(response.status()));
        }

        let raw: RawConditions = response
            .json()
            .await
            .map_err(|_| WeatherError::MissingData)?;
        Conditions::from_raw(raw)
    }

    /// The weather report for a city, or the user-facing failure text.
    pub async fn current_weather(&self, city: &str) -> String {
        match self.conditions(city).await {
            Ok(conditions) => conditions.report(city),
            Err(e) => {
                tracing::warn!("weather lookup for {city} failed: {e:?}");
                e.to_string()
            }
        }
    }

    /// The `get_current_weather` capability backed by this client.
    pub fn capability(self) -> Capability {
        Capability::new(
            "get_current_weather",
            "Get the current weather for a given city",
            move |args| {
                let client = self.clone();
                async move {
                    let args: CityArgs = serde_json::from_value(args.into())?;
                    anyhow::Ok(client.current_weather(&args.city).await)
                }
            },
        )
        .param(
            Param::string("city")
                .required()
                .describe("The name of the city"),
        )
    }
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawConditions {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn capitalize_matches_sentence_case() {
        assert_eq!(capitalize("light RAIN"), "Light rain");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn flat_shape() {
        let conditions = Conditions::from_raw(raw(json!({
            "main": { "temp": 12.5, "humidity": 81 },
            "weather": [{ "description": "broken clouds" }]
        })))
        .unwrap();
        assert_eq!(conditions.temperature, 12.5);
        assert_eq!(conditions.description.as_deref(), Some("Broken clouds"));
        assert_eq!(conditions.humidity, Some(81.0));
    }

    #[test]
    fn nested_shape_wins() {
        let conditions = Conditions::from_raw(raw(json!({
            "current": { "temp": 30.0, "humidity": 40, "weather": [{ "description": "clear sky" }] },
            "main": { "temp": 1.0, "humidity": 99 }
        })))
        .unwrap();
        assert_eq!(conditions.temperature, 30.0);
        assert_eq!(conditions.description.as_deref(), Some("Clear sky"));
        assert_eq!(conditions.humidity, Some(40.0));
    }

    #[test]
    fn nested_shape_falls_back_to_top_level_description() {
        let conditions = Conditions::from_raw(raw(json!({
            "current": { "temp": 8.0, "humidity": 90 },
            "weather": [{ "description": "light drizzle" }]
        })))
        .unwrap();
        assert_eq!(conditions.temperature, 8.0);
        assert_eq!(conditions.description.as_deref(), Some("Light drizzle"));
        assert_eq!(conditions.humidity, Some(90.0));
    }

    #[test]
    fn missing_temperature_is_missing_data() {
        let err = Conditions::from_raw(raw(json!({ "main": { "humidity": 50 } }))).unwrap_err();
        assert!(matches!(err, WeatherError::MissingData));
        let err = Conditions::from_raw(raw(json!({ "name": "Paris" }))).unwrap_err();
        assert!(matches!(err, WeatherError::MissingData));
    }

    #[test]
    fn report_omits_absent_lines() {
        let conditions = Conditions {
            temperature: 21.0,
            description: None,
            humidity: None,
        };
        assert_eq!(conditions.report("Oslo"), "Weather in Oslo:\n- Temperature: 21°C");
    }
}
