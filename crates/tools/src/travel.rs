//! Simulated travel advisory.
//!
//! Not backed by any risk data: the level is drawn at random on every call.

use rand::{Rng, seq::IndexedRandom};
use runtime::{Capability, Param};
use serde::Deserialize;

/// Advisory levels, least to most severe.
pub const LEVELS: [&str; 4] = [
    "Exercise normal precautions",
    "Exercise increased caution",
    "Reconsider travel",
    "Do not travel",
];

#[derive(Debug, Deserialize)]
struct Destination {
    city: String,
    country: String,
}

/// Build an advisory for a destination using the given source of randomness.
pub fn advisory_with(rng: &mut impl Rng, city: &str, country: &str) -> String {
    let level = LEVELS.choose(rng).unwrap_or(&LEVELS[0]);
    format!("Travel Advisory for {city}, {country}:\nRisk Level: {level}")
}

/// Build an advisory for a destination.
pub fn advisory(city: &str, country: &str) -> String {
    advisory_with(&mut rand::rng(), city, country)
}

/// The `get_travel_advisory` capability.
pub fn capability() -> Capability {
    Capability::new(
        "get_travel_advisory",
        "Get the travel advisory for a given city and country",
        |args| async move {
            let dest: Destination = serde_json::from_value(args.into())?;
            anyhow::Ok(advisory(&dest.city, &dest.country))
        },
    )
    .param(
        Param::string("city")
            .required()
            .describe("The name of the city"),
    )
    .param(
        Param::string("country")
            .required()
            .describe("The name of the country"),
    )
}
