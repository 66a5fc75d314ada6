//! Statistical tests for the simulated transaction and travel advisory.

use concierge_tools::{process_transaction, process_transaction_with, travel};
use rand::{SeedableRng, rngs::StdRng};

#[test]
fn success_rate_tracks_probability() {
    let mut rng = StdRng::seed_from_u64(7);
    let draws = 10_000;
    let successes = (0..draws)
        .filter(|_| process_transaction_with(&mut rng, 0.8))
        .count();
    let rate = successes as f64 / draws as f64;
    assert!((rate - 0.8).abs() < 0.02, "observed rate {rate}");
}

#[test]
fn degenerate_probabilities() {
    assert!((0..100).all(|_| process_transaction(1.0)));
    assert!((0..100).all(|_| !process_transaction(0.0)));
}

#[test]
fn advisory_uses_a_known_level() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let advisory = travel::advisory_with(&mut rng, "Lima", "Peru");
        let (head, level) = advisory
            .split_once("\nRisk Level: ")
            .expect("risk level line");
        assert_eq!(head, "Travel Advisory for Lima, Peru:");
        assert!(travel::LEVELS.contains(&level), "unexpected level {level}");
    }
}

#[test]
fn advisory_requires_city_and_country() {
    let capability = travel::capability();
    assert_eq!(capability.name, "get_travel_advisory");
    let required: Vec<_> = capability
        .params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(required, ["city", "country"]);
}
