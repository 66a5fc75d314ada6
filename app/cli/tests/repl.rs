//! Tests for the REPL helpers and capability packs.

use concierge::{Config, Pack, is_exit_phrase, registry};

#[test]
fn exit_phrases_ignore_case_and_whitespace() {
    for line in ["exit", "QUIT", "  Bye ", "\tbye\n"] {
        assert!(is_exit_phrase(line), "{line:?} should exit");
    }
}

#[test]
fn other_lines_do_not_exit() {
    for line in ["", "goodbye", "exit now", "please quit"] {
        assert!(!is_exit_phrase(line), "{line:?} should not exit");
    }
}

#[test]
fn all_packs_register_every_capability() {
    let registry = registry(&Config::default()).unwrap();
    let names: Vec<_> = registry.names().collect();
    assert_eq!(
        names,
        [
            "cancel_investment",
            "get_current_weather",
            "get_travel_advisory",
            "process_investment",
            "process_transaction",
        ]
    );
}

#[test]
fn weather_only_pack() {
    let config = Config {
        capabilities: vec![Pack::Weather],
        ..Config::default()
    };
    let registry = registry(&config).unwrap();
    assert_eq!(registry.names().collect::<Vec<_>>(), ["get_current_weather"]);
}

#[test]
fn repeated_pack_is_rejected() {
    let config = Config {
        capabilities: vec![Pack::Travel, Pack::Travel],
        ..Config::default()
    };
    assert!(registry(&config).is_err());
}
