//! Tests for CLI argument parsing.

use clap::Parser;
use concierge::Cli;

#[test]
fn cli_parse_no_arguments() {
    assert!(Cli::try_parse_from(["concierge"]).is_ok());
}

#[test]
fn cli_rejects_unknown_flags() {
    assert!(Cli::try_parse_from(["concierge", "--model", "gpt-4"]).is_err());
}

#[test]
fn cli_version_flag() {
    let err = Cli::try_parse_from(["concierge", "--version"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
}
