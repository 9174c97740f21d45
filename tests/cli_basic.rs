//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, and each subcommand
//! responds to `--help` with appropriate text. Nothing here touches the
//! network.

#![allow(deprecated)] // cargo_bin deprecation — replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `radiograb` binary.
fn radiograb() -> Command {
    Command::cargo_bin("radiograb").expect("binary 'radiograb' should be built")
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    radiograb()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: radiograb"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("record"));
}

#[test]
fn short_help_flag_shows_usage() {
    radiograb()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: radiograb"));
}

#[test]
fn version_flag_shows_semver() {
    radiograb()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^radiograb \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    radiograb()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: radiograb"));
}

#[test]
fn invalid_subcommand_fails() {
    radiograb()
        .arg("this-is-not-a-real-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn resolve_help() {
    radiograb()
        .args(["resolve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolve a station or episode URL"))
        .stdout(predicate::str::contains("<URL>"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn record_help() {
    radiograb()
        .args(["record", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Record a resolved stream"))
        .stdout(predicate::str::contains("<URL>"))
        .stdout(predicate::str::contains("--output"));
}

// ─── Subcommand argument validation ──────────────────────────────────────────

#[test]
fn resolve_missing_url_fails() {
    radiograb()
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<URL>"));
}

#[test]
fn record_missing_args_fails() {
    radiograb()
        .arg("record")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<URL>"));
}

#[test]
fn record_missing_output_fails() {
    radiograb()
        .args(["record", "https://fmplapla.com/fmnishitokyo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

// ─── Unsupported URLs ────────────────────────────────────────────────────────

#[test]
fn resolve_unsupported_url_reports_no_extractor() {
    radiograb()
        .args(["resolve", "https://example.com/not-a-radio"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no extractor matches URL"));
}
