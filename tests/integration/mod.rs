//! Integration tests for dmanifest

mod config_integration;
mod diff_scenarios;
mod sync_engine;
