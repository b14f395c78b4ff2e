// ABOUTME: Library root for anthony-deploy - exposes the deployment pipeline for testing.
// ABOUTME: The main binary is in main.rs.

pub mod backup;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod logging;
pub mod output;
pub mod prereqs;
pub mod runner;
pub mod strategy;
pub mod types;
