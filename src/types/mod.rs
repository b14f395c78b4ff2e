// ABOUTME: Validated domain types.
// ABOUTME: Currently the closed set of deployment environments.

mod environment;

pub use environment::Environment;
