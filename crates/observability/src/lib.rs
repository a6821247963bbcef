//! `edgemind-observability` — process-wide logging setup.
//!
//! One call from the binary's entry point wires up structured JSON logs for
//! every tier of the analysis engine.

pub mod tracing;

/// Initialize process-wide observability (tracing/logging).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}
