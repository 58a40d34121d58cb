//! Test support
//!
//! Fixture builders shared by the unit tests and end-to-end scenarios
//! against synthetic containers.
