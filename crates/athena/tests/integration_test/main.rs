//! Integration tests for scifi-athena crate.
//!
//! These tests verify the integration of all athena modules without requiring AWS credentials.
//! Tests marked with `#[ignore]` require AWS credentials and must be run explicitly.

mod query_step;
