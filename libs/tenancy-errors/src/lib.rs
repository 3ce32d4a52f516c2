#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Error surface shared by the tenancy crates.
//!
//! - [`Problem`]: RFC 9457 problem details, free of any HTTP framework
//! - [`catalog`]: static definitions for every error kind the data layer raises
//! - [`validation`]: explicit field validators run before writes

pub mod catalog;
pub mod problem;
pub mod validation;

pub use catalog::ErrDef;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem, ValidationViolation};
pub use validation::{Rule, Violations};
