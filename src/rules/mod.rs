//! Rule-Based Detector
//!
//! Named threshold rules evaluated against a fitted baseline. Thresholds
//! live in an injected `RuleSet` configuration object, so deployments tune
//! them without touching shared globals.
//!
//! ## Structure
//! - `config`: per-rule thresholds, severity tables, default values
//! - `engine`: batch and single-record evaluation

pub mod config;
pub mod engine;

pub use config::{RuleKind, RuleSet, SeverityTable};
pub use engine::RulesDetector;
