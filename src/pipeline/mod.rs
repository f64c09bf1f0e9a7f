//! Email classification pipeline.
//!
//! Every email flows through:
//! 1. `prompt::build()` — fixed system instruction + delimited email
//! 2. `LlmProvider::complete()` — one low-temperature call
//! 3. `parser::parse()` — lenient extraction with a fixed fallback
//!
//! `classifier::Classifier` ties the steps together.

pub mod classifier;
pub mod parser;
pub mod prompt;
pub mod types;
