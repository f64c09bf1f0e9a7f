//! Email triage: classify inbound emails as actionable or not with an LLM.

pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod pipeline;
pub mod web;
