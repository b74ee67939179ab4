//! Operational risk intelligence: signal engineering, population risk state,
//! prioritization and a fixed sequence of rule-based evaluators that end in a
//! single business decision.

pub mod action_agent;
pub mod agent;
pub mod config;
pub mod data_source;
pub mod data_validation_agent;
pub mod domain_agent;
pub mod engine;
pub mod error;
pub mod evaluation_agent;
pub mod explainer;
pub mod features;
pub mod feedback;
pub mod prioritization;
pub mod query;
pub mod risk_state;
pub mod rng;
pub mod scoring;
pub mod signals;
pub mod store;
pub mod strategy_agent;
pub mod synthesis_agent;
pub mod synthetic;
pub mod types;
