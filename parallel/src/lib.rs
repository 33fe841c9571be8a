//! Parallel: a Grey Rock communication assistant for high-conflict
//! co-parenting.
//!
//! The [`api`] module serves the analysis endpoints backed by an
//! OpenAI-compatible [`llm`] provider. The [`controller`] drives the
//! input/result workflow against those endpoints through an
//! [`gateway::AnalysisGateway`] and keeps the user's profile in a local
//! [`store`].

pub mod analysis;
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod models;
pub mod store;
