pub mod prompts;
mod service;

pub use service::AnalysisService;
