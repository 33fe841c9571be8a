use std::sync::Arc;

use crate::analysis::AnalysisService;
use crate::config::Config;
use crate::llm::LlmProvider;

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
    pub analysis: AnalysisService,
}

impl ApiState {
    pub fn new(config: Config, llm: LlmProvider) -> Self {
        Self {
            config: Arc::new(config),
            analysis: AnalysisService::new(llm),
        }
    }
}
