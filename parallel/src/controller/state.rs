use crate::models::{AnalysisResult, ResponseMode, SafetyCheckResult, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    App,
    Profile,
    ParentingPlan,
    ChangeLog,
    About,
    ModeGuide,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::App => "Parallel",
            View::Profile => "Profile",
            View::ParentingPlan => "Parenting Plan",
            View::ChangeLog => "Schedule Change Log",
            View::About => "How It Works",
            View::ModeGuide => "Mode Guide",
        }
    }
}

/// Wizard step inside [`View::App`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Input,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Analyze an incoming message and draft a reply.
    #[default]
    Respond,
    /// Check the tone of the user's own draft.
    ToneCheck,
}

/// Which free-text context an imported document fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextTarget {
    Decree,
    ParentingPlan,
}

/// Everything the front end renders. Only the controller mutates it.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub view: View,
    pub step: Step,
    pub input_mode: InputMode,
    pub incoming_message: String,
    pub selected_mode: ResponseMode,
    pub analysis: Option<AnalysisResult>,
    pub safety_check: Option<SafetyCheckResult>,
    pub current_draft: String,
    pub error: Option<String>,
    pub user_profile: UserProfile,
    /// One-shot confirmation such as "Profile saved".
    pub notice: Option<String>,
    pub(crate) in_flight: bool,
    /// Bumped by reset so late completions are discarded.
    pub(crate) generation: u64,
}

impl AppState {
    pub fn is_analyzing(&self) -> bool {
        self.in_flight
    }

    pub fn can_submit(&self) -> bool {
        !self.in_flight && !self.incoming_message.trim().is_empty()
    }
}
