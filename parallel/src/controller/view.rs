use crate::models::{AnalysisResult, RecommendedAction};

use super::state::{AppState, InputMode, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultAction {
    Reset,
    CopyDraft,
    ApplyNeutralRewrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftView<'a> {
    pub heading: &'static str,
    pub text: &'a str,
    /// Phrases the last tone check flagged, when it judged the draft unsafe.
    pub flagged: Option<&'a [String]>,
}

/// What the result step shows, derived from [`AppState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView<'a> {
    pub analysis: Option<&'a AnalysisResult>,
    pub no_response: bool,
    /// `None` when no reply is recommended.
    pub draft: Option<DraftView<'a>>,
    pub actions: Vec<ResultAction>,
}

impl<'a> ResultView<'a> {
    /// `None` outside the result step.
    pub fn from_state(state: &'a AppState) -> Option<Self> {
        if state.step != Step::Result {
            return None;
        }

        let respond_mode = state.input_mode == InputMode::Respond;
        let analysis = state.analysis.as_ref().filter(|_| respond_mode);
        let no_response = analysis
            .is_some_and(|a| a.recommended_action == RecommendedAction::NoResponse);

        let flagged = state
            .safety_check
            .as_ref()
            .filter(|check| !check.is_safe)
            .map(|check| check.emotional_words.as_slice());

        let draft = (!no_response).then(|| DraftView {
            heading: if respond_mode {
                "Recommended Neutral Draft"
            } else {
                "Refined Message"
            },
            text: state.current_draft.as_str(),
            flagged,
        });

        let mut actions = vec![ResultAction::Reset];
        if !no_response {
            actions.push(ResultAction::CopyDraft);
            if flagged.is_some() {
                actions.push(ResultAction::ApplyNeutralRewrite);
            }
        }

        Some(Self {
            analysis,
            no_response,
            draft,
            actions,
        })
    }
}
