//! Application controller: owns [`AppState`] and moves it between the
//! `Input` and `Result` steps through named transitions.

mod state;
mod view;

pub use state::{AppState, ContextTarget, InputMode, Step, View};
pub use view::{DraftView, ResultAction, ResultView};

use crate::error::Result;
use crate::gateway::AnalysisGateway;
use crate::models::{
    AnalysisResult, LogEntry, NewLogEntry, ProfilePatch, ResponseMode, SafetyCheckResult,
};
use crate::store::{KeyValueStorage, ProfileStore};

const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

/// A request the controller has committed to issuing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Analyze {
        message: String,
        mode: ResponseMode,
        decree_context: Option<String>,
        plan_context: Option<String>,
    },
    /// Tone check of the user's own message from the input step.
    ToneCheck { draft: String },
    /// Re-check of the edited draft from the result step.
    DraftCheck { draft: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Analysis(AnalysisResult),
    SafetyCheck(SafetyCheckResult),
}

/// Pairs a [`Submission`] with the state generation it was issued in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub submission: Submission,
    generation: u64,
}

impl Submission {
    pub async fn run<G: AnalysisGateway + ?Sized>(&self, gateway: &G) -> Result<SubmissionOutcome> {
        match self {
            Submission::Analyze {
                message,
                mode,
                decree_context,
                plan_context,
            } => gateway
                .analyze(
                    message,
                    *mode,
                    decree_context.as_deref(),
                    plan_context.as_deref(),
                )
                .await
                .map(SubmissionOutcome::Analysis),
            Submission::ToneCheck { draft } | Submission::DraftCheck { draft } => gateway
                .check_safety(draft)
                .await
                .map(SubmissionOutcome::SafetyCheck),
        }
    }
}

pub struct AppController<G, S> {
    gateway: G,
    store: ProfileStore<S>,
    state: AppState,
}

impl<G: AnalysisGateway, S: KeyValueStorage> AppController<G, S> {
    /// Starts on the input step with the persisted profile loaded.
    pub fn new(gateway: G, store: ProfileStore<S>) -> Self {
        let state = AppState {
            user_profile: store.load(),
            ..Default::default()
        };
        Self {
            gateway,
            store,
            state,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn store(&self) -> &ProfileStore<S> {
        &self.store
    }

    pub fn result_view(&self) -> Option<ResultView<'_>> {
        ResultView::from_state(&self.state)
    }

    pub fn navigate(&mut self, view: View) {
        self.state.view = view;
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.state.input_mode = mode;
    }

    pub fn set_incoming_message(&mut self, message: impl Into<String>) {
        self.state.incoming_message = message.into();
    }

    pub fn clear_incoming_message(&mut self) {
        self.state.incoming_message.clear();
    }

    pub fn select_mode(&mut self, mode: ResponseMode) {
        self.state.selected_mode = mode;
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.state.notice.take()
    }

    /// Commits to a request from the input step.
    ///
    /// Returns `None`, issuing nothing, when the message is blank or another
    /// request is still in flight.
    pub fn begin_submit(&mut self) -> Option<Ticket> {
        if !self.state.can_submit() {
            return None;
        }

        let submission = match self.state.input_mode {
            InputMode::Respond => Submission::Analyze {
                message: self.state.incoming_message.clone(),
                mode: self.state.selected_mode,
                decree_context: self.state.user_profile.decree_context().map(str::to_string),
                plan_context: self
                    .state
                    .user_profile
                    .parenting_plan_context()
                    .map(str::to_string),
            },
            InputMode::ToneCheck => Submission::ToneCheck {
                draft: self.state.incoming_message.clone(),
            },
        };

        self.state.error = None;
        self.state.analysis = None;
        self.state.safety_check = None;
        Some(self.issue(submission))
    }

    /// Commits to re-checking the current draft from the result step.
    pub fn begin_draft_check(&mut self) -> Option<Ticket> {
        if self.state.in_flight
            || self.state.step != Step::Result
            || self.state.current_draft.trim().is_empty()
        {
            return None;
        }

        self.state.error = None;
        let submission = Submission::DraftCheck {
            draft: self.state.current_draft.clone(),
        };
        Some(self.issue(submission))
    }

    fn issue(&mut self, submission: Submission) -> Ticket {
        self.state.in_flight = true;
        Ticket {
            submission,
            generation: self.state.generation,
        }
    }

    /// Applies the outcome of `ticket`. Outcomes from before a reset are dropped.
    pub fn complete_submit(&mut self, ticket: Ticket, outcome: Result<SubmissionOutcome>) {
        self.state.in_flight = false;

        if ticket.generation != self.state.generation {
            tracing::debug!("Discarding result for an abandoned submission");
            return;
        }

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = e.to_string();
                self.state.error = Some(if message.trim().is_empty() {
                    UNEXPECTED_ERROR.to_string()
                } else {
                    message
                });
                return;
            }
        };

        match (ticket.submission, outcome) {
            (Submission::Analyze { .. }, SubmissionOutcome::Analysis(result)) => {
                for violation in result.contract_violations() {
                    tracing::warn!(violation, "Analysis result breaks the classifier contract");
                }
                self.state.current_draft = result.draft_response.clone().unwrap_or_default();
                self.state.analysis = Some(result);
                self.state.step = Step::Result;
            }
            (Submission::ToneCheck { draft }, SubmissionOutcome::SafetyCheck(result)) => {
                self.state.current_draft = draft;
                self.state.safety_check = Some(result);
                self.state.step = Step::Result;
            }
            (Submission::DraftCheck { draft }, SubmissionOutcome::SafetyCheck(result)) => {
                // The draft may have been edited while the check was running.
                if draft == self.state.current_draft {
                    self.state.safety_check = Some(result);
                }
            }
            (submission, _) => {
                tracing::error!(?submission, "Outcome does not match submission");
                self.state.error = Some(UNEXPECTED_ERROR.to_string());
            }
        }
    }

    /// Runs the input step's request to completion. Returns whether a request
    /// was issued.
    pub async fn submit(&mut self) -> bool {
        let Some(ticket) = self.begin_submit() else {
            return false;
        };
        let outcome = ticket.submission.run(&self.gateway).await;
        self.complete_submit(ticket, outcome);
        true
    }

    /// Tone-checks the current draft from the result step.
    pub async fn check_draft(&mut self) -> bool {
        let Some(ticket) = self.begin_draft_check() else {
            return false;
        };
        let outcome = ticket.submission.run(&self.gateway).await;
        self.complete_submit(ticket, outcome);
        true
    }

    /// Replaces the draft and discards the now stale tone check.
    pub fn edit_draft(&mut self, text: impl Into<String>) {
        self.state.current_draft = text.into();
        self.state.safety_check = None;
    }

    /// Swaps in the tone check's neutral rewrite. Returns whether it applied.
    pub fn apply_neutral_rewrite(&mut self) -> bool {
        let Some(suggestion) = self
            .state
            .safety_check
            .as_ref()
            .map(|check| check.neutral_suggestion.clone())
            .filter(|s| !s.trim().is_empty())
        else {
            return false;
        };
        self.edit_draft(suggestion);
        true
    }

    /// Back to the input step. An in-flight request keeps running but its
    /// result will be ignored.
    pub fn reset(&mut self) {
        self.state.step = Step::Input;
        self.state.incoming_message.clear();
        self.state.analysis = None;
        self.state.safety_check = None;
        self.state.current_draft.clear();
        self.state.error = None;
        self.state.generation += 1;
    }

    /// Unsaved edit; call [`save_profile`](Self::save_profile) to persist.
    pub fn update_profile(&mut self, patch: ProfilePatch) {
        self.state.user_profile.apply(patch);
    }

    pub fn save_profile(&mut self) -> Result<()> {
        self.store.save(&self.state.user_profile)?;
        let notice = match self.state.view {
            View::ParentingPlan => "Parenting plan saved",
            _ => "Profile saved",
        };
        self.state.notice = Some(notice.to_string());
        Ok(())
    }

    pub fn add_log_entry(&mut self, draft: NewLogEntry) -> Result<LogEntry> {
        let entry = draft.into_entry()?;
        self.store.append_log(entry.clone())?;
        self.state.user_profile.logs.insert(0, entry.clone());
        self.state.notice = Some("Schedule change logged".to_string());
        Ok(entry)
    }

    pub fn delete_log_entry(&mut self, id: &str) -> Result<()> {
        self.store.delete_log(id)?;
        self.state.user_profile.logs.retain(|entry| entry.id != id);
        Ok(())
    }

    /// Extracts a document's text into the chosen context field (unsaved).
    pub async fn import_document(
        &mut self,
        base64_data: &str,
        mime_type: &str,
        target: ContextTarget,
    ) -> Result<String> {
        let text = self
            .gateway
            .extract_document_text(base64_data, mime_type)
            .await?;

        let patch = match target {
            ContextTarget::Decree => ProfilePatch {
                decree_context: Some(text.clone()),
                ..Default::default()
            },
            ContextTarget::ParentingPlan => ProfilePatch {
                parenting_plan_context: Some(text.clone()),
                ..Default::default()
            },
        };
        self.update_profile(patch);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParallelError;
    use crate::models::{Classification, RecommendedAction, Requestor};
    use crate::store::MemoryStorage;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct StubGateway {
        analysis: Option<AnalysisResult>,
        safety: Option<SafetyCheckResult>,
        extracted: String,
        fail_with: Option<String>,
        calls: AtomicUsize,
        last_analyze: Mutex<Option<(String, ResponseMode, Option<String>, Option<String>)>>,
    }

    impl StubGateway {
        fn failure(&self) -> Option<ParallelError> {
            self.fail_with.clone().map(ParallelError::Request)
        }
    }

    #[async_trait]
    impl AnalysisGateway for StubGateway {
        async fn analyze(
            &self,
            message: &str,
            mode: ResponseMode,
            decree_context: Option<&str>,
            plan_context: Option<&str>,
        ) -> Result<AnalysisResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_analyze.lock().unwrap() = Some((
                message.to_string(),
                mode,
                decree_context.map(str::to_string),
                plan_context.map(str::to_string),
            ));
            if let Some(e) = self.failure() {
                return Err(e);
            }
            Ok(self.analysis.clone().expect("analysis stubbed"))
        }

        async fn check_safety(&self, _draft: &str) -> Result<SafetyCheckResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(e) = self.failure() {
                return Err(e);
            }
            Ok(self.safety.clone().expect("safety stubbed"))
        }

        async fn extract_document_text(&self, _data: &str, _mime: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.extracted.clone())
        }
    }

    fn logistics_result() -> AnalysisResult {
        AnalysisResult {
            classification: Classification::ChildLogistics,
            manipulation_tags: vec![],
            reasoning: "Pickup time request.".to_string(),
            recommended_action: RecommendedAction::Respond,
            draft_response: Some("Pick up at 6pm confirmed.".to_string()),
        }
    }

    fn bait_result() -> AnalysisResult {
        AnalysisResult {
            classification: Classification::PersonalBait,
            manipulation_tags: vec!["Character Attack".to_string()],
            reasoning: "Insult with no logistics.".to_string(),
            recommended_action: RecommendedAction::NoResponse,
            draft_response: None,
        }
    }

    fn unsafe_check() -> SafetyCheckResult {
        SafetyCheckResult {
            is_safe: false,
            emotional_words: vec!["ridiculous".to_string()],
            neutral_suggestion: "I will be there at 5.".to_string(),
        }
    }

    fn controller(gateway: StubGateway) -> AppController<StubGateway, Arc<MemoryStorage>> {
        AppController::new(gateway, ProfileStore::new(Arc::new(MemoryStorage::new())))
    }

    #[tokio::test]
    async fn logistics_message_advances_to_result_with_draft() {
        let mut c = controller(StubGateway {
            analysis: Some(logistics_result()),
            ..Default::default()
        });
        c.set_incoming_message("Please pick up Emma at 6pm");
        c.select_mode(ResponseMode::LogisticsOnly);

        assert!(c.submit().await);

        let state = c.state();
        assert_eq!(state.step, Step::Result);
        assert_eq!(state.current_draft, "Pick up at 6pm confirmed.");
        assert!(state.error.is_none());
        assert!(!state.is_analyzing());

        let view = c.result_view().unwrap();
        assert!(!view.no_response);
        assert_eq!(view.draft.unwrap().text, "Pick up at 6pm confirmed.");
        assert_eq!(
            view.actions,
            vec![ResultAction::Reset, ResultAction::CopyDraft]
        );
    }

    #[tokio::test]
    async fn bait_shows_no_draft_box_and_only_reset() {
        let mut c = controller(StubGateway {
            analysis: Some(bait_result()),
            ..Default::default()
        });
        c.set_incoming_message("You were always a terrible parent.");

        assert!(c.submit().await);

        let view = c.result_view().unwrap();
        assert!(view.no_response);
        assert!(view.draft.is_none());
        assert_eq!(view.actions, vec![ResultAction::Reset]);
        assert_eq!(
            view.analysis.unwrap().classification,
            Classification::PersonalBait
        );
    }

    #[tokio::test]
    async fn blank_message_issues_nothing() {
        let mut c = controller(StubGateway::default());
        c.set_incoming_message("   ");

        assert!(!c.submit().await);
        assert_eq!(c.gateway().calls.load(Ordering::SeqCst), 0);
        assert_eq!(c.state().step, Step::Input);
    }

    #[tokio::test]
    async fn second_submission_while_pending_is_not_issued() {
        let mut c = controller(StubGateway {
            analysis: Some(logistics_result()),
            ..Default::default()
        });
        c.set_incoming_message("Please pick up Emma at 6pm");

        let ticket = c.begin_submit().expect("first submission issued");
        assert!(c.state().is_analyzing());
        assert!(c.begin_submit().is_none());
        assert!(!c.submit().await);
        assert_eq!(c.gateway().calls.load(Ordering::SeqCst), 0);

        let outcome = ticket.submission.run(c.gateway()).await;
        c.complete_submit(ticket, outcome);

        assert_eq!(c.gateway().calls.load(Ordering::SeqCst), 1);
        assert_eq!(c.state().step, Step::Result);
    }

    #[tokio::test]
    async fn failure_stays_on_input_with_message() {
        let mut c = controller(StubGateway {
            fail_with: Some("Failed to analyze message. Please try again.".to_string()),
            ..Default::default()
        });
        c.set_incoming_message("Pickup?");

        assert!(c.submit().await);

        let state = c.state();
        assert_eq!(state.step, Step::Input);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to analyze message. Please try again.")
        );
        assert!(state.analysis.is_none());
        assert!(c.result_view().is_none());
        assert!(!state.is_analyzing());
    }

    #[tokio::test]
    async fn contexts_are_passed_through() {
        let mut c = controller(StubGateway {
            analysis: Some(logistics_result()),
            ..Default::default()
        });
        c.update_profile(ProfilePatch {
            parenting_plan_context: Some("Fridays at 5 PM".to_string()),
            ..Default::default()
        });
        c.select_mode(ResponseMode::ParallelParenting);
        c.set_incoming_message("Can I have the kids Friday?");

        c.submit().await;

        let (message, mode, decree, plan) =
            c.gateway().last_analyze.lock().unwrap().clone().unwrap();
        assert_eq!(message, "Can I have the kids Friday?");
        assert_eq!(mode, ResponseMode::ParallelParenting);
        assert_eq!(decree, None);
        assert_eq!(plan.as_deref(), Some("Fridays at 5 PM"));
    }

    #[tokio::test]
    async fn tone_check_keeps_users_text_as_draft() {
        let mut c = controller(StubGateway {
            safety: Some(unsafe_check()),
            ..Default::default()
        });
        c.set_input_mode(InputMode::ToneCheck);
        c.set_incoming_message("This is ridiculous, I'll be there at 5.");

        assert!(c.submit().await);

        let state = c.state();
        assert_eq!(state.step, Step::Result);
        assert_eq!(state.current_draft, "This is ridiculous, I'll be there at 5.");
        assert!(state.analysis.is_none());

        let view = c.result_view().unwrap();
        let draft = view.draft.unwrap();
        assert_eq!(draft.heading, "Refined Message");
        assert_eq!(draft.flagged.unwrap(), ["ridiculous".to_string()]);
        assert!(view.actions.contains(&ResultAction::ApplyNeutralRewrite));
    }

    #[tokio::test]
    async fn editing_draft_invalidates_safety_check() {
        let mut c = controller(StubGateway {
            safety: Some(unsafe_check()),
            ..Default::default()
        });
        c.set_input_mode(InputMode::ToneCheck);
        c.set_incoming_message("This is ridiculous.");
        c.submit().await;

        c.edit_draft("See you at 5.");

        assert!(c.state().safety_check.is_none());
        assert!(!c.apply_neutral_rewrite());
        assert_eq!(c.state().current_draft, "See you at 5.");
    }

    #[tokio::test]
    async fn apply_rewrite_replaces_draft() {
        let mut c = controller(StubGateway {
            safety: Some(unsafe_check()),
            ..Default::default()
        });
        c.set_input_mode(InputMode::ToneCheck);
        c.set_incoming_message("This is ridiculous.");
        c.submit().await;

        assert!(c.apply_neutral_rewrite());
        assert_eq!(c.state().current_draft, "I will be there at 5.");
        assert!(c.state().safety_check.is_none());
    }

    #[tokio::test]
    async fn draft_check_from_result_step() {
        let mut c = controller(StubGateway {
            analysis: Some(logistics_result()),
            safety: Some(unsafe_check()),
            ..Default::default()
        });
        c.set_incoming_message("Please pick up Emma at 6pm");
        c.submit().await;
        c.edit_draft("Fine, whatever, 6pm.");

        assert!(c.check_draft().await);

        assert_eq!(c.state().step, Step::Result);
        assert_eq!(c.state().safety_check, Some(unsafe_check()));
        assert!(c.state().analysis.is_some());
    }

    #[tokio::test]
    async fn draft_check_outside_result_is_refused() {
        let mut c = controller(StubGateway::default());
        assert!(!c.check_draft().await);
        assert_eq!(c.gateway().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reset_clears_transient_state() {
        let mut c = controller(StubGateway {
            analysis: Some(logistics_result()),
            ..Default::default()
        });
        c.set_incoming_message("Please pick up Emma at 6pm");
        c.submit().await;

        c.reset();

        let state = c.state();
        assert_eq!(state.step, Step::Input);
        assert!(state.incoming_message.is_empty());
        assert!(state.analysis.is_none());
        assert!(state.current_draft.is_empty());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn result_after_reset_is_discarded() {
        let mut c = controller(StubGateway {
            analysis: Some(logistics_result()),
            ..Default::default()
        });
        c.set_incoming_message("Please pick up Emma at 6pm");

        let ticket = c.begin_submit().unwrap();
        c.reset();
        let outcome = ticket.submission.run(c.gateway()).await;
        c.complete_submit(ticket, outcome);

        assert_eq!(c.state().step, Step::Input);
        assert!(c.state().analysis.is_none());
        assert!(!c.state().is_analyzing());
    }

    #[test]
    fn add_log_entry_prepends_and_persists() {
        let mut c = controller(StubGateway::default());
        let before = c.state().user_profile.logs.len();

        let entry = c
            .add_log_entry(NewLogEntry {
                date: NaiveDate::from_ymd_opt(2024, 1, 1),
                requestor: Requestor::CoParent,
                reason: "Work conflict".to_string(),
                notes: String::new(),
            })
            .unwrap();

        let logs = &c.state().user_profile.logs;
        assert_eq!(logs.len(), before + 1);
        assert_eq!(logs[0], entry);
        assert_eq!(c.store().list_logs()[0], entry);
        assert_eq!(c.take_notice().as_deref(), Some("Schedule change logged"));
    }

    #[test]
    fn invalid_log_entry_changes_nothing() {
        let mut c = controller(StubGateway::default());

        let result = c.add_log_entry(NewLogEntry {
            reason: " ".to_string(),
            ..Default::default()
        });

        assert!(result.is_err());
        assert!(c.state().user_profile.logs.is_empty());
        assert!(c.store().list_logs().is_empty());
    }

    #[test]
    fn delete_log_entry_updates_state_and_store() {
        let mut c = controller(StubGateway::default());
        let entry = c
            .add_log_entry(NewLogEntry {
                reason: "Holiday swap".to_string(),
                ..Default::default()
            })
            .unwrap();

        c.delete_log_entry(&entry.id).unwrap();
        c.delete_log_entry("missing").unwrap();

        assert!(c.state().user_profile.logs.is_empty());
        assert!(c.store().list_logs().is_empty());
    }

    #[test]
    fn save_profile_persists_and_notices_by_view() {
        let mut c = controller(StubGateway::default());
        c.update_profile(ProfilePatch {
            name: Some("Sam".to_string()),
            ..Default::default()
        });
        c.save_profile().unwrap();
        assert_eq!(c.take_notice().as_deref(), Some("Profile saved"));
        assert_eq!(c.store().load().name, "Sam");

        c.navigate(View::ParentingPlan);
        c.save_profile().unwrap();
        assert_eq!(c.take_notice().as_deref(), Some("Parenting plan saved"));
    }

    #[test]
    fn controller_loads_persisted_profile() {
        let storage = Arc::new(MemoryStorage::new());
        let store = ProfileStore::new(storage.clone());
        store
            .save(&crate::models::UserProfile {
                co_parent_name: "Alex".to_string(),
                ..Default::default()
            })
            .unwrap();

        let c = AppController::new(StubGateway::default(), ProfileStore::new(storage));
        assert_eq!(c.state().user_profile.co_parent_name, "Alex");
    }

    #[tokio::test]
    async fn import_document_fills_context_without_saving() {
        let mut c = controller(StubGateway {
            extracted: "Exchanges Fridays at 5 PM".to_string(),
            ..Default::default()
        });

        let text = c
            .import_document("aGVsbG8=", "image/png", ContextTarget::ParentingPlan)
            .await
            .unwrap();

        assert_eq!(text, "Exchanges Fridays at 5 PM");
        assert_eq!(
            c.state().user_profile.parenting_plan_context,
            "Exchanges Fridays at 5 PM"
        );
        assert!(c.store().load().parenting_plan_context.is_empty());
    }
}
