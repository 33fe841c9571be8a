use serde::{Deserialize, Serialize};

/// How the classifier sees an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    ChildLogistics,
    Mixed,
    PersonalBait,
    Unknown,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::ChildLogistics,
        Classification::Mixed,
        Classification::PersonalBait,
        Classification::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::ChildLogistics => "CHILD_LOGISTICS",
            Classification::Mixed => "MIXED",
            Classification::PersonalBait => "PERSONAL_BAIT",
            Classification::Unknown => "UNKNOWN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::ChildLogistics => "CHILD LOGISTICS",
            Classification::Mixed => "MIXED",
            Classification::PersonalBait => "PERSONAL BAIT",
            Classification::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    Respond,
    NoResponse,
    #[serde(rename = "WAIT_24_HOURS")]
    Wait24Hours,
}

impl RecommendedAction {
    pub const ALL: [RecommendedAction; 3] = [
        RecommendedAction::Respond,
        RecommendedAction::NoResponse,
        RecommendedAction::Wait24Hours,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::Respond => "RESPOND",
            RecommendedAction::NoResponse => "NO_RESPONSE",
            RecommendedAction::Wait24Hours => "WAIT_24_HOURS",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecommendedAction::Respond => "RESPOND",
            RecommendedAction::NoResponse => "NO RESPONSE",
            RecommendedAction::Wait24Hours => "WAIT 24 HOURS",
        }
    }
}

/// Tone profile for generated drafts. Only changes the instructions sent
/// upstream; nothing local branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResponseMode {
    #[default]
    #[serde(rename = "Logistics Only")]
    LogisticsOnly,
    #[serde(rename = "Schedule Only")]
    ScheduleOnly,
    #[serde(rename = "Court Safe")]
    CourtSafe,
    #[serde(rename = "Parallel Parenting")]
    ParallelParenting,
}

impl ResponseMode {
    pub const ALL: [ResponseMode; 4] = [
        ResponseMode::LogisticsOnly,
        ResponseMode::ScheduleOnly,
        ResponseMode::CourtSafe,
        ResponseMode::ParallelParenting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::LogisticsOnly => "Logistics Only",
            ResponseMode::ScheduleOnly => "Schedule Only",
            ResponseMode::CourtSafe => "Court Safe",
            ResponseMode::ParallelParenting => "Parallel Parenting",
        }
    }

    /// Accepts the wire value ("Court Safe") or a CLI-friendly slug ("court-safe").
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().to_lowercase() == normalized)
    }

    /// Line appended to the system instruction for this mode.
    pub fn instruction(&self) -> &'static str {
        match self {
            ResponseMode::LogisticsOnly => "Strip everything but data.",
            ResponseMode::ScheduleOnly => "Focus on dates/times.",
            ResponseMode::CourtSafe => {
                "Extremely formal, polite but distant. Use complete sentences."
            }
            ResponseMode::ParallelParenting => {
                "Minimal contact. Refer to the parenting plan/decree if applicable."
            }
        }
    }

    /// User-facing explanation shown in the mode guide.
    pub fn description(&self) -> &'static str {
        match self {
            ResponseMode::LogisticsOnly => {
                "Strips away all emotional fluff. Focuses strictly on the \"what, where, and when\" of child-related needs. Best for general daily communication."
            }
            ResponseMode::ScheduleOnly => {
                "Extremely restrictive. Limits the response to dates, times, and locations only. Use this when the other parent is attempting to engage in heavy baiting."
            }
            ResponseMode::CourtSafe => {
                "Formal and professional. Uses complete sentences and professional tone designed to be read by a judge or attorney. Higher transparency, zero reactive language."
            }
            ResponseMode::ParallelParenting => {
                "Minimal contact. Strictly adheres to and references the Parenting Plan or Decree. Avoids negotiation and relies on established court orders."
            }
        }
    }
}

impl std::fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured verdict for an incoming message.
///
/// `draft_response` is expected to be present iff the action is
/// [`RecommendedAction::Respond`]. That is the classifier's contract and is
/// not re-validated here; see [`AnalysisResult::contract_violations`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub classification: Classification,
    #[serde(default)]
    pub manipulation_tags: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    pub recommended_action: RecommendedAction,
    #[serde(default)]
    pub draft_response: Option<String>,
}

impl AnalysisResult {
    /// Remote-enforced rules this result breaks, for logging only.
    pub fn contract_violations(&self) -> Vec<&'static str> {
        let mut violations = Vec::new();

        if self.classification == Classification::PersonalBait
            && self.recommended_action != RecommendedAction::NoResponse
        {
            violations.push("PERSONAL_BAIT must recommend NO_RESPONSE");
        }

        let has_draft = self
            .draft_response
            .as_deref()
            .is_some_and(|draft| !draft.trim().is_empty());
        if self.recommended_action == RecommendedAction::Respond && !has_draft {
            violations.push("RESPOND without a draft response");
        }
        if self.recommended_action == RecommendedAction::NoResponse && has_draft {
            violations.push("NO_RESPONSE with a draft response");
        }

        violations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyCheckResult {
    pub is_safe: bool,
    #[serde(default)]
    pub emotional_words: Vec<String>,
    #[serde(default)]
    pub neutral_suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    #[serde(default)]
    pub text: String,
}

/// Wire body for `POST /api/analyze`.
///
/// Fields are optional so the handler can report missing ones with its own
/// message instead of a serde rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decree_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_context: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetyCheckRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractDocumentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}
