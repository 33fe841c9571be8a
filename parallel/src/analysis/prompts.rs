//! System instructions and response schemas for the three model calls.
//!
//! Templates use plain `format!()` interpolation so a missing variable is a
//! compile error.

use serde_json::json;

use crate::llm::ResponseSchema;
use crate::models::{Classification, RecommendedAction, ResponseMode};

pub const ANALYSIS_TEMPERATURE: f32 = 0.2;
pub const SAFETY_CHECK_TEMPERATURE: f32 = 0.1;

pub const EXTRACTION_INSTRUCTION: &str = "Extract the text from this document.";

const NO_DECREE: &str = "No specific decree details provided.";
const NO_PLAN: &str = "No specific schedule provided.";

/// System instruction for classifying an incoming message and drafting a reply.
///
/// # Example
/// ```
/// use parallel::analysis::prompts::analysis_system_prompt;
/// use parallel::models::ResponseMode;
///
/// let prompt = analysis_system_prompt(ResponseMode::CourtSafe, None, Some("Fridays at 5 PM"));
/// assert!(prompt.contains("CURRENT USER MODE: Court Safe"));
/// assert!(prompt.contains("Fridays at 5 PM"));
/// ```
pub fn analysis_system_prompt(
    mode: ResponseMode,
    decree_context: Option<&str>,
    plan_context: Option<&str>,
) -> String {
    let decree = decree_context
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(NO_DECREE);
    let plan = plan_context
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(NO_PLAN);
    let mode_lines = ResponseMode::ALL
        .iter()
        .map(|m| format!("- {}: {}", m.as_str(), m.instruction()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are 'Parallel', an AI assistant helping a high-conflict co-parent maintain boundaries using the 'Grey Rock' method.

YOUR GOAL:
1. Identify manipulation.
2. Restrict engagement to child-related logistics only.
3. Generate neutral, court-safe responses.

DEFINITIONS:
- CHILD_LOGISTICS: Pertains strictly to pick-up/drop-off, medical, school, or direct child needs.
- PERSONAL_BAIT: Attacks on character, past relationship issues, emotional dumping, non-child topics.
- MIXED: Contains both logistics and bait.

RESPONSE GUIDELINES (Grey Rock):
- Boring, factual, brief.
- No emotion, no defense, no JADE (Justify, Argue, Defend, Explain).
- Remove all salutations (like "Hi", "Dear") unless strictly necessary.
- Remove all pleasantries (like "Hope you are well").
- Focus ONLY on the logistical question asked.
- If the classification is PERSONAL_BAIT, the recommended action MUST be NO_RESPONSE.
- If the classification is MIXED, ignore the bait completely and only address the logistic.
- When acknowledging non-logistical emotional statements that require a brief "closure" without engagement, you can use the phrase "Your feelings have been noted."

CURRENT USER MODE: {mode}
{mode_lines}

USER CONTEXT:
1. DIVORCE DECREE / COURT ORDER (Legal Custody Rules):
{decree}

2. PARENTING PLAN (Schedule/Time):
{plan}

INSTRUCTION:
If the user provided court order or parenting plan details, ensure the draft response strictly adheres to them (e.g., adherence to exchange times, locations, holiday schedules). If the incoming message contradicts the documents, politely and neutrally reference them (e.g., "Per the parenting plan, my time begins at 5 PM on Friday")."#,
        mode = mode.as_str(),
    )
}

pub const SAFETY_CHECK_SYSTEM_PROMPT: &str = r#"You are a tone-check filter for 'Parallel', a high-conflict co-parenting app.
The input text is a draft written BY the user, intended to be sent TO their co-parent.

YOUR JOB:
1. Analyze the draft for emotional bait, defensiveness, or apologies.
2. Ensure it follows the "Grey Rock" method: Boring, factual, zero emotion.
3. REWRITE the draft if it is unsafe.

PERSPECTIVE GUIDELINES:
- The rewrite must be written FROM the user's perspective (e.g., use 'I' correctly, as in 'I will be there at 5').
- Maintain correct grammar and sentence structure for a direct message to a co-parent.

NEUTRAL REWRITE STRATEGIES:
- Use the phrase "Your feelings have been noted" to acknowledge emotional statements or complaints without defending or validating them.
- Remove all JADE (Justification, Argument, Defense, Explanation).
- Remove all emotional language, apologies ("I'm sorry"), and pleasantries.
- Keep it brief and strictly child-related."#;

pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a document assistant.
Your ONLY job is to extract all readable text from the provided document image or PDF.
Preserve the structure and formatting where possible (e.g. lists, times, headers).
Do not add any commentary or summary. Just output the extracted text."#;

pub fn analysis_schema() -> ResponseSchema {
    let classifications: Vec<&str> = Classification::ALL.iter().map(|c| c.as_str()).collect();
    let actions: Vec<&str> = RecommendedAction::ALL.iter().map(|a| a.as_str()).collect();

    ResponseSchema {
        name: "message_analysis",
        schema: json!({
            "type": "object",
            "properties": {
                "classification": {
                    "type": "string",
                    "enum": classifications,
                    "description": "Classify the incoming message based on content."
                },
                "manipulationTags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of manipulative tactics found (e.g., 'Guilt Bait', 'Urgency', 'Blame Shift', 'Topic Drift'). Empty if none."
                },
                "reasoning": {
                    "type": "string",
                    "description": "Brief, non-judgmental explanation of why this classification and action were chosen."
                },
                "recommendedAction": {
                    "type": "string",
                    "enum": actions,
                    "description": "The recommended course of action."
                },
                "draftResponse": {
                    "type": ["string", "null"],
                    "description": "A neutral, grey-rock response if action is RESPOND. Null if NO_RESPONSE."
                }
            },
            "required": ["classification", "manipulationTags", "reasoning", "recommendedAction"]
        }),
    }
}

pub fn safety_check_schema() -> ResponseSchema {
    ResponseSchema {
        name: "safety_check",
        schema: json!({
            "type": "object",
            "properties": {
                "isSafe": {
                    "type": "boolean",
                    "description": "True if the text is emotionally neutral and factual. False if it contains emotion, defense, or escalation."
                },
                "emotionalWords": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of words or phrases identified as emotional or defensive."
                },
                "neutralSuggestion": {
                    "type": "string",
                    "description": "A rewritten version of the text that is perfectly neutral and 'Grey Rock'."
                }
            },
            "required": ["isSafe", "emotionalWords", "neutralSuggestion"]
        }),
    }
}
