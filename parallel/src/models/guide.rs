//! Static reference copy: explanations for common manipulation tags.

const HOOK_DEFINITIONS: &[(&str, &str)] = &[
    (
        "Guilt Bait",
        "Attempts to make you feel responsible for their emotional state or life circumstances. The goal is to induce an emotional reaction or force compliance through shame.",
    ),
    (
        "Character Attack",
        "Direct insults or subtle slights directed at your personality, parenting, or integrity. These are meant to provoke a defensive response, pulling you into an argument.",
    ),
    (
        "Topic Drift",
        "Bringing up past relationship issues or unrelated grievances during a logistical discussion. This distracts from the child-related matter and keeps you engaged in conflict.",
    ),
    (
        "Blame Shift",
        "Avoiding accountability by portraying you as the sole cause of conflict or logistical failures. It forces you into a defensive \"JADE\" posture (Justify, Argue, Defend, Explain).",
    ),
    (
        "Urgency",
        "Creating an artificial sense of crisis (\"I need an answer NOW\") to bypass your boundaries and force an emotional decision without proper thought.",
    ),
    (
        "Pressure",
        "Using repetitive messaging or threats of consequences to wear down your boundaries and force a specific outcome.",
    ),
    (
        "Manipulation",
        "Subtle psychological tactics designed to gain control or influence over your behavior or emotions, often using the children as leverage.",
    ),
    (
        "Passive Aggression",
        "Indirect expressions of hostility through sarcasm, backhanded compliments, or deliberate failure to follow agreed-upon logistics.",
    ),
    (
        "Gaslighting",
        "Denying facts or past events to make you question your memory or reality, undermining your confidence in your own boundaries.",
    ),
];

const GENERIC_HOOK_DEFINITION: &str = "This is a manipulative tactic designed to pull you away from logical co-parenting and into emotional engagement.";

pub const HOOK_HANDLING_ADVICE: &str = "Do not defend yourself against these statements. Address only the logistical question, or if there is no question, do not respond at all. This is the 'Grey Rock' method.";

/// Explanation for a tag. Tags are free-form, so lookup ignores case and
/// unknown tags get a generic explanation.
pub fn hook_definition(tag: &str) -> &'static str {
    let tag = tag.trim();
    HOOK_DEFINITIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(tag))
        .map(|(_, definition)| *definition)
        .unwrap_or(GENERIC_HOOK_DEFINITION)
}

pub fn known_hooks() -> impl Iterator<Item = &'static str> {
    HOOK_DEFINITIONS.iter().map(|(name, _)| *name)
}
