//! Command-line definitions and terminal rendering.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use parallel::controller::{ContextTarget, ResultAction, ResultView, View};
use parallel::models::{
    hook_definition, known_hooks, LogEntry, ResponseMode, UserProfile, HOOK_HANDLING_ADVICE,
};

/// Parallel - neutral replies for high-conflict co-parenting messages.
#[derive(Parser, Debug)]
#[command(name = "parallel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Analysis server to talk to
    #[arg(long, global = true, env = "PARALLEL_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding the local profile
    #[arg(long, global = true, env = "PARALLEL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the analysis HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },

    /// Classify an incoming message and draft a neutral reply
    Analyze {
        /// The message you received
        message: String,
        /// Response mode (logistics-only, schedule-only, court-safe, parallel-parenting)
        #[arg(short, long, default_value = "logistics-only", value_parser = parse_mode)]
        mode: ResponseMode,
    },

    /// Check the tone of a message you want to send
    ToneCheck {
        draft: String,
        /// Print the neutral rewrite instead of the original when it was flagged
        #[arg(long)]
        apply: bool,
    },

    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Schedule change log
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },

    /// Import a decree or parenting plan from a PDF or image
    Extract {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = TargetArg::Plan)]
        target: TargetArg,
    },

    /// Explain manipulation hooks
    Hooks {
        /// A single tag to explain
        tag: Option<String>,
    },

    /// Describe the response modes
    Modes,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    Show,
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        co_parent_name: Option<String>,
        #[arg(long)]
        children_names: Option<String>,
        #[arg(long)]
        decree: Option<String>,
        #[arg(long)]
        plan: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    Add {
        /// Why the schedule changed
        reason: String,
        /// Date of the change (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Who asked for it (me, co-parent, other)
        #[arg(long, default_value = "co-parent")]
        requestor: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    List,
    Delete {
        id: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArg {
    Decree,
    Plan,
}

impl From<TargetArg> for ContextTarget {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Decree => ContextTarget::Decree,
            TargetArg::Plan => ContextTarget::ParentingPlan,
        }
    }
}

fn parse_mode(value: &str) -> Result<ResponseMode, String> {
    ResponseMode::parse(value).ok_or_else(|| {
        let known: Vec<_> = ResponseMode::ALL.iter().map(|m| m.as_str()).collect();
        format!("unknown mode '{value}', expected one of: {}", known.join(", "))
    })
}

pub fn render_result(view: &ResultView<'_>) -> String {
    let mut out = String::new();

    if let Some(analysis) = view.analysis {
        let _ = writeln!(out, "Classification: {}", analysis.classification.label());
        let _ = writeln!(out, "Action:         {}", analysis.recommended_action.label());
        if !analysis.reasoning.is_empty() {
            let _ = writeln!(out, "Reasoning:      {}", analysis.reasoning);
        }
        if !analysis.manipulation_tags.is_empty() {
            let _ = writeln!(out, "\nHooks detected:");
            for tag in &analysis.manipulation_tags {
                let _ = writeln!(out, "  - {tag}: {}", hook_definition(tag));
            }
        }
    }

    if view.no_response {
        let _ = writeln!(out, "\nNo response recommended.");
        let _ = writeln!(
            out,
            "This message contains no child logistics. Replying only invites more conflict."
        );
    }

    if let Some(draft) = &view.draft {
        let _ = writeln!(out, "\n{}:", draft.heading);
        let _ = writeln!(out, "{}", draft.text);
        if let Some(flagged) = draft.flagged {
            let _ = writeln!(out, "\nEmotional language: {}", flagged.join(", "));
        }
    }

    if view.actions.contains(&ResultAction::ApplyNeutralRewrite) {
        let _ = writeln!(out, "\nRe-run with --apply to use the neutral rewrite.");
    }

    out
}

pub fn render_profile(profile: &UserProfile) -> String {
    fn field(value: &str) -> &str {
        if value.trim().is_empty() {
            "-"
        } else {
            value
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}\n", View::Profile.title());
    let _ = writeln!(out, "Name:           {}", field(&profile.name));
    let _ = writeln!(out, "Email:          {}", field(&profile.email));
    let _ = writeln!(out, "Co-parent:      {}", field(&profile.co_parent_name));
    let _ = writeln!(out, "Children:       {}", field(&profile.children_names));
    let _ = writeln!(
        out,
        "Decree:         {} chars",
        profile.decree_context.trim().len()
    );
    let _ = writeln!(
        out,
        "Parenting plan: {} chars",
        profile.parenting_plan_context.trim().len()
    );
    let _ = writeln!(out, "Logged changes: {}", profile.logs.len());
    out
}

pub fn render_logs(logs: &[LogEntry]) -> String {
    if logs.is_empty() {
        return "No schedule changes logged.\n".to_string();
    }

    let mut out = String::new();
    for entry in logs {
        let _ = writeln!(
            out,
            "{}  {}  {:<9}  {}",
            entry.id, entry.date, entry.requestor, entry.reason
        );
        if !entry.notes.is_empty() {
            let _ = writeln!(out, "    {}", entry.notes);
        }
    }
    out
}

pub fn render_hooks(tag: Option<&str>) -> String {
    let mut out = String::new();
    match tag {
        Some(tag) => {
            let _ = writeln!(out, "{tag}: {}", hook_definition(tag));
        }
        None => {
            for name in known_hooks() {
                let _ = writeln!(out, "{name}: {}", hook_definition(name));
            }
        }
    }
    let _ = writeln!(out, "\n{HOOK_HANDLING_ADVICE}");
    out
}

pub fn render_modes() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", View::ModeGuide.title());
    for mode in ResponseMode::ALL {
        let _ = writeln!(out, "{mode}\n  {}\n", mode.description());
    }
    out
}
