//! Guardrail filter applied to every user message before routing.
//!
//! Two fixed pattern lists, checked in order, first match wins:
//! 1. Restricted topics (whole words, case-insensitive)
//! 2. Prompt attacks: requests to reveal, ignore, or rewrite instructions
//!
//! Blocked text never reaches a model.

use regex::Regex;
use serde::Serialize;
use tracing::info;

const RESTRICTED_TOPICS: &[&str] = &[
    r"\bcat(s)?\b",
    r"\bdog(s)?\b",
    r"\bhoroscope(s)?\b",
    r"\bzodiac\b",
    r"\bastrology\b",
    r"\bTaylor\s+Swift\b",
];

const PROMPT_ATTACKS: &[&str] = &[
    r"system\s*prompt",
    r"reveal.*prompt",
    r"show.*prompt",
    r"print.*prompt",
    r"what.*your.*instructions",
    r"ignore\s+(all|previous)\s+instructions",
    r"override\s+(all|previous)\s+instructions",
    r"change\s+your\s+rules",
    r"modify\s+your\s+rules",
    r"developer\s+message",
    r"hidden\s+instructions",
];

pub const RESTRICTED_TOPIC_MESSAGE: &str = "Sorry, I can't help with that topic. \
     I'm here to help with city weather, attractions, transit tips, and day-trip planning.";

pub const PROMPT_ATTACK_MESSAGE: &str = "I can't reveal or modify my system instructions, \
     but I'd be happy to continue helping with your city planning questions!";

/// Why a message was blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    RestrictedTopic,
    PromptAttack,
}

impl BlockReason {
    /// The reply shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            BlockReason::RestrictedTopic => RESTRICTED_TOPIC_MESSAGE,
            BlockReason::PromptAttack => PROMPT_ATTACK_MESSAGE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::RestrictedTopic => "restricted_topic",
            BlockReason::PromptAttack => "prompt_attack",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a guardrail check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Block(BlockReason),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    /// Empty when allowed, otherwise the user-facing block message.
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Allow => "",
            Verdict::Block(reason) => reason.message(),
        }
    }
}

/// Compiled guardrail patterns.
pub struct Guardrails {
    restricted: Vec<Regex>,
    attacks: Vec<Regex>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("guardrail patterns are valid literals"))
        .collect()
}

impl Guardrails {
    pub fn new() -> Self {
        Self {
            restricted: compile(RESTRICTED_TOPICS),
            attacks: compile(PROMPT_ATTACKS),
        }
    }

    /// Check one user message.
    pub fn check(&self, text: &str) -> Verdict {
        let text = text.trim();
        if text.is_empty() {
            return Verdict::Allow;
        }

        let reason = if self.restricted.iter().any(|re| re.is_match(text)) {
            BlockReason::RestrictedTopic
        } else if self.attacks.iter().any(|re| re.is_match(text)) {
            BlockReason::PromptAttack
        } else {
            return Verdict::Allow;
        };

        info!(reason = %reason, "Guardrail blocked message");
        Verdict::Block(reason)
    }
}

impl Default for Guardrails {
    fn default() -> Self {
        Self::new()
    }
}
