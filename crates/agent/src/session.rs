//! Per-conversation state: bounded chat history and extracted preferences.

use cityguide_core::message::{ConversationId, Message};
use cityguide_tools::Budget;
use serde::Serialize;

/// Preferences picked up from what the user has said.
///
/// Fields are only ever set or overwritten, never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_kids: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indoor_preference: Option<bool>,
}

impl Preferences {
    /// Update from one user message using keyword triggers.
    pub fn update_from_text(&mut self, text: &str) {
        let t = text.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| t.contains(n));

        if has(&["budget low", "cheap", "low budget"]) {
            self.budget = Some(Budget::Low);
        } else if has(&["budget medium", "mid budget"]) {
            self.budget = Some(Budget::Medium);
        } else if has(&["budget high", "luxury", "high budget"]) {
            self.budget = Some(Budget::High);
        }

        if has(&["with kids", "with children", "family trip"]) {
            self.with_kids = Some(true);
        }

        if t.contains("indoor") {
            self.indoor_preference = Some(true);
        }
        if t.contains("outdoor") {
            self.indoor_preference = Some(false);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.budget.is_none() && self.with_kids.is_none() && self.indoor_preference.is_none()
    }

    /// `budget=low, with_kids=true`, or a placeholder when nothing is known.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No stored preferences yet.".into();
        }

        let mut parts = Vec::new();
        if let Some(budget) = self.budget {
            parts.push(format!("budget={budget}"));
        }
        if let Some(with_kids) = self.with_kids {
            parts.push(format!("with_kids={with_kids}"));
        }
        if let Some(indoor) = self.indoor_preference {
            parts.push(format!("indoor_preference={indoor}"));
        }
        parts.join(", ")
    }

    /// Compact JSON for prompts, e.g. `{"budget":"low"}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".into())
    }
}

/// One conversation. Owned by the caller and lent to the assistant per turn.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: ConversationId,
    pub preferences: Preferences,
    messages: Vec<Message>,
    max_turns: usize,
}

impl Session {
    /// A session keeping at most `max_turns` user/assistant pairs.
    pub fn new(max_turns: usize) -> Self {
        Self {
            id: ConversationId::new(),
            preferences: Preferences::default(),
            messages: Vec::new(),
            max_turns: max_turns.max(1),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Record a completed turn and drop the oldest messages beyond the limit.
    pub fn record_exchange(&mut self, user: &str, assistant: &str) {
        self.messages.push(Message::user(user));
        self.messages.push(Message::assistant(assistant));
        self.trim();
    }

    fn trim(&mut self) {
        let max_messages = self.max_turns * 2;
        if self.messages.len() > max_messages {
            let excess = self.messages.len() - max_messages;
            self.messages.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityguide_core::message::Role;

    fn prefs_after(texts: &[&str]) -> Preferences {
        let mut prefs = Preferences::default();
        for t in texts {
            prefs.update_from_text(t);
        }
        prefs
    }

    #[test]
    fn budget_triggers() {
        assert_eq!(prefs_after(&["something cheap please"]).budget, Some(Budget::Low));
        assert_eq!(prefs_after(&["mid budget"]).budget, Some(Budget::Medium));
        assert_eq!(prefs_after(&["LUXURY only"]).budget, Some(Budget::High));
        assert_eq!(prefs_after(&["no money talk"]).budget, None);
    }

    #[test]
    fn low_budget_checked_first() {
        assert_eq!(prefs_after(&["cheap or luxury, whatever"]).budget, Some(Budget::Low));
    }

    #[test]
    fn later_message_overwrites_budget() {
        let prefs = prefs_after(&["low budget", "actually budget high"]);
        assert_eq!(prefs.budget, Some(Budget::High));
    }

    #[test]
    fn kids_and_indoor() {
        let prefs = prefs_after(&["Family trip, we like indoor stuff"]);
        assert_eq!(prefs.with_kids, Some(true));
        assert_eq!(prefs.indoor_preference, Some(true));
    }

    #[test]
    fn outdoor_wins_when_both_mentioned() {
        let prefs = prefs_after(&["indoor or outdoor, prefer outdoor"]);
        assert_eq!(prefs.indoor_preference, Some(false));
    }

    #[test]
    fn fields_never_cleared() {
        let prefs = prefs_after(&["cheap trip with kids", "hello", "what's up"]);
        assert_eq!(prefs.budget, Some(Budget::Low));
        assert_eq!(prefs.with_kids, Some(true));
    }

    #[test]
    fn summary_rendering() {
        assert_eq!(Preferences::default().summary(), "No stored preferences yet.");
        let prefs = prefs_after(&["low budget with kids"]);
        assert_eq!(prefs.summary(), "budget=low, with_kids=true");
    }

    #[test]
    fn json_skips_unknown_fields() {
        assert_eq!(Preferences::default().to_json(), "{}");
        let prefs = prefs_after(&["budget high outdoor"]);
        assert_eq!(prefs.to_json(), r#"{"budget":"high","indoor_preference":false}"#);
    }

    #[test]
    fn history_is_trimmed_to_max_turns() {
        let mut session = Session::new(2);
        for i in 0..5 {
            session.record_exchange(&format!("q{i}"), &format!("a{i}"));
        }
        let messages = session.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "q3");
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[3].content, "a4");
    }

    #[test]
    fn recent_returns_tail() {
        let mut session = Session::new(10);
        session.record_exchange("q1", "a1");
        session.record_exchange("q2", "a2");
        let tail = session.recent(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].content, "a1");
        assert_eq!(session.recent(100).len(), 4);
    }
}
