//! Intent router: picks the service that handles a message.
//!
//! Plain keyword containment on the lower-cased text. Categories are tried
//! in a fixed order (weather, retrieval, plan) and the first category with
//! any matching keyword wins; everything else is chit-chat.

use serde::Serialize;
use std::fmt;

const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "temperature",
    "forecast",
    "rain",
    "snow",
    "umbrella",
    "what should i wear",
    "is it cold",
    "is it hot",
];

const RETRIEVAL_KEYWORDS: &[&str] = &[
    "nearby",
    "attractions",
    "recommend",
    "things to do",
    "museum",
    "park",
    "food",
    "restaurant",
    "shopping",
    "transit",
    "subway",
    "streetcar",
    "bus",
    "ttc",
    "ticket",
    "fare",
    "tips",
    "introduction",
];

const PLAN_KEYWORDS: &[&str] = &[
    "plan",
    "itinerary",
    "day trip",
    "one day trip",
    "schedule",
    "trip plan",
    "plan my day",
    "plan a trip",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Weather,
    Retrieval,
    Plan,
    Chitchat,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Weather => "weather",
            Intent::Retrieval => "retrieval",
            Intent::Plan => "plan",
            Intent::Chitchat => "chitchat",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a user message.
pub fn route(text: &str) -> Intent {
    let text = text.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if mentions(WEATHER_KEYWORDS) {
        Intent::Weather
    } else if mentions(RETRIEVAL_KEYWORDS) {
        Intent::Retrieval
    } else if mentions(PLAN_KEYWORDS) {
        Intent::Plan
    } else {
        Intent::Chitchat
    }
}
