//! The CityGuide session loop.
//!
//! Every user message goes through the same turn:
//!
//! 1. **Guard** the text against restricted topics and prompt attacks
//! 2. **Remember** budget / kids / indoor preferences
//! 3. **Route** by keyword to weather, retrieval, plan or chit-chat
//! 4. **Dispatch** to the weather lookup, the grounded answer composer, the
//!    function-calling trip planner, or a plain persona chat
//! 5. **Record** the exchange in bounded history

pub mod answer;
pub mod assistant;
pub mod persona;
pub mod planning;
pub mod router;
pub mod session;

#[cfg(test)]
#[allow(dead_code)]
mod test_helpers;

pub use answer::AnswerComposer;
pub use assistant::{Assistant, AssistantSettings, Turn, TurnOutcome};
pub use planning::DayTripPlanning;
pub use router::{Intent, route};
pub use session::{Preferences, Session};
