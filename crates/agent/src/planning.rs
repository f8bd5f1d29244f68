//! Day-trip planning through function calling.
//!
//! # Flow
//!
//! 1. Ask the model to call `plan_day_trip`, passing along known preferences
//! 2. Tool call present: run it locally, then ask the model to render the
//!    itinerary JSON as a friendly Morning / Afternoon / Evening reply
//! 3. No tool call, or arguments that don't parse: build a default plan
//!    locally and return it as JSON

use cityguide_core::error::ToolError;
use cityguide_core::message::Message;
use cityguide_core::provider::{Provider, ProviderRequest, ToolChoice};
use cityguide_core::tool::{ToolCall, ToolRegistry};
use cityguide_tools::{PreferenceTag, TripPlanner};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::persona::persona;
use crate::session::Preferences;

const FALLBACK_PREFERENCES: [PreferenceTag; 2] = [PreferenceTag::Museum, PreferenceTag::Food];

pub struct DayTripPlanning {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    tools: Arc<ToolRegistry>,
    planner: Arc<TripPlanner>,
    city: String,
}

impl DayTripPlanning {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        planner: Arc<TripPlanner>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            tools,
            planner,
            city: city.into(),
        }
    }

    pub async fn reply(&self, request_text: &str, preferences: &Preferences) -> Result<String, cityguide_core::Error> {
        let request = ProviderRequest::new(
            self.model.clone(),
            vec![
                Message::system(persona(&self.city)),
                Message::user(tool_request_prompt(request_text, preferences)),
            ],
            self.temperature,
        )
        .with_tools(self.tools.definitions(), ToolChoice::Auto);

        let response = self.provider.complete(request).await?;

        let Some(raw_call) = response.message.tool_calls.first() else {
            info!("Model did not call the planner, using local fallback plan");
            return self.fallback_plan(preferences).await;
        };

        let call = match ToolCall::try_from(raw_call) {
            Ok(call) => call,
            Err(e) => {
                warn!(error = %e, "Unparseable tool arguments, using local fallback plan");
                return self.fallback_plan(preferences).await;
            }
        };

        debug!(tool = %call.name, arguments = %call.arguments, "Executing tool call");
        let result = match self.tools.execute(&call).await {
            Ok(result) => result,
            Err(ToolError::InvalidArguments(reason)) => {
                warn!(%reason, "Invalid tool arguments, using local fallback plan");
                return self.fallback_plan(preferences).await;
            }
            Err(e) => return Err(e.into()),
        };

        let render = ProviderRequest::new(
            self.model.clone(),
            vec![
                Message::system(persona(&self.city)),
                Message::user(render_prompt(&result.output)),
            ],
            self.temperature,
        );
        let rendered = self.provider.complete(render).await?;

        let content = rendered.message.content.trim();
        if content.is_empty() {
            Ok(result.output)
        } else {
            Ok(content.to_string())
        }
    }

    /// Plan locally with the configured city, the stored budget (or medium)
    /// and museum + food.
    async fn fallback_plan(&self, preferences: &Preferences) -> Result<String, cityguide_core::Error> {
        let budget = preferences.budget.unwrap_or_default();
        let itinerary = self
            .planner
            .plan(&self.city, budget, &FALLBACK_PREFERENCES)
            .await?;
        Ok(serde_json::to_string_pretty(&itinerary)?)
    }
}

fn tool_request_prompt(request_text: &str, preferences: &Preferences) -> String {
    format!(
        "Please call the function plan_day_trip to generate a 1-day itinerary.\n\
         Session memory (preferences): {}\n\
         User request: {request_text}\n\
         If the user did not specify budget/preferences, make a reasonable default \
         (budget=medium, preferences=['museum','food']).",
        preferences.to_json()
    )
}

fn render_prompt(plan_json: &str) -> String {
    format!(
        "Format the following JSON into a friendly itinerary:\n\
         - Morning / Afternoon / Evening\n\
         - For each slot: 1 sentence on highlights + 1 short tip\n\
         - Finish with transit advice\n\n\
         JSON:\n{plan_json}"
    )
}
