//! `plan_day_trip`: the trip planner exposed to the model as a callable
//! function.

use async_trait::async_trait;
use cityguide_core::error::ToolError;
use cityguide_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use std::sync::Arc;

use crate::planner::{Budget, PreferenceTag, TripPlanner};

pub const TOOL_NAME: &str = "plan_day_trip";

#[derive(Debug, Deserialize)]
struct PlanArgs {
    city: String,
    budget: Budget,
    preferences: Vec<PreferenceTag>,
}

pub struct PlanDayTripTool {
    planner: Arc<TripPlanner>,
}

impl PlanDayTripTool {
    pub fn new(planner: Arc<TripPlanner>) -> Self {
        Self { planner }
    }
}

#[async_trait]
impl Tool for PlanDayTripTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Create a 1-day itinerary (morning, afternoon, evening) using only the local knowledge base."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let tags: Vec<&str> = PreferenceTag::ALL.iter().map(|t| t.as_str()).collect();
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name"
                },
                "budget": {
                    "type": "string",
                    "enum": ["low", "medium", "high"],
                    "description": "Spending level for the day"
                },
                "preferences": {
                    "type": "array",
                    "items": { "type": "string", "enum": tags },
                    "description": "Interests to plan around"
                }
            },
            "required": ["city", "budget", "preferences"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: PlanArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(format!("{TOOL_NAME}: {e}")))?;

        let itinerary = self
            .planner
            .plan(&args.city, args.budget, &args.preferences)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: TOOL_NAME.into(),
                reason: e.to_string(),
            })?;

        let data = serde_json::to_value(&itinerary).map_err(|e| ToolError::ExecutionFailed {
            tool_name: TOOL_NAME.into(),
            reason: e.to_string(),
        })?;
        let output = serde_json::to_string_pretty(&data).unwrap_or_default();

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: Some(data),
        })
    }
}
