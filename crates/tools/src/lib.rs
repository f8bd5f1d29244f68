//! Service tools for CityGuide.
//!
//! - **weather**: today's forecast from Open-Meteo plus clothing advice
//! - **planner**: a three-slot day itinerary built from retrieved records
//! - **plan_day_trip**: the planner exposed to the model via function calling

pub mod plan_day_trip;
pub mod planner;
pub mod weather;

use cityguide_core::tool::ToolRegistry;
use std::sync::Arc;

pub use plan_day_trip::PlanDayTripTool;
pub use planner::{Budget, Itinerary, ItinerarySlot, PreferenceTag, TripPlanner};
pub use weather::{DailyForecast, OpenMeteoProvider, WeatherProvider, WeatherService};

/// Create the registry of tools offered to the model.
pub fn default_registry(planner: Arc<TripPlanner>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(PlanDayTripTool::new(planner)));
    registry
}
