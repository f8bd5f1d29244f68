//! Trip planner: a Morning / Afternoon / Evening itinerary assembled from
//! the knowledge base.
//!
//! The planner issues one composite similarity query, keeps the candidates
//! whose price level fits the budget (or all of them if none do), and fills
//! the three slots in ranking order.

use cityguide_core::error::StoreError;
use cityguide_core::knowledge::{RetrievalHit, Retriever};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Candidates fetched per plan.
const CANDIDATES: usize = 8;

const SLOTS: [&str; 3] = ["Morning", "Afternoon", "Evening"];

const TRANSIT_ADVICE: &str = "Use the subway or streetcar for efficient travel between neighborhoods. \
     Combine walking for nearby attractions.";

pub const NO_DATA_ADVICE: &str = "No local data available to build an itinerary.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Low,
    #[default]
    Medium,
    High,
}

impl Budget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Budget::Low => "low",
            Budget::Medium => "medium",
            Budget::High => "high",
        }
    }

    /// Whether a record's price level fits this budget.
    ///
    /// An empty price level fits every budget.
    pub fn admits(&self, price_level: &str) -> bool {
        let level = price_level.trim().to_lowercase();
        match self {
            Budget::Low => matches!(level.as_str(), "low" | ""),
            Budget::Medium => matches!(level.as_str(), "low" | "medium" | ""),
            Budget::High => true,
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Budget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Budget::Low),
            "medium" => Ok(Budget::Medium),
            "high" => Ok(Budget::High),
            other => Err(format!("unknown budget '{other}' (expected low, medium or high)")),
        }
    }
}

/// Interests the model may pass to `plan_day_trip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceTag {
    Museum,
    Food,
    Nature,
    Shopping,
    Family,
    Date,
    Solo,
}

impl PreferenceTag {
    pub const ALL: [PreferenceTag; 7] = [
        PreferenceTag::Museum,
        PreferenceTag::Food,
        PreferenceTag::Nature,
        PreferenceTag::Shopping,
        PreferenceTag::Family,
        PreferenceTag::Date,
        PreferenceTag::Solo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceTag::Museum => "museum",
            PreferenceTag::Food => "food",
            PreferenceTag::Nature => "nature",
            PreferenceTag::Shopping => "shopping",
            PreferenceTag::Family => "family",
            PreferenceTag::Date => "date",
            PreferenceTag::Solo => "solo",
        }
    }
}

impl fmt::Display for PreferenceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferenceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == wanted)
            .ok_or_else(|| format!("unknown preference '{wanted}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItinerarySlot {
    pub time: String,
    pub place: String,
    pub category: String,
    pub neighborhood: String,
    pub highlights: String,
    pub tips: String,
    pub transit: String,
    pub estimated_duration_hours: String,
}

impl ItinerarySlot {
    fn from_hit(time: &str, hit: &RetrievalHit) -> Self {
        let meta = &hit.metadata;
        let place = if meta.name.trim().is_empty() {
            "Unknown".to_string()
        } else {
            meta.name.clone()
        };
        Self {
            time: time.to_string(),
            place,
            category: meta.category.clone(),
            neighborhood: meta.neighborhood.clone(),
            highlights: meta.highlights.clone(),
            tips: meta.tips.clone(),
            transit: meta.transit.clone(),
            estimated_duration_hours: meta.duration_hours.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub city: String,
    pub budget: Budget,
    pub preferences: Vec<PreferenceTag>,
    pub itinerary: Vec<ItinerarySlot>,
    pub transit_advice: String,
}

/// Builds itineraries from retrieved knowledge records.
pub struct TripPlanner {
    retriever: Arc<dyn Retriever>,
}

impl TripPlanner {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }

    /// The similarity query for a plan request.
    pub fn query_text(city: &str, budget: Budget, preferences: &[PreferenceTag]) -> String {
        let prefs = if preferences.is_empty() {
            "sightseeing".to_string()
        } else {
            preferences
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!("{city} {budget} {prefs}")
    }

    pub async fn plan(
        &self,
        city: &str,
        budget: Budget,
        preferences: &[PreferenceTag],
    ) -> Result<Itinerary, StoreError> {
        let query = Self::query_text(city, budget, preferences);
        let candidates = self.retriever.retrieve(&query, CANDIDATES).await?;
        debug!(%query, candidates = candidates.len(), "Planning day trip");

        if candidates.is_empty() {
            return Ok(Itinerary {
                city: city.to_string(),
                budget,
                preferences: preferences.to_vec(),
                itinerary: Vec::new(),
                transit_advice: NO_DATA_ADVICE.to_string(),
            });
        }

        let affordable: Vec<&RetrievalHit> = candidates
            .iter()
            .filter(|hit| budget.admits(&hit.metadata.price_level))
            .collect();
        let chosen = if affordable.is_empty() {
            candidates.iter().collect()
        } else {
            affordable
        };

        let itinerary = SLOTS
            .iter()
            .zip(chosen)
            .map(|(time, hit)| ItinerarySlot::from_hit(time, hit))
            .collect();

        let transit_advice = match budget {
            Budget::Low => format!("{TRANSIT_ADVICE} Consider staying within the same area to reduce transit costs."),
            Budget::Medium => TRANSIT_ADVICE.to_string(),
            Budget::High => format!("{TRANSIT_ADVICE} Ride-share can help save time in the evening."),
        };

        Ok(Itinerary {
            city: city.to_string(),
            budget,
            preferences: preferences.to_vec(),
            itinerary,
            transit_advice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cityguide_core::knowledge::RecordMetadata;
    use std::sync::Mutex;

    /// Returns fixed hits and remembers the last query.
    struct FixedRetriever {
        hits: Vec<RetrievalHit>,
        last_query: Mutex<Option<(String, usize)>>,
    }

    impl FixedRetriever {
        fn new(hits: Vec<RetrievalHit>) -> Self {
            Self { hits, last_query: Mutex::new(None) }
        }
    }

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalHit>, StoreError> {
            *self.last_query.lock().unwrap() = Some((query.to_string(), k));
            Ok(self.hits.iter().take(k).cloned().collect())
        }
    }

    struct BrokenRetriever;

    #[async_trait]
    impl Retriever for BrokenRetriever {
        async fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<RetrievalHit>, StoreError> {
            Err(StoreError::QueryFailed("collection unavailable".into()))
        }
    }

    fn hit(name: &str, price_level: &str) -> RetrievalHit {
        RetrievalHit {
            id: name.to_lowercase(),
            text: format!("{name} description"),
            metadata: RecordMetadata {
                name: name.into(),
                category: "museum".into(),
                neighborhood: "Downtown".into(),
                transit: "Line 1".into(),
                price_level: price_level.into(),
                duration_hours: "2".into(),
                highlights: "Exhibits".into(),
                tips: "Go early".into(),
                ..RecordMetadata::default()
            },
            distance: 0.1,
        }
    }

    fn planner(hits: Vec<RetrievalHit>) -> (TripPlanner, Arc<FixedRetriever>) {
        let retriever = Arc::new(FixedRetriever::new(hits));
        (TripPlanner::new(retriever.clone()), retriever)
    }

    #[test]
    fn budget_admission() {
        assert!(Budget::Low.admits("low"));
        assert!(Budget::Low.admits(""));
        assert!(Budget::Low.admits(" LOW "));
        assert!(!Budget::Low.admits("medium"));
        assert!(Budget::Medium.admits("low"));
        assert!(Budget::Medium.admits("Medium"));
        assert!(!Budget::Medium.admits("high"));
        assert!(Budget::High.admits("high"));
        assert!(Budget::High.admits("anything"));
    }

    #[test]
    fn parse_budget_and_tags() {
        assert_eq!("LOW".parse::<Budget>().unwrap(), Budget::Low);
        assert!("cheap".parse::<Budget>().is_err());
        assert_eq!(" Nature ".parse::<PreferenceTag>().unwrap(), PreferenceTag::Nature);
        assert!("opera".parse::<PreferenceTag>().is_err());
    }

    #[test]
    fn query_text_defaults_to_sightseeing() {
        assert_eq!(TripPlanner::query_text("Toronto", Budget::Low, &[]), "Toronto low sightseeing");
        assert_eq!(
            TripPlanner::query_text("Toronto", Budget::High, &[PreferenceTag::Food, PreferenceTag::Date]),
            "Toronto high food date"
        );
    }

    #[tokio::test]
    async fn low_budget_filters_and_fills_slots() {
        let (planner, retriever) = planner(vec![
            hit("Gallery", "high"),
            hit("Market", "low"),
            hit("Park", ""),
            hit("Bistro", "medium"),
            hit("Island", "low"),
        ]);

        let plan = planner
            .plan("Toronto", Budget::Low, &[PreferenceTag::Food])
            .await
            .unwrap();

        let (query, k) = retriever.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query, "Toronto low food");
        assert_eq!(k, 8);

        let places: Vec<&str> = plan.itinerary.iter().map(|s| s.place.as_str()).collect();
        assert_eq!(places, vec!["Market", "Park", "Island"]);
        let times: Vec<&str> = plan.itinerary.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["Morning", "Afternoon", "Evening"]);
        assert!(plan.transit_advice.ends_with("Consider staying within the same area to reduce transit costs."));
    }

    #[tokio::test]
    async fn filter_falls_back_to_all_candidates() {
        let (planner, _) = planner(vec![hit("Gallery", "high"), hit("Tower", "high")]);
        let plan = planner.plan("Toronto", Budget::Low, &[]).await.unwrap();
        assert_eq!(plan.itinerary.len(), 2);
        assert_eq!(plan.itinerary[0].place, "Gallery");
        assert_eq!(plan.itinerary[1].time, "Afternoon");
    }

    #[tokio::test]
    async fn two_affordable_of_five_fill_two_slots_in_order() {
        let (planner, _) = planner(vec![
            hit("c1", "high"),
            hit("c2", "low"),
            hit("c3", "medium"),
            hit("c4", "high"),
            hit("c5", "low"),
        ]);
        let plan = planner.plan("Toronto", Budget::Low, &[]).await.unwrap();

        let places: Vec<&str> = plan.itinerary.iter().map(|s| s.place.as_str()).collect();
        assert_eq!(places, vec!["c2", "c5"]);
        let times: Vec<&str> = plan.itinerary.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["Morning", "Afternoon"]);
    }

    #[tokio::test]
    async fn none_affordable_of_five_takes_first_three() {
        let (planner, _) = planner(vec![
            hit("c1", "high"),
            hit("c2", "high"),
            hit("c3", "medium"),
            hit("c4", "high"),
            hit("c5", "medium"),
        ]);
        let plan = planner.plan("Toronto", Budget::Low, &[]).await.unwrap();

        let places: Vec<&str> = plan.itinerary.iter().map(|s| s.place.as_str()).collect();
        assert_eq!(places, vec!["c1", "c2", "c3"]);
        assert_eq!(plan.itinerary[2].time, "Evening");
    }

    #[tokio::test]
    async fn no_candidates_yields_empty_plan() {
        let (planner, _) = planner(vec![]);
        let plan = planner.plan("Toronto", Budget::Medium, &[]).await.unwrap();
        assert!(plan.itinerary.is_empty());
        assert_eq!(plan.transit_advice, NO_DATA_ADVICE);
        assert_eq!(plan.city, "Toronto");
    }

    #[tokio::test]
    async fn high_budget_advice_and_slot_fields() {
        let (planner, _) = planner(vec![hit("Gallery", "high")]);
        let plan = planner.plan("Toronto", Budget::High, &[]).await.unwrap();
        let slot = &plan.itinerary[0];
        assert_eq!(slot.category, "museum");
        assert_eq!(slot.neighborhood, "Downtown");
        assert_eq!(slot.transit, "Line 1");
        assert_eq!(slot.estimated_duration_hours, "2");
        assert!(plan.transit_advice.ends_with("Ride-share can help save time in the evening."));
    }

    #[tokio::test]
    async fn medium_budget_has_plain_advice() {
        let (planner, _) = planner(vec![hit("Gallery", "")]);
        let plan = planner.plan("Toronto", Budget::Medium, &[]).await.unwrap();
        assert_eq!(plan.transit_advice, TRANSIT_ADVICE);
    }

    #[tokio::test]
    async fn empty_name_becomes_unknown() {
        let (planner, _) = planner(vec![hit("", "low")]);
        let plan = planner.plan("Toronto", Budget::Low, &[]).await.unwrap();
        assert_eq!(plan.itinerary[0].place, "Unknown");
    }

    #[tokio::test]
    async fn retrieval_failure_propagates() {
        let planner = TripPlanner::new(Arc::new(BrokenRetriever));
        assert!(planner.plan("Toronto", Budget::Low, &[]).await.is_err());
    }

    #[test]
    fn itinerary_serializes_with_expected_fields() {
        let plan = Itinerary {
            city: "Toronto".into(),
            budget: Budget::Low,
            preferences: vec![PreferenceTag::Museum],
            itinerary: vec![],
            transit_advice: NO_DATA_ADVICE.into(),
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["budget"], "low");
        assert_eq!(json["preferences"][0], "museum");
        assert!(json["itinerary"].as_array().unwrap().is_empty());
    }
}
