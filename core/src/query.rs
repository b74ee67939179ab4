//! Query understanding: deterministic keyword parse of the user's question.
//!
//! Does not read data and does not change any decision; the intent is
//! carried into the run report for the front end.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Explanation,
    Prioritization,
    Recommendation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Customer,
    Region,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    Today,
    ThisWeek,
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub intent:       Intent,
    pub entity:       Entity,
    pub time_horizon: TimeHorizon,
    pub urgency:      Urgency,
    pub raw_query:    String,
}

pub fn understand_query(query: &str) -> QueryIntent {
    let q = query.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| q.contains(w));

    let intent = if any(&["why", "reason", "cause"]) {
        Intent::Explanation
    } else if any(&["who", "which", "list"]) {
        Intent::Prioritization
    } else if any(&["what should", "what action", "next step"]) {
        Intent::Recommendation
    } else {
        Intent::Unknown
    };

    let entity = if any(&["customer", "user", "account"]) {
        Entity::Customer
    } else if any(&["region", "city", "location"]) {
        Entity::Region
    } else {
        Entity::General
    };

    let (time_horizon, urgency) = if any(&["today", "now", "immediately"]) {
        (TimeHorizon::Today, Urgency::High)
    } else if q.contains("week") {
        (TimeHorizon::ThisWeek, Urgency::Normal)
    } else {
        (TimeHorizon::Unspecified, Urgency::Normal)
    };

    QueryIntent {
        intent,
        entity,
        time_horizon,
        urgency,
        raw_query: query.to_string(),
    }
}
