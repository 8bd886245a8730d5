//! Travel ideas: pre-sales itinerary concepts published by a microsite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelIdea {
    /// Upstream id, unique per microsite.
    pub id: String,
    pub microsite_id: String,
    pub title: String,
    pub destination: Option<String>,
    pub themes: Vec<String>,
    pub price_from: Option<f64>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub generated_content: Option<IdeaContent>,
    pub raw_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTravelIdea {
    pub id: String,
    pub microsite_id: String,
    pub title: String,
    pub destination: Option<String>,
    pub themes: Vec<String>,
    pub price_from: Option<f64>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub raw_data: serde_json::Value,
}

/// Marketing copy produced by the AI content tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdeaContent {
    pub headline: String,
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}
