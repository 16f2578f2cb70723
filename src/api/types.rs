use serde::{Deserialize, Serialize};

/// One row of a `/search-sites` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteResult {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SiteResult {
    pub fn new(id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            brand: None,
            status: None,
            category: None,
        }
    }
}

/// Configuration defaults for a known site (`/site-details/:id`)
///
/// The backend fills in whatever it knows; everything except the name may
/// be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDetails {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Sales price per pyeong, in 만원
    #[serde(default)]
    pub price: Option<f64>,
    /// Average price of the comparison area, in 만원
    #[serde(default)]
    pub target_price: Option<f64>,
    /// Number of units supplied
    #[serde(default)]
    pub supply: Option<f64>,
}

/// Body of `POST /analyze` and `POST /regenerate-copy`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub field_name: String,
    pub address: String,
    pub product_category: String,
    pub sales_stage: String,
    pub down_payment: String,
    pub interest_benefit: String,
    pub additional_benefits: Vec<String>,
    pub main_concern: String,
    pub monthly_budget: u32,
    pub existing_media: Vec<String>,
    pub sales_price: u32,
    pub target_area_price: u32,
    pub down_payment_amount: u32,
    pub supply_volume: u32,
    pub field_keypoints: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub price_score: f64,
    pub location_score: f64,
    pub benefit_score: f64,
    pub total_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaPlan {
    pub media: String,
    pub feature: String,
    pub reason: String,
    pub strategy_example: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub name: String,
    pub price: f64,
}

/// One axis of the site-vs-market radar chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPoint {
    pub subject: String,
    #[serde(rename = "A")]
    pub site: f64,
    #[serde(rename = "B")]
    pub market: f64,
    #[serde(rename = "fullMark")]
    pub full_mark: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub price: f64,
    pub gap_label: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoiForecast {
    pub expected_leads: f64,
    /// Cost per lead, in 원
    pub expected_cpl: f64,
    /// Lead-to-contract rate, in percent
    pub conversion_rate: f64,
}

/// Result of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub score_breakdown: ScoreBreakdown,
    #[serde(default)]
    pub market_diagnosis: String,
    #[serde(default)]
    pub market_gap_percent: f64,
    #[serde(default)]
    pub price_data: Vec<PricePoint>,
    #[serde(default)]
    pub radar_data: Vec<RadarPoint>,
    #[serde(default)]
    pub ad_recommendation: String,
    #[serde(default)]
    pub media_mix: Vec<MediaPlan>,
    #[serde(default)]
    pub copywriting: String,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub target_persona: String,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub roi_forecast: RoiForecast,
    #[serde(default)]
    pub keyword_strategy: Vec<String>,
    #[serde(default)]
    pub weekly_plan: Vec<String>,
    #[serde(default)]
    pub lms_copy_samples: Vec<String>,
    #[serde(default)]
    pub channel_talk_samples: Vec<String>,
}

/// Result of `POST /regenerate-copy`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CopySamples {
    #[serde(default)]
    pub lms_copy_samples: Vec<String>,
    #[serde(default)]
    pub channel_talk_samples: Vec<String>,
}

/// Consultation request sent to `POST /submit-lead`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub phone: String,
    /// Job title of the requester
    pub rank: String,
    /// Site the requester is marketing
    pub site: String,
}

impl LeadForm {
    /// Names of the fields that are blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("phone", &self.phone),
            ("rank", &self.rank),
            ("site", &self.site),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// A previously stored analysis from `GET /history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub field_name: String,
    pub address: String,
    pub score: f64,
    pub created_at: String,
    /// The stored `AnalysisResult`, serialized as JSON text
    pub response_json: String,
}

impl HistoryEntry {
    /// Decode the stored analysis
    pub fn result(&self) -> serde_json::Result<AnalysisResult> {
        serde_json::from_str(&self.response_json)
    }

    /// Creation time, if the backend sent an RFC 3339 or naive ISO timestamp
    pub fn created_at_local(&self) -> Option<chrono::DateTime<chrono::Local>> {
        if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(&self.created_at) {
            return Some(ts.with_timezone(&chrono::Local));
        }
        chrono::NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().with_timezone(&chrono::Local))
    }
}
