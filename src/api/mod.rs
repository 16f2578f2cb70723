pub mod http;
pub mod types;

pub use http::HttpBackend;
pub use types::{
    AnalysisRequest, AnalysisResult, Competitor, CopySamples, HistoryEntry, LeadForm, MediaPlan,
    PricePoint, RadarPoint, RoiForecast, ScoreBreakdown, SiteDetails, SiteResult,
};

/// Site search abstraction - the only backend seam the search controller needs
#[async_trait::async_trait]
pub trait SiteSearch: Send + Sync {
    /// Look up sales sites matching `query`, in server order
    async fn search_sites(&self, query: &str) -> Result<Vec<SiteResult>, ApiError>;
}

/// Everything past site search: details, analysis and the side endpoints
#[async_trait::async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn site_details(&self, id: &str) -> Result<SiteDetails, ApiError>;

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ApiError>;

    async fn regenerate_copy(&self, request: &AnalysisRequest) -> Result<CopySamples, ApiError>;

    async fn submit_lead(&self, lead: &LeadForm) -> Result<(), ApiError>;

    async fn history(&self, email: Option<&str>) -> Result<Vec<HistoryEntry>, ApiError>;
}

/// Backend-related errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::Network(e)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::InvalidResponse(e.to_string())
    }
}
