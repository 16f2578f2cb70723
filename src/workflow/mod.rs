//! Everything downstream of site search: configuration, analysis and the
//! side requests that hang off a finished report.

pub mod campaign;
pub mod fallback;
pub mod forecast;

pub use campaign::{CampaignConfig, Keypoints};
pub use forecast::RoiProjection;

use crate::api::{AnalysisBackend, AnalysisResult, ApiError, HistoryEntry, LeadForm, SiteResult};
use std::sync::Arc;

/// How the user left the search step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Picked a search result
    Site(SiteResult),
    /// Scanned the typed text as a new site
    Manual(String),
}

/// Where a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    Remote,
    /// Backend failed; the canned local report was used
    LocalFallback,
    /// Reloaded from history
    History,
}

/// A report plus what is needed to re-project it
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub source: AnalysisSource,
    /// Budget the forecast was made for, in 만원
    pub monthly_budget: u32,
}

impl Analysis {
    pub fn project(&self, simulated_budget: u32) -> RoiProjection {
        self.result
            .roi_forecast
            .project(self.monthly_budget, simulated_budget)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Stored analysis is unreadable: {0}")]
    CorruptHistory(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Drives the configure → analyze flow against the backend
#[derive(Clone)]
pub struct Workflow {
    backend: Arc<dyn AnalysisBackend>,
}

impl Workflow {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    /// Build the configuration step for a selection
    ///
    /// A site whose details cannot be fetched is treated as a manual entry
    /// under its name.
    pub async fn prepare(&self, selection: Selection) -> CampaignConfig {
        match selection {
            Selection::Manual(text) => CampaignConfig::manual(&text),
            Selection::Site(site) => match self.backend.site_details(&site.id).await {
                Ok(details) => {
                    tracing::debug!(site_id = %site.id, "site details loaded");
                    CampaignConfig::from_details(&details)
                }
                Err(e) => {
                    tracing::warn!(
                        site_id = %site.id,
                        error = %e,
                        "site details unavailable, falling back to manual entry"
                    );
                    CampaignConfig::manual(&site.name)
                }
            },
        }
    }

    /// Submit the configuration; never fails
    ///
    /// Backend errors produce the local template report instead.
    pub async fn analyze(&self, config: &CampaignConfig, user_email: Option<&str>) -> Analysis {
        let request = config.to_request(user_email);

        let (result, source) = match self.backend.analyze(&request).await {
            Ok(result) => (result, AnalysisSource::Remote),
            Err(e) => {
                tracing::warn!(
                    field_name = %config.field_name,
                    error = %e,
                    "analysis failed, switching to local report"
                );
                (fallback::local_analysis(config), AnalysisSource::LocalFallback)
            }
        };

        Analysis {
            result,
            source,
            monthly_budget: config.monthly_budget,
        }
    }

    /// Replace the copy samples of `analysis` with freshly generated ones
    ///
    /// The rest of the report is left untouched, also on error.
    pub async fn regenerate_copy(
        &self,
        config: &CampaignConfig,
        analysis: &mut Analysis,
    ) -> Result<(), WorkflowError> {
        let samples = self.backend.regenerate_copy(&config.to_request(None)).await?;

        tracing::info!(
            lms = samples.lms_copy_samples.len(),
            channel_talk = samples.channel_talk_samples.len(),
            "copy samples regenerated"
        );

        analysis.result.lms_copy_samples = samples.lms_copy_samples;
        analysis.result.channel_talk_samples = samples.channel_talk_samples;
        Ok(())
    }

    /// Send a consultation request; every field is required
    pub async fn submit_lead(&self, lead: &LeadForm) -> Result<(), WorkflowError> {
        let missing = lead.missing_fields();
        if !missing.is_empty() {
            return Err(WorkflowError::MissingFields(missing));
        }
        self.backend.submit_lead(lead).await?;
        Ok(())
    }

    pub async fn history(&self, user_email: Option<&str>) -> Result<Vec<HistoryEntry>, WorkflowError> {
        Ok(self.backend.history(user_email).await?)
    }

    /// Reopen a stored report
    pub fn load_history(&self, entry: &HistoryEntry) -> Result<(CampaignConfig, Analysis), WorkflowError> {
        let result = entry.result()?;
        let config = CampaignConfig {
            field_name: entry.field_name.clone(),
            address: entry.address.clone(),
            ..CampaignConfig::default()
        };

        tracing::debug!(history_id = entry.id, field_name = %entry.field_name, "history entry loaded");

        let analysis = Analysis {
            result,
            source: AnalysisSource::History,
            monthly_budget: config.monthly_budget,
        };
        Ok((config, analysis))
    }
}
