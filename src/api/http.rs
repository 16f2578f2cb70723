use super::{
    AnalysisBackend, AnalysisRequest, AnalysisResult, ApiError, CopySamples, HistoryEntry,
    LeadForm, SiteDetails, SiteResult, SiteSearch,
};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// reqwest-backed client for the analysis backend
///
/// All endpoints hang off one base URL (dev or prod host, see
/// `config::ApiSettings`).
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a client for `base_url`
    ///
    /// `timeout` bounds every request made through this client. The search
    /// controller applies its own, shorter timeout on top of it.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;

        tracing::debug!(base_url = %parsed, timeout_ms = timeout.as_millis() as u64, "http backend created");

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, ApiError> {
        let response = Self::check_status(response, endpoint).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(endpoint, error = %e, "backend response did not match expected shape");
            ApiError::from(e)
        })
    }

    async fn check_status(response: Response, endpoint: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            endpoint,
            status = %status,
            error = %body,
            "backend returned error"
        );

        Err(ApiError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait::async_trait]
impl SiteSearch for HttpBackend {
    async fn search_sites(&self, query: &str) -> Result<Vec<SiteResult>, ApiError> {
        let url = self.endpoint(&["search-sites"])?;

        tracing::debug!(query = %query, "searching sites");

        let response = self.client.get(url).query(&[("q", query)]).send().await?;
        let sites: Vec<SiteResult> = Self::read_json(response, "search-sites").await?;

        tracing::debug!(query = %query, result_count = sites.len(), "site search completed");
        Ok(sites)
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for HttpBackend {
    async fn site_details(&self, id: &str) -> Result<SiteDetails, ApiError> {
        let url = self.endpoint(&["site-details", id])?;
        tracing::debug!(site_id = %id, "fetching site details");

        let response = self.client.get(url).send().await?;
        Self::read_json(response, "site-details").await
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ApiError> {
        let url = self.endpoint(&["analyze"])?;

        tracing::info!(
            field_name = %request.field_name,
            category = %request.product_category,
            monthly_budget = request.monthly_budget,
            user = %request.user_email.as_deref().map(crate::logging::mask_email).unwrap_or_default(),
            "submitting analysis"
        );

        let response = self.client.post(url).json(request).send().await?;
        let result: AnalysisResult = Self::read_json(response, "analyze").await?;

        tracing::info!(field_name = %request.field_name, score = result.score, "analysis received");
        Ok(result)
    }

    async fn regenerate_copy(&self, request: &AnalysisRequest) -> Result<CopySamples, ApiError> {
        let url = self.endpoint(&["regenerate-copy"])?;
        tracing::debug!(field_name = %request.field_name, "regenerating copy samples");

        // The copy endpoint never stores anything per user.
        let mut body = request.clone();
        body.user_email = None;

        let response = self.client.post(url).json(&body).send().await?;
        Self::read_json(response, "regenerate-copy").await
    }

    async fn submit_lead(&self, lead: &LeadForm) -> Result<(), ApiError> {
        let url = self.endpoint(&["submit-lead"])?;
        tracing::info!(site = %lead.site, "submitting consultation lead");

        let response = self.client.post(url).json(lead).send().await?;
        Self::check_status(response, "submit-lead").await?;
        Ok(())
    }

    async fn history(&self, email: Option<&str>) -> Result<Vec<HistoryEntry>, ApiError> {
        let url = self.endpoint(&["history"])?;
        let mut request = self.client.get(url);
        if let Some(email) = email {
            request = request.query(&[("email", email)]);
        }

        let response = request.send().await?;
        let entries: Vec<HistoryEntry> = Self::read_json(response, "history").await?;
        tracing::debug!(entry_count = entries.len(), "history loaded");
        Ok(entries)
    }
}
