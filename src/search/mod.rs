//! Debounced, cancellable site search
//!
//! [`SearchController`] turns a rapidly changing query into at most one
//! request per settled input and publishes a single [`SearchState`].

pub mod controller;

pub use controller::{SearchController, Subscription};

use crate::api::{ApiError, SiteResult};
use std::fmt;
use std::time::Duration;

/// Default keystroke settling window
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Default bound on a single search request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

/// Timing parameters for the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Quiet period after the last keystroke before a request is sent
    pub debounce: Duration,
    /// Requests still pending after this long end in [`SearchState::TimedOut`]
    pub request_timeout: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Opaque handle identifying one issued search request
///
/// Only the most recently minted token is current; a response carrying any
/// other token is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub(crate) fn first() -> Self {
        RequestToken(1)
    }

    pub(crate) fn next(self) -> Self {
        RequestToken(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a search for the current query failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Transport-level failure (DNS, refused connection, reset)
    NetworkError,
    /// Backend answered with a non-2xx status
    HttpError(u16),
    /// Payload was not a list of sites
    InvalidResponse,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NetworkError => write!(f, "network_error"),
            FailureReason::HttpError(status) => write!(f, "http_error:{status}"),
            FailureReason::InvalidResponse => write!(f, "invalid_response"),
        }
    }
}

/// Observable state of the controller
///
/// Every variant except `Idle` carries the (trimmed) query it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Debouncing {
        query: String,
    },
    InFlight {
        query: String,
        token: RequestToken,
    },
    Succeeded {
        query: String,
        results: Vec<SiteResult>,
    },
    Failed {
        query: String,
        reason: FailureReason,
    },
    TimedOut {
        query: String,
    },
}

impl SearchState {
    /// Results to show; empty for every state but `Succeeded`
    pub fn results(&self) -> &[SiteResult] {
        match self {
            SearchState::Succeeded { results, .. } => results,
            _ => &[],
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            SearchState::Idle => None,
            SearchState::Debouncing { query }
            | SearchState::InFlight { query, .. }
            | SearchState::Succeeded { query, .. }
            | SearchState::Failed { query, .. }
            | SearchState::TimedOut { query } => Some(query),
        }
    }

    /// Waiting on the debounce window or the network
    pub fn is_searching(&self) -> bool {
        matches!(
            self,
            SearchState::Debouncing { .. } | SearchState::InFlight { .. }
        )
    }

    /// Presentation projection
    ///
    /// A failed search renders exactly like an empty one so that the UI keeps
    /// a single "register manually" fallback. Timeouts stay distinct.
    pub fn view(&self) -> SearchView {
        match self {
            SearchState::Idle => SearchView::Idle,
            SearchState::Debouncing { .. } | SearchState::InFlight { .. } => SearchView::Searching,
            SearchState::Succeeded { results, .. } if results.is_empty() => SearchView::Empty,
            SearchState::Succeeded { results, .. } => SearchView::Results(results.clone()),
            SearchState::Failed { .. } => SearchView::Empty,
            SearchState::TimedOut { .. } => {
                SearchView::Error("Search request took too long, please try again".to_string())
            }
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            SearchState::Idle => "idle",
            SearchState::Debouncing { .. } => "debouncing",
            SearchState::InFlight { .. } => "in_flight",
            SearchState::Succeeded { .. } => "succeeded",
            SearchState::Failed { .. } => "failed",
            SearchState::TimedOut { .. } => "timed_out",
        }
    }
}

/// What a search box should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchView {
    Idle,
    Searching,
    Results(Vec<SiteResult>),
    /// No matches, or the search failed: offer manual registration
    Empty,
    /// Search timed out
    Error(String),
}

/// How a finished request ended, before staleness is checked
#[derive(Debug)]
pub(crate) enum SearchOutcome {
    Results(Vec<SiteResult>),
    Failed(FailureReason),
    TimedOut,
}

impl From<Result<Vec<SiteResult>, ApiError>> for SearchOutcome {
    fn from(result: Result<Vec<SiteResult>, ApiError>) -> Self {
        match result {
            Ok(results) => SearchOutcome::Results(results),
            Err(ApiError::Timeout) => SearchOutcome::TimedOut,
            Err(ApiError::Http { status, .. }) => {
                SearchOutcome::Failed(FailureReason::HttpError(status))
            }
            Err(ApiError::InvalidResponse(_)) => {
                SearchOutcome::Failed(FailureReason::InvalidResponse)
            }
            Err(ApiError::Network(_)) | Err(ApiError::InvalidBaseUrl(_)) => {
                SearchOutcome::Failed(FailureReason::NetworkError)
            }
        }
    }
}

/// Why the controller gave up on pending work; logged, never surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cancellation {
    NewerQuery,
    Cleared,
    Selected,
    Disposed,
}

impl fmt::Display for Cancellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Cancellation::NewerQuery => "newer_query",
            Cancellation::Cleared => "cleared",
            Cancellation::Selected => "selected",
            Cancellation::Disposed => "disposed",
        };
        f.write_str(reason)
    }
}
