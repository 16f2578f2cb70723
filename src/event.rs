use crate::api::HistoryEntry;
use crate::search::SearchState;
use crate::workflow::{Analysis, CampaignConfig};
use crossterm::event::KeyEvent;

/// Events that can occur in the application
#[derive(Debug, Clone)]
pub enum Event {
    /// Terminal key press event
    Key(KeyEvent),
    /// Terminal resize event
    Resize(u16, u16),
    /// Periodic redraw (spinner)
    Tick,
    /// Search controller changed state
    Search(SearchState),
    /// Configuration step is ready for a selected or scanned site
    Prepared(CampaignConfig),
    /// Analysis finished (remote or local fallback)
    Analyzed {
        config: CampaignConfig,
        analysis: Analysis,
    },
    /// Copy regeneration finished; `Err` carries a user-facing message
    CopyRegenerated(Result<Analysis, String>),
    /// Consultation request finished; `Err` carries a user-facing message
    LeadSubmitted(Result<(), String>),
    /// History listing finished
    HistoryLoaded(Result<Vec<HistoryEntry>, String>),
}

/// Result type for event handling
pub type EventResult<T> = anyhow::Result<T>;
