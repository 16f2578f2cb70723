pub mod app;
pub mod form;
pub mod input;
mod view;

pub use app::{App, ReportView, Screen};
pub use form::{CampaignForm, FormAction, LeadEditor};
pub use input::InputWidget;
