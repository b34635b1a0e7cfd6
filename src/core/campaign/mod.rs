//! Campaign Module
//!
//! The category catalog and the campaign creation wizard.

pub mod category;
pub mod wizard;

pub use category::Category;
pub use wizard::{
    CampaignSubmission, CampaignSubmitter, DraftCampaign, Transition, WizardController,
    WizardField, WizardStep,
};
