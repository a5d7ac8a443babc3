// bindery/src/workflow/mod.rs

//! The workflow contract and the providers that answer its information requests.

pub mod definition;
pub mod info;

pub use definition::{AdditionalData, InfoRequest, Report, Workflow};
pub use info::{AdditionalInfoProvider, ChannelInfoProvider, InfoPrompt, NoAdditionalInfo, StaticInfo};
