//! Extraction-log-guarded updates.
//!
//! Every extraction attempt is appended to the audit store first, then
//! conditionally applied to its target entity. A manually-verified entity is
//! never touched. The generic workflow lives in `workflow`; the per-entity
//! adapters supply fetch/save and the partial-merge field mapping.

pub mod adapter;
pub mod membership;
pub mod politician;
pub mod speaker;
pub mod statement;
pub mod workflow;

pub use adapter::EntityAdapter;
pub use membership::{MembershipAdapter, MembershipExtraction};
pub use politician::{PoliticianAdapter, PoliticianExtraction};
pub use speaker::{SpeakerAdapter, SpeakerLinkExtraction};
pub use statement::{StatementAdapter, StatementExtraction};
pub use workflow::UpdateWorkflow;
