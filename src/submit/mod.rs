pub mod client;
pub mod payload;
pub mod request;

pub use client::{ConfigSubmitter, HttpSubmitter, SubmitError, NO_RESPONSE_TEXT};
pub use payload::{
    assemble_legacy_config, assemble_node_config, AdminSection, BanmanSection, LegacyAdminSection,
    LegacyConfig, NodeConfig, PayloadError, SubmissionPayload, ValidatorSection,
};
pub use request::{RequestError, RequestEvent, RequestState, RequestTracker};
