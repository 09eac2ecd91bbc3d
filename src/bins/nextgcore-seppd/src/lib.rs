//! NextGCore SEPP (Security Edge Protection Proxy) Library
//!
//! Control-plane state of the SEPP:
//! - Directory of peer SEPPs, looked up by domain name or PLMN ID
//! - Registry of in-flight associations between inbound streams and peers
//! - Context lifecycle (init, prepare, validate, start, final)
//! - Ingestion of the `sepp` configuration section

pub mod assoc;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod node;
pub mod sbi_path;
pub mod sepp_sm;

mod property_tests;

pub use assoc::{AssocHandle, AssocRegistry, PeerClientRef, SeppAssoc};
pub use context::{
    pool_sizes, ContextState, SecurityCapabilityConfig, SeppContext,
    MAX_NUM_OF_SEPP_ASSOC_PER_UE,
};
pub use error::{SeppError, SeppResult};
pub use event::SeppEvent;
pub use node::{NodeDirectory, NodeHandle, PlmnId, SeppNode, MAX_NUM_OF_PLMN};
pub use sbi_path::{handle_request, handle_response, handle_timeout, RoutingInfo, StreamReply};
pub use sepp_sm::sepp_state_operational;
