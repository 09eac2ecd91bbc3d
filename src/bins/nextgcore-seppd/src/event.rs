//! SEPP Event Definitions
//!
//! Port of src/sepp/event.h and event.c - Event definitions for SEPP

use ogs_sbi::StreamId;

use crate::assoc::AssocHandle;
use crate::sbi_path::RoutingInfo;

/// Events delivered to the control thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeppEvent {
    /// Incoming request on an SBI server stream
    SbiServer {
        stream: StreamId,
        routing: RoutingInfo,
    },
    /// Response to a forwarded request
    SbiClient { assoc: AssocHandle, status: u16 },
    /// Forwarded request expired
    SbiTimer { assoc: AssocHandle },
}

impl SeppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SeppEvent::SbiServer { .. } => "OGS_EVENT_SBI_SERVER",
            SeppEvent::SbiClient { .. } => "OGS_EVENT_SBI_CLIENT",
            SeppEvent::SbiTimer { .. } => "OGS_EVENT_SBI_TIMER",
        }
    }
}
