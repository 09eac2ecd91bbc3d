//! SEPP Main State Machine
//!
//! Port of src/sepp/sepp-sm.c - event dispatch for the operational state

use ogs_sbi::SbiContext;

use crate::context::{ContextState, SeppContext};
use crate::event::SeppEvent;
use crate::sbi_path::{self, status, StreamReply};

/// Dispatch one event. Returns the reply to send on an inbound stream, if
/// the event finished a request.
pub fn sepp_state_operational(
    ctx: &mut SeppContext,
    sbi: &SbiContext,
    event: SeppEvent,
) -> Option<StreamReply> {
    assert!(
        ctx.state() == ContextState::Running,
        "SEPP events dispatched before start"
    );
    log::debug!("sepp_state_operational(): {}", event.name());

    match event {
        SeppEvent::SbiServer { stream, routing } => {
            match sbi_path::handle_request(ctx, sbi, stream, routing) {
                Ok(_) => None,
                Err(e) => Some(StreamReply {
                    stream,
                    status: sbi_path::status_for_error(&e),
                }),
            }
        }
        SeppEvent::SbiClient { assoc, status } => match sbi_path::handle_response(ctx, assoc) {
            Ok(stream) => Some(StreamReply { stream, status }),
            Err(e) => {
                log::warn!("Response dropped: {}", e);
                None
            }
        },
        SeppEvent::SbiTimer { assoc } => match sbi_path::handle_timeout(ctx, assoc) {
            Ok(stream) => Some(StreamReply {
                stream,
                status: status::GATEWAY_TIMEOUT,
            }),
            Err(e) => {
                log::debug!("Timer for released association: {}", e);
                None
            }
        },
    }
}
