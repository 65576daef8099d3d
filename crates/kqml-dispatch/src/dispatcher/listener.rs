//! Read loop executed on the listener thread.

use kqml_config::MalformedPolicy;
use tracing::{debug, info, warn};

use super::DISPATCH_TARGET;
use super::DispatchCore;
use super::lifecycle::StoppedOnDrop;
use crate::reader::{ReadError, Reader};

/// Reads and dispatches until shutdown is requested or the stream ends, then
/// hands the reader back so `shutdown` can close it.
pub(super) fn run_read_loop<R: Reader>(core: &DispatchCore, mut reader: R) -> R {
    let _stopped = StoppedOnDrop(&core.lifecycle);
    let agent = core.agent.as_str();
    info!(target: DISPATCH_TARGET, agent, "dispatcher listening");

    while !core.shutdown_requested() {
        match reader.read_performative() {
            Ok(msg) => core.dispatch(&msg),
            Err(error) if error.is_stream_end() => {
                info!(target: DISPATCH_TARGET, agent, %error, "input stream ended");
                core.receiver.receive_end_of_stream();
                break;
            }
            Err(error @ ReadError::Malformed { .. }) => {
                handle_malformed(core, &error);
            }
            Err(error) => {
                if core.shutdown_requested() {
                    debug!(
                        target: DISPATCH_TARGET,
                        agent,
                        %error,
                        "suppressing read failure during shutdown"
                    );
                } else {
                    warn!(target: DISPATCH_TARGET, agent, %error, "read failed");
                    core.receiver.handle_exception(&error);
                }
                break;
            }
        }
    }

    info!(target: DISPATCH_TARGET, agent, "dispatcher stopped listening");
    reader
}

fn handle_malformed(core: &DispatchCore, error: &ReadError) {
    let agent = core.agent.as_str();
    match core.malformed_policy {
        MalformedPolicy::Discard => {
            debug!(target: DISPATCH_TARGET, agent, %error, "discarding malformed input");
        }
        MalformedPolicy::Log => {
            warn!(target: DISPATCH_TARGET, agent, %error, "discarding malformed input");
        }
        MalformedPolicy::Report => {
            warn!(target: DISPATCH_TARGET, agent, %error, "reporting malformed input");
            core.receiver.handle_exception(error);
        }
    }
}
