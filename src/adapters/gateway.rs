//! Gateway command inbox.
//!
//! Whatever control-plane transport is attached (MQTT bridge, serial
//! console, HTTP) pushes raw [`CommandRequest`]s here from its own task;
//! the poll loop drains them between ticks.  Bounded, non-blocking on both
//! ends, no heap.
//!
//! ```text
//! ┌──────────────┐ CommandRequest ┌──────────────┐
//! │  transport   │───────────────▶│  poll loop    │
//! │  (any task)  │   try_send     │  try_receive  │
//! └──────────────┘                └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::{CommandKind, CommandRequest};
use crate::error::CommandError;

/// Inbox depth.  Commands are human-rate; a full inbox means the poll loop
/// is stalled and newer requests are refused.
pub const INBOX_DEPTH: usize = 4;

pub type Inbox = Channel<CriticalSectionRawMutex, CommandRequest, INBOX_DEPTH>;

/// The firmware's single inbox.
pub static COMMAND_INBOX: Inbox = Channel::new();

/// Transport-side handle.
#[derive(Clone, Copy)]
pub struct GatewaySender {
    inbox: &'static Inbox,
}

impl GatewaySender {
    pub const fn new(inbox: &'static Inbox) -> Self {
        Self { inbox }
    }

    /// Queue a request.  Fails with `Malformed` if the payload is too long
    /// and `Busy` if the inbox is full.
    pub fn submit(&self, kind: CommandKind, value: &str) -> Result<(), CommandError> {
        let req = CommandRequest::new(kind, value)?;
        self.inbox.try_send(req).map_err(|_| {
            warn!("gateway: inbox full, dropping {:?} request", kind);
            CommandError::Busy
        })
    }
}

/// Poll-loop-side handle.
pub struct GatewayReceiver {
    inbox: &'static Inbox,
}

impl GatewayReceiver {
    pub const fn new(inbox: &'static Inbox) -> Self {
        Self { inbox }
    }

    /// Next queued request, if any.  Never blocks.
    pub fn poll(&self) -> Option<CommandRequest> {
        self.inbox.try_receive().ok()
    }
}
