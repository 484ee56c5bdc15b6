//! Inbound commands to the application service.
//!
//! The gateway delivers raw `(topic, payload)` pairs as [`CommandRequest`]s;
//! [`AppCommand::from_request`] turns them into typed commands that the
//! [`AppService`](super::service::AppService) interprets and acts upon.
//! Payload literals are matched exactly (case-sensitive, no trimming).

use heapless::String;

use crate::config::SystemConfig;
use crate::error::CommandError;

/// Largest payload the gateway may deliver (settings JSON included).
pub const MAX_PAYLOAD: usize = 256;

/// Which gateway topic a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `ON` / `OFF` / `RESET`.
    Power,
    /// `1cup` / `2cup`.
    Brew,
    /// Partial settings JSON (`available`, `buzzer`, `debugging`).
    Settings,
    /// The gateway (re)established its upstream link; payload ignored.
    Connected,
}

/// A raw request as queued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub kind: CommandKind,
    pub value: String<MAX_PAYLOAD>,
}

impl CommandRequest {
    /// Build a request, failing if `value` exceeds [`MAX_PAYLOAD`].
    pub fn new(kind: CommandKind, value: &str) -> Result<Self, CommandError> {
        let value = String::try_from(value).map_err(|_| CommandError::Malformed)?;
        Ok(Self { kind, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerRequest {
    On,
    Off,
    /// Restart the bridge itself; the machine is not touched.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrewRequest {
    OneCup,
    TwoCup,
}

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Power(PowerRequest),
    Brew(BrewRequest),
    /// Hot-reload configuration.  Validated before it is applied.
    UpdateConfig(SystemConfig),
    /// Upstream link is up: play the connected cue and republish status.
    GatewayConnected,
}

impl AppCommand {
    /// Parse a gateway request.  `current` is the base for partial settings.
    pub fn from_request(req: &CommandRequest, current: &SystemConfig) -> Result<Self, CommandError> {
        let value = req.value.as_str();
        match req.kind {
            CommandKind::Power => match value {
                "ON" => Ok(Self::Power(PowerRequest::On)),
                "OFF" => Ok(Self::Power(PowerRequest::Off)),
                "RESET" => Ok(Self::Power(PowerRequest::Reset)),
                _ => Err(CommandError::Malformed),
            },
            CommandKind::Brew => match value {
                "1cup" => Ok(Self::Brew(BrewRequest::OneCup)),
                "2cup" => Ok(Self::Brew(BrewRequest::TwoCup)),
                _ => Err(CommandError::Malformed),
            },
            CommandKind::Settings => current
                .apply_gateway_json(value)
                .map(Self::UpdateConfig)
                .map_err(|_| CommandError::Malformed),
            CommandKind::Connected => Ok(Self::GatewayConnected),
        }
    }
}

/// What happened to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command was acted upon (a button press was started, or the
    /// config applied).
    Accepted,
    /// The machine is already where the command wanted it; nothing pressed.
    AlreadyInState,
    /// The caller must restart the bridge.
    ResetRequested,
    Rejected(CommandError),
}
