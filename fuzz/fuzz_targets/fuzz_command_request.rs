//! Fuzz target: `AppCommand::from_request`
//!
//! The first byte picks the gateway topic, the rest is the payload.  Parsing
//! must never panic, and anything that parses must be one of the exact
//! literals (or, for settings, a config that passes validation).
//!
//! cargo fuzz run fuzz_command_request

#![no_main]

use critical_section as _;
use libfuzzer_sys::fuzz_target;
use senseo_bridge::app::commands::{AppCommand, CommandKind, CommandRequest};
use senseo_bridge::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let kind = match selector % 4 {
        0 => CommandKind::Power,
        1 => CommandKind::Brew,
        2 => CommandKind::Settings,
        _ => CommandKind::Connected,
    };
    let Ok(value) = core::str::from_utf8(payload) else {
        return;
    };
    let Ok(req) = CommandRequest::new(kind, value) else {
        return;
    };

    let current = SystemConfig::default();
    match AppCommand::from_request(&req, &current) {
        Ok(AppCommand::Power(_)) => assert!(matches!(value, "ON" | "OFF" | "RESET")),
        Ok(AppCommand::Brew(_)) => assert!(matches!(value, "1cup" | "2cup")),
        Ok(AppCommand::UpdateConfig(cfg)) => assert!(cfg.validate().is_ok()),
        Ok(AppCommand::GatewayConnected) => assert_eq!(kind, CommandKind::Connected),
        Err(_) => assert_ne!(kind, CommandKind::Connected),
    }
});
