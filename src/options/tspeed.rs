//! Terminal Speed (RFC 1079).
//!
//! The server asks and the client answers `IS "<tx>,<rx>"` with decimal
//! baud rates. Malformed replies are logged and dropped.

use std::any::Any;

use bytes::Bytes;
use tracing::warn;

use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::TSPEED;
use crate::telnet::op_subneg::{IS, SEND};
use crate::{Role, SessionCore};

/// The baud rates a client reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TspeedConfig {
    pub tx: u32,
    pub rx: u32,
}

impl Default for TspeedConfig {
    fn default() -> Self {
        Self {
            tx: 38400,
            rx: 38400,
        }
    }
}

#[derive(Debug, Default)]
pub struct TspeedPlugin {
    config: TspeedConfig,
    /// Server: the rates the client reported.
    reported: Option<(u32, u32)>,
}

impl TspeedPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: TspeedConfig) -> Self {
        Self {
            config,
            reported: None,
        }
    }

    pub fn config_mut(&mut self) -> &mut TspeedConfig {
        &mut self.config
    }

    /// Server: the last `(tx, rx)` pair the client reported.
    #[must_use]
    pub fn reported(&self) -> Option<(u32, u32)> {
        self.reported
    }

    fn handle_is(&mut self, core: &mut SessionCore, payload: &[u8]) {
        let text = String::from_utf8_lossy(payload);
        let Some((tx, rx)) = parse_speeds(&text) else {
            warn!(reply = %text, "malformed TSPEED reply, ignoring");
            return;
        };
        self.reported = Some((tx, rx));
        core.notify_terminal_speed(tx, rx);
    }
}

fn parse_speeds(text: &str) -> Option<(u32, u32)> {
    let (tx, rx) = text.trim().split_once(',')?;
    Some((tx.trim().parse().ok()?, rx.trim().parse().ok()?))
}

impl OptionPlugin for TspeedPlugin {
    fn name(&self) -> &'static str {
        "tspeed"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[TSPEED]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![Interest::new(TSPEED, Side::Remote)],
            Role::Client => vec![Interest::new(TSPEED, Side::Local)],
        }
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Do, TSPEED)],
            Role::Client => Vec::new(),
        }
    }

    fn on_option_enabled(&mut self, core: &mut SessionCore, _option: u8, side: Side) {
        if core.role() == Role::Server && side == Side::Remote {
            core.send_subnegotiation(TSPEED, &[SEND]);
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, _option: u8, payload: &Bytes) {
        match (core.role(), payload.split_first()) {
            (Role::Server, Some((&IS, rest))) => self.handle_is(core, rest),
            (Role::Client, Some((&SEND, _))) => {
                let reply = format!("{},{}", self.config.tx, self.config.rx);
                let mut payload = vec![IS];
                payload.extend_from_slice(reply.as_bytes());
                core.send_subnegotiation(TSPEED, &payload);
            }
            (_, Some((subcommand, _))) => {
                warn!(subcommand, "unexpected TSPEED subcommand for this role, ignoring");
            }
            (_, None) => warn!("empty TSPEED subnegotiation, ignoring"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
