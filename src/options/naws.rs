//! Negotiate About Window Size (RFC 1073).
//!
//! The server asks `DO NAWS` at bring-up and stores the dimensions the
//! client reports; it never sends dimensions itself, so `DO NAWS` from a
//! peer is refused in server role. The client accepts `DO NAWS` and
//! reports through [`crate::Session::send_naws`].

use std::any::Any;

use bytes::Bytes;
use tracing::warn;

use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::NAWS;
use crate::{Role, SessionCore};

#[derive(Debug, Default)]
pub struct NawsPlugin;

impl NawsPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OptionPlugin for NawsPlugin {
    fn name(&self) -> &'static str {
        "naws"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[NAWS]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![Interest::new(NAWS, Side::Remote)],
            Role::Client => vec![Interest::new(NAWS, Side::Local)],
        }
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Do, NAWS)],
            Role::Client => Vec::new(),
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, _option: u8, payload: &Bytes) {
        if core.role() != Role::Server {
            warn!("NAWS subnegotiation in client role, ignoring");
            return;
        }
        if payload.len() != 4 {
            warn!(len = payload.len(), "NAWS payload is not 4 bytes, ignoring");
            return;
        }
        let width = u16::from_be_bytes([payload[0], payload[1]]);
        let height = u16::from_be_bytes([payload[2], payload[3]]);
        core.set_window_size(width, height);
        // Callback contract is height before width.
        core.notify_naws(height, width);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
