//! Suppress Go Ahead (RFC 858).
//!
//! Offered unconditionally by the server at bring-up. Once agreed,
//! [`crate::Session::send_go_ahead`] becomes a no-op.

use std::any::Any;

use bytes::Bytes;
use tracing::warn;

use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::SUPPRESS_GO_AHEAD;
use crate::{Role, SessionCore};

#[derive(Debug, Default)]
pub struct SgaPlugin;

impl SgaPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OptionPlugin for SgaPlugin {
    fn name(&self) -> &'static str {
        "sga"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[SUPPRESS_GO_AHEAD]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![Interest::new(SUPPRESS_GO_AHEAD, Side::Local)],
            Role::Client => vec![Interest::new(SUPPRESS_GO_AHEAD, Side::Remote)],
        }
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Will, SUPPRESS_GO_AHEAD)],
            Role::Client => Vec::new(),
        }
    }

    fn on_subnegotiation(&mut self, _core: &mut SessionCore, _option: u8, _payload: &Bytes) {
        warn!("SGA has no subnegotiation, ignoring");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
