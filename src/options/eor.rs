//! End of Record negotiation (RFC 885).
//!
//! Once agreed, the server terminates prompts with `IAC EOR` instead of
//! a newline; the client surfaces each `IAC EOR` as a prompt callback.
//! The prompt marker itself is handled by the decoder; this plugin only
//! negotiates the option.

use std::any::Any;

use bytes::Bytes;
use tracing::warn;

use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::TELOPT_EOR;
use crate::{Role, SessionCore};

#[derive(Debug, Default)]
pub struct EorPlugin;

impl EorPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OptionPlugin for EorPlugin {
    fn name(&self) -> &'static str {
        "eor"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[TELOPT_EOR]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![Interest::new(TELOPT_EOR, Side::Local)],
            Role::Client => vec![Interest::new(TELOPT_EOR, Side::Remote)],
        }
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Will, TELOPT_EOR)],
            Role::Client => Vec::new(),
        }
    }

    fn on_subnegotiation(&mut self, _core: &mut SessionCore, _option: u8, _payload: &Bytes) {
        warn!("EOR has no subnegotiation, ignoring");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
