//! Mud Client Compression Protocol, v2 and v3.
//!
//! MCCP2 compresses server-to-client traffic, MCCP3 client-to-server.
//! Both are announced with `WILL` from the server. The compressing side
//! marks the switch-over point by sending the empty subnegotiation
//! `IAC SB <opt> IAC SE` and compresses every byte after that `SE`; the
//! receiving side installs its inflater the moment it processes the
//! frame, so the very next transport byte is treated as compressed.
//!
//! MCCP1 (option 85) used a malformed subnegotiation and is deliberately
//! not offered; an unsolicited `WILL MCCP1` is refused like any other
//! unregistered option.

use std::any::Any;

use bytes::Bytes;
use tracing::warn;

use crate::compress::MccpVersion;
use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::{MCCP2, MCCP3};
use crate::{Role, SessionCore};

#[derive(Debug, Default)]
pub struct MccpPlugin;

impl MccpPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OptionPlugin for MccpPlugin {
    fn name(&self) -> &'static str {
        "mccp"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[MCCP2, MCCP3]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            // The server WILLs both variants.
            Role::Server => vec![
                Interest::new(MCCP2, Side::Local),
                Interest::new(MCCP3, Side::Local),
            ],
            Role::Client => vec![
                Interest::new(MCCP2, Side::Remote),
                Interest::new(MCCP3, Side::Remote),
            ],
        }
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Will, MCCP2), (Verb::Will, MCCP3)],
            Role::Client => Vec::new(),
        }
    }

    fn on_option_enabled(&mut self, core: &mut SessionCore, option: u8, _side: Side) {
        match (core.role(), option) {
            // DO MCCP2 arrived: mark the boundary, then compress
            // everything after it.
            (Role::Server, MCCP2) => {
                core.send_subnegotiation(MCCP2, &[]);
                core.begin_egress_compression(MccpVersion::V2);
            }
            // We accepted WILL MCCP3: announce and start compressing our
            // own egress.
            (Role::Client, MCCP3) => {
                core.send_subnegotiation(MCCP3, &[]);
                core.begin_egress_compression(MccpVersion::V3);
            }
            // MCCP2 at the client / MCCP3 at the server start on the
            // peer's subnegotiation marker, not on the negotiation.
            _ => {}
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, option: u8, payload: &Bytes) {
        if !payload.is_empty() {
            warn!(option, len = payload.len(), "MCCP subnegotiation with unexpected payload, ignoring");
            return;
        }
        match (core.role(), option) {
            (Role::Client, MCCP2) => core.begin_ingress_decompression(MccpVersion::V2),
            (Role::Server, MCCP3) => core.begin_ingress_decompression(MccpVersion::V3),
            _ => warn!(option, "unexpected MCCP subnegotiation for this role, ignoring"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
