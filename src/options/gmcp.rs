//! Generic Mud Communication Protocol.
//!
//! Payloads are `<package name> SP <JSON body>`. The body is handed to
//! the host verbatim; this module never parses the JSON itself. Typed
//! egress goes through [`crate::Session::send_gmcp`].

use std::any::Any;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::GMCP;
use crate::{Role, SessionCore};

#[derive(Debug, Default)]
pub struct GmcpPlugin;

impl GmcpPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OptionPlugin for GmcpPlugin {
    fn name(&self) -> &'static str {
        "gmcp"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[GMCP]
    }

    fn interests(&self, _role: Role) -> Vec<Interest> {
        // Either side may offer GMCP.
        vec![
            Interest::new(GMCP, Side::Local),
            Interest::new(GMCP, Side::Remote),
        ]
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Will, GMCP)],
            Role::Client => Vec::new(),
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, _option: u8, payload: &Bytes) {
        if payload.is_empty() {
            warn!("empty GMCP message, ignoring");
            return;
        }
        let text = String::from_utf8_lossy(payload);
        match text.split_once(' ') {
            Some((package, json)) => core.notify_gmcp(package, json),
            None => {
                // Body-less messages such as `Core.Ping` are legal.
                debug!(package = %text, "GMCP message without body");
                core.notify_gmcp(&text, "");
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
