//! Authentication envelope (RFC 2941).
//!
//! Only the framing is implemented: the server offers its `(type,
//! modifier)` pairs in a `SEND` subnegotiation and relays the client's
//! `IS` reply to the host untouched. Credential evaluation is entirely
//! the host's business.

use std::any::Any;

use bytes::Bytes;
use tracing::warn;

use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::AUTHENTICATION;
use crate::telnet::op_subneg::{IS, SEND};
use crate::{Role, SessionCore};

/// AUTH type NULL, sent by a client with nothing to offer.
const AUTH_NULL: u8 = 0;

/// Authentication types offered (server) or supported (client), as
/// `(type, modifier)` pairs in preference order.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    pub types: Vec<(u8, u8)>,
}

#[derive(Debug, Default)]
pub struct AuthPlugin {
    config: AuthConfig,
}

impl AuthPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: AuthConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AuthConfig {
        &mut self.config
    }

    fn handle_send(&self, core: &mut SessionCore, offered: &[u8]) {
        core.notify_auth_request(offered);
        // Pick the first offered pair we also support; with no match (or
        // no configured types) answer IS NULL so the server can proceed.
        let chosen = offered
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .find(|pair| self.config.types.contains(pair));
        let reply = match chosen {
            Some((auth_type, modifier)) => vec![IS, auth_type, modifier],
            None => vec![IS, AUTH_NULL, 0],
        };
        core.send_subnegotiation(AUTHENTICATION, &reply);
    }
}

impl OptionPlugin for AuthPlugin {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[AUTHENTICATION]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![Interest::new(AUTHENTICATION, Side::Remote)],
            Role::Client => vec![Interest::new(AUTHENTICATION, Side::Local)],
        }
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Do, AUTHENTICATION)],
            Role::Client => Vec::new(),
        }
    }

    fn on_option_enabled(&mut self, core: &mut SessionCore, _option: u8, side: Side) {
        if core.role() == Role::Server && side == Side::Remote {
            let mut payload = vec![SEND];
            for (auth_type, modifier) in &self.config.types {
                payload.push(*auth_type);
                payload.push(*modifier);
            }
            core.send_subnegotiation(AUTHENTICATION, &payload);
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, _option: u8, payload: &Bytes) {
        match (core.role(), payload.split_first()) {
            (Role::Server, Some((&IS, rest))) => core.notify_auth_response(rest),
            (Role::Client, Some((&SEND, rest))) => self.handle_send(core, rest),
            (_, Some((subcommand, _))) => {
                warn!(subcommand, "unexpected AUTH subcommand for this role, ignoring");
            }
            (_, None) => warn!("empty AUTH subnegotiation, ignoring"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
