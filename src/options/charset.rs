//! Character set negotiation (RFC 2066).
//!
//! The server advertises `WILL CHARSET` and, once the option is agreed on
//! either side, sends a `REQUEST` subnegotiation listing its candidate
//! charsets, each preceded by the separator byte. The client answers
//! `ACCEPTED <name>` or `REJECTED`. Both ends switch the session text
//! encoding at the byte immediately after the `IAC SE` closing the
//! `ACCEPTED` frame: the acceptor switches as it emits it, the requester
//! as it processes it.

use std::any::Any;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::encoding::TextEncoding;
use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::CHARSET;
use crate::telnet::op_subneg::charset::{
    ACCEPTED, REJECTED, REQUEST, TTABLE_IS, TTABLE_REJECTED,
};
use crate::{Role, SessionCore};

/// Charset negotiation knobs.
#[derive(Clone, Debug)]
pub struct CharsetConfig {
    /// Separator byte used in REQUEST payloads. `;` per the common
    /// interpretation; some peers expect `,`.
    pub separator: u8,
    /// Charsets offered (server) or acceptable (client), most preferred
    /// first.
    pub preference: Vec<TextEncoding>,
}

impl Default for CharsetConfig {
    fn default() -> Self {
        Self {
            separator: b';',
            preference: TextEncoding::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CharsetPlugin {
    config: CharsetConfig,
    requested: bool,
}

impl CharsetPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: CharsetConfig) -> Self {
        Self {
            config,
            requested: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CharsetConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CharsetConfig {
        &mut self.config
    }

    fn send_request(&mut self, core: &mut SessionCore) {
        self.requested = true;
        let mut payload = vec![REQUEST];
        for encoding in &self.config.preference {
            payload.push(self.config.separator);
            payload.extend_from_slice(encoding.name().as_bytes());
        }
        core.send_subnegotiation(CHARSET, &payload);
    }

    fn handle_request(&self, core: &mut SessionCore, payload: &[u8]) {
        // The byte after REQUEST is the separator in force for this
        // frame.
        let Some((&separator, names)) = payload.split_first() else {
            warn!("empty CHARSET REQUEST, rejecting");
            core.send_subnegotiation(CHARSET, &[REJECTED]);
            return;
        };
        let chosen = names
            .split(|&b| b == separator)
            .filter(|name| !name.is_empty())
            .find_map(|name| {
                let text = String::from_utf8_lossy(name);
                TextEncoding::from_name(&text)
                    .filter(|enc| self.config.preference.contains(enc))
                    .map(|enc| (enc, name.to_vec()))
            });
        match chosen {
            Some((encoding, name)) => {
                let mut reply = vec![ACCEPTED];
                reply.extend_from_slice(&name);
                core.send_subnegotiation(CHARSET, &reply);
                // Encoding changes for every byte after the SE just sent.
                core.set_encoding(encoding);
            }
            None => {
                debug!("no acceptable charset in REQUEST, rejecting");
                core.send_subnegotiation(CHARSET, &[REJECTED]);
            }
        }
    }

    fn handle_accepted(core: &mut SessionCore, name: &[u8]) {
        let text = String::from_utf8_lossy(name);
        match TextEncoding::from_name(&text) {
            Some(encoding) => core.set_encoding(encoding),
            None => warn!(name = %text, "peer accepted a charset we do not know, keeping current"),
        }
    }
}

impl OptionPlugin for CharsetPlugin {
    fn name(&self) -> &'static str {
        "charset"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[CHARSET]
    }

    fn interests(&self, _role: Role) -> Vec<Interest> {
        // Either side may WILL; accept both directions in both roles.
        vec![
            Interest::new(CHARSET, Side::Local),
            Interest::new(CHARSET, Side::Remote),
        ]
    }

    fn initial_negotiations(&self, _role: Role) -> Vec<(Verb, u8)> {
        vec![(Verb::Will, CHARSET)]
    }

    fn on_option_enabled(&mut self, core: &mut SessionCore, _option: u8, _side: Side) {
        if core.role() == Role::Server && !self.requested {
            self.send_request(core);
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, _option: u8, payload: &Bytes) {
        match payload.split_first() {
            Some((&REQUEST, rest)) => self.handle_request(core, rest),
            Some((&ACCEPTED, name)) => Self::handle_accepted(core, name),
            Some((&REJECTED, _)) => debug!("peer rejected our charset request"),
            Some((&TTABLE_IS, _)) => {
                // Translation tables are not supported.
                core.send_subnegotiation(CHARSET, &[TTABLE_REJECTED]);
            }
            Some((subcommand, _)) => {
                warn!(subcommand, "unknown CHARSET subcommand, ignoring");
            }
            None => warn!("empty CHARSET subnegotiation, ignoring"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
