//! Terminal Type (RFC 1091).
//!
//! The server cycles `SB TTYPE SEND` requests; the client answers
//! `SB TTYPE IS <name>` from its configured list, repeating the last
//! entry once exhausted. The server stops when a name repeats or after
//! eight entries, whichever comes first.

use std::any::Any;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::TTYPE;
use crate::telnet::op_subneg::{IS, SEND};
use crate::{Role, SessionCore};

const MAX_TYPES: usize = 8;

#[derive(Debug, Default)]
pub struct TtypePlugin {
    /// Client: types to report, in order.
    client_types: Vec<String>,
    /// Client: how many SENDs have been answered.
    cursor: usize,
    /// Server: unique types collected, in arrival order.
    collected: Vec<String>,
    /// Server: cycling finished.
    done: bool,
}

impl TtypePlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the client-side terminal type list.
    #[must_use]
    pub fn with_client_types(types: Vec<String>) -> Self {
        Self {
            client_types: types,
            ..Self::default()
        }
    }

    pub fn set_client_types(&mut self, types: Vec<String>) {
        self.client_types = types;
        self.cursor = 0;
    }

    /// Server: the unique terminal types the client reported so far.
    #[must_use]
    pub fn terminal_types(&self) -> &[String] {
        &self.collected
    }

    /// Server: true once the client's list has been fully cycled.
    #[must_use]
    pub fn cycling_done(&self) -> bool {
        self.done
    }

    fn handle_is(&mut self, core: &mut SessionCore, name: &str) {
        if self.done {
            return;
        }
        if self.collected.iter().any(|known| known == name) {
            // A repeat marks the end of the client's list.
            debug!(name, "terminal type repeated, cycling done");
            self.done = true;
            return;
        }
        self.collected.push(name.to_owned());
        if self.collected.len() >= MAX_TYPES {
            debug!("terminal type limit reached, cycling done");
            self.done = true;
            return;
        }
        core.send_subnegotiation(TTYPE, &[SEND]);
    }

    fn handle_send(&mut self, core: &mut SessionCore) {
        let name = if self.client_types.is_empty() {
            "UNKNOWN"
        } else {
            let index = self.cursor.min(self.client_types.len() - 1);
            self.client_types[index].as_str()
        };
        self.cursor = self.cursor.saturating_add(1);
        let mut payload = Vec::with_capacity(1 + name.len());
        payload.push(IS);
        payload.extend_from_slice(name.as_bytes());
        core.send_subnegotiation(TTYPE, &payload);
    }
}

impl OptionPlugin for TtypePlugin {
    fn name(&self) -> &'static str {
        "ttype"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[TTYPE]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![Interest::new(TTYPE, Side::Remote)],
            Role::Client => vec![Interest::new(TTYPE, Side::Local)],
        }
    }

    fn on_option_enabled(&mut self, core: &mut SessionCore, _option: u8, side: Side) {
        if core.role() == Role::Server && side == Side::Remote {
            self.collected.clear();
            self.done = false;
            core.send_subnegotiation(TTYPE, &[SEND]);
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, _option: u8, payload: &Bytes) {
        match payload.first() {
            Some(&IS) if core.role() == Role::Server => {
                let name = String::from_utf8_lossy(&payload[1..]).into_owned();
                self.handle_is(core, name.trim_end_matches('\0'));
            }
            Some(&SEND) if core.role() == Role::Client => self.handle_send(core),
            Some(subcommand) => {
                warn!(subcommand, "unexpected TTYPE subcommand for this role, ignoring");
            }
            None => warn!("empty TTYPE subnegotiation, ignoring"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod test_ttype {
    use super::*;
    use crate::Callbacks;

    fn server_core() -> SessionCore {
        SessionCore::new(Role::Server, Callbacks::default())
    }

    #[test]
    fn repeat_ends_cycling() {
        let mut core = server_core();
        let mut plugin = TtypePlugin::new();
        plugin.handle_is(&mut core, "ANSI");
        plugin.handle_is(&mut core, "VT100");
        plugin.handle_is(&mut core, "VT100");
        assert!(plugin.cycling_done());
        assert_eq!(plugin.terminal_types(), ["ANSI", "VT100"]);
    }

    #[test]
    fn eighth_entry_ends_cycling() {
        let mut core = server_core();
        let mut plugin = TtypePlugin::new();
        for i in 0..MAX_TYPES {
            plugin.handle_is(&mut core, &format!("TERM{i}"));
        }
        assert!(plugin.cycling_done());
        assert_eq!(plugin.terminal_types().len(), MAX_TYPES);
    }

    #[test]
    fn client_repeats_last_type() {
        let mut core = SessionCore::new(Role::Client, Callbacks::default());
        let mut plugin =
            TtypePlugin::with_client_types(vec!["ANSI".into(), "VT100".into()]);
        for _ in 0..3 {
            plugin.handle_send(&mut core);
        }
        assert_eq!(plugin.cursor, 3);
    }
}
