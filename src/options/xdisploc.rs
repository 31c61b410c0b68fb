//! X Display Location (RFC 1096).

use std::any::Any;

use bytes::Bytes;
use tracing::warn;

use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::XDISPLOC;
use crate::telnet::op_subneg::{IS, SEND};
use crate::{Role, SessionCore};

#[derive(Debug, Default)]
pub struct XdisplocPlugin {
    /// Client: the display string to report, e.g. `host:0.0`.
    display: String,
    /// Server: the display string the client reported.
    reported: Option<String>,
}

impl XdisplocPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_display(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            reported: None,
        }
    }

    pub fn set_display(&mut self, display: impl Into<String>) {
        self.display = display.into();
    }

    #[must_use]
    pub fn reported(&self) -> Option<&str> {
        self.reported.as_deref()
    }
}

impl OptionPlugin for XdisplocPlugin {
    fn name(&self) -> &'static str {
        "xdisploc"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[XDISPLOC]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![Interest::new(XDISPLOC, Side::Remote)],
            Role::Client => vec![Interest::new(XDISPLOC, Side::Local)],
        }
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Do, XDISPLOC)],
            Role::Client => Vec::new(),
        }
    }

    fn on_option_enabled(&mut self, core: &mut SessionCore, _option: u8, side: Side) {
        if core.role() == Role::Server && side == Side::Remote {
            core.send_subnegotiation(XDISPLOC, &[SEND]);
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, _option: u8, payload: &Bytes) {
        match (core.role(), payload.split_first()) {
            (Role::Server, Some((&IS, rest))) => {
                let display = String::from_utf8_lossy(rest).into_owned();
                core.notify_xdisplay(&display);
                self.reported = Some(display);
            }
            (Role::Client, Some((&SEND, _))) => {
                let mut reply = vec![IS];
                reply.extend_from_slice(self.display.as_bytes());
                core.send_subnegotiation(XDISPLOC, &reply);
            }
            (_, Some((subcommand, _))) => {
                warn!(subcommand, "unexpected XDISPLOC subcommand for this role, ignoring");
            }
            (_, None) => warn!("empty XDISPLOC subnegotiation, ignoring"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
