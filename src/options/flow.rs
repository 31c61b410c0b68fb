//! Remote flow control (RFC 1372).
//!
//! The server asks `DO FLOWCONTROL` at bring-up; subcommands toggle flow
//! control or select the restart discipline, and each one is relayed to
//! the matching host callback.

use std::any::Any;

use bytes::Bytes;
use tracing::warn;

use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::FLOWCONTROL;
use crate::telnet::op_subneg::flow::{OFF, ON, RESTART_ANY, RESTART_XON};
use crate::{Role, SessionCore};

/// Which input restarts suspended output.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FlowRestart {
    /// Any input character restarts output.
    Any,
    /// Only XON restarts output.
    XonOnly,
}

#[derive(Debug, Default)]
pub struct FlowControlPlugin {
    enabled: bool,
    restart: Option<FlowRestart>,
}

impl FlowControlPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn flow_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn restart_mode(&self) -> Option<FlowRestart> {
        self.restart
    }
}

impl OptionPlugin for FlowControlPlugin {
    fn name(&self) -> &'static str {
        "flowcontrol"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[FLOWCONTROL]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![Interest::new(FLOWCONTROL, Side::Remote)],
            Role::Client => vec![Interest::new(FLOWCONTROL, Side::Local)],
        }
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Do, FLOWCONTROL)],
            Role::Client => Vec::new(),
        }
    }

    fn on_option_enabled(&mut self, core: &mut SessionCore, _option: u8, _side: Side) {
        self.enabled = true;
        core.notify_flow_control(true);
    }

    fn on_option_disabled(&mut self, core: &mut SessionCore, _option: u8, _side: Side) {
        if self.enabled {
            self.enabled = false;
            core.notify_flow_control(false);
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, _option: u8, payload: &Bytes) {
        match payload.first() {
            Some(&OFF) => {
                self.enabled = false;
                core.notify_flow_control(false);
            }
            Some(&ON) => {
                self.enabled = true;
                core.notify_flow_control(true);
            }
            Some(&RESTART_ANY) => {
                self.restart = Some(FlowRestart::Any);
                core.notify_flow_restart(FlowRestart::Any);
            }
            Some(&RESTART_XON) => {
                self.restart = Some(FlowRestart::XonOnly);
                core.notify_flow_restart(FlowRestart::XonOnly);
            }
            Some(subcommand) => {
                warn!(subcommand, "unknown FLOWCONTROL subcommand, ignoring");
            }
            None => warn!("empty FLOWCONTROL subnegotiation, ignoring"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
