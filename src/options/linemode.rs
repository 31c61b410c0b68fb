//! Linemode (RFC 1184).
//!
//! The client accepts `DO LINEMODE` and acknowledges MODE frames by
//! echoing the flags with the ACK bit set. SLC and FORWARDMASK
//! subnegotiations are parsed to completion but deliberately not
//! interpreted; their content is logged.

use std::any::Any;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::LINEMODE;
use crate::telnet::op_subneg::linemode::{FORWARDMASK, MODE, MODE_ACK, SLC};
use crate::{Role, SessionCore};

#[derive(Debug, Default)]
pub struct LinemodePlugin {
    mode: u8,
}

impl LinemodePlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last MODE flags seen (without the ACK bit).
    #[must_use]
    pub fn mode_flags(&self) -> u8 {
        self.mode
    }

    fn handle_mode(&mut self, core: &mut SessionCore, flags: u8) {
        if flags & MODE_ACK != 0 {
            // An acknowledgement; never re-ack it.
            self.mode = flags & !MODE_ACK;
            debug!(flags = self.mode, "linemode MODE acknowledged");
            return;
        }
        self.mode = flags;
        if core.role() == Role::Client {
            core.send_subnegotiation(LINEMODE, &[MODE, flags | MODE_ACK]);
        }
    }

    fn log_slc(payload: &[u8]) {
        let triplets = payload.chunks_exact(3).count();
        if payload.len() % 3 != 0 {
            warn!(len = payload.len(), "SLC payload is not a whole number of triplets");
        }
        debug!(triplets, "linemode SLC received, not interpreted");
    }
}

impl OptionPlugin for LinemodePlugin {
    fn name(&self) -> &'static str {
        "linemode"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[LINEMODE]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![Interest::new(LINEMODE, Side::Remote)],
            Role::Client => vec![Interest::new(LINEMODE, Side::Local)],
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, _option: u8, payload: &Bytes) {
        match payload.split_first() {
            Some((&MODE, rest)) => match rest.first() {
                Some(&flags) => self.handle_mode(core, flags),
                None => warn!("MODE subnegotiation without a flags byte, ignoring"),
            },
            Some((&SLC, rest)) => Self::log_slc(rest),
            Some((&FORWARDMASK, _)) => {
                debug!("linemode FORWARDMASK received, not interpreted");
            }
            // RFC 1184 nests DO/DONT/WILL/WONT FORWARDMASK inside the
            // subnegotiation.
            Some((&verb, rest)) if (251..=254).contains(&verb) => {
                debug!(verb, len = rest.len(), "linemode forwardmask negotiation, not interpreted");
            }
            Some((subcommand, _)) => {
                warn!(subcommand, "unknown LINEMODE subcommand, ignoring");
            }
            None => warn!("empty LINEMODE subnegotiation, ignoring"),
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
mod test_linemode {
    use super::*;
    use crate::telnet::op_subneg::linemode::MODE_EDIT;
    use crate::Callbacks;

    #[test]
    fn client_acks_mode_with_ack_bit() {
        let mut core = SessionCore::new(Role::Client, Callbacks::default());
        let mut plugin = LinemodePlugin::new();
        plugin.on_subnegotiation(&mut core, LINEMODE, &Bytes::from_static(&[MODE, MODE_EDIT]));
        assert_eq!(plugin.mode_flags(), MODE_EDIT);
        let wire = core.take_wire();
        assert_eq!(
            &wire[..],
            &[255, 250, LINEMODE, MODE, MODE_EDIT | MODE_ACK, 255, 240]
        );
    }

    #[test]
    fn ack_is_not_reacked() {
        let mut core = SessionCore::new(Role::Client, Callbacks::default());
        let mut plugin = LinemodePlugin::new();
        plugin.on_subnegotiation(
            &mut core,
            LINEMODE,
            &Bytes::copy_from_slice(&[MODE, MODE_EDIT | MODE_ACK]),
        );
        assert_eq!(plugin.mode_flags(), MODE_EDIT);
        assert!(core.take_wire().is_empty());
    }
}
