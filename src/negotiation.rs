//! RFC 1143 "Q method" option negotiation.
//!
//! The [`Table`] is the single writer of per-option state. Every incoming
//! verb is answered with at most one outgoing verb, which is what breaks
//! WILL/DO reflection loops between two naive endpoints.

use tracing::{debug, warn};

use crate::events::Verb;

const TABLE_SIZE: usize = 1 + u8::MAX as usize;

/// Q-method state for one option on one side.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum QState {
    /// Disabled, at rest.
    #[default]
    No,
    /// We asked to enable and await the answer.
    WantYesEmpty,
    /// We asked to enable, then changed our mind before the answer.
    WantYesOpposite,
    /// Enabled, at rest.
    Yes,
    /// We asked to disable and await the answer.
    WantNoEmpty,
    /// We asked to disable, then changed our mind before the answer.
    WantNoOpposite,
}

impl QState {
    /// True only in the enabled steady state.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self == QState::Yes
    }
}

/// Which end of the connection an option state describes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Side {
    /// Our own behaviour (negotiated with WILL/WONT from us, DO/DONT from
    /// the peer).
    Local,
    /// The peer's behaviour.
    Remote,
}

/// Negotiation state for a single option: one Q state per side, plus the
/// support flags derived from the registered plugins.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Entry {
    local: QState,
    remote: QState,
    local_support: bool,
    remote_support: bool,
}

impl Entry {
    #[must_use]
    pub fn state(&self, side: Side) -> QState {
        match side {
            Side::Local => self.local,
            Side::Remote => self.remote,
        }
    }

    fn set_state(&mut self, side: Side, state: QState) {
        match side {
            Side::Local => self.local = state,
            Side::Remote => self.remote = state,
        }
    }

    #[must_use]
    pub fn supported(&self, side: Side) -> bool {
        match side {
            Side::Local => self.local_support,
            Side::Remote => self.remote_support,
        }
    }

    pub fn set_support(&mut self, side: Side) {
        match side {
            Side::Local => self.local_support = true,
            Side::Remote => self.remote_support = true,
        }
    }

    #[must_use]
    pub fn enabled(&self, side: Side) -> bool {
        self.state(side).is_enabled()
    }

    /// Enabled on at least one side.
    #[must_use]
    pub fn enabled_anywhere(&self) -> bool {
        self.local.is_enabled() || self.remote.is_enabled()
    }
}

/// An enable/disable edge produced by a state transition, to be relayed
/// to the owning plugin.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Edge {
    pub option: u8,
    pub side: Side,
    pub enabled: bool,
}

/// The table's decision for one incoming negotiation command.
#[derive(Debug, Default)]
pub struct Reaction {
    /// At most one reply verb for the same option.
    pub reply: Option<Verb>,
    /// Enable/disable edge, if the transition crossed one.
    pub edge: Option<Edge>,
}

/// The per-session option negotiation table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Table {
    options: [Entry; TABLE_SIZE],
}

impl Default for Table {
    fn default() -> Self {
        Self {
            options: [Entry::default(); TABLE_SIZE],
        }
    }
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn option(&self, option: u8) -> &Entry {
        &self.options[option as usize]
    }

    fn option_mut(&mut self, option: u8) -> &mut Entry {
        &mut self.options[option as usize]
    }

    /// Declare that a registered plugin accepts this option on `side`.
    pub fn support(&mut self, option: u8, side: Side) {
        self.option_mut(option).set_support(side);
    }

    #[must_use]
    pub fn enabled(&self, option: u8, side: Side) -> bool {
        self.option(option).enabled(side)
    }

    /// Apply the Q-method transition for one incoming verb.
    ///
    /// Returns the reply to emit (if any) and the enable/disable edge the
    /// transition crossed (if any). Unsupported options are always
    /// refused; anomalous peer behaviour is logged and resolved toward
    /// `No`.
    pub fn receive(&mut self, verb: Verb, option: u8) -> Reaction {
        let (side, affirm) = match verb {
            Verb::Will => (Side::Remote, true),
            Verb::Wont => (Side::Remote, false),
            Verb::Do => (Side::Local, true),
            Verb::Dont => (Side::Local, false),
        };
        // Replies about our side use WILL/WONT, about theirs DO/DONT.
        let (agree, refuse) = match side {
            Side::Remote => (Verb::Do, Verb::Dont),
            Side::Local => (Verb::Will, Verb::Wont),
        };

        let entry = self.option_mut(option);
        let accept = entry.supported(side);
        let current = entry.state(side);

        let (next, reply) = if affirm {
            match current {
                QState::No if accept => (QState::Yes, Some(agree)),
                QState::No => (QState::No, Some(refuse)),
                QState::WantNoEmpty => {
                    warn!(option, ?verb, "peer affirmed an option we refused");
                    (QState::No, None)
                }
                QState::WantNoOpposite => (QState::WantYesEmpty, Some(agree)),
                QState::WantYesEmpty => (QState::Yes, None),
                QState::WantYesOpposite => (QState::WantNoEmpty, Some(refuse)),
                QState::Yes => (QState::Yes, None),
            }
        } else {
            match current {
                QState::No => (QState::No, None),
                QState::WantNoEmpty | QState::WantYesEmpty | QState::WantYesOpposite => {
                    (QState::No, None)
                }
                QState::WantNoOpposite => (QState::WantYesEmpty, Some(agree)),
                QState::Yes => (QState::No, Some(refuse)),
            }
        };

        debug!(option, ?verb, ?current, ?next, "negotiation transition");
        entry.set_state(side, next);

        Reaction {
            reply,
            edge: edge_between(option, side, current, next),
        }
    }

    /// Start (or queue) enabling an option on a side.
    ///
    /// Returns the verb to send, if the request is not already in flight.
    pub fn request_enable(&mut self, option: u8, side: Side) -> Option<Verb> {
        let ask = match side {
            Side::Local => Verb::Will,
            Side::Remote => Verb::Do,
        };
        let entry = self.option_mut(option);
        entry.set_support(side);
        match entry.state(side) {
            QState::No => {
                entry.set_state(side, QState::WantYesEmpty);
                Some(ask)
            }
            QState::WantNoEmpty => {
                entry.set_state(side, QState::WantNoOpposite);
                None
            }
            QState::WantYesOpposite => {
                entry.set_state(side, QState::WantYesEmpty);
                None
            }
            QState::WantYesEmpty | QState::WantNoOpposite | QState::Yes => None,
        }
    }

    /// Start (or queue) disabling an option on a side.
    pub fn request_disable(&mut self, option: u8, side: Side) -> Option<Verb> {
        let ask = match side {
            Side::Local => Verb::Wont,
            Side::Remote => Verb::Dont,
        };
        let entry = self.option_mut(option);
        match entry.state(side) {
            QState::Yes => {
                entry.set_state(side, QState::WantNoEmpty);
                Some(ask)
            }
            QState::WantYesEmpty => {
                entry.set_state(side, QState::WantYesOpposite);
                None
            }
            QState::WantNoOpposite => {
                entry.set_state(side, QState::WantNoEmpty);
                None
            }
            QState::No | QState::WantNoEmpty | QState::WantYesOpposite => None,
        }
    }

    /// Reset all negotiated states, keeping the support flags.
    pub fn reset_states(&mut self) {
        for entry in &mut self.options {
            entry.local = QState::No;
            entry.remote = QState::No;
        }
    }
}

fn edge_between(option: u8, side: Side, from: QState, to: QState) -> Option<Edge> {
    match (from.is_enabled(), to.is_enabled()) {
        (false, true) => Some(Edge {
            option,
            side,
            enabled: true,
        }),
        (true, false) => Some(Edge {
            option,
            side,
            enabled: false,
        }),
        _ => None,
    }
}
