//! Mud Server Status Protocol.
//!
//! The server advertises `WILL MSSP` and answers the client's `DO` with a
//! single subnegotiation carrying `VAR name VAL value` runs. Array
//! values repeat the `VAL` marker under one `VAR`. The host populates
//! the [`MsspConfig`] up front or lazily from the `on_mssp_request`
//! callback.

use std::any::Any;

use bytes::Bytes;
use tracing::warn;

use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::MSSP;
use crate::telnet::op_subneg::mssp::{VAL, VAR};
use crate::{Role, SessionCore};

/// An MSSP variable value: a single string or a list of strings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MsspValue {
    Scalar(String),
    List(Vec<String>),
}

/// The server-info variables to advertise, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MsspConfig {
    entries: Vec<(String, MsspValue)>,
}

impl MsspConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar variable, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name.into(), MsspValue::Scalar(value.into()));
    }

    /// Set an array variable, replacing any previous value.
    pub fn set_list(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.insert(name.into(), MsspValue::List(values));
    }

    fn insert(&mut self, name: String, value: MsspValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[(String, MsspValue)] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        for (name, value) in &self.entries {
            payload.push(VAR);
            payload.extend_from_slice(name.as_bytes());
            match value {
                MsspValue::Scalar(text) => {
                    payload.push(VAL);
                    payload.extend_from_slice(text.as_bytes());
                }
                MsspValue::List(items) => {
                    for item in items {
                        payload.push(VAL);
                        payload.extend_from_slice(item.as_bytes());
                    }
                }
            }
        }
        payload
    }
}

/// Parse a received MSSP payload back into variables.
fn parse_payload(payload: &[u8]) -> Vec<(String, MsspValue)> {
    let mut entries: Vec<(String, Vec<String>)> = Vec::new();
    let mut index = 0usize;
    while index < payload.len() {
        if payload[index] != VAR {
            // Desynchronised; skip to the next VAR marker.
            index += 1;
            continue;
        }
        index += 1;
        let name_end = payload[index..]
            .iter()
            .position(|&b| b == VAL || b == VAR)
            .map_or(payload.len(), |offset| index + offset);
        let name = String::from_utf8_lossy(&payload[index..name_end]).into_owned();
        index = name_end;

        let mut values = Vec::new();
        while index < payload.len() && payload[index] == VAL {
            index += 1;
            let value_end = payload[index..]
                .iter()
                .position(|&b| b == VAL || b == VAR)
                .map_or(payload.len(), |offset| index + offset);
            values.push(String::from_utf8_lossy(&payload[index..value_end]).into_owned());
            index = value_end;
        }
        entries.push((name, values));
    }

    entries
        .into_iter()
        .map(|(name, mut values)| {
            let value = if values.len() == 1 {
                MsspValue::Scalar(values.remove(0))
            } else {
                MsspValue::List(values)
            };
            (name, value)
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct MsspPlugin {
    config: MsspConfig,
    /// Client: variables received from the server.
    received: Vec<(String, MsspValue)>,
}

impl MsspPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: MsspConfig) -> Self {
        Self {
            config,
            received: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MsspConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MsspConfig {
        &mut self.config
    }

    /// Client: the last server-info set received.
    #[must_use]
    pub fn received(&self) -> &[(String, MsspValue)] {
        &self.received
    }
}

impl OptionPlugin for MsspPlugin {
    fn name(&self) -> &'static str {
        "mssp"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[MSSP]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![Interest::new(MSSP, Side::Local)],
            Role::Client => vec![Interest::new(MSSP, Side::Remote)],
        }
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Will, MSSP)],
            Role::Client => Vec::new(),
        }
    }

    fn on_option_enabled(&mut self, core: &mut SessionCore, _option: u8, side: Side) {
        if core.role() == Role::Server && side == Side::Local {
            core.notify_mssp_request(&mut self.config);
            core.send_subnegotiation(MSSP, &self.config.to_payload());
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, _option: u8, payload: &Bytes) {
        if core.role() != Role::Client {
            warn!("MSSP subnegotiation in server role, ignoring");
            return;
        }
        self.received = parse_payload(payload);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
