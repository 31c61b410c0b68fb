//! Environment variable exchange: NEW-ENVIRON (RFC 1572) and the
//! superseded ENVIRON (RFC 1408), one plugin for both codes.
//!
//! The server sends `SEND` (empty list meaning "everything"); the client
//! answers `IS` with `VAR name VALUE value` runs, plus `USERVAR` runs on
//! NEW-ENVIRON only. A `VAR` with no following `VALUE` carries the empty
//! string. `ESC` quotes the four type codes inside names and values.

use std::any::Any;
use std::collections::BTreeMap;

use bytes::Bytes;
use tracing::warn;

use crate::events::Verb;
use crate::negotiation::Side;
use crate::plugin::{Interest, OptionPlugin};
use crate::telnet::op_option::{ENVIRON, NEW_ENVIRON};
use crate::telnet::op_subneg::environ::{ESC, USERVAR, VALUE, VAR};
use crate::telnet::op_subneg::{INFO, IS, SEND};
use crate::{Role, SessionCore};

/// The variables a client is willing to disclose.
#[derive(Clone, Debug, Default)]
pub struct EnvironConfig {
    pub vars: BTreeMap<String, String>,
    /// NEW-ENVIRON only.
    pub user_vars: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct EnvironPlugin {
    config: EnvironConfig,
}

impl EnvironPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EnvironConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EnvironConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EnvironConfig {
        &mut self.config
    }

    fn handle_is(core: &mut SessionCore, option: u8, payload: &[u8]) {
        let (vars, user_vars) = parse_variables(option, payload);
        core.notify_environment(&vars, &user_vars);
    }

    fn handle_send(&self, core: &mut SessionCore, option: u8, requests: &[u8]) {
        let mut reply = vec![IS];
        let wanted = parse_requests(option, requests);

        for (name, value) in &self.config.vars {
            if wanted.includes(VAR, name) {
                append_variable(&mut reply, VAR, name, value);
            }
        }
        if option == NEW_ENVIRON {
            for (name, value) in &self.config.user_vars {
                if wanted.includes(USERVAR, name) {
                    append_variable(&mut reply, USERVAR, name, value);
                }
            }
        }
        core.send_subnegotiation(option, &reply);
    }
}

impl OptionPlugin for EnvironPlugin {
    fn name(&self) -> &'static str {
        "environ"
    }

    fn option_codes(&self) -> &'static [u8] {
        &[NEW_ENVIRON, ENVIRON]
    }

    fn interests(&self, role: Role) -> Vec<Interest> {
        match role {
            Role::Server => vec![
                Interest::new(NEW_ENVIRON, Side::Remote),
                Interest::new(ENVIRON, Side::Remote),
            ],
            Role::Client => vec![
                Interest::new(NEW_ENVIRON, Side::Local),
                Interest::new(ENVIRON, Side::Local),
            ],
        }
    }

    fn initial_negotiations(&self, role: Role) -> Vec<(Verb, u8)> {
        match role {
            Role::Server => vec![(Verb::Do, NEW_ENVIRON)],
            Role::Client => Vec::new(),
        }
    }

    fn on_option_enabled(&mut self, core: &mut SessionCore, option: u8, side: Side) {
        if core.role() == Role::Server && side == Side::Remote {
            // Empty request list: send everything.
            core.send_subnegotiation(option, &[SEND]);
        }
    }

    fn on_subnegotiation(&mut self, core: &mut SessionCore, option: u8, payload: &Bytes) {
        match (core.role(), payload.split_first()) {
            (Role::Server, Some((&(IS | INFO), rest))) => Self::handle_is(core, option, rest),
            (Role::Client, Some((&SEND, rest))) => self.handle_send(core, option, rest),
            (_, Some((subcommand, _))) => {
                warn!(subcommand, option, "unexpected ENVIRON subcommand for this role, ignoring");
            }
            (_, None) => warn!(option, "empty ENVIRON subnegotiation, ignoring"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Append `type name [VALUE value]`, ESC-quoting the type codes.
fn append_variable(out: &mut Vec<u8>, kind: u8, name: &str, value: &str) {
    out.push(kind);
    append_escaped(out, name.as_bytes());
    if !value.is_empty() {
        out.push(VALUE);
        append_escaped(out, value.as_bytes());
    }
}

fn append_escaped(out: &mut Vec<u8>, data: &[u8]) {
    for &byte in data {
        if matches!(byte, VAR | VALUE | ESC | USERVAR) {
            out.push(ESC);
        }
        out.push(byte);
    }
}

/// Which variables a SEND request asked for.
struct Requests {
    /// Empty request list means "everything".
    everything: bool,
    vars: Vec<String>,
    user_vars: Vec<String>,
    /// A bare VAR (or USERVAR) with no name asks for the whole class.
    all_vars: bool,
    all_user_vars: bool,
}

impl Requests {
    fn includes(&self, kind: u8, name: &str) -> bool {
        if self.everything {
            return true;
        }
        match kind {
            VAR => self.all_vars || self.vars.iter().any(|n| n == name),
            USERVAR => self.all_user_vars || self.user_vars.iter().any(|n| n == name),
            _ => false,
        }
    }
}

fn parse_requests(option: u8, payload: &[u8]) -> Requests {
    let mut requests = Requests {
        everything: payload.is_empty(),
        vars: Vec::new(),
        user_vars: Vec::new(),
        all_vars: false,
        all_user_vars: false,
    };

    let mut kind: Option<u8> = None;
    let mut name = Vec::new();
    let mut close = |kind: &mut Option<u8>, name: &mut Vec<u8>, requests: &mut Requests| {
        if let Some(k) = kind.take() {
            let text = String::from_utf8_lossy(name).into_owned();
            match (k, text.is_empty()) {
                (VAR, true) => requests.all_vars = true,
                (VAR, false) => requests.vars.push(text),
                (USERVAR, true) => requests.all_user_vars = true,
                (USERVAR, false) => requests.user_vars.push(text),
                _ => {}
            }
        }
        name.clear();
    };

    let mut bytes = payload.iter().copied();
    while let Some(byte) = bytes.next() {
        match byte {
            ESC => {
                if let Some(escaped) = bytes.next() {
                    name.push(escaped);
                }
            }
            VAR => {
                close(&mut kind, &mut name, &mut requests);
                kind = Some(VAR);
            }
            USERVAR if option == NEW_ENVIRON => {
                close(&mut kind, &mut name, &mut requests);
                kind = Some(USERVAR);
            }
            _ => name.push(byte),
        }
    }
    close(&mut kind, &mut name, &mut requests);
    requests
}

/// Parse an IS/INFO payload into `(vars, user_vars)`.
fn parse_variables(
    option: u8,
    payload: &[u8],
) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    #[derive(Clone, Copy, Eq, PartialEq)]
    enum Field {
        Name,
        Value,
    }

    let mut vars = BTreeMap::new();
    let mut user_vars = BTreeMap::new();

    let mut kind: Option<u8> = None;
    let mut field = Field::Name;
    let mut name = Vec::new();
    let mut value = Vec::new();

    let mut commit = |kind: Option<u8>, name: &mut Vec<u8>, value: &mut Vec<u8>| {
        if let Some(k) = kind {
            let name_text = String::from_utf8_lossy(name).into_owned();
            let value_text = String::from_utf8_lossy(value).into_owned();
            if !name_text.is_empty() {
                match k {
                    VAR => {
                        vars.insert(name_text, value_text);
                    }
                    USERVAR => {
                        user_vars.insert(name_text, value_text);
                    }
                    _ => {}
                }
            }
        }
        name.clear();
        value.clear();
    };

    let mut bytes = payload.iter().copied();
    while let Some(byte) = bytes.next() {
        let is_type_code = byte == VAR || (byte == USERVAR && option == NEW_ENVIRON);
        if is_type_code {
            commit(kind, &mut name, &mut value);
            kind = Some(byte);
            field = Field::Name;
        } else if byte == VALUE && field == Field::Name {
            field = Field::Value;
        } else {
            let actual = if byte == ESC { bytes.next() } else { Some(byte) };
            if let Some(actual) = actual {
                match field {
                    Field::Name => name.push(actual),
                    Field::Value => value.push(actual),
                }
            }
        }
    }
    commit(kind, &mut name, &mut value);

    (vars, user_vars)
}
