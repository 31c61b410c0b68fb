//! The option plugin model.
//!
//! Each Telnet option (or small family of options) is implemented by an
//! [`OptionPlugin`]. The [`Registry`] owns the plugin boxes, resolves
//! their declared dependencies into a stable topological order at build
//! time, and relays negotiation edges and completed subnegotiations to
//! the owning plugin.

use std::any::Any;
use std::collections::HashSet;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::events::Verb;
use crate::negotiation::{Edge, Side, Table};
use crate::{Role, SessionCore};

/// Which option, on which side, a plugin is willing to see enabled.
///
/// The negotiator refuses everything not covered by a registered
/// interest.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Interest {
    pub option: u8,
    pub side: Side,
}

impl Interest {
    #[must_use]
    pub fn new(option: u8, side: Side) -> Self {
        Self { option, side }
    }
}

/// A handler for one Telnet option (or a composite of closely related
/// option codes, like ENVIRON/NEW-ENVIRON or MCCP2/MCCP3).
pub trait OptionPlugin {
    /// Stable plugin name, used in dependency diagnostics.
    fn name(&self) -> &'static str;

    /// The option codes this plugin owns. The first is the primary code
    /// that dependency declarations refer to.
    fn option_codes(&self) -> &'static [u8];

    /// The (option, side) pairs this plugin accepts for the given role.
    fn interests(&self, role: Role) -> Vec<Interest>;

    /// Primary codes of plugins this one may call into.
    fn dependencies(&self) -> &'static [u8] {
        &[]
    }

    /// Negotiations to launch at session bring-up.
    fn initial_negotiations(&self, _role: Role) -> Vec<(Verb, u8)> {
        Vec::new()
    }

    /// An option reached YES on a side for the first time.
    fn on_option_enabled(&mut self, _core: &mut SessionCore, _option: u8, _side: Side) {}

    /// An option fell back to NO on a side.
    fn on_option_disabled(&mut self, _core: &mut SessionCore, _option: u8, _side: Side) {}

    /// A completed, de-escaped subnegotiation payload for an owned option.
    fn on_subnegotiation(&mut self, core: &mut SessionCore, option: u8, payload: &Bytes);

    /// The session is being disposed.
    fn on_shutdown(&mut self, _core: &mut SessionCore) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Registered {
    plugin: Box<dyn OptionPlugin>,
    /// (option, side) pairs currently notified as enabled.
    notified: HashSet<(u8, Side)>,
}

/// The session's plugin registry.
pub struct Registry {
    entries: Vec<Registered>,
    by_option: [Option<usize>; 256],
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_option: [None; 256],
        }
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin. Order of registration breaks dependency ties.
    pub fn register(&mut self, plugin: Box<dyn OptionPlugin>) {
        self.entries.push(Registered {
            plugin,
            notified: HashSet::new(),
        });
    }

    /// True if some plugin owns the option code.
    #[must_use]
    pub fn owns(&self, option: u8) -> bool {
        self.by_option[option as usize].is_some()
    }

    /// Resolve dependencies, order the plugins, and project their
    /// interests into the negotiation table's support flags.
    pub(crate) fn build(&mut self, role: Role, table: &mut Table) -> Result<()> {
        self.sort_by_dependencies()?;

        self.by_option = [None; 256];
        for (index, entry) in self.entries.iter().enumerate() {
            for &code in entry.plugin.option_codes() {
                if self.by_option[code as usize].is_some() {
                    return Err(Error::DuplicateOption(code));
                }
                self.by_option[code as usize] = Some(index);
            }
        }

        for entry in &self.entries {
            for interest in entry.plugin.interests(role) {
                table.support(interest.option, interest.side);
            }
        }

        Ok(())
    }

    /// Launch every plugin's initial negotiations, in dependency order.
    pub(crate) fn emit_initial(&mut self, core: &mut SessionCore) {
        for entry in &mut self.entries {
            for (verb, option) in entry.plugin.initial_negotiations(core.role()) {
                match verb {
                    Verb::Will => core.request_enable(option, Side::Local),
                    Verb::Do => core.request_enable(option, Side::Remote),
                    Verb::Wont => core.request_disable(option, Side::Local),
                    Verb::Dont => core.request_disable(option, Side::Remote),
                }
            }
        }
    }

    /// Relay an enable/disable edge to the owning plugin, once per
    /// (option, side) until the opposite edge occurs.
    pub(crate) fn apply_edge(&mut self, core: &mut SessionCore, edge: Edge) {
        let Some(index) = self.by_option[edge.option as usize] else {
            // Refused options have no owner; nothing to notify.
            return;
        };
        let entry = &mut self.entries[index];
        let key = (edge.option, edge.side);
        if edge.enabled {
            if entry.notified.insert(key) {
                debug!(plugin = entry.plugin.name(), option = edge.option, side = ?edge.side, "option enabled");
                entry.plugin.on_option_enabled(core, edge.option, edge.side);
            }
        } else if entry.notified.remove(&key) {
            debug!(plugin = entry.plugin.name(), option = edge.option, side = ?edge.side, "option disabled");
            entry.plugin.on_option_disabled(core, edge.option, edge.side);
        }
    }

    /// Route a completed subnegotiation to the owning plugin.
    pub(crate) fn dispatch_subnegotiation(
        &mut self,
        core: &mut SessionCore,
        option: u8,
        payload: &Bytes,
    ) {
        match self.by_option[option as usize] {
            Some(index) => {
                self.entries[index]
                    .plugin
                    .on_subnegotiation(core, option, payload);
            }
            None => warn!(option, "subnegotiation for unowned option, ignoring"),
        }
    }

    /// Names of enabled plugins that depend on the plugin owning `option`.
    pub(crate) fn enabled_dependents(&self, option: u8, table: &Table) -> Vec<&'static str> {
        let Some(owner) = self.by_option[option as usize] else {
            return Vec::new();
        };
        let owner_codes = self.entries[owner].plugin.option_codes();
        self.entries
            .iter()
            .filter(|entry| {
                entry
                    .plugin
                    .dependencies()
                    .iter()
                    .any(|dep| owner_codes.contains(dep))
            })
            .filter(|entry| {
                entry
                    .plugin
                    .option_codes()
                    .iter()
                    .any(|&code| table.option(code).enabled_anywhere())
            })
            .map(|entry| entry.plugin.name())
            .collect()
    }

    /// Shut plugins down in reverse dependency order.
    pub(crate) fn shutdown(&mut self, core: &mut SessionCore) {
        for entry in self.entries.iter_mut().rev() {
            entry.plugin.on_shutdown(core);
        }
    }

    /// The option codes owned by the plugin that owns `option`.
    pub(crate) fn codes_of(&self, option: u8) -> Vec<u8> {
        self.by_option[option as usize]
            .map(|index| self.entries[index].plugin.option_codes().to_vec())
            .unwrap_or_default()
    }

    /// Borrow a plugin by concrete type.
    #[must_use]
    pub fn get_ref<P: 'static>(&self) -> Option<&P> {
        self.entries
            .iter()
            .find_map(|entry| entry.plugin.as_any().downcast_ref::<P>())
    }

    /// Mutably borrow a plugin by concrete type.
    pub fn get_mut<P: 'static>(&mut self) -> Option<&mut P> {
        self.entries
            .iter_mut()
            .find_map(|entry| entry.plugin.as_any_mut().downcast_mut::<P>())
    }

    /// Stable topological sort (Kahn), ties broken by registration order.
    fn sort_by_dependencies(&mut self) -> Result<()> {
        let n = self.entries.len();

        // dependency code -> provider index
        let provider = |code: u8| -> Option<usize> {
            self.entries
                .iter()
                .position(|entry| entry.plugin.option_codes().contains(&code))
        };

        let mut needs: Vec<Vec<usize>> = Vec::with_capacity(n);
        for entry in &self.entries {
            let mut upstream = Vec::new();
            for &dep in entry.plugin.dependencies() {
                match provider(dep) {
                    Some(index) => upstream.push(index),
                    None => {
                        return Err(Error::UnknownDependency {
                            plugin: entry.plugin.name(),
                            dependency: dep,
                        })
                    }
                }
            }
            needs.push(upstream);
        }

        let mut placed = vec![false; n];
        let mut order = Vec::with_capacity(n);
        while order.len() < n {
            let next = (0..n).find(|&candidate| {
                !placed[candidate]
                    && needs[candidate]
                        .iter()
                        .all(|&upstream| placed[upstream] || upstream == candidate)
            });
            match next {
                Some(index) => {
                    placed[index] = true;
                    order.push(index);
                }
                None => {
                    let stuck = (0..n)
                        .find(|&i| !placed[i])
                        .map_or("unknown", |i| self.entries[i].plugin.name());
                    return Err(Error::DependencyCycle(stuck));
                }
            }
        }

        let mut slots: Vec<Option<Registered>> = self.entries.drain(..).map(Some).collect();
        self.entries = order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect();
        Ok(())
    }
}
