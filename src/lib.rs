//! A transport-agnostic Telnet option negotiation engine for MUD servers
//! and clients.
//!
//! The engine owns no sockets. A host feeds inbound transport bytes to
//! [`Session::interpret`], drains outbound wire bytes from
//! [`Session::take_outbound`], and observes decoded data and option
//! traffic through registered callbacks. Option behaviour is supplied by
//! [`plugin::OptionPlugin`] implementations; the full standard set lives
//! in [`options`].

pub mod compress;
pub mod decoder;
pub mod encoding;
pub mod error;
pub mod events;
pub mod negotiation;
pub mod options;
pub mod plugin;
pub mod telnet;

use std::collections::{BTreeMap, VecDeque};

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use tracing::{debug, error, warn};

use compress::{Deflater, Inflater, MccpVersion};
use decoder::Decoder;
use encoding::TextEncoding;
use error::{Error, Result};
use events::{Event, Negotiation, SubnegotiationFrame, Verb};
use negotiation::{Edge, QState, Side, Table};
use options::flow::FlowRestart;
use options::mssp::MsspConfig;
use plugin::Registry;
use telnet::op_command::{EOR, GA, IAC};
use telnet::op_option::{NAWS, SUPPRESS_GO_AHEAD, TELOPT_EOR};

pub use error::Error as TelnetError;
pub use events::{escape_iac, unescape_iac};

/// Which end of the connection this session implements.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    Server,
    Client,
}

type SubmitFn = Box<dyn FnMut(&str, TextEncoding)>;
type WireFn = Box<dyn FnMut(&[u8])>;
type NawsFn = Box<dyn FnMut(u16, u16)>;
type UnitFn = Box<dyn FnMut()>;
type GmcpFn = Box<dyn FnMut(&str, &str)>;
type MsspFn = Box<dyn FnMut(&mut MsspConfig)>;
type EnvironFn = Box<dyn FnMut(&BTreeMap<String, String>, &BTreeMap<String, String>)>;
type SpeedFn = Box<dyn FnMut(u32, u32)>;
type TextFn = Box<dyn FnMut(&str)>;
type FlagFn = Box<dyn FnMut(bool)>;
type RestartFn = Box<dyn FnMut(FlowRestart)>;
type CompressionFn = Box<dyn FnMut(MccpVersion, bool)>;
type AuthFn = Box<dyn FnMut(&[u8])>;

/// The host's registered callbacks. All are optional except `on_submit`,
/// which `build` requires.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) submit: Option<SubmitFn>,
    pub(crate) negotiation_out: Option<WireFn>,
    pub(crate) naws: Option<NawsFn>,
    pub(crate) prompt: Option<UnitFn>,
    pub(crate) gmcp: Option<GmcpFn>,
    pub(crate) mssp_request: Option<MsspFn>,
    pub(crate) environment: Option<EnvironFn>,
    pub(crate) terminal_speed: Option<SpeedFn>,
    pub(crate) xdisplay: Option<TextFn>,
    pub(crate) flow_control_state: Option<FlagFn>,
    pub(crate) flow_control_restart: Option<RestartFn>,
    pub(crate) compression_state: Option<CompressionFn>,
    pub(crate) auth_request: Option<AuthFn>,
    pub(crate) auth_response: Option<AuthFn>,
}

/// Everything a session owns except its plugins.
///
/// Plugins receive `&mut SessionCore` as their context handle: it exposes
/// negotiation sends, subnegotiation sends, encoding control and the host
/// callbacks, but never the plugin registry itself.
pub struct SessionCore {
    role: Role,
    pub(crate) options: Table,
    decoder: Decoder,
    encoding: TextEncoding,
    window: (u16, u16),
    line: BytesMut,
    out: BytesMut,
    egress: Option<Deflater>,
    ingress: Option<Inflater>,
    callbacks: Callbacks,
    events: VecDeque<Event>,
    /// Disable edges produced outside command handling (host- or
    /// plugin-driven), awaiting relay to the owning plugin.
    pending_edges: Vec<Edge>,
    disposed: bool,
    errored: bool,
    pending_error: Option<Error>,
}

impl SessionCore {
    pub(crate) fn new(role: Role, callbacks: Callbacks) -> Self {
        Self {
            role,
            options: Table::new(),
            decoder: Decoder::new(),
            encoding: TextEncoding::default(),
            window: (78, 24),
            line: BytesMut::with_capacity(256),
            out: BytesMut::with_capacity(256),
            egress: None,
            ingress: None,
            callbacks,
            events: VecDeque::new(),
            pending_edges: Vec::new(),
            disposed: false,
            errored: false,
            pending_error: None,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The session text encoding currently in force.
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Switch the session text encoding. Takes effect for the very next
    /// byte in either direction.
    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        debug!(from = self.encoding.name(), to = encoding.name(), "session encoding switched");
        self.encoding = encoding;
    }

    /// Last reported client window as (width, height).
    #[must_use]
    pub fn window_size(&self) -> (u16, u16) {
        self.window
    }

    pub fn set_window_size(&mut self, width: u16, height: u16) {
        self.window = (width, height);
    }

    #[must_use]
    pub fn option_enabled(&self, option: u8, side: Side) -> bool {
        self.options.enabled(option, side)
    }

    /// Ask the peer to enable an option on a side, Q-method tracked.
    pub fn request_enable(&mut self, option: u8, side: Side) {
        if let Some(verb) = self.options.request_enable(option, side) {
            self.send_negotiation(verb, option);
        }
    }

    /// Ask the peer to disable an option on a side, Q-method tracked.
    pub fn request_disable(&mut self, option: u8, side: Side) {
        let was_enabled = self.options.enabled(option, side);
        if let Some(verb) = self.options.request_disable(option, side) {
            self.send_negotiation(verb, option);
        }
        // Leaving YES means the option is functionally off now, even
        // though the peer's acknowledgement is still in flight.
        if was_enabled && !self.options.enabled(option, side) {
            self.pending_edges.push(Edge {
                option,
                side,
                enabled: false,
            });
        }
    }

    /// Emit `IAC <verb> <option>`.
    pub(crate) fn send_negotiation(&mut self, verb: Verb, option: u8) {
        let bytes: Bytes = Negotiation { verb, option }.into();
        if let Some(cb) = self.callbacks.negotiation_out.as_mut() {
            cb(&bytes);
        }
        self.write_wire(&bytes);
    }

    /// Emit `IAC SB <option> <payload, IAC-escaped> IAC SE`.
    pub fn send_subnegotiation(&mut self, option: u8, payload: &[u8]) {
        let bytes: Bytes =
            SubnegotiationFrame::new(option, Bytes::copy_from_slice(payload)).into();
        self.write_wire(&bytes);
    }

    /// Install the egress deflate stream. Every byte written after this
    /// call is compressed.
    pub fn begin_egress_compression(&mut self, version: MccpVersion) {
        if self.egress.is_some() {
            warn!(version = version as u8, "egress compression already active, ignoring");
            return;
        }
        self.egress = Some(Deflater::new(version));
        self.notify_compression(version, true);
    }

    /// Install the ingress inflate stream. The next transport byte fed to
    /// `interpret` is the first compressed byte.
    pub fn begin_ingress_decompression(&mut self, version: MccpVersion) {
        if self.ingress.is_some() {
            warn!(version = version as u8, "ingress decompression already active, ignoring");
            return;
        }
        self.ingress = Some(Inflater::new(version));
        self.notify_compression(version, true);
    }

    fn write_wire(&mut self, bytes: &[u8]) {
        if let Some(deflater) = self.egress.as_mut() {
            match deflater.deflate(bytes) {
                Ok(compressed) => self.out.put_slice(&compressed),
                Err(err) => self.fail_compression(err),
            }
        } else {
            self.out.put_slice(bytes);
        }
    }

    fn fail_compression(&mut self, err: Error) {
        error!(%err, "compression failure, session is now errored");
        if let Error::Compression { version, .. } = &err {
            self.notify_compression(*version, false);
        }
        self.pending_error = Some(err);
    }

    fn deliver_line(&mut self) {
        let bytes = self.line.split().freeze();
        let text = self.encoding.decode(&bytes);
        let encoding = self.encoding;
        if let Some(cb) = self.callbacks.submit.as_mut() {
            cb(&text, encoding);
        }
    }

    pub(crate) fn take_wire(&mut self) -> Bytes {
        self.out.split().freeze()
    }

    fn check(&mut self) -> Result<()> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        if let Some(err) = self.pending_error.take() {
            self.errored = true;
            return Err(err);
        }
        if self.errored {
            return Err(Error::Errored);
        }
        Ok(())
    }

    // Callback notifiers, used by the option plugins.

    pub fn notify_naws(&mut self, height: u16, width: u16) {
        if let Some(cb) = self.callbacks.naws.as_mut() {
            cb(height, width);
        }
    }

    pub fn notify_prompt(&mut self) {
        if let Some(cb) = self.callbacks.prompt.as_mut() {
            cb();
        }
    }

    pub fn notify_gmcp(&mut self, package: &str, json: &str) {
        if let Some(cb) = self.callbacks.gmcp.as_mut() {
            cb(package, json);
        }
    }

    pub fn notify_mssp_request(&mut self, config: &mut MsspConfig) {
        if let Some(cb) = self.callbacks.mssp_request.as_mut() {
            cb(config);
        }
    }

    pub fn notify_environment(
        &mut self,
        vars: &BTreeMap<String, String>,
        user_vars: &BTreeMap<String, String>,
    ) {
        if let Some(cb) = self.callbacks.environment.as_mut() {
            cb(vars, user_vars);
        }
    }

    pub fn notify_terminal_speed(&mut self, tx: u32, rx: u32) {
        if let Some(cb) = self.callbacks.terminal_speed.as_mut() {
            cb(tx, rx);
        }
    }

    pub fn notify_xdisplay(&mut self, display: &str) {
        if let Some(cb) = self.callbacks.xdisplay.as_mut() {
            cb(display);
        }
    }

    pub fn notify_flow_control(&mut self, enabled: bool) {
        if let Some(cb) = self.callbacks.flow_control_state.as_mut() {
            cb(enabled);
        }
    }

    pub fn notify_flow_restart(&mut self, mode: FlowRestart) {
        if let Some(cb) = self.callbacks.flow_control_restart.as_mut() {
            cb(mode);
        }
    }

    pub fn notify_compression(&mut self, version: MccpVersion, enabled: bool) {
        if let Some(cb) = self.callbacks.compression_state.as_mut() {
            cb(version, enabled);
        }
    }

    pub fn notify_auth_request(&mut self, payload: &[u8]) {
        if let Some(cb) = self.callbacks.auth_request.as_mut() {
            cb(payload);
        }
    }

    pub fn notify_auth_response(&mut self, payload: &[u8]) {
        if let Some(cb) = self.callbacks.auth_response.as_mut() {
            cb(payload);
        }
    }
}

/// One Telnet session: a byte decoder, a Q-method option table, a plugin
/// registry and an outbound wire buffer.
pub struct Session {
    core: SessionCore,
    plugins: Registry,
}

impl Session {
    /// Start building a server-role session.
    #[must_use]
    pub fn server() -> SessionBuilder {
        SessionBuilder::new(Role::Server)
    }

    /// Start building a client-role session.
    #[must_use]
    pub fn client() -> SessionBuilder {
        SessionBuilder::new(Role::Client)
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.core.role
    }

    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.core.encoding
    }

    #[must_use]
    pub fn window_size(&self) -> (u16, u16) {
        self.core.window
    }

    /// The Q-method state of an option on a side.
    #[must_use]
    pub fn option_state(&self, option: u8, side: Side) -> QState {
        self.core.options.option(option).state(side)
    }

    /// Feed inbound transport bytes through the decompression, decoding
    /// and dispatch pipeline.
    ///
    /// All replies and callbacks triggered by a byte complete before the
    /// next byte is consumed. Fails fast once the session is disposed or
    /// errored; compression failures surface here and latch the errored
    /// state.
    pub fn interpret(&mut self, data: &[u8]) -> Result<()> {
        self.core.check()?;
        let mut rest = data;
        while !rest.is_empty() {
            if self.core.ingress.is_some() {
                let inflated = self.inflate_chunk(rest)?;
                rest = &[];
                self.process_plain(&inflated.data)?;
                if let Some(trailing) = inflated.trailing_plain {
                    // The peer closed its zlib stream; what follows is
                    // plain Telnet again.
                    self.core.ingress = None;
                    self.interpret(&trailing)?;
                }
            } else {
                let consumed = self.process_until_ingress(rest)?;
                rest = &rest[consumed..];
            }
        }
        self.core.check()
    }

    /// Drain the cooperative event queue. Exposed for deterministic
    /// testing; `interpret` drains it as it goes.
    pub fn wait_for_processing(&mut self) -> Result<()> {
        self.pump()?;
        self.core.check()
    }

    /// Encode application text with the session encoding, escape IAC and
    /// queue it for the transport.
    pub fn send_application(&mut self, text: &str) -> Result<()> {
        self.core.check()?;
        let encoded = self.core.encoding.encode(text);
        let escaped = escape_iac(encoded);
        self.core.write_wire(&escaped);
        self.core.check()
    }

    /// Queue pre-encoded application bytes, escaping IAC.
    pub fn send_application_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.core.check()?;
        let escaped = escape_iac(Bytes::copy_from_slice(bytes));
        self.core.write_wire(&escaped);
        self.core.check()
    }

    /// Send a prompt, terminated with `IAC EOR` when end-of-record is
    /// agreed, otherwise with CR LF.
    pub fn send_prompt(&mut self, text: &str) -> Result<()> {
        self.core.check()?;
        let encoded = self.core.encoding.encode(text);
        let escaped = escape_iac(encoded);
        self.core.write_wire(&escaped);
        if self.core.options.enabled(TELOPT_EOR, Side::Local) {
            self.core.write_wire(&[IAC, EOR]);
        } else {
            self.core.write_wire(b"\r\n");
        }
        self.core.check()
    }

    /// Emit `IAC GA`, unless suppress-go-ahead has been agreed.
    pub fn send_go_ahead(&mut self) -> Result<()> {
        self.core.check()?;
        if !self.core.options.enabled(SUPPRESS_GO_AHEAD, Side::Local) {
            self.core.write_wire(&[IAC, GA]);
        }
        self.core.check()
    }

    /// Report the local window size to the server (client role), as a
    /// NAWS subnegotiation of two big-endian 16-bit values.
    pub fn send_naws(&mut self, width: u16, height: u16) -> Result<()> {
        self.core.check()?;
        if !self.core.options.enabled(NAWS, Side::Local) {
            warn!("send_naws before NAWS is agreed, dropping");
            return Ok(());
        }
        let mut payload = Vec::with_capacity(4);
        payload.extend(width.to_be_bytes());
        payload.extend(height.to_be_bytes());
        self.core.set_window_size(width, height);
        self.core.send_subnegotiation(NAWS, &payload);
        self.core.check()
    }

    /// Send a GMCP message: `<package> SP <json>`.
    pub fn send_gmcp(&mut self, package: &str, data: &impl Serialize) -> Result<()> {
        self.core.check()?;
        let json = serde_json::to_string(data)
            .map_err(|err| Error::Gmcp(err.to_string()))?;
        let payload = format!("{package} {json}");
        self.core
            .send_subnegotiation(telnet::op_option::GMCP, payload.as_bytes());
        self.core.check()
    }

    /// Send a raw subnegotiation for an option.
    pub fn send_subnegotiation(&mut self, option: u8, payload: &[u8]) -> Result<()> {
        self.core.check()?;
        self.core.send_subnegotiation(option, payload);
        self.core.check()
    }

    /// Host-driven request to enable an option on a side.
    pub fn request_enable(&mut self, option: u8, side: Side) -> Result<()> {
        self.core.check()?;
        self.core.request_enable(option, side);
        self.core.check()
    }

    /// Host-driven request to disable an option on a side.
    pub fn request_disable(&mut self, option: u8, side: Side) -> Result<()> {
        self.core.check()?;
        self.core.request_disable(option, side);
        self.flush_pending_edges();
        self.core.check()
    }

    /// Negotiate off every option of the plugin owning `option`.
    ///
    /// Refused while another enabled plugin declares a dependency on it.
    pub fn disable_plugin(&mut self, option: u8) -> Result<()> {
        self.core.check()?;
        if !self.plugins.owns(option) {
            return Err(Error::NoSuchPlugin(option));
        }
        let dependents = self.plugins.enabled_dependents(option, &self.core.options);
        if !dependents.is_empty() {
            return Err(Error::ActiveDependents { option, dependents });
        }
        for code in self.plugins.codes_of(option) {
            self.core.request_disable(code, Side::Local);
            self.core.request_disable(code, Side::Remote);
        }
        self.flush_pending_edges();
        self.core.check()
    }

    /// Borrow a registered plugin by concrete type, e.g. to read the
    /// terminal types collected by the TTYPE plugin.
    #[must_use]
    pub fn plugin_ref<P: 'static>(&self) -> Option<&P> {
        self.plugins.get_ref::<P>()
    }

    /// Mutably borrow a registered plugin, e.g. to update its
    /// configuration record.
    pub fn plugin_mut<P: 'static>(&mut self) -> Option<&mut P> {
        self.plugins.get_mut::<P>()
    }

    /// Drain the bytes queued for the transport.
    pub fn take_outbound(&mut self) -> Bytes {
        self.core.take_wire()
    }

    /// Hand back an unterminated trailing line, if any.
    pub fn flush_partial_line(&mut self) -> Option<Bytes> {
        if self.core.line.is_empty() {
            None
        } else {
            Some(self.core.line.split().freeze())
        }
    }

    /// Tear the session down: plugins shut down in reverse dependency
    /// order, any open subnegotiation is discarded, and further input is
    /// rejected.
    pub fn dispose(&mut self) {
        if self.core.disposed {
            return;
        }
        self.plugins.shutdown(&mut self.core);
        self.core.decoder.abort_open_frame();
        self.core.events.clear();
        self.core.disposed = true;
    }

    fn inflate_chunk(&mut self, data: &[u8]) -> Result<compress::Inflated> {
        let Some(inflater) = self.core.ingress.as_mut() else {
            return Ok(compress::Inflated::default());
        };
        match inflater.inflate(data) {
            Ok(inflated) => Ok(inflated),
            Err(err) => {
                self.core.fail_compression(err);
                self.core.check().map(|()| compress::Inflated::default())
            }
        }
    }

    /// Feed bytes one at a time so that an ingress decompressor installed
    /// by a subnegotiation applies from exactly the next byte.
    fn process_until_ingress(&mut self, data: &[u8]) -> Result<usize> {
        let mut scratch = Vec::with_capacity(4);
        for (index, &byte) in data.iter().enumerate() {
            scratch.clear();
            self.core.decoder.feed(byte, &mut scratch);
            self.core.events.extend(scratch.drain(..));
            self.pump()?;
            if self.core.ingress.is_some() {
                return Ok(index + 1);
            }
        }
        Ok(data.len())
    }

    /// Feed already-decompressed bytes in bulk. A second ingress stream
    /// cannot begin inside decompressed data, so no per-byte check is
    /// needed.
    fn process_plain(&mut self, data: &[u8]) -> Result<()> {
        let mut scratch = Vec::with_capacity(data.len() / 2 + 4);
        self.core.decoder.feed_slice(data, &mut scratch);
        self.core.events.extend(scratch);
        self.pump()
    }

    fn pump(&mut self) -> Result<()> {
        while let Some(event) = self.core.events.pop_front() {
            self.handle_event(event);
            self.flush_pending_edges();
            self.core.check()?;
        }
        Ok(())
    }

    /// Relay edges queued by host- or plugin-driven requests. A plugin
    /// reacting to an edge may queue further ones.
    fn flush_pending_edges(&mut self) {
        while let Some(edge) = self.core.pending_edges.pop() {
            self.plugins.apply_edge(&mut self.core, edge);
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Data(byte) => self.core.line.put_u8(byte),
            Event::Line => self.core.deliver_line(),
            Event::Prompt => self.core.notify_prompt(),
            Event::Command(verb, option) => {
                let reaction = self.core.options.receive(verb, option);
                if let Some(reply) = reaction.reply {
                    self.core.send_negotiation(reply, option);
                }
                if let Some(edge) = reaction.edge {
                    self.plugins.apply_edge(&mut self.core, edge);
                }
            }
            Event::SubnegotiationStart(_) | Event::SubnegotiationByte(_) => {}
            Event::Subnegotiation(option, payload) => {
                self.plugins
                    .dispatch_subnegotiation(&mut self.core, option, &payload);
            }
        }
    }
}

/// Builder for a [`Session`]: role, plugins and callbacks.
pub struct SessionBuilder {
    role: Role,
    registry: Registry,
    callbacks: Callbacks,
}

impl SessionBuilder {
    fn new(role: Role) -> Self {
        Self {
            role,
            registry: Registry::new(),
            callbacks: Callbacks::default(),
        }
    }

    /// Register a plugin. Registration order breaks dependency ties.
    #[must_use]
    pub fn register(mut self, plugin: Box<dyn plugin::OptionPlugin>) -> Self {
        self.registry.register(plugin);
        self
    }

    /// Register the full standard plugin set with default configuration.
    #[must_use]
    pub fn with_default_plugins(self) -> Self {
        self.register(Box::new(options::sga::SgaPlugin::new()))
            .register(Box::new(options::eor::EorPlugin::new()))
            .register(Box::new(options::naws::NawsPlugin::new()))
            .register(Box::new(options::ttype::TtypePlugin::new()))
            .register(Box::new(options::charset::CharsetPlugin::new()))
            .register(Box::new(options::environ::EnvironPlugin::new()))
            .register(Box::new(options::tspeed::TspeedPlugin::new()))
            .register(Box::new(options::xdisploc::XdisplocPlugin::new()))
            .register(Box::new(options::flow::FlowControlPlugin::new()))
            .register(Box::new(options::linemode::LinemodePlugin::new()))
            .register(Box::new(options::auth::AuthPlugin::new()))
            .register(Box::new(options::mssp::MsspPlugin::new()))
            .register(Box::new(options::gmcp::GmcpPlugin::new()))
            .register(Box::new(options::mccp::MccpPlugin::new()))
    }

    /// Required: receives each decoded line of application data.
    #[must_use]
    pub fn on_submit(mut self, f: impl FnMut(&str, TextEncoding) + 'static) -> Self {
        self.callbacks.submit = Some(Box::new(f));
        self
    }

    /// Observes every outbound `IAC <verb> <option>` before compression.
    #[must_use]
    pub fn on_negotiation_out(mut self, f: impl FnMut(&[u8]) + 'static) -> Self {
        self.callbacks.negotiation_out = Some(Box::new(f));
        self
    }

    /// Receives `(height, width)` after each NAWS update.
    #[must_use]
    pub fn on_naws(mut self, f: impl FnMut(u16, u16) + 'static) -> Self {
        self.callbacks.naws = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_prompt(mut self, f: impl FnMut() + 'static) -> Self {
        self.callbacks.prompt = Some(Box::new(f));
        self
    }

    /// Receives `(package, json)` for each inbound GMCP message.
    #[must_use]
    pub fn on_gmcp(mut self, f: impl FnMut(&str, &str) + 'static) -> Self {
        self.callbacks.gmcp = Some(Box::new(f));
        self
    }

    /// Invoked just before the MSSP reply is built, so the host can
    /// populate the config on demand.
    #[must_use]
    pub fn on_mssp_request(mut self, f: impl FnMut(&mut MsspConfig) + 'static) -> Self {
        self.callbacks.mssp_request = Some(Box::new(f));
        self
    }

    /// Receives `(vars, user_vars)` from (NEW-)ENVIRON replies.
    #[must_use]
    pub fn on_environment(
        mut self,
        f: impl FnMut(&BTreeMap<String, String>, &BTreeMap<String, String>) + 'static,
    ) -> Self {
        self.callbacks.environment = Some(Box::new(f));
        self
    }

    /// Receives `(tx, rx)` baud rates from TSPEED replies.
    #[must_use]
    pub fn on_terminal_speed(mut self, f: impl FnMut(u32, u32) + 'static) -> Self {
        self.callbacks.terminal_speed = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_xdisplay(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.callbacks.xdisplay = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_flow_control_state(mut self, f: impl FnMut(bool) + 'static) -> Self {
        self.callbacks.flow_control_state = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_flow_control_restart_mode(mut self, f: impl FnMut(FlowRestart) + 'static) -> Self {
        self.callbacks.flow_control_restart = Some(Box::new(f));
        self
    }

    /// Receives `(version, enabled)` on every compression state change,
    /// including `enabled = false` on a fatal stream error.
    #[must_use]
    pub fn on_compression_state(mut self, f: impl FnMut(MccpVersion, bool) + 'static) -> Self {
        self.callbacks.compression_state = Some(Box::new(f));
        self
    }

    /// Receives the raw authentication SEND payload (client role).
    #[must_use]
    pub fn on_auth_request(mut self, f: impl FnMut(&[u8]) + 'static) -> Self {
        self.callbacks.auth_request = Some(Box::new(f));
        self
    }

    /// Receives the raw authentication IS payload (server role).
    #[must_use]
    pub fn on_auth_response(mut self, f: impl FnMut(&[u8]) + 'static) -> Self {
        self.callbacks.auth_response = Some(Box::new(f));
        self
    }

    /// Validate the configuration, wire plugin interests into the
    /// negotiation table and launch each plugin's opening negotiations.
    pub fn build(self) -> Result<Session> {
        if self.callbacks.submit.is_none() {
            return Err(Error::MissingCallback("on_submit"));
        }
        let mut core = SessionCore::new(self.role, self.callbacks);
        let mut registry = self.registry;
        registry.build(self.role, &mut core.options)?;
        let mut session = Session {
            core,
            plugins: registry,
        };
        session.plugins.emit_initial(&mut session.core);
        Ok(session)
    }
}
