use bytes::{BufMut, BytesMut};
use tracing::warn;

use crate::events::{Event, Verb};
use crate::telnet::op_command::{EOR, GA, IAC, NOP, SB, SE};

/// Subnegotiation payloads beyond this are truncated (and logged). The
/// frame is still delivered with the bytes that fit.
pub const MAX_SUBNEGOTIATION_LEN: usize = 64 * 1024;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum State {
    /// Plain data stream.
    #[default]
    StreamData,
    /// An IAC was seen; the next byte selects the command.
    SawIac,
    /// A negotiation verb was seen; the next byte is the option code.
    AwaitOption(Verb),
    /// `IAC SB` was seen; the next byte is the option code.
    SubnegotiationAwaitOption,
    /// Inside an open subnegotiation for the given option.
    Subnegotiation(u8),
    /// Inside a subnegotiation, one IAC pending.
    SubnegotiationSawIac(u8),
}

/// The per-session byte decoder.
///
/// Consumes input one byte at a time and appends typed [`Event`]s in
/// arrival order. Every byte causes exactly one transition; malformed
/// input is logged and the stream continues.
#[derive(Debug, Default)]
pub struct Decoder {
    state: State,
    pending_cr: bool,
    subneg: BytesMut,
    overflow: usize,
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an `IAC SB` frame is open without its closing `IAC SE`.
    #[must_use]
    pub fn in_subnegotiation(&self) -> bool {
        matches!(
            self.state,
            State::SubnegotiationAwaitOption
                | State::Subnegotiation(_)
                | State::SubnegotiationSawIac(_)
        )
    }

    /// Feed a slice, appending events for every byte.
    pub fn feed_slice(&mut self, data: &[u8], out: &mut Vec<Event>) {
        for &byte in data {
            self.feed(byte, out);
        }
    }

    /// Feed one byte, appending zero or more events.
    pub fn feed(&mut self, byte: u8, out: &mut Vec<Event>) {
        match (self.state, byte) {
            (State::StreamData, IAC) => {
                self.flush_pending_cr(out);
                self.state = State::SawIac;
            }
            (State::StreamData, CR) => {
                self.flush_pending_cr(out);
                self.pending_cr = true;
            }
            (State::StreamData, LF) => {
                // CR LF and bare LF both end a line; the CR is consumed.
                self.pending_cr = false;
                out.push(Event::Line);
            }
            (State::StreamData, _) => {
                self.flush_pending_cr(out);
                out.push(Event::Data(byte));
            }

            (State::SawIac, IAC) => {
                out.push(Event::Data(0xFF));
                self.state = State::StreamData;
            }
            (State::SawIac, SB) => self.state = State::SubnegotiationAwaitOption,
            (State::SawIac, EOR) => {
                out.push(Event::Prompt);
                self.state = State::StreamData;
            }
            (State::SawIac, GA | NOP) => self.state = State::StreamData,
            (State::SawIac, SE) => {
                warn!("IAC SE outside an open subnegotiation, ignoring");
                self.state = State::StreamData;
            }
            (State::SawIac, _) => match Verb::from_byte(byte) {
                Some(verb) => self.state = State::AwaitOption(verb),
                None => {
                    warn!(command = byte, "unknown IAC command byte, ignoring");
                    self.state = State::StreamData;
                }
            },

            (State::AwaitOption(verb), _) => {
                out.push(Event::Command(verb, byte));
                self.state = State::StreamData;
            }

            (State::SubnegotiationAwaitOption, _) => {
                self.subneg.clear();
                self.overflow = 0;
                out.push(Event::SubnegotiationStart(byte));
                self.state = State::Subnegotiation(byte);
            }

            (State::Subnegotiation(opt), IAC) => self.state = State::SubnegotiationSawIac(opt),
            (State::Subnegotiation(_), _) => self.push_subneg_byte(byte, out),

            (State::SubnegotiationSawIac(opt), IAC) => {
                self.push_subneg_byte(0xFF, out);
                self.state = State::Subnegotiation(opt);
            }
            (State::SubnegotiationSawIac(opt), SE) => {
                if self.overflow > 0 {
                    warn!(
                        option = opt,
                        dropped = self.overflow,
                        "oversize subnegotiation truncated"
                    );
                }
                out.push(Event::Subnegotiation(opt, self.subneg.split().freeze()));
                self.overflow = 0;
                self.state = State::StreamData;
            }
            (State::SubnegotiationSawIac(opt), SB) => {
                // A nested SB cannot occur in conforming streams; the outer
                // frame is unrecoverable.
                warn!(option = opt, "IAC SB inside subnegotiation, discarding outer frame");
                self.subneg.clear();
                self.overflow = 0;
                self.state = State::SubnegotiationAwaitOption;
            }
            (State::SubnegotiationSawIac(opt), _) => {
                warn!(
                    option = opt,
                    byte, "unescaped IAC inside subnegotiation aborts the frame"
                );
                self.subneg.clear();
                self.overflow = 0;
                self.state = State::SawIac;
                self.feed(byte, out);
            }
        }
    }

    /// Discard any open subnegotiation frame, e.g. at session teardown.
    pub fn abort_open_frame(&mut self) {
        if self.in_subnegotiation() {
            warn!("session ended with an unterminated subnegotiation, discarding");
        }
        self.subneg.clear();
        self.overflow = 0;
        self.pending_cr = false;
        self.state = State::StreamData;
    }

    fn push_subneg_byte(&mut self, byte: u8, out: &mut Vec<Event>) {
        if self.subneg.len() < MAX_SUBNEGOTIATION_LEN {
            self.subneg.put_u8(byte);
            out.push(Event::SubnegotiationByte(byte));
        } else {
            self.overflow += 1;
        }
    }

    fn flush_pending_cr(&mut self, out: &mut Vec<Event>) {
        if self.pending_cr {
            out.push(Event::Data(CR));
            self.pending_cr = false;
        }
    }
}

#[cfg(feature = "tokio-util")]
impl tokio_util::codec::Decoder for Decoder {
    type Item = Vec<Event>;
    type Error = std::io::Error;

    fn decode(
        &mut self,
        src: &mut BytesMut,
    ) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        let mut events = Vec::with_capacity(4);
        self.feed_slice(src.split().as_ref(), &mut events);
        Ok(if events.is_empty() { None } else { Some(events) })
    }
}

#[cfg(feature = "tokio-util")]
impl tokio_util::codec::Encoder<crate::events::Negotiation> for Decoder {
    type Error = std::io::Error;

    fn encode(
        &mut self,
        item: crate::events::Negotiation,
        dst: &mut BytesMut,
    ) -> Result<(), Self::Error> {
        dst.put_slice(&bytes::Bytes::from(item));
        Ok(())
    }
}

#[cfg(feature = "tokio-util")]
impl tokio_util::codec::Encoder<crate::events::SubnegotiationFrame> for Decoder {
    type Error = std::io::Error;

    fn encode(
        &mut self,
        item: crate::events::SubnegotiationFrame,
        dst: &mut BytesMut,
    ) -> Result<(), Self::Error> {
        dst.put_slice(&bytes::Bytes::from(item));
        Ok(())
    }
}
