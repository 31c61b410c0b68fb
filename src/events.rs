use bytes::{BufMut, Bytes, BytesMut};

use crate::telnet::op_command::{DO, DONT, IAC, SB, SE, WILL, WONT};

/// One of the four Telnet negotiation verbs.
///
/// Kept as a real enum rather than a raw `u8` so negotiation logic can
/// never confuse a verb with an option code or a payload byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Verb {
    Will,
    Wont,
    Do,
    Dont,
}

impl Verb {
    /// The wire byte for this verb.
    #[must_use]
    pub fn byte(self) -> u8 {
        match self {
            Verb::Will => WILL,
            Verb::Wont => WONT,
            Verb::Do => DO,
            Verb::Dont => DONT,
        }
    }

    /// Decode a wire byte into a verb, if it is one.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Verb> {
        match byte {
            WILL => Some(Verb::Will),
            WONT => Some(Verb::Wont),
            DO => Some(Verb::Do),
            DONT => Some(Verb::Dont),
            _ => None,
        }
    }

    /// The verb a conforming peer uses to agree with this one.
    #[must_use]
    pub fn agreement(self) -> Verb {
        match self {
            Verb::Will => Verb::Do,
            Verb::Wont => Verb::Dont,
            Verb::Do => Verb::Will,
            Verb::Dont => Verb::Wont,
        }
    }
}

/// A typed event produced by the byte decoder, in arrival order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// A plain data byte, already IAC-unescaped.
    Data(u8),
    /// A complete three-byte negotiation command.
    Command(Verb, u8),
    /// `IAC SB <opt>` was seen; payload bytes follow.
    SubnegotiationStart(u8),
    /// One de-escaped payload byte inside an open subnegotiation.
    SubnegotiationByte(u8),
    /// `IAC SE` closed the subnegotiation; the payload is fully
    /// de-escaped (no IAC-IAC pairs remain).
    Subnegotiation(u8, Bytes),
    /// `IAC EOR` prompt marker.
    Prompt,
    /// A CR LF (or bare LF) line boundary in the data stream.
    Line,
}

/// A 3-byte `IAC <verb> <option>` wire sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Negotiation {
    pub verb: Verb,
    pub option: u8,
}

impl From<Negotiation> for Bytes {
    fn from(negotiation: Negotiation) -> Self {
        Bytes::copy_from_slice(&[IAC, negotiation.verb.byte(), negotiation.option])
    }
}

/// An `IAC SB <option> <payload> IAC SE` wire frame.
///
/// The payload is held un-escaped; encoding to [`Bytes`] doubles every
/// 0xFF byte.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubnegotiationFrame {
    pub option: u8,
    pub payload: Bytes,
}

impl SubnegotiationFrame {
    #[must_use]
    pub fn new(option: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            option,
            payload: payload.into(),
        }
    }
}

impl From<SubnegotiationFrame> for Bytes {
    fn from(frame: SubnegotiationFrame) -> Self {
        let head = [IAC, SB, frame.option];
        let escaped = escape_iac(frame.payload);
        let tail = [IAC, SE];
        let mut buf = BytesMut::with_capacity(head.len() + escaped.len() + tail.len());
        buf.put(&head[..]);
        buf.put(&escaped[..]);
        buf.put(&tail[..]);
        buf.freeze()
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for SubnegotiationFrame {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let option = u.arbitrary()?;
        let payload: Vec<u8> = u.arbitrary()?;
        Ok(Self {
            option,
            payload: Bytes::from(payload),
        })
    }
}

/// Double every IAC (0xFF) byte so the data can travel in the stream
/// outside an IAC sequence.
///
/// `[255, 1, 6, 2]` becomes `[255, 255, 1, 6, 2]`.
#[must_use]
pub fn escape_iac<T>(data: T) -> Bytes
where
    Bytes: From<T>,
{
    let data = Bytes::from(data);
    let mut out = BytesMut::with_capacity(data.len());
    let mut rest = &data[..];
    while let Some(pos) = rest.iter().position(|&byte| byte == IAC) {
        // Copy through the IAC found, then double it.
        out.put_slice(&rest[..=pos]);
        out.put_u8(IAC);
        rest = &rest[pos + 1..];
    }
    out.put_slice(rest);
    out.freeze()
}

/// Collapse doubled IAC bytes back into single 0xFF data bytes.
///
/// `[255, 255, 1, 6, 2]` becomes `[255, 1, 6, 2]`.
#[must_use]
pub fn unescape_iac<T>(data: T) -> Bytes
where
    Bytes: From<T>,
{
    let data = Bytes::from(data);
    let mut out = BytesMut::with_capacity(data.len());
    let mut bytes = data.iter().copied();
    while let Some(byte) = bytes.next() {
        out.put_u8(byte);
        if byte == IAC {
            // Swallow the second half of an IAC IAC pair; anything else
            // after a lone IAC is kept as-is.
            match bytes.next() {
                Some(IAC) | None => {}
                Some(other) => out.put_u8(other),
            }
        }
    }
    out.freeze()
}

#[cfg(test)]
mod test_events {
    use super::*;
    use crate::telnet::op_option::GMCP;

    #[test]
    fn verb_round_trip() {
        for verb in [Verb::Will, Verb::Wont, Verb::Do, Verb::Dont] {
            assert_eq!(Verb::from_byte(verb.byte()), Some(verb));
        }
        assert_eq!(Verb::from_byte(SE), None);
    }

    #[test]
    fn negotiation_encodes_three_bytes() {
        let bytes: Bytes = Negotiation {
            verb: Verb::Do,
            option: GMCP,
        }
        .into();
        assert_eq!(&bytes[..], &[IAC, DO, GMCP]);
    }

    #[test]
    fn subnegotiation_escapes_payload() {
        let frame = SubnegotiationFrame::new(GMCP, vec![1u8, IAC, 2]);
        let bytes: Bytes = frame.into();
        assert_eq!(&bytes[..], &[IAC, SB, GMCP, 1, IAC, IAC, 2, IAC, SE]);
    }

    #[test]
    fn escape_then_unescape_is_identity() {
        let data = vec![0u8, IAC, 13, IAC, IAC, 255, 7];
        let escaped = escape_iac(data.clone());
        assert_eq!(unescape_iac(escaped), Bytes::from(data));
    }
}
