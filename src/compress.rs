//! MCCP2/MCCP3 zlib stream splicing.
//!
//! The engine owns at most one [`Inflater`] (ingress) and one [`Deflater`]
//! (egress) per session. Each is installed at the byte boundary directly
//! after the enabling subnegotiation's `IAC SE` and stays until teardown,
//! unless the peer finishes its zlib stream early.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use tracing::debug;

use crate::error::Error;

/// Which MCCP revision opened a compression stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum MccpVersion {
    /// Server-to-client compression, option 86.
    V2 = 2,
    /// Client-to-server compression, option 87.
    V3 = 3,
}

impl std::fmt::Display for MccpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MCCP{}", *self as u8)
    }
}

/// Output of one inflate call.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Inflated {
    /// Decompressed bytes, ready for the decoder.
    pub data: Vec<u8>,
    /// Bytes after an orderly zlib stream end; they are plain Telnet
    /// again and the inflater must be discarded.
    pub trailing_plain: Option<Vec<u8>>,
}

/// Ingress zlib (RFC 1950) decompressor. Adler-32 checking is performed
/// by the underlying stream.
#[derive(Debug)]
pub struct Inflater {
    version: MccpVersion,
    stream: Decompress,
}

impl Inflater {
    #[must_use]
    pub fn new(version: MccpVersion) -> Self {
        debug!(version = version as u8, "ingress decompression begins");
        Self {
            version,
            stream: Decompress::new(true),
        }
    }

    #[must_use]
    pub fn version(&self) -> MccpVersion {
        self.version
    }

    /// Decompress one chunk of transport input.
    ///
    /// Errors are session-fatal per the MCCP contract.
    pub fn inflate(&mut self, input: &[u8]) -> Result<Inflated, Error> {
        let mut result = Inflated::default();
        let mut consumed = 0usize;

        while consumed < input.len() {
            let remaining = &input[consumed..];
            let out_start = result.data.len();
            result.data.resize(out_start + remaining.len().max(256), 0);

            let in_before = self.stream.total_in();
            let out_before = self.stream.total_out();
            let status = self
                .stream
                .decompress(
                    remaining,
                    &mut result.data[out_start..],
                    FlushDecompress::None,
                )
                .map_err(|err| Error::Compression {
                    version: self.version,
                    reason: err.to_string(),
                })?;

            let used = usize::try_from(self.stream.total_in() - in_before).unwrap_or(0);
            let produced = usize::try_from(self.stream.total_out() - out_before).unwrap_or(0);
            consumed += used;
            result.data.truncate(out_start + produced);

            if status == Status::StreamEnd {
                debug!(version = self.version as u8, "peer ended compressed stream");
                result.trailing_plain = Some(input[consumed..].to_vec());
                return Ok(result);
            }
            if used == 0 && produced == 0 {
                // Needs more input than this chunk holds.
                break;
            }
        }

        Ok(result)
    }
}

/// Egress zlib compressor. Every write is sync-flushed so the peer can
/// decode what we have sent without waiting for more output.
#[derive(Debug)]
pub struct Deflater {
    version: MccpVersion,
    stream: Compress,
}

impl Deflater {
    #[must_use]
    pub fn new(version: MccpVersion) -> Self {
        debug!(version = version as u8, "egress compression begins");
        Self {
            version,
            stream: Compress::new(Compression::default(), true),
        }
    }

    #[must_use]
    pub fn version(&self) -> MccpVersion {
        self.version
    }

    /// Compress one outbound chunk, sync-flushed.
    pub fn deflate(&mut self, input: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(input.len() / 2 + 64);
        let mut consumed = 0usize;

        while consumed < input.len() {
            let remaining = &input[consumed..];
            let out_start = out.len();
            out.resize(out_start + remaining.len().max(128), 0);

            let in_before = self.stream.total_in();
            let out_before = self.stream.total_out();
            self.stream
                .compress(remaining, &mut out[out_start..], FlushCompress::None)
                .map_err(|err| Error::Compression {
                    version: self.version,
                    reason: err.to_string(),
                })?;
            let used = usize::try_from(self.stream.total_in() - in_before).unwrap_or(0);
            let produced = usize::try_from(self.stream.total_out() - out_before).unwrap_or(0);
            consumed += used;
            out.truncate(out_start + produced);
            if used == 0 && produced == 0 {
                break;
            }
        }

        loop {
            let out_start = out.len();
            out.resize(out_start + 128, 0);
            let out_before = self.stream.total_out();
            self.stream
                .compress(&[], &mut out[out_start..], FlushCompress::Sync)
                .map_err(|err| Error::Compression {
                    version: self.version,
                    reason: err.to_string(),
                })?;
            let produced = usize::try_from(self.stream.total_out() - out_before).unwrap_or(0);
            out.truncate(out_start + produced);
            if produced < 128 {
                break;
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod test_compress {
    use super::*;

    #[test]
    fn deflate_then_inflate_round_trips() {
        let mut deflater = Deflater::new(MccpVersion::V2);
        let mut inflater = Inflater::new(MccpVersion::V2);

        let first = deflater.deflate(b"You see a small dusty room.\r\n").unwrap();
        let second = deflater.deflate(b"Exits: north, east.\r\n").unwrap();

        let mut plain = Vec::new();
        plain.extend(inflater.inflate(&first).unwrap().data);
        plain.extend(inflater.inflate(&second).unwrap().data);
        assert_eq!(
            plain,
            b"You see a small dusty room.\r\nExits: north, east.\r\n"
        );
    }

    #[test]
    fn inflate_handles_split_input() {
        let mut deflater = Deflater::new(MccpVersion::V3);
        let compressed = deflater.deflate(b"split across reads").unwrap();

        let mut inflater = Inflater::new(MccpVersion::V3);
        let mut plain = Vec::new();
        for chunk in compressed.chunks(3) {
            plain.extend(inflater.inflate(chunk).unwrap().data);
        }
        assert_eq!(plain, b"split across reads");
    }

    #[test]
    fn orderly_stream_end_returns_trailing_plain() {
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"last words").unwrap();
        let mut wire = enc.finish().unwrap();
        wire.extend_from_slice(b"plain again");

        let mut inflater = Inflater::new(MccpVersion::V2);
        let result = inflater.inflate(&wire).unwrap();
        assert_eq!(result.data, b"last words");
        assert_eq!(result.trailing_plain.as_deref(), Some(&b"plain again"[..]));
    }

    #[test]
    fn garbage_input_is_a_fatal_error() {
        let mut inflater = Inflater::new(MccpVersion::V2);
        let err = inflater.inflate(&[0x00, 0x01, 0x02, 0x03]).unwrap_err();
        assert!(matches!(err, Error::Compression { version: MccpVersion::V2, .. }));
    }
}
