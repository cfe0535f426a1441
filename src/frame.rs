//! Frame codec for the touchscreen serial protocol.
//!
//! Every frame, in either direction, is a UTF-8 payload followed by the
//! three-byte terminator `FF FF FF`. The display answers a malformed
//! instruction with the single byte `0x1A` before a terminator; that byte
//! marks desynchronization and is never payload.
//!
//! ```text
//! ┌──────────────────────┬──────────┐
//! │ payload (UTF-8)      │ FF FF FF │
//! └──────────────────────┴──────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use metar_clock::frame::{self, TERMINATOR};
//! use metar_clock::hal::MockLink;
//!
//! let bytes = frame::encode("page data");
//! assert!(bytes.ends_with(&TERMINATOR));
//!
//! let mut link = MockLink::new();
//! link.push_inbound(&frame::encode("BRV80"));
//! let decoded = frame::decode(&mut link).unwrap().unwrap();
//! assert_eq!(decoded.text, "BRV80");
//! assert!(decoded.anomaly.is_none());
//! ```

use thiserror::Error;

use crate::traits::{SerialLink, TransportError};

/// Frame terminator.
pub const TERMINATOR: [u8; 3] = [0xFF; 3];

/// Byte the display sends when it has lost frame alignment.
pub const ERROR_MARKER: u8 = 0x1A;

/// Longest inbound frame accepted, terminator included. Longer input is
/// reported as [`DecodeError::Truncated`].
pub const MAX_FRAME_LEN: usize = 1024;

// ============================================================================
// Errors and anomalies
// ============================================================================

/// A frame that could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Bytes between terminators were not valid UTF-8.
    #[error("frame payload is not UTF-8: {raw:02x?}")]
    NonUtf8Payload {
        /// Payload bytes, terminator stripped.
        raw: Vec<u8>,
    },

    /// The payload carried the device error marker.
    #[error("display reported a protocol error: {text:?}")]
    DeviceErrorSignal {
        /// Decoded payload including the marker.
        text: String,
    },

    /// The read timed out, or [`MAX_FRAME_LEN`] bytes arrived, before a
    /// terminator.
    #[error("frame truncated after {} bytes", raw.len())]
    Truncated {
        /// Bytes received before the timeout.
        raw: Vec<u8>,
    },

    /// The link itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DecodeError {
    /// Returns true if the link must be resynchronized before further use.
    pub fn needs_resync(&self) -> bool {
        !matches!(self, DecodeError::Transport(_))
    }
}

/// Something unexpected that did not prevent decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameAnomaly {
    /// Bytes were already waiting after a complete frame and were discarded.
    TrailingUnexpectedData(Vec<u8>),
}

/// A successfully decoded inbound frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// Payload text, terminator stripped.
    pub text: String,
    /// Warning-level condition seen while decoding.
    pub anomaly: Option<FrameAnomaly>,
}

// ============================================================================
// Codec
// ============================================================================

/// Encode `text` as an outbound frame.
///
/// No length limit is enforced.
pub fn encode(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() + TERMINATOR.len());
    bytes.extend_from_slice(text.as_bytes());
    bytes.extend_from_slice(&TERMINATOR);
    bytes
}

/// Decode one inbound frame, if any bytes are waiting.
///
/// Returns `Ok(None)` without blocking when the link has nothing buffered,
/// or when the read times out before any byte arrives.
///
/// After a good frame, any bytes already waiting are drained, reported as
/// [`FrameAnomaly::TrailingUnexpectedData`], and the inbound buffer cleared.
///
/// # Errors
///
/// See [`DecodeError`]. All variants except `Transport` call for a resync.
pub fn decode<L: SerialLink + ?Sized>(link: &mut L) -> Result<Option<Decoded>, DecodeError> {
    if link.bytes_available()? == 0 {
        return Ok(None);
    }

    let mut raw = Vec::new();
    let mut byte = [0u8; 1];
    while !raw.ends_with(&TERMINATOR) {
        if raw.len() >= MAX_FRAME_LEN {
            return Err(DecodeError::Truncated { raw });
        }
        if link.read(&mut byte)? == 0 {
            if raw.is_empty() {
                return Ok(None);
            }
            return Err(DecodeError::Truncated { raw });
        }
        raw.push(byte[0]);
    }
    raw.truncate(raw.len() - TERMINATOR.len());

    let text = String::from_utf8(raw).map_err(|e| DecodeError::NonUtf8Payload {
        raw: e.into_bytes(),
    })?;
    if text.as_bytes().contains(&ERROR_MARKER) {
        return Err(DecodeError::DeviceErrorSignal { text });
    }

    let anomaly = if link.bytes_available()? > 0 {
        let trailing = link.drain_available()?;
        link.clear_input()?;
        Some(FrameAnomaly::TrailingUnexpectedData(trailing))
    } else {
        None
    };

    Ok(Some(Decoded { text, anomaly }))
}
