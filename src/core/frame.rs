//! Wire frame format: build/parse of DATA, ACK, NAK frames with a CRC32
//! trailer.

use thiserror::Error;

/// `kind` byte values, as carried on the wire.
pub const FRAME_DATA: u8 = 1;
pub const FRAME_ACK: u8 = 2;
pub const FRAME_NAK: u8 = 3;

/// A decoded, CRC-validated frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Carries a network-layer packet plus the cumulative-ACK piggyback.
    Data { seq: u8, ack: u8, data: Vec<u8> },
    /// Standalone cumulative acknowledgement.
    Ack { ack: u8 },
    /// Negative acknowledgement naming the last in-order frame.
    Nak { ack: u8 },
}

impl Frame {
    /// The `ack` field every frame kind carries.
    pub fn ack(&self) -> u8 {
        match self {
            Frame::Data { ack, .. } | Frame::Ack { ack } | Frame::Nak { ack } => *ack,
        }
    }
}

/// Frame decode failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Shorter than the minimum ACK/NAK wire size (2 header bytes + 4 CRC).
    #[error("frame too short: {0} bytes")]
    TooShort(usize),
    /// CRC32 over the whole received buffer was nonzero.
    #[error("CRC check failed")]
    BadCrc,
    /// `kind` byte was not one of DATA/ACK/NAK.
    #[error("unknown frame kind {0}")]
    UnknownKind(u8),
}

fn crc32(buf: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(buf);
    hasher.finalize()
}

/// Encodes `frame` to its wire form, appending a CRC32 trailer such that
/// `crc32` over the whole returned buffer is zero.
pub fn encode(frame: &Frame) -> Vec<u8> {
    let mut buf = Vec::new();

    match frame {
        Frame::Data { seq, ack, data } => {
            buf.push(FRAME_DATA);
            buf.push(*ack);
            buf.push(*seq);
            buf.extend_from_slice(data);
        }
        Frame::Ack { ack } => {
            buf.push(FRAME_ACK);
            buf.push(*ack);
        }
        Frame::Nak { ack } => {
            buf.push(FRAME_NAK);
            buf.push(*ack);
        }
    }

    let crc = crc32(&buf);
    buf.extend_from_slice(&crc.to_le_bytes());
    buf
}

/// Decodes a received (possibly corrupt) wire buffer.
///
/// Fails on a short buffer or a bad CRC before even looking at `kind`, so
/// the corrupt-frame policy in the receiver runs uniformly regardless of
/// what the frame would otherwise have been.
pub fn decode(buf: &[u8]) -> Result<Frame, FrameError> {
    if buf.len() < 6 {
        return Err(FrameError::TooShort(buf.len()));
    }

    if crc32(buf) != 0 {
        return Err(FrameError::BadCrc);
    }

    let payload = &buf[..buf.len() - 4];
    let kind = payload[0];
    let ack = payload[1];

    match kind {
        FRAME_DATA => {
            if payload.len() < 3 {
                return Err(FrameError::TooShort(buf.len()));
            }
            Ok(Frame::Data {
                seq: payload[2],
                ack,
                data: payload[3..].to_vec(),
            })
        }
        FRAME_ACK => Ok(Frame::Ack { ack }),
        FRAME_NAK => Ok(Frame::Nak { ack }),
        other => Err(FrameError::UnknownKind(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_data_frame() {
        let frame = Frame::Data {
            seq: 3,
            ack: 6,
            data: vec![1, 2, 3, 4],
        };
        let wire = encode(&frame);
        assert_eq!(wire.len(), 3 + 4 + 4);
        assert_eq!(decode(&wire).unwrap(), frame);
    }

    #[test]
    fn round_trips_ack_and_nak() {
        let ack = Frame::Ack { ack: 2 };
        let nak = Frame::Nak { ack: 5 };
        assert_eq!(decode(&encode(&ack)).unwrap(), ack);
        assert_eq!(decode(&encode(&nak)).unwrap(), nak);
        assert_eq!(encode(&ack).len(), 2 + 4);
    }

    #[test]
    fn rejects_short_buffer() {
        assert_eq!(decode(&[1, 2, 3, 4, 5]), Err(FrameError::TooShort(5)));
    }

    #[test]
    fn rejects_corrupted_frame() {
        let mut wire = encode(&Frame::Ack { ack: 1 });
        wire[0] ^= 0xFF;
        assert_eq!(decode(&wire), Err(FrameError::BadCrc));
    }

    #[test]
    fn rejects_unknown_kind() {
        let mut wire = encode(&Frame::Ack { ack: 1 });
        wire[0] = 9;
        // recompute crc so it passes the CRC gate and we hit UnknownKind
        let crc = crc32(&wire[..wire.len() - 4]);
        wire[wire.len() - 4..].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(decode(&wire), Err(FrameError::UnknownKind(9)));
    }
}
