//! Frame codec for the Discord IPC socket.
//!
//! Every frame is an 8-byte little-endian header (`opcode`, `length`)
//! followed by `length` bytes of JSON.

use bytes::{Buf, BufMut, BytesMut};
use cadpresence_common::IpcError;
use tokio_util::codec::{Decoder, Encoder};

pub const HEADER_LEN: usize = 8;
pub const MAX_FRAME_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Handshake,
    Frame,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    pub fn as_u32(self) -> u32 {
        match self {
            Opcode::Handshake => 0,
            Opcode::Frame => 1,
            Opcode::Close => 2,
            Opcode::Ping => 3,
            Opcode::Pong => 4,
        }
    }
}

impl TryFrom<u32> for Opcode {
    type Error = IpcError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Opcode::Handshake),
            1 => Ok(Opcode::Frame),
            2 => Ok(Opcode::Close),
            3 => Ok(Opcode::Ping),
            4 => Ok(Opcode::Pong),
            other => Err(IpcError::Protocol(format!("unknown opcode {other}"))),
        }
    }
}

/// A decoded frame. An empty body decodes as `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub opcode: Opcode,
    pub payload: serde_json::Value,
}

impl Frame {
    pub fn new(opcode: Opcode, payload: serde_json::Value) -> Self {
        Self { opcode, payload }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IpcCodec;

impl Decoder for IpcCodec {
    type Item = Frame;
    type Error = IpcError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, IpcError> {
        if src.len() < HEADER_LEN {
            return Ok(None);
        }

        let mut header = &src[..HEADER_LEN];
        let raw_opcode = header.get_u32_le();
        let len = header.get_u32_le() as usize;

        if len > MAX_FRAME_LEN {
            return Err(IpcError::FrameTooLarge(len));
        }
        if src.len() < HEADER_LEN + len {
            src.reserve(HEADER_LEN + len - src.len());
            return Ok(None);
        }

        src.advance(HEADER_LEN);
        let body = src.split_to(len);
        let opcode = Opcode::try_from(raw_opcode)?;
        let payload = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body)?
        };

        Ok(Some(Frame { opcode, payload }))
    }
}

impl Encoder<Frame> for IpcCodec {
    type Error = IpcError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), IpcError> {
        let body = serde_json::to_vec(&frame.payload)?;
        if body.len() > MAX_FRAME_LEN {
            return Err(IpcError::FrameTooLarge(body.len()));
        }

        dst.reserve(HEADER_LEN + body.len());
        dst.put_u32_le(frame.opcode.as_u32());
        dst.put_u32_le(body.len() as u32);
        dst.extend_from_slice(&body);
        Ok(())
    }
}
