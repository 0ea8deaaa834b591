use super::MAX_LEN_SERVERBOUND;
use crate::errors::RconProtocolError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::mem::size_of;

/// Length of the id and type fields that open every frame.
pub(crate) const HEADER_LEN: usize = size_of::<i32>() * 2;

/// Type field of an RCON packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RconPacketType {
    /// Sent by the server for every command response (and by some servers for logins).
    Response,
    /// Runs a command. Minecraft also uses this value for the login reply.
    RunCommand,
    /// Login with the RCON password.
    Login,
    /// Anything else a server may send; kept so that odd frames can still be read.
    Unknown(i32),
}

impl From<RconPacketType> for i32 {
    fn from(packet_type: RconPacketType) -> Self {
        match packet_type {
            RconPacketType::Response => 0,
            RconPacketType::RunCommand => 2,
            RconPacketType::Login => 3,
            RconPacketType::Unknown(value) => value,
        }
    }
}

impl From<i32> for RconPacketType {
    fn from(value: i32) -> Self {
        match value {
            0 => RconPacketType::Response,
            2 => RconPacketType::RunCommand,
            3 => RconPacketType::Login,
            other => RconPacketType::Unknown(other),
        }
    }
}

/// A single frame on the RCON stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RconPacket {
    /// Id used to correlate responses with requests.
    pub request_id: i32,
    /// What this packet is.
    pub packet_type: RconPacketType,
    /// Body, without the terminating NUL bytes.
    pub payload: Bytes,
}

impl RconPacket {
    /// Create a serverbound packet.
    ///
    /// # Errors
    /// Returns [`RconProtocolError::PayloadTooLong`] if the payload exceeds the 1446 byte
    /// serverbound limit, and [`RconProtocolError::NulInPayload`] if it contains a NUL byte.
    pub fn new(
        request_id: i32,
        packet_type: RconPacketType,
        payload: &str,
    ) -> Result<Self, RconProtocolError> {
        if payload.len() > MAX_LEN_SERVERBOUND {
            return Err(RconProtocolError::PayloadTooLong {
                len: payload.len(),
                limit: MAX_LEN_SERVERBOUND,
            });
        }

        if payload.as_bytes().contains(&0) {
            return Err(RconProtocolError::NulInPayload);
        }

        Ok(Self {
            request_id,
            packet_type,
            payload: Bytes::copy_from_slice(payload.as_bytes()),
        })
    }

    /// Encode the packet, including its size prefix.
    pub fn bytes(self) -> Bytes {
        Bytes::from(self)
    }

    /// Decode a frame, i.e. everything that follows the size field.
    ///
    /// This never fails: a frame too short to hold a header is padded with
    /// zeros, and at most two trailing NUL bytes are trimmed from the body.
    pub fn decode(mut frame: Bytes) -> Self {
        let mut header = [0u8; HEADER_LEN];
        let available = frame.len().min(HEADER_LEN);
        header[..available].copy_from_slice(&frame[..available]);
        frame.advance(available);

        let mut header = &header[..];
        let request_id = header.get_i32_le();
        let packet_type = header.get_i32_le();

        // body terminator, then packet terminator
        for _ in 0..2 {
            if frame.last() == Some(&0) {
                frame.truncate(frame.len() - 1);
            }
        }

        Self {
            request_id,
            packet_type: packet_type.into(),
            payload: frame,
        }
    }

    /// Body as text. Invalid UTF-8 is replaced rather than rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

impl From<RconPacket> for Bytes {
    fn from(packet: RconPacket) -> Self {
        let len = get_remaining_length(packet.payload.len());
        let packet_type: i32 = packet.packet_type.into();

        let mut bytes = BytesMut::with_capacity(size_of::<i32>() + len as usize);

        bytes.put_i32_le(len);
        bytes.put_i32_le(packet.request_id);
        bytes.put_i32_le(packet_type);
        bytes.put(packet.payload);
        bytes.put_u16(0x00_00);

        bytes.freeze()
    }
}

/// Get the *remaining length* of the packet given the length of its payload.
///
/// Remaining length here refers to the length of the packet in bytes excluding
/// the first four bytes which communicate this value. So it refers to the
/// length of the packet *after* the length field.
///
/// As the remainder of the packet is composed of two [i32]s (request ID and type),
/// the payload, and **TWO** 0 bytes (the body terminator and the packet terminator),
/// it is the size of two [i32]s + the length of the payload + 2.
fn get_remaining_length(payload_len: usize) -> i32 {
    (payload_len + HEADER_LEN + 2) as i32
}

/// All text the server sent for a single request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The request id the packets carried.
    pub request_id: i32,
    /// Type of the first packet seen for this id.
    pub packet_type: RconPacketType,
    /// Concatenated bodies, in the order they arrived.
    pub payload: BytesMut,
}

impl Response {
    /// Response text. Invalid UTF-8 is replaced rather than rejected.
    ///
    /// Bodies are joined as bytes before decoding, so a character split over
    /// two packets survives.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Accumulated responses keyed by request id, in order of first arrival.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Responses {
    entries: Vec<Response>,
}

impl Responses {
    /// Append a packet's body to the response for its id.
    pub fn push(&mut self, packet: RconPacket) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.request_id == packet.request_id)
        {
            Some(entry) => entry.payload.put(packet.payload),
            None => self.entries.push(Response {
                request_id: packet.request_id,
                packet_type: packet.packet_type,
                payload: BytesMut::from(&packet.payload[..]),
            }),
        }
    }

    /// The response for `request_id`, if any packet carried it.
    pub fn get(&self, request_id: i32) -> Option<&Response> {
        self.entries
            .iter()
            .find(|entry| entry.request_id == request_id)
    }

    /// Remove and return the response for `request_id`.
    pub fn take(&mut self, request_id: i32) -> Option<Response> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.request_id == request_id)?;

        Some(self.entries.remove(index))
    }

    /// The response whose first packet arrived first.
    pub fn first(&self) -> Option<&Response> {
        self.entries.first()
    }

    /// Number of distinct request ids seen.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no packet was read at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the responses in order of first arrival.
    pub fn iter(&self) -> impl Iterator<Item = &Response> {
        self.entries.iter()
    }
}
