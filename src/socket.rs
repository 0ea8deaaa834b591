use crate::errors::{closed_by_server, timed_out};
use crate::rcon::{RconPacket, Responses};
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use std::{io::ErrorKind, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncReadExt, Result},
    time::timeout,
};
use tracing::{debug, trace, warn};

use crate::rcon::packet::HEADER_LEN;

/// Trait to allow for reading RCON frames from the socket.
///
/// RCON servers never say which packet is the last one of a response. Every
/// read here is bounded by `dur`, and silence for that long at a packet
/// boundary is treated as the end of the response rather than an error.
#[async_trait]
pub(crate) trait ReadRconPackets {
    /// Read the 4 byte size field.
    /// Returns `None` when no byte arrives within `dur`, and a
    /// `ConnectionAborted` error when the stream is closed.
    async fn read_size(&mut self, dur: Duration) -> Result<Option<u32>>;

    /// Read exactly `len` bytes, each read bounded by `dur`.
    async fn read_frame(&mut self, len: usize, dur: Duration) -> Result<Bytes>;

    /// Read whatever arrives, up to `max` bytes, until `dur` passes without
    /// data or the stream is closed.
    async fn read_available(&mut self, max: usize, dur: Duration) -> Result<Bytes>;

    /// Read a single packet, recovering frames whose body would exceed `max_body` bytes.
    async fn read_packet(&mut self, max_body: usize, dur: Duration) -> Result<Option<RconPacket>>;

    /// Read packets until the server goes quiet, grouping bodies by request id.
    ///
    /// A stream closed after at least one packet ends the response; closed
    /// before any packet it is an error.
    async fn read_all(&mut self, max_body: usize, dur: Duration) -> Result<Responses>;
}

#[async_trait]
impl<T> ReadRconPackets for T
where
    T: AsyncRead + Unpin + Send,
{
    async fn read_size(&mut self, dur: Duration) -> Result<Option<u32>> {
        let mut buf = [0u8; 4];
        let mut filled = 0;

        while filled < buf.len() {
            match timeout(dur, self.read(&mut buf[filled..])).await {
                Err(_) if filled == 0 => return Ok(None),
                Err(_) => return Err(timed_out("packet size")),
                Ok(Ok(0)) if filled == 0 => return Err(closed_by_server()),
                Ok(Ok(0)) => return Err(ErrorKind::UnexpectedEof.into()),
                Ok(Ok(n)) => filled += n,
                Ok(Err(err)) => return Err(err),
            }
        }

        Ok(Some(u32::from_le_bytes(buf)))
    }

    async fn read_frame(&mut self, len: usize, dur: Duration) -> Result<Bytes> {
        let mut bytes = BytesMut::zeroed(len);
        let mut filled = 0;

        while filled < len {
            match timeout(dur, self.read(&mut bytes[filled..])).await {
                Err(_) => return Err(timed_out("packet body")),
                Ok(Ok(0)) => return Err(ErrorKind::UnexpectedEof.into()),
                Ok(Ok(n)) => filled += n,
                Ok(Err(err)) => return Err(err),
            }
        }

        Ok(bytes.freeze())
    }

    async fn read_available(&mut self, max: usize, dur: Duration) -> Result<Bytes> {
        let mut bytes = BytesMut::zeroed(max);
        let mut filled = 0;

        while filled < max {
            match timeout(dur, self.read(&mut bytes[filled..])).await {
                Err(_) | Ok(Ok(0)) => break,
                Ok(Ok(n)) => filled += n,
                Ok(Err(err)) => return Err(err),
            }
        }

        bytes.truncate(filled);
        Ok(bytes.freeze())
    }

    async fn read_packet(&mut self, max_body: usize, dur: Duration) -> Result<Option<RconPacket>> {
        let Some(len) = self.read_size(dur).await? else {
            return Ok(None);
        };
        let len = len as usize;

        // header, body, body terminator, packet terminator
        let max_len = HEADER_LEN + max_body + 2;

        if len > max_len {
            warn!(len, max_len, "oversized rcon frame, reading at most the ceiling");

            // the declared size cannot be trusted, so neither can a header
            let mut frame = BytesMut::with_capacity(HEADER_LEN + max_body);
            frame.put_bytes(0, HEADER_LEN);
            frame.put(self.read_available(max_body, dur).await?);

            return Ok(Some(RconPacket::decode(frame.freeze())));
        }

        if len < HEADER_LEN {
            warn!(len, "short rcon frame, padding header");
        }

        let packet = RconPacket::decode(self.read_frame(len, dur).await?);
        trace!(
            request_id = packet.request_id,
            packet_type = ?packet.packet_type,
            len,
            "received rcon packet"
        );

        Ok(Some(packet))
    }

    async fn read_all(&mut self, max_body: usize, dur: Duration) -> Result<Responses> {
        let mut responses = Responses::default();

        loop {
            match self.read_packet(max_body, dur).await {
                Ok(Some(packet)) => responses.push(packet),
                Ok(None) => break,
                Err(err)
                    if err.kind() == ErrorKind::ConnectionAborted && !responses.is_empty() =>
                {
                    debug!("rcon server closed the connection after its response");
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(responses)
    }
}
