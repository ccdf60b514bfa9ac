//! Incremental WebSocket frame decoding
//!
//! A [`FrameDecoder`] is owned by exactly one connection. Raw byte chunks
//! arrive with no boundary guarantees; the decoder appends them to its
//! receive buffer and drains every complete frame, unmasking each payload
//! before it is surfaced. Trailing bytes of an incomplete frame stay
//! buffered until the next feed.
//!
//! Byte 0 of each frame (fin, reserved bits, opcode) is ignored: this
//! decoder consumes a single client-to-server data stream and performs no
//! opcode dispatch and no outbound framing.

use crate::error::{FrameError, Result};
use crate::protocol::{constants::DEFAULT_MAX_FRAME_SIZE, frame::*};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Connection-scoped incremental frame decoder
#[derive(Debug)]
pub struct FrameDecoder {
    /// Receive buffer: zero or more complete frames followed by at most one
    /// incomplete frame prefix
    buffer: BytesMut,
    /// Largest declared payload length accepted before failing closed
    max_frame_size: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }
}

impl FrameDecoder {
    /// Create a decoder with the default frame size limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with an explicit frame size limit
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            max_frame_size,
        }
    }

    /// Accept newly arrived bytes and drain every complete frame.
    ///
    /// Returns the unmasked payloads in wire order. An empty vector means
    /// the buffer holds only an incomplete frame prefix; that is a steady
    /// state, not an error. [`FrameError::TooLarge`] means the peer declared
    /// a payload beyond the configured limit and the connection should be
    /// dropped.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Bytes>> {
        self.buffer.extend_from_slice(data);

        let mut payloads = Vec::new();
        while let Some(payload) = self.try_decode()? {
            payloads.push(payload);
        }
        Ok(payloads)
    }

    /// Attempt to extract one complete frame from the front of the buffer.
    fn try_decode(&mut self) -> Result<Option<Bytes>> {
        let buf = &self.buffer;

        // A buffer of length 0 or 1 carries no length class yet.
        if buf.len() < HEADER_SIZE_INLINE {
            return Ok(None);
        }

        let (payload_len, header_size) = match buf[1] & PAYLOAD_LEN_MASK {
            PAYLOAD_LEN_16 => {
                if buf.len() < HEADER_SIZE_16 {
                    return Ok(None);
                }
                let len = u16::from_be_bytes([buf[2], buf[3]]);
                (len as usize, HEADER_SIZE_16)
            }
            PAYLOAD_LEN_64 => {
                if buf.len() < HEADER_SIZE_64 {
                    return Ok(None);
                }
                let mut len = [0u8; 8];
                len.copy_from_slice(&buf[2..HEADER_SIZE_64]);
                (u64::from_be_bytes(len) as usize, HEADER_SIZE_64)
            }
            inline => (inline as usize, HEADER_SIZE_INLINE),
        };

        if payload_len > self.max_frame_size {
            return Err(FrameError::TooLarge {
                size: payload_len,
                max: self.max_frame_size,
            }
            .into());
        }

        let total_frame_size = header_size + MASKING_KEY_LEN + payload_len;
        if buf.len() < total_frame_size {
            return Ok(None);
        }

        let mut mask = [0u8; MASKING_KEY_LEN];
        mask.copy_from_slice(&buf[header_size..header_size + MASKING_KEY_LEN]);

        let masked = &buf[header_size + MASKING_KEY_LEN..total_frame_size];
        let mut payload = BytesMut::with_capacity(payload_len);
        for (i, &byte) in masked.iter().enumerate() {
            payload.put_u8(byte ^ mask[i % MASKING_KEY_LEN]);
        }

        self.buffer.advance(total_frame_size);
        Ok(Some(payload.freeze()))
    }

    /// Number of bytes currently buffered
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}
