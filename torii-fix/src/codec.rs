/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! FIX stream framing.
//!
//! [`FrameBuffer`] accumulates raw socket bytes and yields complete frames.
//! A frame boundary is the SOH following the `10=` trailer; a valid frame
//! begins with `8=`. Bytes preceding a non-starting frame are discarded,
//! which is how the stream recovers after a codec error.

use bytes::{BufMut, BytesMut};
use memchr::{memchr, memmem};

use crate::message::SOH;

/// Accumulating frame splitter for a FIX byte stream.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: BytesMut,
}

impl FrameBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes received from the socket.
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Pops the next complete frame, or `None` if more bytes are needed.
    pub fn next_frame(&mut self) -> Option<BytesMut> {
        loop {
            // The checksum field always follows another field, so scan for
            // an SOH-anchored trailer; this cannot fire inside a larger tag
            // such as 110.
            let trailer = memmem::find(&self.buf, b"\x0110=")? + 1;
            let soh = memchr(SOH, &self.buf[trailer + 3..])?;
            let boundary = trailer + 3 + soh + 1;

            if self.buf.starts_with(b"8=") {
                return Some(self.buf.split_to(boundary));
            }

            // Drop bytes that precede a frame start, or the whole
            // non-starting frame if none is found.
            match memmem::find(&self.buf[..boundary], b"8=") {
                Some(start) => {
                    let _ = self.buf.split_to(start);
                }
                None => {
                    let _ = self.buf.split_to(boundary);
                }
            }
        }
    }

    /// Bytes currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::FixMessage;
    use crate::tags::tag;

    fn sample_frame() -> BytesMut {
        let mut msg = FixMessage::with_type("0");
        msg.set(tag::SENDER_COMP_ID, "CLIENT")
            .set(tag::TARGET_COMP_ID, "OMS")
            .set(tag::MSG_SEQ_NUM, "1");
        msg.seal()
    }

    #[test]
    fn test_whole_frame() {
        let frame = sample_frame();
        let mut fb = FrameBuffer::new();
        fb.extend(&frame);
        assert_eq!(fb.next_frame().unwrap(), frame);
        assert!(fb.is_empty());
    }

    #[test]
    fn test_split_delivery() {
        let frame = sample_frame();
        let mut fb = FrameBuffer::new();
        fb.extend(&frame[..10]);
        assert!(fb.next_frame().is_none());
        fb.extend(&frame[10..]);
        assert_eq!(fb.next_frame().unwrap(), frame);
    }

    #[test]
    fn test_two_frames_in_one_read() {
        let frame = sample_frame();
        let mut fb = FrameBuffer::new();
        let mut both = frame.to_vec();
        both.extend_from_slice(&frame);
        fb.extend(&both);
        assert_eq!(fb.next_frame().unwrap(), frame);
        assert_eq!(fb.next_frame().unwrap(), frame);
        assert!(fb.next_frame().is_none());
    }

    #[test]
    fn test_garbage_prefix_discarded() {
        let frame = sample_frame();
        let mut fb = FrameBuffer::new();
        fb.extend(b"noise\x01junk");
        fb.extend(&frame);
        assert_eq!(fb.next_frame().unwrap(), frame);
    }

    #[test]
    fn test_tag_110_does_not_split_frame() {
        let mut msg = FixMessage::with_type("A");
        msg.set(110, "5").set(tag::MSG_SEQ_NUM, "1");
        let frame = msg.seal();
        let mut fb = FrameBuffer::new();
        fb.extend(&frame);
        let popped = fb.next_frame().unwrap();
        assert_eq!(popped, frame);
        let decoded = FixMessage::decode(&popped).unwrap();
        assert_eq!(decoded.get(110), Some("5"));
    }
}
