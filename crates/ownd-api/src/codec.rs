//! `##`-delimited frame codec for [`tokio_util::codec::Framed`].
//!
//! Inbound bytes are split after every `##`; the terminator stays part of
//! the frame. Bytes outside ASCII are replaced rather than rejected, so a
//! single corrupted frame only fails classification upstream.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::Error;

/// Longest frame the codec will buffer.
pub const MAX_FRAME_LEN: usize = 4096;

const TERMINATOR: &[u8] = ownd_core::frame::TERMINATOR.as_bytes();

#[derive(Debug, Clone, Default)]
pub struct FrameCodec {
    /// Bytes already searched for a terminator.
    scanned: usize,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for FrameCodec {
    type Item = String;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, Error> {
        // Resume one byte early so a terminator split across reads is found.
        let start = self.scanned.saturating_sub(TERMINATOR.len() - 1);
        let found = src
            .get(start..)
            .and_then(|tail| tail.windows(TERMINATOR.len()).position(|w| w == TERMINATOR));

        match found {
            Some(offset) => {
                let end = start + offset + TERMINATOR.len();
                self.scanned = 0;
                let frame = src.split_to(end);
                Ok(Some(String::from_utf8_lossy(&frame).into_owned()))
            }
            None if src.len() > MAX_FRAME_LEN => {
                let len = src.len();
                src.clear();
                self.scanned = 0;
                Err(Error::InvalidFrame(format!(
                    "no terminator within {MAX_FRAME_LEN} bytes ({len} buffered)"
                )))
            }
            None => {
                self.scanned = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => {
                src.clear();
                self.scanned = 0;
                Err(Error::Truncated)
            }
        }
    }
}

impl Encoder<&str> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, frame: &str, dst: &mut BytesMut) -> Result<(), Error> {
        dst.put_slice(frame.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn decode_all(codec: &mut FrameCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(buf).expect("decodes") {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn splits_several_frames_in_one_read() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from("*#*1##*1*1*12##*1*0*1");
        assert_eq!(decode_all(&mut codec, &mut buf), ["*#*1##", "*1*1*12##"]);
        assert_eq!(&buf[..], b"*1*0*1");
    }

    #[test]
    fn terminator_split_across_reads() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from("*1*1*12#");
        assert_eq!(codec.decode(&mut buf).expect("decodes"), None);
        buf.extend_from_slice(b"#*1");
        assert_eq!(
            codec.decode(&mut buf).expect("decodes").as_deref(),
            Some("*1*1*12##")
        );
    }

    #[test]
    fn partial_frame_at_eof_is_truncated() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from("*1*1*1");
        assert!(matches!(codec.decode_eof(&mut buf), Err(Error::Truncated)));

        let mut empty = BytesMut::new();
        assert!(matches!(codec.decode_eof(&mut empty), Ok(None)));
    }

    #[test]
    fn oversized_garbage_is_rejected_and_dropped() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(vec![b'1'; MAX_FRAME_LEN + 1].as_slice());
        assert!(matches!(codec.decode(&mut buf), Err(Error::InvalidFrame(_))));
        assert!(buf.is_empty());
    }

    #[test]
    fn encodes_verbatim() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode("*99*1##", &mut buf).expect("encodes");
        assert_eq!(&buf[..], b"*99*1##");
    }
}
