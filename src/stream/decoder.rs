//! CRLF frame decoder for the event stream body.
//!
//! The body arrives in arbitrary chunks. Bytes are buffered until a CRLF
//! completes a frame, so a message split across chunks (or a multi-byte
//! character split across chunks) decodes once the rest arrives.

use crate::error::SteamBotsError;
use crate::stream::event::StreamEvent;

/// Delimiter terminating every message on the stream.
pub const FRAME_DELIMITER: &[u8] = b"\r\n";

/// Incremental decoder turning body chunks into [`StreamEvent`]s.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    // Bytes already searched without finding a delimiter.
    scanned: usize,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of body bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Number of bytes buffered but not yet part of a complete frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Take the next complete frame, without its delimiter.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        // A delimiter may straddle the previous scan boundary.
        let start = self.scanned.saturating_sub(FRAME_DELIMITER.len() - 1);
        let found = self.buffer[start..]
            .windows(FRAME_DELIMITER.len())
            .position(|window| window == FRAME_DELIMITER)
            .map(|offset| start + offset);

        match found {
            Some(index) => {
                let frame = self.buffer[..index].to_vec();
                self.buffer.drain(..index + FRAME_DELIMITER.len());
                self.scanned = 0;
                Some(frame)
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Decode the next complete event.
    ///
    /// Blank frames (keep-alives) are skipped. Returns `None` once no
    /// complete frame is buffered.
    pub fn next_event(&mut self) -> Option<Result<StreamEvent, SteamBotsError>> {
        loop {
            let frame = self.next_frame()?;
            if frame.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(StreamEvent::from_slice(&frame));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = b"{\"id\":1,\"type\":\"trade\"}\r\n{\"id\":2,\"type\":\"deposit\"}\r\n{\"id\":3,\"type\":\"trade\",\"name\":\"\xc3\xa9t\xc3\xa9\"}\r\n";

    fn drain(decoder: &mut FrameDecoder) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = decoder.next_event() {
            events.push(event.unwrap());
        }
        events
    }

    fn ids(events: &[StreamEvent]) -> Vec<String> {
        events
            .iter()
            .map(|e| e.id().unwrap().as_str().to_string())
            .collect()
    }

    #[test]
    fn test_whole_body_in_one_chunk() {
        let mut decoder = FrameDecoder::new();
        decoder.push(BODY);
        let events = drain(&mut decoder);
        assert_eq!(ids(&events), vec!["1", "2", "3"]);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn test_every_chunk_size_yields_same_events() {
        for chunk_size in 1..=BODY.len() {
            let mut decoder = FrameDecoder::new();
            let mut events = Vec::new();
            for chunk in BODY.chunks(chunk_size) {
                decoder.push(chunk);
                events.extend(drain(&mut decoder));
            }
            assert_eq!(ids(&events), vec!["1", "2", "3"], "chunk size {chunk_size}");
            assert_eq!(events[2].payload()["name"], "\u{e9}t\u{e9}");
        }
    }

    #[test]
    fn test_delimiter_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"{\"id\":1,\"type\":\"a\"}\r");
        assert!(decoder.next_event().is_none());
        decoder.push(b"\n{\"id\":2");
        let events = drain(&mut decoder);
        assert_eq!(ids(&events), vec!["1"]);
        assert_eq!(decoder.buffered_len(), b"{\"id\":2".len());
    }

    #[test]
    fn test_keepalive_frames_are_skipped() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"\r\n\r\n{\"id\":9,\"type\":\"ping\"}\r\n \r\n");
        let events = drain(&mut decoder);
        assert_eq!(ids(&events), vec!["9"]);
    }

    #[test]
    fn test_lone_newline_is_not_a_delimiter() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"{\"id\":1,\n\"type\":\"a\"}\r\n");
        let events = drain(&mut decoder);
        assert_eq!(ids(&events), vec!["1"]);
    }

    #[test]
    fn test_malformed_frame_is_an_error() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"garbage\r\n{\"id\":1}\r\n");
        assert!(matches!(
            decoder.next_event(),
            Some(Err(SteamBotsError::StreamDecode(_)))
        ));
    }
}
