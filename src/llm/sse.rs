//! Incremental Server-Sent Events decoder
//!
//! Both provider streams arrive as SSE over a chunked HTTP body. Chunk
//! boundaries fall anywhere - mid-line, mid-frame - so the decoder buffers
//! bytes and yields only complete frames. OpenAI-style streams carry bare
//! `data:` lines; Anthropic-style streams dispatch on the `event:` field,
//! so frames keep the event name alongside the payload.

/// One decoded SSE frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if the frame carried one
    pub event: Option<String>,
    /// Concatenated `data:` payload
    pub data: String,
}

/// Buffers incoming bytes and extracts complete SSE frames
///
/// A frame ends at a blank line. Multi-line `data:` fields are joined
/// with `\n` per the SSE spec; comment lines (leading `:`) and unknown
/// fields are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    event: Option<String>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push incoming bytes; returns every frame completed by this chunk
    ///
    /// Incomplete frames stay buffered for the next `push()` or `finish()`.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));

        let mut frames = Vec::new();
        while let Some(newline_pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline_pos).collect();
            if let Some(frame) = self.take_line(line.trim_end_matches(['\n', '\r'])) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush the trailing frame when the stream ends without a final blank line
    pub fn finish(&mut self) -> Vec<SseFrame> {
        let rest = std::mem::take(&mut self.buffer);
        let mut frames = Vec::new();
        for line in rest.lines() {
            if let Some(frame) = self.take_line(line.trim_end_matches('\r')) {
                frames.push(frame);
            }
        }
        if let Some(frame) = self.flush_pending() {
            frames.push(frame);
        }
        frames
    }

    fn take_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.flush_pending();
        }
        if line.starts_with(':') {
            return None; // comment / keep-alive
        }
        if let Some(value) = line.strip_prefix("event:") {
            self.event = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            self.data_lines.push(value.trim().to_string());
        }
        None
    }

    fn flush_pending(&mut self) -> Option<SseFrame> {
        if self.event.is_none() && self.data_lines.is_empty() {
            return None;
        }
        let frame = SseFrame {
            event: self.event.take(),
            data: std::mem::take(&mut self.data_lines).join("\n"),
        };
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_frame(data: &str) -> SseFrame {
        SseFrame {
            event: None,
            data: data.to_string(),
        }
    }

    #[test]
    fn test_single_complete_frame() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data: {\"hello\":\"world\"}\n\n");
        assert_eq!(frames, vec![data_frame("{\"hello\":\"world\"}")]);
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data: {\"a\":1}\n\ndata: {\"b\":2}\n\n");
        assert_eq!(frames, vec![data_frame("{\"a\":1}"), data_frame("{\"b\":2}")]);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = SseDecoder::new();

        let frames1 = decoder.push(b"data: {\"text\":\"hel");
        assert!(frames1.is_empty());

        let frames2 = decoder.push(b"lo\"}\n\n");
        assert_eq!(frames2, vec![data_frame("{\"text\":\"hello\"}")]);
    }

    #[test]
    fn test_event_field_is_kept() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(
            b"event: content_block_delta\ndata: {\"delta\":{\"text\":\"hi\"}}\n\n",
        );
        assert_eq!(
            frames,
            vec![SseFrame {
                event: Some("content_block_delta".to_string()),
                data: "{\"delta\":{\"text\":\"hi\"}}".to_string(),
            }]
        );
    }

    #[test]
    fn test_event_does_not_leak_into_next_frame() {
        let mut decoder = SseDecoder::new();
        let frames =
            decoder.push(b"event: message_start\ndata: {}\n\ndata: {\"x\":1}\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event.as_deref(), Some("message_start"));
        assert_eq!(frames[1].event, None);
    }

    #[test]
    fn test_final_frame_without_trailing_newline() {
        let mut decoder = SseDecoder::new();

        let frames1 = decoder.push(b"data: {\"a\":1}\n\ndata: {\"b\":2}");
        assert_eq!(frames1, vec![data_frame("{\"a\":1}")]);

        let remaining = decoder.finish();
        assert_eq!(remaining, vec![data_frame("{\"b\":2}")]);
    }

    #[test]
    fn test_finish_clears_state() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: {\"a\":1}");
        assert_eq!(decoder.finish(), vec![data_frame("{\"a\":1}")]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b": keep-alive\n\n\ndata: {\"x\":1}\n\n");
        assert_eq!(frames, vec![data_frame("{\"x\":1}")]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data: {\"x\":1}\r\n\r\n");
        assert_eq!(frames, vec![data_frame("{\"x\":1}")]);
    }

    #[test]
    fn test_multi_line_data_joined() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data: first\ndata: second\n\n");
        assert_eq!(frames, vec![data_frame("first\nsecond")]);
    }

    #[test]
    fn test_utf8_lossy_conversion() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data: {\"text\":\"\xFF\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert!(frames[0].data.contains("text"));
    }
}
