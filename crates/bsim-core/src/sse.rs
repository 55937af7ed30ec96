//! Incremental decoder for `text/event-stream` bodies.

/// Splits an event-stream byte feed into `data:` payloads.
///
/// Bytes are buffered until a full line is available, so multi-byte UTF-8
/// sequences split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buf: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk; returns every complete `data:` payload.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(data) = data_payload(&line) {
                out.push(data);
            }
        }
        out
    }

    /// Flush a trailing line the upstream did not terminate.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        data_payload(&rest)
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    if data.is_empty() {
        return None;
    }
    Some(data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_data_lines_and_ignores_the_rest() {
        let mut dec = SseLineDecoder::new();
        let got = dec.push(b": keepalive\nevent: message\ndata: {\"a\":1}\n\ndata:[DONE]\n");
        assert_eq!(got, vec!["{\"a\":1}".to_string(), "[DONE]".to_string()]);
    }

    #[test]
    fn joins_lines_split_across_chunks() {
        let mut dec = SseLineDecoder::new();
        assert!(dec.push(b"data: hel").is_empty());
        assert_eq!(dec.push(b"lo\r\n"), vec!["hello".to_string()]);
    }

    #[test]
    fn keeps_utf8_intact_across_chunk_boundaries() {
        let bytes = "data: Привет\n".as_bytes();
        let mut dec = SseLineDecoder::new();
        assert!(dec.push(&bytes[..8]).is_empty());
        assert_eq!(dec.push(&bytes[8..]), vec!["Привет".to_string()]);
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut dec = SseLineDecoder::new();
        assert!(dec.push(b"data: tail").is_empty());
        assert_eq!(dec.finish().as_deref(), Some("tail"));
        assert_eq!(dec.finish(), None);
    }
}
