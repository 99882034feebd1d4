//! Newline-delimited frame codec.
//!
//! Wire format: one UTF-8 JSON object per line.
//! ```text
//! {"op":"gpio_set","gpio":17,"state":true}\n
//! ```
//!
//! The decoder accumulates incoming bytes and yields complete lines.  A
//! single socket read may carry part of a line or several lines at once.
//! Lines longer than the configured limit are reported once as
//! [`DecodedFrame::Oversized`] and the remainder of that line is dropped.

/// One unit produced by [`LineDecoder::feed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedFrame {
    Line(String),
    /// The line exceeded the frame limit.
    Oversized,
    /// The line was not valid UTF-8.
    Malformed,
}

/// Streaming line decoder.
pub struct LineDecoder {
    buf: Vec<u8>,
    max_frame: usize,
    /// Skipping the tail of an oversized line.
    discarding: bool,
}

impl LineDecoder {
    pub fn new(max_frame: usize) -> Self {
        Self {
            buf: Vec::with_capacity(max_frame.min(1024)),
            max_frame,
            discarding: false,
        }
    }

    /// Feed bytes into the decoder and collect every completed frame.
    ///
    /// Blank lines are skipped and a trailing `\r` is stripped.
    pub fn feed(&mut self, data: &[u8]) -> Vec<DecodedFrame> {
        let mut frames = Vec::new();

        for &byte in data {
            if byte == b'\n' {
                if self.discarding {
                    self.discarding = false;
                } else if let Some(frame) = self.take_line() {
                    frames.push(frame);
                }
                continue;
            }

            if self.discarding {
                continue;
            }

            if self.buf.len() == self.max_frame {
                self.buf.clear();
                self.discarding = true;
                frames.push(DecodedFrame::Oversized);
                continue;
            }

            self.buf.push(byte);
        }

        frames
    }

    /// Bytes of an incomplete line currently held.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Reset decoder state (e.g. after a protocol error the caller recovers from).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }

    fn take_line(&mut self) -> Option<DecodedFrame> {
        let mut line = std::mem::take(&mut self.buf);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        Some(match String::from_utf8(line) {
            Ok(text) => DecodedFrame::Line(text),
            Err(_) => DecodedFrame::Malformed,
        })
    }
}
