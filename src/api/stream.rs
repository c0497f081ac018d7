use crate::error::TransportError;
use crate::types::{Frame, DEFAULT_EVENT_NAME};
use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use std::io;
use std::pin::Pin;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Line-driven SSE record parser.
///
/// Feed it one line at a time; a blank line closes the current record. The
/// parser never fails: unknown lines are skipped and malformed payloads are
/// left for the decoder to reject.
#[derive(Debug, Default)]
pub struct SseFrameParser {
    event: Option<String>,
    data_lines: Vec<String>,
}

impl SseFrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, raw: &str) -> Option<Frame> {
        let line = raw.trim_end_matches(['\n', '\r']);

        if line.is_empty() {
            let frame = self.take_frame();
            self.event = None;
            return frame;
        }

        if line.starts_with(':') {
            return None;
        }

        if let Some(rest) = line.strip_prefix("event:") {
            self.event = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            self.data_lines.push(rest.to_string());
        }

        None
    }

    /// Emits the trailing record of a stream that ended without a blank line.
    pub fn finish(&mut self) -> Option<Frame> {
        let frame = self.take_frame();
        self.event = None;
        frame
    }

    fn take_frame(&mut self) -> Option<Frame> {
        if self.data_lines.is_empty() {
            return None;
        }

        let data = std::mem::take(&mut self.data_lines).join("\n");
        let event = self
            .event
            .take()
            .unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string());
        Some(Frame { event, data })
    }
}

/// Lazily parses frames out of an in-memory line sequence.
pub struct Frames<I> {
    lines: I,
    parser: SseFrameParser,
    done: bool,
}

pub fn frames<I>(lines: I) -> Frames<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Frames {
        lines: lines.into_iter(),
        parser: SseFrameParser::new(),
        done: false,
    }
}

impl<I> Iterator for Frames<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.done {
            return None;
        }

        for line in self.lines.by_ref() {
            if let Some(frame) = self.parser.push_line(line.as_ref()) {
                return Some(frame);
            }
        }

        self.done = true;
        self.parser.finish()
    }
}

/// Pull-based frame stream over a line stream.
///
/// A transport error is yielded once and ends the stream.
pub fn frame_stream<S>(lines: S) -> impl Stream<Item = Result<Frame, TransportError>>
where
    S: Stream<Item = Result<String, TransportError>> + Unpin,
{
    stream::unfold(Some((lines, SseFrameParser::new())), |state| async move {
        let (mut lines, mut parser) = state?;
        loop {
            match lines.next().await {
                Some(Ok(line)) => {
                    if let Some(frame) = parser.push_line(&line) {
                        return Some((Ok(frame), Some((lines, parser))));
                    }
                }
                Some(Err(error)) => return Some((Err(error), None)),
                None => return parser.finish().map(|frame| (Ok(frame), None)),
            }
        }
    })
}

/// Splits a response body into text lines. A final unterminated line is
/// still delivered when the connection closes.
pub fn lines_from_bytes(body: ByteStream) -> LineStream {
    let reader = StreamReader::new(body.map(|chunk| chunk.map_err(io::Error::other)));
    let lines = FramedRead::new(reader, LinesCodec::new())
        .map(|line| line.map_err(|error| TransportError::Stream(error.to_string())));
    Box::pin(lines)
}
