//! `Content-Length` framing over byte streams.
//!
//! ```text
//! Content-Length: <length>\r\n
//! \r\n
//! <payload>
//! ```

use std::io::{self, BufRead, Write};

use crate::error::TransportError;

const CONTENT_LENGTH: &str = "content-length";

/// Largest message body accepted from the client.
const MAX_CONTENT_LENGTH: usize = 64 * 1024 * 1024;

/// Reads and writes framed messages.
///
/// Generic over the streams so the server can run against stdio in
/// production and in-memory buffers in tests.
#[derive(Debug)]
pub struct Transport<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Transport<R, W> {
    /// Wraps a reader and writer.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Writes one framed message and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if writing fails.
    pub fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        write!(self.writer, "Content-Length: {}\r\n\r\n", message.len())?;
        self.writer.write_all(message)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Reads one framed message, blocking until it is complete.
    ///
    /// Returns `None` when the stream ends cleanly between messages.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MissingContentLength`] or
    /// [`TransportError::InvalidHeader`] for bad headers or a length above
    /// the accepted maximum, and
    /// [`TransportError::Io`] when the stream fails or ends mid-message.
    pub fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let Some(content_length) = self.read_headers()? else {
            return Ok(None);
        };
        let mut content = vec![0_u8; content_length];
        self.reader.read_exact(&mut content)?;
        Ok(Some(content))
    }

    /// The underlying writer.
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    fn read_headers(&mut self) -> Result<Option<usize>, TransportError> {
        let mut content_length = None;
        let mut seen_header = false;

        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                if seen_header {
                    return Err(TransportError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed while reading headers",
                    )));
                }
                return Ok(None);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                if seen_header {
                    break;
                }
                continue;
            }
            seen_header = true;

            if let Some((name, value)) = trimmed.split_once(':')
                && name.trim().eq_ignore_ascii_case(CONTENT_LENGTH)
            {
                let raw = value.trim();
                let length = raw
                    .parse::<usize>()
                    .ok()
                    .filter(|&length| length <= MAX_CONTENT_LENGTH)
                    .ok_or_else(|| TransportError::InvalidHeader {
                        value: raw.to_owned(),
                    })?;
                content_length = Some(length);
            }
        }

        content_length
            .map(Some)
            .ok_or(TransportError::MissingContentLength)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    fn transport(input: &[u8]) -> Transport<Cursor<Vec<u8>>, Vec<u8>> {
        Transport::new(Cursor::new(input.to_vec()), Vec::new())
    }

    #[rstest]
    fn sends_framed_message() {
        let mut framed = transport(b"");

        framed.send(b"test payload").expect("send failed");

        assert_eq!(framed.writer(), b"Content-Length: 12\r\n\r\ntest payload");
    }

    #[rstest]
    #[case(b"Content-Length: 5\r\n\r\nhello".as_slice())]
    #[case(b"Content-Length: 5\r\nContent-Type: application/vscode-jsonrpc\r\n\r\nhello".as_slice())]
    #[case(b"content-length:5\r\n\r\nhello".as_slice())]
    fn receives_framed_message(#[case] input: &[u8]) {
        let mut framed = transport(input);

        let received = framed.receive().expect("receive failed");

        assert_eq!(received.as_deref(), Some(b"hello".as_slice()));
    }

    #[rstest]
    fn clean_end_of_stream_yields_none() {
        let mut framed = transport(b"");

        assert!(framed.receive().expect("receive failed").is_none());
    }

    #[rstest]
    fn reads_consecutive_messages() {
        let mut framed = transport(b"Content-Length: 2\r\n\r\n{}Content-Length: 4\r\n\r\nnull");

        let first = framed.receive().expect("first");
        let second = framed.receive().expect("second");

        assert_eq!(first.as_deref(), Some(b"{}".as_slice()));
        assert_eq!(second.as_deref(), Some(b"null".as_slice()));
    }

    #[rstest]
    fn rejects_missing_content_length() {
        let mut framed = transport(b"Content-Type: application/json\r\n\r\ntest");

        let result = framed.receive();

        assert!(matches!(result, Err(TransportError::MissingContentLength)));
    }

    #[rstest]
    fn rejects_invalid_content_length() {
        let mut framed = transport(b"Content-Length: invalid\r\n\r\ntest");

        let result = framed.receive();

        assert!(matches!(
            result,
            Err(TransportError::InvalidHeader { value }) if value == "invalid"
        ));
    }

    #[rstest]
    #[case("18446744073709551615")]
    #[case("67108865")]
    fn rejects_oversized_content_length(#[case] length: &str) {
        let mut framed = transport(format!("Content-Length: {length}\r\n\r\n").as_bytes());

        let result = framed.receive();

        assert!(matches!(
            result,
            Err(TransportError::InvalidHeader { value }) if value == length
        ));
    }

    #[rstest]
    fn end_of_stream_inside_headers_is_an_error() {
        let mut framed = transport(b"Content-Length: 10");

        let result = framed.receive();

        assert!(matches!(result, Err(TransportError::Io(_))));
    }
}
