/// IRC line codec — frames a TCP byte stream into IRC messages.
///
/// Splits on `\n` (an optional preceding `\r` is stripped, so both RFC
/// `\r\n` and bare `\n` framing are accepted), parses each line into a
/// [`Message`], and serializes outgoing messages with `\r\n` termination.
///
/// Blank lines are skipped. Lines whose parameters contain forbidden
/// characters are dropped with a warning; the connection survives. A line
/// that outgrows [`MAX_LINE_LENGTH`] without a terminator is a protocol
/// error and ends the connection.
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use super::message::{Message, ParseError};

/// Maximum buffered line length (excluding the terminator).
/// RFC 2812 says 512 bytes; IRCv3 `message-tags` can push this to 8191.
const MAX_LINE_LENGTH: usize = 8191;

/// Codec error: either a protocol violation or an I/O error.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("line exceeds maximum length ({MAX_LINE_LENGTH} bytes)")]
    LineTooLong,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A tokio codec that frames IRC messages on line boundaries.
#[derive(Debug, Default)]
pub struct IrcCodec;

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(pos) = src.iter().position(|&b| b == b'\n') else {
                // No complete line yet. Check if the buffer is getting too large.
                if src.len() > MAX_LINE_LENGTH {
                    return Err(CodecError::LineTooLong);
                }
                return Ok(None);
            };

            if pos > MAX_LINE_LENGTH {
                return Err(CodecError::LineTooLong);
            }

            // Extract the line (without `\n`), advance the buffer.
            let mut line_bytes = src.split_to(pos);
            src.advance(1); // skip \n
            if line_bytes.last() == Some(&b'\r') {
                line_bytes.truncate(line_bytes.len() - 1);
            }

            let line = std::str::from_utf8(&line_bytes)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

            match Message::parse(line) {
                Ok(msg) => return Ok(Some(msg)),
                // Blank lines carry nothing; skip to the next one.
                Err(ParseError::Empty) => continue,
                Err(e) => {
                    warn!(%line, "dropping unparseable line: {e}");
                    continue;
                }
            }
        }
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let wire = item.to_wire();
        dst.reserve(wire.len() + 2);
        dst.put_slice(wire.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
