//!
//! RESP (REdis Serialization Protocol) framing — the wire codec.
//!
//! Generalizes the free-function-over-a-reader shape of the original
//! source's `resp/parser.go` (`parseSimpleStrings`, `parseBulkStrings`,
//! `parseArrays`, ...) to Tokio's async IO traits, and widens the
//! reply side to a full recursive `Frame` so nested replies (an `EXEC`
//! transaction's array of per-command replies, a pub/sub push frame)
//! round-trip through the same type used for decoding.

use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::{RedliteError, Result};

/// One RESP value: a scalar, or a (possibly nil) array of further frames.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Option<Vec<u8>>),
    Array(Option<Vec<Frame>>),
}

impl Frame {
    pub fn ok() -> Frame {
        Frame::Simple("OK".to_string())
    }

    pub fn queued() -> Frame {
        Frame::Simple("QUEUED".to_string())
    }

    pub fn pong() -> Frame {
        Frame::Simple("PONG".to_string())
    }

    pub fn bulk(s: impl Into<Vec<u8>>) -> Frame {
        Frame::Bulk(Some(s.into()))
    }

    pub fn nil_bulk() -> Frame {
        Frame::Bulk(None)
    }

    pub fn array(items: Vec<Frame>) -> Frame {
        Frame::Array(Some(items))
    }

    pub fn empty_array() -> Frame {
        Frame::Array(Some(Vec::new()))
    }

    pub fn error(msg: impl Into<String>) -> Frame {
        Frame::Error(msg.into())
    }

    pub fn int(n: i64) -> Frame {
        Frame::Integer(n)
    }

    /// A `*N\r\n$len\r\n...` array of bulk strings, the shape used for
    /// `SMEMBERS`, `LRANGE`, `HGETALL`, pub/sub push frames, and so on.
    pub fn bulk_array(items: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Frame {
        Frame::array(items.into_iter().map(Frame::bulk).collect())
    }

    pub fn from_error(err: &RedliteError) -> Frame {
        Frame::Error(err.wire_message())
    }

    /// Serializes this frame as wire bytes, appended to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Frame::Simple(s) => {
                out.push(b'+');
                out.extend_from_slice(s.as_bytes());
                out.extend_from_slice(b"\r\n");
            }
            Frame::Error(s) => {
                out.push(b'-');
                out.extend_from_slice(s.as_bytes());
                out.extend_from_slice(b"\r\n");
            }
            Frame::Integer(n) => {
                out.push(b':');
                out.extend_from_slice(n.to_string().as_bytes());
                out.extend_from_slice(b"\r\n");
            }
            Frame::Bulk(None) => out.extend_from_slice(b"$-1\r\n"),
            Frame::Bulk(Some(b)) => {
                out.push(b'$');
                out.extend_from_slice(b.len().to_string().as_bytes());
                out.extend_from_slice(b"\r\n");
                out.extend_from_slice(b);
                out.extend_from_slice(b"\r\n");
            }
            Frame::Array(None) => out.extend_from_slice(b"*-1\r\n"),
            Frame::Array(Some(items)) => {
                out.push(b'*');
                out.extend_from_slice(items.len().to_string().as_bytes());
                out.extend_from_slice(b"\r\n");
                for item in items {
                    item.encode(out);
                }
            }
        }
    }
}

/// Reads exactly one framed value from `reader`.
///
/// Returns `Ok(None)` when the stream closes cleanly between frames
/// (distinguished `Eof`, per the decoder contract); any EOF or malformed
/// byte encountered once a frame has started is a `Protocol` error.
pub async fn decode_frame<R>(reader: &mut R) -> Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(parse_value(reader, line).await?))
}

/// Reads one line that must be present (mid-frame); EOF here is a protocol error.
async fn read_line_mid<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line).await?;
    if n == 0 {
        return Err(RedliteError::Protocol("unexpected eof".to_string()));
    }
    Ok(line)
}

fn trim_crlf(line: &[u8]) -> Result<&[u8]> {
    let without_lf = line
        .strip_suffix(b"\n")
        .ok_or_else(|| RedliteError::Protocol("line missing terminator".to_string()))?;
    without_lf
        .strip_suffix(b"\r")
        .ok_or_else(|| RedliteError::Protocol("missing trailing CRLF".to_string()))
}

fn parse_i64(text: &str) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|_| RedliteError::Protocol(format!("invalid length/integer: '{text}'")))
}

/// Parses one RESP value given its already-read-and-terminated first line.
/// Boxed because async fns cannot recurse directly.
fn parse_value<'a, R>(
    reader: &'a mut R,
    line: Vec<u8>,
) -> Pin<Box<dyn Future<Output = Result<Frame>> + Send + 'a>>
where
    R: AsyncBufRead + Unpin + Send,
{
    Box::pin(async move {
        let content = trim_crlf(&line)?;
        let (&prefix, rest) = content
            .split_first()
            .ok_or_else(|| RedliteError::Protocol("empty frame".to_string()))?;
        let rest = std::str::from_utf8(rest)
            .map_err(|_| RedliteError::Protocol("non-utf8 frame header".to_string()))?;

        match prefix {
            b'+' => Ok(Frame::Simple(rest.to_string())),
            b'-' => Ok(Frame::Error(rest.to_string())),
            b':' => Ok(Frame::Integer(parse_i64(rest)?)),
            b'$' => parse_bulk(reader, rest).await,
            b'*' => parse_array(reader, rest).await,
            // Recognised for robustness per §4.1, never emitted by this server.
            b'_' => Ok(Frame::Bulk(None)),
            b'#' => match rest {
                "t" => Ok(Frame::Integer(1)),
                "f" => Ok(Frame::Integer(0)),
                other => Err(RedliteError::Protocol(format!("invalid boolean '{other}'"))),
            },
            other => Err(RedliteError::Protocol(format!(
                "unknown type prefix '{}'",
                other as char
            ))),
        }
    })
}

async fn parse_bulk<R>(reader: &mut R, len_str: &str) -> Result<Frame>
where
    R: AsyncBufRead + Unpin + Send,
{
    let len = parse_i64(len_str)?;
    if len == -1 {
        return Ok(Frame::Bulk(None));
    }
    if len < 0 {
        return Err(RedliteError::Protocol("negative bulk length".to_string()));
    }
    let len = len as usize;
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|_| RedliteError::Protocol("unexpected eof in bulk string".to_string()))?;
    let mut crlf = [0u8; 2];
    reader
        .read_exact(&mut crlf)
        .await
        .map_err(|_| RedliteError::Protocol("missing trailing CRLF after bulk string".to_string()))?;
    if &crlf != b"\r\n" {
        return Err(RedliteError::Protocol(
            "missing trailing CRLF after bulk string".to_string(),
        ));
    }
    Ok(Frame::Bulk(Some(buf)))
}

async fn parse_array<R>(reader: &mut R, len_str: &str) -> Result<Frame>
where
    R: AsyncBufRead + Unpin + Send,
{
    let len = parse_i64(len_str)?;
    if len == -1 {
        return Ok(Frame::Array(None));
    }
    if len < 0 {
        return Err(RedliteError::Protocol("negative array length".to_string()));
    }
    let mut items = Vec::with_capacity(len as usize);
    for _ in 0..len {
        let line = read_line_mid(reader).await?;
        items.push(parse_value(reader, line).await?);
    }
    Ok(Frame::Array(Some(items)))
}

/// Extracts a command's `(name, args)` from a decoded frame: it must
/// be a non-empty array of bulk strings.
pub fn frame_as_command(frame: Frame) -> Result<Vec<Vec<u8>>> {
    match frame {
        Frame::Array(Some(items)) if !items.is_empty() => items
            .into_iter()
            .map(|item| match item {
                Frame::Bulk(Some(b)) => Ok(b),
                _ => Err(RedliteError::Protocol(
                    "expected array of bulk strings".to_string(),
                )),
            })
            .collect(),
        _ => Err(RedliteError::Protocol(
            "expected non-empty array".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn decode_bytes(bytes: &[u8]) -> Result<Option<Frame>> {
        let mut reader = BufReader::new(bytes);
        decode_frame(&mut reader).await
    }

    #[tokio::test]
    async fn decodes_inline_set_command() {
        let input = b"*3\r\n$3\r\nSET\r\n$5\r\nhello\r\n$5\r\nworld\r\n";
        let frame = decode_bytes(input).await.unwrap().unwrap();
        let cmd = frame_as_command(frame).unwrap();
        assert_eq!(cmd, vec![b"SET".to_vec(), b"hello".to_vec(), b"world".to_vec()]);
    }

    #[tokio::test]
    async fn eof_between_frames_is_none() {
        let frame = decode_bytes(b"").await.unwrap();
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn eof_mid_frame_is_protocol_error() {
        let err = decode_bytes(b"*2\r\n$3\r\nfoo\r\n").await.unwrap_err();
        assert!(matches!(err, RedliteError::Protocol(_)));
    }

    #[tokio::test]
    async fn unknown_prefix_is_protocol_error() {
        let err = decode_bytes(b"^oops\r\n").await.unwrap_err();
        assert!(matches!(err, RedliteError::Protocol(_)));
    }

    #[tokio::test]
    async fn missing_trailing_crlf_after_bulk_is_protocol_error() {
        let err = decode_bytes(b"$3\r\nfooXX").await.unwrap_err();
        assert!(matches!(err, RedliteError::Protocol(_)));
    }

    #[test]
    fn encodes_nested_array_reply() {
        let frame = Frame::array(vec![Frame::ok(), Frame::int(2), Frame::nil_bulk()]);
        let mut out = Vec::new();
        frame.encode(&mut out);
        assert_eq!(out, b"*3\r\n+OK\r\n:2\r\n$-1\r\n".to_vec());
    }

    #[test]
    fn encodes_array_of_bulk_strings() {
        let frame = Frame::bulk_array(vec!["a", "b"]);
        let mut out = Vec::new();
        frame.encode(&mut out);
        assert_eq!(out, b"*2\r\n$1\r\na\r\n$1\r\nb\r\n".to_vec());
    }
}
