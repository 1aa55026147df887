//! Line-delimited framing for the agent stdio transport (§4.1).
//!
//! Each message is a single JSON object terminated by `\n`. Readers must
//! accept frames up to [`MAX_FRAME_BYTES`]; anything larger is rejected
//! without silently truncating.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;

/// Minimum frame size readers must accept, per §4.1/§8 boundary behavior.
pub const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024;

/// Read one newline-terminated frame, enforcing [`MAX_FRAME_BYTES`].
///
/// Returns `Ok(None)` on clean EOF with no partial data (the stream closed
/// between frames). A partial, unterminated frame at EOF is a protocol
/// error, not a silent truncation.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut limited = reader.take(MAX_FRAME_BYTES as u64 + 1);
    let n = limited.read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    if buf.len() > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge {
            max: MAX_FRAME_BYTES,
        });
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else {
        // Hit EOF mid-frame: no trailing newline was ever written.
        return Err(ProtocolError::ConnectionClosed);
    }
    Ok(Some(buf))
}

/// Write one frame followed by a single `\n`. Nothing else should ever be
/// written to this stream (stdout is reserved for AP frames; diagnostics go
/// to stderr).
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(payload).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn reads_single_frame() {
        let data = b"{\"a\":1}\n".to_vec();
        let mut reader = BufReader::new(&data[..]);
        let frame = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(frame, b"{\"a\":1}");
    }

    #[tokio::test]
    async fn reads_multiple_frames_in_order() {
        let data = b"{\"a\":1}\n{\"a\":2}\n".to_vec();
        let mut reader = BufReader::new(&data[..]);
        let first = read_frame(&mut reader).await.unwrap().unwrap();
        let second = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(first, b"{\"a\":1}");
        assert_eq!(second, b"{\"a\":2}");
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn accepts_frame_at_the_10mib_boundary() {
        let mut data = vec![b'1'; MAX_FRAME_BYTES - 1];
        data.push(b'\n');
        let mut reader = BufReader::new(&data[..]);
        let frame = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(frame.len(), MAX_FRAME_BYTES - 1);
    }

    #[tokio::test]
    async fn rejects_frame_over_10mib_plus_one() {
        let mut data = vec![b'1'; MAX_FRAME_BYTES + 1];
        data.push(b'\n');
        let mut reader = BufReader::new(&data[..]);
        let err = read_frame(&mut reader).await.unwrap_err();
        assert!(matches!(err, ProtocolError::FrameTooLarge { .. }));
    }

    #[tokio::test]
    async fn write_frame_appends_single_newline() {
        let mut out = Vec::new();
        write_frame(&mut out, b"{}").await.unwrap();
        assert_eq!(out, b"{}\n");
    }
}
