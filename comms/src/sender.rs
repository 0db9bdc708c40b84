//! The sending end of the link framing layer.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{LEN_TYPE_SIZE, LenType, Serialize};

/// The sending end handle of a framed link.
pub struct RingSender<W>
where
    W: AsyncWrite + Unpin,
{
    tx: W,
    buf: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> RingSender<W> {
    pub(super) fn new(tx: W) -> Self {
        Self {
            tx,
            buf: Vec::new(),
        }
    }

    /// Frames `msg` and writes it out, flushing before returning.
    ///
    /// Completion means the bytes were accepted by the transport, not that
    /// the peer consumed them. The in-memory links built by [`crate::pair`]
    /// have a buffer smaller than any frame, so there a completed send does
    /// imply the peer is actively receiving.
    pub async fn send<'a, T: Serialize<'a>>(&mut self, msg: &'a T) -> io::Result<()> {
        let Self { buf, tx } = self;

        buf.clear();
        buf.resize(LEN_TYPE_SIZE, 0);

        let tail = msg.serialize(buf);
        let body_len = buf.len() - LEN_TYPE_SIZE + tail.map(<[_]>::len).unwrap_or_default();
        let header = (body_len as LenType).to_be_bytes();
        buf[..header.len()].copy_from_slice(&header);

        tx.write_all(buf).await?;
        if let Some(tail) = tail {
            tx.write_all(tail).await?;
        }

        tx.flush().await
    }
}
