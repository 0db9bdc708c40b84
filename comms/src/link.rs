//! A bidirectional link: one framed receiver and sender pair.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadHalf, WriteHalf};

use crate::{Deserialize, RingReceiver, RingSender, Serialize, channel};

/// Byte capacity of each direction of an in-memory link.
///
/// Deliberately smaller than the smallest frame (a halo frame is 16 bytes on
/// the wire), so a send can only complete while the peer is draining its end.
/// That reproduces the synchronous-send regime the halo protocol's parity
/// ordering exists for: an unmatched send parks the sender instead of
/// buffering silently.
pub const LINK_CAPACITY: usize = 4;

/// The read half of an in-memory link, as produced by [`pair`].
pub type MemReader = ReadHalf<DuplexStream>;
/// The write half of an in-memory link, as produced by [`pair`].
pub type MemWriter = WriteHalf<DuplexStream>;
/// An in-memory link end, as produced by [`pair`].
pub type MemLink = Link<MemReader, MemWriter>;

/// Both ends of one framed connection, bundled.
pub struct Link<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    rx: RingReceiver<R>,
    tx: RingSender<W>,
}

impl<R: AsyncRead + Unpin, W: AsyncWrite + Unpin> Link<R, W> {
    pub fn new(rx: RingReceiver<R>, tx: RingSender<W>) -> Self {
        Self { rx, tx }
    }

    /// Sends one frame, completing once the transport accepted it.
    pub async fn send<'a, T: Serialize<'a>>(&mut self, msg: &'a T) -> io::Result<()> {
        self.tx.send(msg).await
    }

    /// Receives one frame. The value may borrow the link's receive buffer.
    pub async fn recv<'s, T: Deserialize<'s>>(&'s mut self) -> io::Result<T> {
        self.rx.recv().await
    }
}

/// Creates a connected pair of in-memory links with rendezvous-sized buffers.
pub fn pair() -> (MemLink, MemLink) {
    let (a, b) = tokio::io::duplex(LINK_CAPACITY);
    (from_stream(a), from_stream(b))
}

fn from_stream(stream: DuplexStream) -> MemLink {
    let (rx, tx) = tokio::io::split(stream);
    let (rx, tx) = channel(rx, tx);
    Link::new(rx, tx)
}
