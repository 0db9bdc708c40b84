//! The receiving end of the link framing layer.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{Deserialize, LEN_TYPE_SIZE, LenType};

/// The receiving end handle of a framed link.
///
/// Owns the scratch buffer frames are read into; values returned by
/// [`RingReceiver::recv`] may borrow from it and live until the next call.
pub struct RingReceiver<R: AsyncRead + Unpin> {
    rx: R,
    buf: Vec<u32>,
}

impl<R: AsyncRead + Unpin> RingReceiver<R> {
    pub(super) fn new(rx: R) -> Self {
        Self {
            rx,
            buf: Vec::new(),
        }
    }

    /// Waits for the next frame and decodes it as a `T`.
    ///
    /// # Returns
    /// The decoded message, or `io::Error` when the peer is gone or the
    /// frame does not parse.
    pub async fn recv<'s, T: Deserialize<'s>>(&'s mut self) -> io::Result<T> {
        let mut size_buf = [0; LEN_TYPE_SIZE];
        self.rx.read_exact(&mut size_buf).await?;
        let len = LenType::from_be_bytes(size_buf) as usize;

        // The scratch buffer is `u32` so the payload after the 4-byte kind
        // header stays 4-byte aligned for the slice casts in deserialization.
        let words = len.div_ceil(size_of::<u32>());
        self.buf.clear();
        self.buf.resize(words, 0);

        let view: &mut [u8] = bytemuck::cast_slice_mut(self.buf.as_mut_slice());
        let frame = &mut view[..len];
        self.rx.read_exact(frame).await?;

        T::deserialize(frame)
    }
}
