//! Framed message links between solver workers.
//!
//! Every connection carries length-prefixed frames: a big-endian `u64` byte
//! count, a big-endian `u32` kind header, then the payload. Numeric payloads
//! travel in native layout via [`bytemuck`], so a slice of grid values can be
//! written straight from the field buffer without an intermediate copy.
//!
//! On top of the point-to-point [`Link`]s, [`Collective`] provides the two
//! group-wide operations the solver needs: an all-reduce of the residual sum
//! and a rank-ordered gather of the final field.

mod collective;
mod deserialize;
mod link;
pub mod msg;
mod receiver;
mod sender;
mod serialize;
pub mod topology;

use tokio::io::{AsyncRead, AsyncWrite};

pub use collective::{Collective, MemCollective};
pub use deserialize::Deserialize;
pub use link::{LINK_CAPACITY, Link, MemLink, MemReader, MemWriter, pair};
pub use receiver::RingReceiver;
pub use sender::RingSender;
pub use serialize::Serialize;
pub use topology::{Seat, wire_group};

type LenType = u64;
const LEN_TYPE_SIZE: usize = size_of::<LenType>();

/// Creates both `RingReceiver` and `RingSender` channel parts.
///
/// Given a reader and a writer, returns both ends of a framed connection.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
pub fn channel<R, W>(rx: R, tx: W) -> (RingReceiver<R>, RingSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (RingReceiver::new(rx), RingSender::new(tx))
}
