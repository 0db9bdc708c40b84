use std::io;

pub trait Deserialize<'a>: Sized {
    /// Decodes a frame body. Borrowing variants keep pointing into `buf`,
    /// which is why the receiver ties returned values to its buffer.
    fn deserialize(buf: &'a [u8]) -> io::Result<Self>;
}
