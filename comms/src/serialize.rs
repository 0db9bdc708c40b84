pub trait Serialize<'a> {
    /// Encodes the fixed part of the frame into `buf` and optionally returns
    /// a borrowed tail to be written after it, zero-copy.
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]>;
}
