use std::io;

use crate::{Deserialize, Serialize};

type Header = u32;
const HEADER_SIZE: usize = size_of::<Header>();

/// Direction tag on a halo frame.
///
/// Odd ranks open every pairing by sending `BoundaryDown`; their even
/// neighbors answer with `BoundaryUp`. A receiver always knows which tag it
/// is owed next, so a mismatch is a protocol violation, not a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaloTag {
    BoundaryDown,
    BoundaryUp,
}

impl HaloTag {
    pub fn name(self) -> &'static str {
        match self {
            HaloTag::BoundaryDown => "halo boundary-down",
            HaloTag::BoundaryUp => "halo boundary-up",
        }
    }
}

/// Every frame the solver puts on a link.
#[derive(Debug, PartialEq)]
pub enum Msg<'a> {
    /// One boundary value travelling to a neighbor.
    Halo { tag: HaloTag, value: f32 },
    /// A worker's local squared-change sum for the current iteration.
    ResidualShare(f64),
    /// The group-wide residual pushed back by the coordinator.
    ResidualTotal(f64),
    /// A worker's owned grid values, contributed to the final gather.
    FieldSlice(&'a [f32]),
}

impl Msg<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Msg::Halo { tag, .. } => tag.name(),
            Msg::ResidualShare(_) => "residual share",
            Msg::ResidualTotal(_) => "residual total",
            Msg::FieldSlice(_) => "field slice",
        }
    }

    fn buf_is_too_small<T>(size: usize) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("The given buffer is too small {size}, must at least be {HEADER_SIZE} bytes"),
        ))
    }

    fn invalid_kind<T>(kind: Header) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an invalid kind header {kind}"),
        ))
    }
}

fn scalar<T: bytemuck::Pod>(body: &[u8]) -> io::Result<T> {
    if body.len() != size_of::<T>() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Scalar payload of {} bytes, expected {}",
                body.len(),
                size_of::<T>()
            ),
        ));
    }

    Ok(bytemuck::pod_read_unaligned(body))
}

impl<'a> Serialize<'a> for Msg<'a> {
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]> {
        match self {
            Msg::Halo { tag, value } => {
                let kind = match tag {
                    HaloTag::BoundaryDown => 1,
                    HaloTag::BoundaryUp => 2,
                };
                buf.extend_from_slice(&(kind as Header).to_be_bytes());
                buf.extend_from_slice(bytemuck::bytes_of(value));
                None
            }
            Msg::ResidualShare(sum) => {
                buf.extend_from_slice(&(3 as Header).to_be_bytes());
                buf.extend_from_slice(bytemuck::bytes_of(sum));
                None
            }
            Msg::ResidualTotal(sum) => {
                buf.extend_from_slice(&(4 as Header).to_be_bytes());
                buf.extend_from_slice(bytemuck::bytes_of(sum));
                None
            }
            Msg::FieldSlice(values) => {
                buf.extend_from_slice(&(5 as Header).to_be_bytes());
                Some(bytemuck::cast_slice(values))
            }
        }
    }
}

impl<'a> Deserialize<'a> for Msg<'a> {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Self::buf_is_too_small(buf.len());
        }

        let (kind_buf, body) = buf.split_at(HEADER_SIZE);

        // SAFETY: The buffer was split to exactly `HEADER_SIZE` just above.
        let kind = Header::from_be_bytes(kind_buf.try_into().unwrap());

        match kind {
            1 | 2 => {
                let tag = if kind == 1 {
                    HaloTag::BoundaryDown
                } else {
                    HaloTag::BoundaryUp
                };
                Ok(Msg::Halo {
                    tag,
                    value: scalar(body)?,
                })
            }
            3 => Ok(Msg::ResidualShare(scalar(body)?)),
            4 => Ok(Msg::ResidualTotal(scalar(body)?)),
            5 => {
                let values = bytemuck::try_cast_slice(body)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
                Ok(Msg::FieldSlice(values))
            }
            kind => Self::invalid_kind(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(msg: &Msg<'_>) -> Vec<u8> {
        let mut buf = Vec::new();
        let tail = msg.serialize(&mut buf);
        if let Some(tail) = tail {
            buf.extend_from_slice(tail);
        }
        buf
    }

    #[test]
    fn halo_frames_carry_tag_and_value() {
        for (tag, kind) in [(HaloTag::BoundaryDown, 1u32), (HaloTag::BoundaryUp, 2u32)] {
            let bytes = encode(&Msg::Halo { tag, value: 2.5 });
            assert_eq!(bytes[..4], kind.to_be_bytes());

            let decoded = Msg::deserialize(&bytes).unwrap();
            assert_eq!(decoded, Msg::Halo { tag, value: 2.5 });
        }
    }

    #[test]
    fn residual_frames_round_trip_f64() {
        let bytes = encode(&Msg::ResidualShare(1e-7));
        assert_eq!(Msg::deserialize(&bytes).unwrap(), Msg::ResidualShare(1e-7));

        let bytes = encode(&Msg::ResidualTotal(42.0));
        assert_eq!(Msg::deserialize(&bytes).unwrap(), Msg::ResidualTotal(42.0));
    }

    #[test]
    fn field_slice_is_borrowed_from_the_buffer() {
        let values = [1.0f32, -2.0, 3.5];
        let bytes = encode(&Msg::FieldSlice(&values));

        match Msg::deserialize(&bytes).unwrap() {
            Msg::FieldSlice(decoded) => assert_eq!(decoded, values),
            other => panic!("expected field slice, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let mut bytes = 9u32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&1.0f32.to_le_bytes());

        let err = Msg::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_scalar_is_rejected() {
        let bytes = 3u32.to_be_bytes().to_vec();
        assert!(Msg::deserialize(&bytes).is_err());
    }
}
