//! Wire-format constants and tag classification.

use crate::schema::FieldKind;

/// Highest field number permitted by the wire format (2^29 - 1).
pub const MAX_FIELD_NUMBER: u64 = 536_870_911;

/// Low-level encoding discriminant carried in every field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    I64,
    Len,
    SGroup,
    EGroup,
    I32,
}

impl WireType {
    pub fn from_bits(bits: u32) -> Option<WireType> {
        Some(match bits {
            0 => WireType::Varint,
            1 => WireType::I64,
            2 => WireType::Len,
            3 => WireType::SGroup,
            4 => WireType::EGroup,
            5 => WireType::I32,
            _ => return None,
        })
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WireType::Varint => "varint",
            WireType::I64 => "i64",
            WireType::Len => "len",
            WireType::SGroup => "sgroup",
            WireType::EGroup => "egroup",
            WireType::I32 => "i32",
        };
        write!(f, "{label}")
    }
}

/// The wire type a conforming encoder uses for a single (unpacked) value of
/// the given field kind. Groups have no single-value encoding and map to
/// `SGroup`, which the parser rejects.
pub fn expected_wire_type(kind: &FieldKind) -> WireType {
    match kind {
        FieldKind::Int32
        | FieldKind::Int64
        | FieldKind::Uint32
        | FieldKind::Uint64
        | FieldKind::Sint32
        | FieldKind::Sint64
        | FieldKind::Bool
        | FieldKind::Enum(_) => WireType::Varint,
        FieldKind::Fixed64 | FieldKind::Sfixed64 | FieldKind::Double => WireType::I64,
        FieldKind::Fixed32 | FieldKind::Sfixed32 | FieldKind::Float => WireType::I32,
        FieldKind::String | FieldKind::Bytes | FieldKind::Message(_) => WireType::Len,
        FieldKind::Group => WireType::SGroup,
    }
}

/// Whether repeated values of this kind may also arrive packed in a single
/// length-delimited region.
pub fn is_packable(kind: &FieldKind) -> bool {
    !matches!(
        kind,
        FieldKind::String | FieldKind::Bytes | FieldKind::Message(_) | FieldKind::Group
    )
}

pub fn zigzag32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

pub fn zigzag64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_type_bits_round_trip() {
        assert_eq!(WireType::from_bits(0), Some(WireType::Varint));
        assert_eq!(WireType::from_bits(2), Some(WireType::Len));
        assert_eq!(WireType::from_bits(5), Some(WireType::I32));
        assert_eq!(WireType::from_bits(6), None);
        assert_eq!(WireType::from_bits(7), None);
    }

    #[test]
    fn zigzag_decodes_signed_values() {
        assert_eq!(zigzag32(0), 0);
        assert_eq!(zigzag32(1), -1);
        assert_eq!(zigzag32(2), 1);
        assert_eq!(zigzag32(3), -2);
        assert_eq!(zigzag32(4294967294), 2147483647);
        assert_eq!(zigzag32(4294967295), -2147483648);
        assert_eq!(zigzag64(1), -1);
        assert_eq!(zigzag64(u64::MAX), i64::MIN);
    }

    #[test]
    fn expected_wire_types() {
        assert_eq!(expected_wire_type(&FieldKind::Bool), WireType::Varint);
        assert_eq!(expected_wire_type(&FieldKind::Double), WireType::I64);
        assert_eq!(expected_wire_type(&FieldKind::Float), WireType::I32);
        assert_eq!(expected_wire_type(&FieldKind::String), WireType::Len);
        assert!(is_packable(&FieldKind::Sint64));
        assert!(!is_packable(&FieldKind::Bytes));
    }
}
