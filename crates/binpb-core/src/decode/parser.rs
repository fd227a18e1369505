//! Descriptor-driven structural parse of one payload against one type.
//!
//! The parse is strict on purpose: every tag's wire type must match the
//! declared field kind, every field number must be known, length-delimited
//! regions must be consumed exactly, and the payload must end on a field
//! boundary. Anything less would let brute-force matching accept unrelated
//! payloads, since the wire format is structurally promiscuous.

use std::collections::HashMap;

use super::error::WireError;
use super::reader::WireReader;
use super::wire::{self, WireType};
use crate::schema::{Cardinality, FieldDescriptor, FieldKind, MessageDescriptor, TypeRegistry};
use crate::{DecodedField, DecodedMessage, DecodedValue};

/// Nested message depth accepted before a payload is rejected.
pub const MAX_NESTING_DEPTH: usize = 100;

pub(crate) fn parse_message(
    descriptor: &MessageDescriptor,
    registry: &TypeRegistry,
    payload: &[u8],
) -> Result<DecodedMessage, WireError> {
    let mut reader = WireReader::new(payload);
    parse_at_depth(descriptor, registry, &mut reader, 0)
}

fn parse_at_depth(
    descriptor: &MessageDescriptor,
    registry: &TypeRegistry,
    reader: &mut WireReader<'_>,
    depth: usize,
) -> Result<DecodedMessage, WireError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(WireError::NestingTooDeep(MAX_NESTING_DEPTH));
    }

    let mut seen: HashMap<u32, Vec<DecodedValue>> = HashMap::new();

    while !reader.at_end()? {
        let tag = reader.read_varint()?;
        let number = tag >> 3;
        if number == 0 || number > wire::MAX_FIELD_NUMBER {
            return Err(WireError::InvalidFieldNumber { number });
        }
        let number = number as u32;
        let bits = (tag & 0x7) as u32;
        let got = WireType::from_bits(bits).ok_or(WireError::ReservedWireType { bits, number })?;
        if matches!(got, WireType::SGroup | WireType::EGroup) {
            return Err(WireError::GroupEncoding { number });
        }

        let field = descriptor
            .field_by_number(number)
            .ok_or_else(|| WireError::UnknownField {
                type_name: descriptor.full_name.clone(),
                number,
            })?;
        let expected = wire::expected_wire_type(&field.kind);
        let values = seen.entry(number).or_default();

        if got == expected {
            values.push(decode_value(field, descriptor, registry, reader, depth)?);
        } else if got == WireType::Len && field.is_repeated() && wire::is_packable(&field.kind) {
            let guard = reader.begin_region()?;
            while !reader.at_end()? {
                values.push(decode_value(field, descriptor, registry, reader, depth)?);
            }
            reader.end_region(guard);
        } else {
            return Err(WireError::WireTypeMismatch {
                type_name: descriptor.full_name.clone(),
                field: field.name.clone(),
                expected,
                got,
            });
        }
    }

    let mut fields = Vec::new();
    for field in &descriptor.fields {
        let Some(mut values) = seen.remove(&field.number) else {
            if field.cardinality == Cardinality::Required {
                return Err(WireError::MissingRequired {
                    type_name: descriptor.full_name.clone(),
                    field: field.name.clone(),
                });
            }
            continue;
        };
        let value = if field.is_repeated() {
            DecodedValue::List(values)
        } else {
            // Non-repeated duplicates are legal on the wire; last one wins.
            match values.pop() {
                Some(value) => value,
                None => continue,
            }
        };
        fields.push(DecodedField {
            name: field.name.clone(),
            value,
        });
    }

    Ok(DecodedMessage {
        type_name: descriptor.full_name.clone(),
        fields,
    })
}

fn decode_value(
    field: &FieldDescriptor,
    owner: &MessageDescriptor,
    registry: &TypeRegistry,
    reader: &mut WireReader<'_>,
    depth: usize,
) -> Result<DecodedValue, WireError> {
    Ok(match &field.kind {
        FieldKind::Double => DecodedValue::F64(f64::from_bits(reader.read_fixed64()?)),
        FieldKind::Float => DecodedValue::F32(f32::from_bits(reader.read_fixed32()?)),
        FieldKind::Int32 => DecodedValue::I32(reader.read_varint()? as i32),
        FieldKind::Int64 => DecodedValue::I64(reader.read_varint()? as i64),
        FieldKind::Uint32 => DecodedValue::U32(reader.read_varint()? as u32),
        FieldKind::Uint64 => DecodedValue::U64(reader.read_varint()?),
        FieldKind::Sint32 => DecodedValue::I32(wire::zigzag32(reader.read_varint()? as u32)),
        FieldKind::Sint64 => DecodedValue::I64(wire::zigzag64(reader.read_varint()?)),
        FieldKind::Fixed32 => DecodedValue::U32(reader.read_fixed32()?),
        FieldKind::Fixed64 => DecodedValue::U64(reader.read_fixed64()?),
        FieldKind::Sfixed32 => DecodedValue::I32(reader.read_fixed32()? as i32),
        FieldKind::Sfixed64 => DecodedValue::I64(reader.read_fixed64()? as i64),
        FieldKind::Bool => DecodedValue::Bool(reader.read_varint()? != 0),
        FieldKind::Enum(enum_name) => {
            let value = reader.read_varint()? as i32;
            let name = registry
                .lookup_enum(enum_name)
                .and_then(|descriptor| descriptor.value_name(value))
                .map(str::to_string);
            DecodedValue::Enum {
                number: value,
                name,
            }
        }
        FieldKind::String => {
            let bytes = reader.read_bytes()?;
            let text = String::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8 {
                type_name: owner.full_name.clone(),
                field: field.name.clone(),
            })?;
            DecodedValue::Str(text)
        }
        FieldKind::Bytes => DecodedValue::Bytes(reader.read_bytes()?),
        FieldKind::Message(type_name) => {
            let nested = registry
                .lookup(type_name)
                .ok_or_else(|| WireError::UnknownNestedType(type_name.clone()))?;
            let guard = reader.begin_region()?;
            let message = parse_at_depth(nested, registry, reader, depth + 1)?;
            reader.end_region(guard);
            DecodedValue::Message(Box::new(message))
        }
        FieldKind::Group => {
            return Err(WireError::GroupEncoding {
                number: field.number,
            });
        }
    })
}
