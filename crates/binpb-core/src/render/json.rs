//! JSON rendering, isomorphic to the decoded field tree.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::to_hex;
use crate::{DecodedMessage, DecodedValue};

pub(crate) fn render_json(message: &DecodedMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(message)
}

impl Serialize for DecodedMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Bool(v) => serializer.serialize_bool(*v),
            DecodedValue::I32(v) => serializer.serialize_i32(*v),
            DecodedValue::I64(v) => serializer.serialize_i64(*v),
            DecodedValue::U32(v) => serializer.serialize_u32(*v),
            DecodedValue::U64(v) => serializer.serialize_u64(*v),
            DecodedValue::F32(v) => serializer.serialize_f32(*v),
            DecodedValue::F64(v) => serializer.serialize_f64(*v),
            DecodedValue::Str(v) => serializer.serialize_str(v),
            DecodedValue::Bytes(v) => serializer.serialize_str(&to_hex(v)),
            DecodedValue::Enum { number, name } => match name {
                Some(name) => serializer.serialize_str(name),
                None => serializer.serialize_i32(*number),
            },
            DecodedValue::Message(inner) => inner.serialize(serializer),
            DecodedValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
