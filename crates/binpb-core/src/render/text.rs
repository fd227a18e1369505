//! Indented proto-text-style rendering of a decoded field tree.

use super::to_hex;
use crate::{DecodedMessage, DecodedValue};

pub(crate) fn render_text(message: &DecodedMessage) -> String {
    let mut out = String::new();
    write_fields(&mut out, message, 0);
    out
}

fn write_fields(out: &mut String, message: &DecodedMessage, indent: usize) {
    for field in &message.fields {
        write_value(out, &field.name, &field.value, indent);
    }
}

fn write_value(out: &mut String, name: &str, value: &DecodedValue, indent: usize) {
    match value {
        DecodedValue::List(items) => {
            // Repeated fields render as one line (or block) per element.
            for item in items {
                write_value(out, name, item, indent);
            }
        }
        DecodedValue::Message(inner) => {
            pad(out, indent);
            out.push_str(name);
            out.push_str(" {\n");
            write_fields(out, inner, indent + 1);
            pad(out, indent);
            out.push_str("}\n");
        }
        scalar => {
            pad(out, indent);
            out.push_str(name);
            out.push_str(": ");
            out.push_str(&scalar_text(scalar));
            out.push('\n');
        }
    }
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn scalar_text(value: &DecodedValue) -> String {
    match value {
        DecodedValue::Bool(v) => v.to_string(),
        DecodedValue::I32(v) => v.to_string(),
        DecodedValue::I64(v) => v.to_string(),
        DecodedValue::U32(v) => v.to_string(),
        DecodedValue::U64(v) => v.to_string(),
        DecodedValue::F32(v) => v.to_string(),
        DecodedValue::F64(v) => v.to_string(),
        DecodedValue::Str(v) => format!("{v:?}"),
        DecodedValue::Bytes(v) => format!("\"{}\"", to_hex(v)),
        DecodedValue::Enum { number, name } => match name {
            Some(name) => name.clone(),
            None => number.to_string(),
        },
        DecodedValue::Message(_) | DecodedValue::List(_) => String::new(),
    }
}
