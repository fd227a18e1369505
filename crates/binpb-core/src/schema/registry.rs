//! Type registry built from compiled file descriptors.
//!
//! The registry maps fully-qualified message-type names to decodable
//! descriptors and records first-registration order so that brute-force
//! decoding and `--list-messages` output are deterministic. Registering a
//! duplicate name overwrites the previous descriptor and keeps the original
//! position in the order (last-registration-wins policy).

use std::collections::HashMap;

use protobuf::descriptor::field_descriptor_proto::{Label, Type};
use protobuf::descriptor::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
};

/// Runtime field type, resolved from a `FieldDescriptorProto`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    /// Nested message type, by fully-qualified name.
    Message(String),
    /// Enum type, by fully-qualified name.
    Enum(String),
    /// Proto2 group field (rejected at decode time).
    Group,
}

/// Field presence/multiplicity semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Proto3 implicit presence.
    Singular,
    /// Explicit `optional` (proto2 or proto3).
    Optional,
    /// Proto2 `required`; decode fails if the field is absent.
    Required,
    Repeated,
}

/// A single field of a message type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: u32,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
}

impl FieldDescriptor {
    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }
}

/// A decodable message type, immutable after registration.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    /// Fully-qualified name (e.g. `package.Outer.Inner`).
    pub full_name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Synthesized map-entry type (hidden from `list_names`).
    pub map_entry: bool,
}

impl MessageDescriptor {
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.number == number)
    }
}

/// An enum type, used to render value names for decoded enum fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub full_name: String,
    values: HashMap<i32, String>,
}

impl EnumDescriptor {
    pub fn value_name(&self, number: i32) -> Option<&str> {
        self.values.get(&number).map(String::as_str)
    }
}

/// Name-to-descriptor mapping with stable first-registration order.
///
/// # Examples
/// ```
/// use binpb_core::TypeRegistry;
///
/// let registry = TypeRegistry::new();
/// assert!(registry.is_empty());
/// assert!(registry.lookup("Person").is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    messages: HashMap<String, MessageDescriptor>,
    enums: HashMap<String, EnumDescriptor>,
    order: Vec<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every message and enum type declared in a file descriptor,
    /// including nested declarations. A later registration of an existing
    /// fully-qualified name replaces the descriptor silently.
    pub fn register_file(&mut self, fd: &FileDescriptorProto) {
        let package = fd.package.clone().unwrap_or_default();
        let proto3 = fd.syntax.as_deref() == Some("proto3");
        for message in &fd.message_type {
            self.register_message(&package, message, proto3);
        }
        for enum_type in &fd.enum_type {
            self.register_enum(&package, enum_type);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.get(name)
    }

    pub fn lookup_enum(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(name)
    }

    /// Known message-type names in first-registration order. Synthesized
    /// map-entry types are excluded.
    pub fn list_names(&self) -> &[String] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    fn register_message(&mut self, scope: &str, message: &DescriptorProto, proto3: bool) {
        let simple = message.name.clone().unwrap_or_default();
        if simple.is_empty() {
            return;
        }
        let full_name = qualify(scope, &simple);

        for nested in &message.nested_type {
            self.register_message(&full_name, nested, proto3);
        }
        for enum_type in &message.enum_type {
            self.register_enum(&full_name, enum_type);
        }

        let fields = message
            .field
            .iter()
            .filter_map(|field| convert_field(field, proto3))
            .collect();
        let map_entry = message.options.map_entry.unwrap_or(false);
        let descriptor = MessageDescriptor {
            full_name: full_name.clone(),
            fields,
            map_entry,
        };

        let replaced = self.messages.insert(full_name.clone(), descriptor);
        if replaced.is_none() && !map_entry {
            self.order.push(full_name);
        }
    }

    fn register_enum(&mut self, scope: &str, enum_type: &EnumDescriptorProto) {
        let simple = enum_type.name.clone().unwrap_or_default();
        if simple.is_empty() {
            return;
        }
        let full_name = qualify(scope, &simple);
        let values = enum_type
            .value
            .iter()
            .filter_map(|value| {
                let name = value.name.clone()?;
                Some((value.number.unwrap_or(0), name))
            })
            .collect();
        self.enums.insert(
            full_name.clone(),
            EnumDescriptor { full_name, values },
        );
    }
}

fn qualify(scope: &str, simple: &str) -> String {
    if scope.is_empty() {
        simple.to_string()
    } else {
        format!("{scope}.{simple}")
    }
}

fn convert_field(field: &FieldDescriptorProto, proto3: bool) -> Option<FieldDescriptor> {
    let name = field.name.clone()?;
    let number = u32::try_from(field.number.unwrap_or(0)).ok()?;
    if number == 0 {
        return None;
    }
    let kind = convert_kind(field)?;
    let cardinality = if field.label == Some(Label::LABEL_REPEATED.into()) {
        Cardinality::Repeated
    } else if field.label == Some(Label::LABEL_REQUIRED.into()) {
        Cardinality::Required
    } else if field.proto3_optional.unwrap_or(false) || !proto3 {
        Cardinality::Optional
    } else {
        Cardinality::Singular
    };
    Some(FieldDescriptor {
        name,
        number,
        kind,
        cardinality,
    })
}

fn convert_kind(field: &FieldDescriptorProto) -> Option<FieldKind> {
    // After typecheck, referenced type names are fully qualified with a
    // leading dot; registry keys drop the dot.
    let referenced = || {
        field
            .type_name
            .clone()
            .unwrap_or_default()
            .trim_start_matches('.')
            .to_string()
    };
    Some(match field.type_?.enum_value_or_default() {
        Type::TYPE_DOUBLE => FieldKind::Double,
        Type::TYPE_FLOAT => FieldKind::Float,
        Type::TYPE_INT32 => FieldKind::Int32,
        Type::TYPE_INT64 => FieldKind::Int64,
        Type::TYPE_UINT32 => FieldKind::Uint32,
        Type::TYPE_UINT64 => FieldKind::Uint64,
        Type::TYPE_SINT32 => FieldKind::Sint32,
        Type::TYPE_SINT64 => FieldKind::Sint64,
        Type::TYPE_FIXED32 => FieldKind::Fixed32,
        Type::TYPE_FIXED64 => FieldKind::Fixed64,
        Type::TYPE_SFIXED32 => FieldKind::Sfixed32,
        Type::TYPE_SFIXED64 => FieldKind::Sfixed64,
        Type::TYPE_BOOL => FieldKind::Bool,
        Type::TYPE_STRING => FieldKind::String,
        Type::TYPE_BYTES => FieldKind::Bytes,
        Type::TYPE_MESSAGE => FieldKind::Message(referenced()),
        Type::TYPE_ENUM => FieldKind::Enum(referenced()),
        Type::TYPE_GROUP => FieldKind::Group,
    })
}
