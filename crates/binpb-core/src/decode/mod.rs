//! Decode engine: match policy over one payload and one registry.
//!
//! A request either names a type (looked up exactly, never second-guessed)
//! or brute-forces the registry in first-registration order until a type
//! parses structurally. An empty registry degrades to a bounded hex preview
//! instead of failing, so a fully broken schema tree still yields something
//! inspectable.

pub mod error;
pub mod parser;
pub mod reader;
pub mod wire;

pub use error::{DecodeError, WireError};
pub use parser::MAX_NESTING_DEPTH;
pub use wire::WireType;

use crate::render::hex_preview;
use crate::schema::TypeRegistry;
use crate::{DecodeOutcome, HEX_PREVIEW_MAX_BYTES};

/// Decode `payload` against `requested`, or against every known type when
/// no name is given.
///
/// Recoverable conditions (unknown name, no brute-force match, empty
/// registry) are returned as [`DecodeOutcome`] values; the only error is a
/// malformed payload for an explicitly named type.
pub fn decode_payload(
    payload: &[u8],
    requested: Option<&str>,
    registry: &TypeRegistry,
) -> Result<DecodeOutcome, DecodeError> {
    match requested {
        Some(name) => named_lookup(payload, name, registry),
        None => Ok(brute_force(payload, registry)),
    }
}

fn named_lookup(
    payload: &[u8],
    name: &str,
    registry: &TypeRegistry,
) -> Result<DecodeOutcome, DecodeError> {
    let Some(descriptor) = registry.lookup(name) else {
        return Ok(DecodeOutcome::NamedTypeNotFound {
            requested: name.to_string(),
            known: registry.list_names().to_vec(),
        });
    };
    let message =
        parser::parse_message(descriptor, registry, payload).map_err(|source| {
            DecodeError::Malformed {
                type_name: name.to_string(),
                source,
            }
        })?;
    Ok(DecodeOutcome::Matched {
        type_name: name.to_string(),
        message,
    })
}

fn brute_force(payload: &[u8], registry: &TypeRegistry) -> DecodeOutcome {
    if registry.is_empty() {
        return DecodeOutcome::HeuristicFallback {
            preview: hex_preview(payload, HEX_PREVIEW_MAX_BYTES),
        };
    }
    for name in registry.list_names() {
        let Some(descriptor) = registry.lookup(name) else {
            continue;
        };
        if let Ok(message) = parser::parse_message(descriptor, registry, payload) {
            return DecodeOutcome::Matched {
                type_name: name.clone(),
                message,
            };
        }
    }
    DecodeOutcome::NoMatch {
        tried: registry.list_names().to_vec(),
    }
}


#[cfg(test)]
mod tests {
    use super::testenc::*;
    use super::*;
    use crate::schema::testutil::registry_from_source;

    fn abc_registry() -> TypeRegistry {
        registry_from_source(
            r#"
            syntax = "proto3";

            message Alpha { string label = 1; }
            message Beta { int32 count = 1; }
            message Gamma { bytes blob = 2; }
            "#,
        )
    }

    #[test]
    fn named_lookup_decodes_matching_payload() {
        let registry = abc_registry();
        let payload = varint_field(1, 41);

        let outcome = decode_payload(&payload, Some("Beta"), &registry).expect("decode");
        let DecodeOutcome::Matched { type_name, message } = outcome else {
            panic!("expected match");
        };
        assert_eq!(type_name, "Beta");
        assert_eq!(message.fields[0].name, "count");
    }

    #[test]
    fn named_lookup_miss_reports_requested_and_known_names() {
        let registry = abc_registry();
        let outcome = decode_payload(&[], Some("Ghost"), &registry).expect("decode");

        let DecodeOutcome::NamedTypeNotFound { requested, known } = outcome else {
            panic!("expected NamedTypeNotFound");
        };
        assert_eq!(requested, "Ghost");
        assert_eq!(known, ["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn named_lookup_never_falls_back_to_brute_force() {
        let registry = abc_registry();
        // This payload would brute-force match Beta, but the caller asked
        // for a name that does not exist.
        let payload = varint_field(1, 41);
        let outcome = decode_payload(&payload, Some("Ghost"), &registry).expect("decode");
        assert!(matches!(outcome, DecodeOutcome::NamedTypeNotFound { .. }));
    }

    #[test]
    fn named_lookup_malformed_payload_is_an_error_naming_the_type() {
        let registry = abc_registry();
        // Alpha's only field is a string; a varint tag cannot satisfy it.
        let payload = varint_field(1, 41);
        let err = decode_payload(&payload, Some("Alpha"), &registry).unwrap_err();
        let DecodeError::Malformed { type_name, .. } = &err;
        assert_eq!(type_name, "Alpha");
        assert!(err.to_string().contains("does not decode as Alpha"));
    }

    #[test]
    fn brute_force_tries_registration_order_and_stops_at_first_match() {
        let registry = abc_registry();
        // Valid only for Beta: field 1 as varint. Alpha expects len for
        // field 1, Gamma has no field 1 at all.
        let payload = varint_field(1, 7);

        let outcome = decode_payload(&payload, None, &registry).expect("decode");
        let DecodeOutcome::Matched { type_name, .. } = outcome else {
            panic!("expected match");
        };
        assert_eq!(type_name, "Beta");
    }

    #[test]
    fn brute_force_prefers_earlier_registration_on_ambiguity() {
        let registry = registry_from_source(
            r#"
            syntax = "proto3";

            message First { string id = 1; }
            message Second { string id = 1; }
            "#,
        );
        let payload = str_field(1, "same-shape");

        let outcome = decode_payload(&payload, None, &registry).expect("decode");
        let DecodeOutcome::Matched { type_name, .. } = outcome else {
            panic!("expected match");
        };
        assert_eq!(type_name, "First");
    }

    #[test]
    fn brute_force_exhaustion_reports_all_tried_names() {
        let registry = abc_registry();
        // Field 3 exists in none of the registered types.
        let payload = varint_field(3, 1);

        let outcome = decode_payload(&payload, None, &registry).expect("decode");
        let DecodeOutcome::NoMatch { tried } = outcome else {
            panic!("expected NoMatch");
        };
        assert_eq!(tried, ["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn empty_registry_degrades_to_hex_preview() {
        let registry = TypeRegistry::new();
        let outcome = decode_payload(&[0xde, 0xad, 0xbe, 0xef], None, &registry).expect("decode");

        let DecodeOutcome::HeuristicFallback { preview } = outcome else {
            panic!("expected fallback");
        };
        assert!(preview.contains("deadbeef"));
    }
}
