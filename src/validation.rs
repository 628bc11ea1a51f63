//! Schema validation helpers.
//!
//! Checks a `serde_json::Value` configuration against a [`Schema`] and
//! reports problems as [`Diagnostic`]s, one per offending attribute path.
//!
//! # Example
//!
//! ```
//! use eventpush_provider::schema::{Attribute, Schema};
//! use eventpush_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("queue_url", Attribute::required_string())
//!     .with_attribute("delay_seconds", Attribute::optional_int32());
//!
//! let diagnostics = validate(&schema, &json!({"queue_url": "https://sqs", "delay_seconds": 5}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"queue_url": "https://sqs", "delay_seconds": "5"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("delay_seconds".to_string()));
//! ```

use crate::schema::{
    Attribute, AttributeType, Block, Diagnostic, NestedBlock, NestingMode, Schema, Validator,
};
use serde_json::Value;

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed-only attributes are skipped (the provider sets these)
/// - Attribute types must match the schema, and int32 values must fit in 32 bits
/// - Attribute validators run on values of the right type
/// - Nested blocks are validated recursively, list blocks against `max_items`
///
/// Attributes are visited in name order so the output is stable.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return,
        _ => {
            let diag = Diagnostic::error("Expected object")
                .with_detail(format!("Got {}", value_type_name(value)));
            diagnostics.push(if path.is_empty() {
                diag
            } else {
                diag.with_attribute(path)
            });
            return;
        }
    };

    let mut names: Vec<_> = block.attributes.keys().collect();
    names.sort();
    for name in names {
        let attr_path = join_path(path, name);
        validate_attribute(&block.attributes[name], obj.get(name), &attr_path, diagnostics);
    }

    let mut names: Vec<_> = block.blocks.keys().collect();
    names.sort();
    for name in names {
        let block_path = join_path(path, name);
        validate_nested_block(&block.blocks[name], obj.get(name), &block_path, diagnostics);
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        }
        Some(v) => {
            if validate_attribute_type(attr.attr_type, v, path, diagnostics) {
                for validator in &attr.validators {
                    apply_validator(validator, v, path, diagnostics);
                }
            }
        }
    }
}

/// Returns whether the value has the expected type.
fn validate_attribute_type(
    attr_type: AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let (ok, expected) = match attr_type {
        AttributeType::String => (value.is_string(), "string"),
        AttributeType::Bool => (value.is_boolean(), "bool"),
        AttributeType::Int32 => (as_int32(value).is_some(), "int32"),
    };
    if !ok {
        diagnostics.push(type_error(path, expected, value));
    }
    ok
}

fn apply_validator(
    validator: &Validator,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match validator {
        Validator::OneOfCaseInsensitive { values } => {
            let Some(s) = value.as_str() else { return };
            if !values.iter().any(|v| v.eq_ignore_ascii_case(s)) {
                diagnostics.push(
                    Diagnostic::error(format!("Invalid value for attribute '{}'", path))
                        .with_detail(format!(
                            "Value must be one of (case-insensitive): {}, got: \"{}\"",
                            values.join(", "),
                            s
                        ))
                        .with_attribute(path),
                );
            }
        }
        Validator::Between { min, max } => {
            let Some(n) = as_int32(value).map(i64::from) else {
                return;
            };
            if n < *min || n > *max {
                diagnostics.push(
                    Diagnostic::error(format!("Invalid value for attribute '{}'", path))
                        .with_detail(format!("Value must be between {} and {}, got: {}", min, max, n))
                        .with_attribute(path),
                );
            }
        }
    }
}

fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match (nested.nesting_mode, value) {
        (_, None | Some(Value::Null)) => {}
        (NestingMode::Single, Some(v)) => {
            validate_block(&nested.block, v, path, diagnostics);
        }
        (NestingMode::List, Some(Value::Array(arr))) => {
            let len = arr.len() as u32;
            if nested.max_items > 0 && len > nested.max_items {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' allows at most {} item(s), got {}",
                        path, nested.max_items, len
                    ))
                    .with_attribute(path),
                );
            }

            for (i, item) in arr.iter().enumerate() {
                let item_path = format!("{}.{}", path, i);
                validate_block(&nested.block, item, &item_path, diagnostics);
            }
        }
        (NestingMode::List, Some(v)) => {
            diagnostics.push(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", value_type_name(v)))
                    .with_attribute(path),
            );
        }
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Integral JSON numbers that fit in an `i32`, including `5.0`.
pub(crate) fn as_int32(value: &Value) -> Option<i32> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).ok();
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Block, NestedBlock, Schema};
    use serde_json::json;

    fn signature_schema() -> Schema {
        Schema::v0()
            .with_attribute("message_body", Attribute::required_string())
            .with_block(
                "kms_signature",
                NestedBlock::list(
                    Block::new()
                        .with_attribute("kms_key_id", Attribute::required_string())
                        .with_attribute(
                            "algorithm",
                            Attribute::optional_string().with_validator(
                                Validator::one_of_case_insensitive(["RSASSA_PKCS1_V1_5_SHA_256"]),
                            ),
                        ),
                )
                .with_max_items(1),
            )
    }

    #[test]
    fn test_validate_required_string() {
        let schema = Schema::v0().with_attribute("topic_arn", Attribute::required_string());

        assert!(validate(&schema, &json!({"topic_arn": "arn:aws:sns:us-east-2:1:t"})).is_empty());

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("topic_arn".to_string()));

        let diagnostics = validate(&schema, &json!({"topic_arn": null}));
        assert_eq!(diagnostics.len(), 1);

        let diagnostics = validate(&schema, &json!({"topic_arn": 123}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_validate_computed_attribute_skipped() {
        let schema = Schema::v0().with_attribute("event_id", Attribute::computed_string());

        assert!(validate(&schema, &json!({})).is_empty());
        assert!(validate(&schema, &json!({"event_id": 123})).is_empty());
    }

    #[test]
    fn test_validate_int32() {
        let schema = Schema::v0().with_attribute("delay_seconds", Attribute::optional_int32());

        assert!(validate(&schema, &json!({"delay_seconds": 42})).is_empty());
        assert!(validate(&schema, &json!({"delay_seconds": 42.0})).is_empty());
        assert_eq!(validate(&schema, &json!({"delay_seconds": 42.5})).len(), 1);
        assert_eq!(validate(&schema, &json!({"delay_seconds": "42"})).len(), 1);
        assert_eq!(
            validate(&schema, &json!({"delay_seconds": i64::from(i32::MAX) + 1})).len(),
            1
        );
    }

    #[test]
    fn test_validate_between() {
        let schema = Schema::v0().with_attribute(
            "delay_seconds",
            Attribute::optional_int32().with_validator(Validator::between(0, 900)),
        );

        assert!(validate(&schema, &json!({"delay_seconds": 0})).is_empty());
        assert!(validate(&schema, &json!({"delay_seconds": 900})).is_empty());

        let diagnostics = validate(&schema, &json!({"delay_seconds": 901}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("between 0 and 900"));
    }

    #[test]
    fn test_validate_between_integral_float() {
        let schema = Schema::v0().with_attribute(
            "delay_seconds",
            Attribute::optional_int32().with_validator(Validator::between(0, 900)),
        );

        assert!(validate(&schema, &json!({"delay_seconds": 900.0})).is_empty());

        let diagnostics = validate(&schema, &json!({"delay_seconds": 1000.0}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("delay_seconds"));
        assert!(diagnostics[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("got: 1000"));
    }

    #[test]
    fn test_validate_bool() {
        let schema = Schema::v0().with_attribute("create_only", Attribute::optional_bool());

        assert!(validate(&schema, &json!({"create_only": true})).is_empty());
        assert_eq!(validate(&schema, &json!({"create_only": "true"})).len(), 1);
    }

    #[test]
    fn test_validate_one_of_case_insensitive() {
        let schema = signature_schema();

        let ok = json!({
            "message_body": "hello",
            "kms_signature": [{"kms_key_id": "key", "algorithm": "rsassa_pkcs1_v1_5_sha_256"}]
        });
        assert!(validate(&schema, &ok).is_empty());

        let bad = json!({
            "message_body": "hello",
            "kms_signature": [{"kms_key_id": "key", "algorithm": "ECDSA_SHA_256"}]
        });
        let diagnostics = validate(&schema, &bad);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute,
            Some("kms_signature.0.algorithm".to_string())
        );
    }

    #[test]
    fn test_validate_list_block_max_items() {
        let schema = signature_schema();

        let input = json!({
            "message_body": "hello",
            "kms_signature": [{"kms_key_id": "a"}, {"kms_key_id": "b"}]
        });
        let diagnostics = validate(&schema, &input);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("at most 1"));

        let input = json!({"message_body": "hello", "kms_signature": []});
        assert!(validate(&schema, &input).is_empty());

        let input = json!({"message_body": "hello", "kms_signature": [{}]});
        let diagnostics = validate(&schema, &input);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute,
            Some("kms_signature.0.kms_key_id".to_string())
        );
    }

    #[test]
    fn test_validate_list_block_wrong_type() {
        let schema = signature_schema();
        let input = json!({"message_body": "hello", "kms_signature": {"kms_key_id": "a"}});

        let diagnostics = validate(&schema, &input);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Expected list"));
    }

    #[test]
    fn test_validate_single_block() {
        let schema = Schema::v0().with_block(
            "aws",
            NestedBlock::single(Block::new().with_attribute("region", Attribute::optional_string())),
        );

        assert!(validate(&schema, &json!({})).is_empty());
        assert!(validate(&schema, &json!({"aws": {"region": "us-east-2"}})).is_empty());

        let diagnostics = validate(&schema, &json!({"aws": {"region": 1}}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("aws.region".to_string()));
    }

    #[test]
    fn test_validate_multiple_errors_are_ordered() {
        let schema = Schema::v0()
            .with_attribute("queue_url", Attribute::required_string())
            .with_attribute("delay_seconds", Attribute::optional_int32())
            .with_attribute("create_only", Attribute::optional_bool());

        let diagnostics = validate(
            &schema,
            &json!({"queue_url": 1, "delay_seconds": "x", "create_only": "yes"}),
        );
        let paths: Vec<_> = diagnostics
            .iter()
            .map(|d| d.attribute.clone().unwrap())
            .collect();
        assert_eq!(paths, vec!["create_only", "delay_seconds", "queue_url"]);
    }

    #[test]
    fn test_validate_root_not_object() {
        let schema = Schema::v0().with_attribute("message_body", Attribute::required_string());

        let diagnostics = validate(&schema, &json!("not an object"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Expected object"));
        assert!(diagnostics[0].attribute.is_none());
    }
}
