//! JSON fixtures: loading from disk and mapping onto dynamic messages.

use crate::error::{ConversionError, FixtureError};
use prost_reflect::{
    DeserializeOptions, DynamicMessage, FieldDescriptor, Kind, MessageDescriptor, ReflectMessage,
    SerializeOptions,
};
use serde_json::Value;
use std::path::Path;

/// Read and parse a JSON fixture.
pub fn read_fixture(path: &Path) -> Result<Value, FixtureError> {
    let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| FixtureError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert a JSON value into an instance of `desc` using the protobuf JSON mapping.
///
/// Unknown keys are ignored. A value whose type does not fit its field is an error.
pub fn to_message(mut value: Value, desc: &MessageDescriptor) -> Result<DynamicMessage, ConversionError> {
    normalize_field_names(&mut value, desc);

    let options = DeserializeOptions::new().deny_unknown_fields(false);
    DynamicMessage::deserialize_with_options(desc.clone(), value, &options).map_err(|source| {
        ConversionError::Mismatch {
            message: desc.full_name().to_string(),
            source,
        }
    })
}

/// Render a dynamic message as JSON, keeping proto field names and default values.
pub fn to_json(message: &DynamicMessage) -> Result<Value, ConversionError> {
    let options = SerializeOptions::new()
        .use_proto_field_name(true)
        .skip_default_fields(false);
    message
        .serialize_with_options(serde_json::value::Serializer, &options)
        .map_err(|source| ConversionError::Render {
            message: message.descriptor().full_name().to_string(),
            source,
        })
}

/// Rename keys written with a trailing underscore (`header_`) to the field
/// they name, when no field matches them as-is. Recurses into nested
/// messages, repeated messages and message-valued maps.
pub fn normalize_field_names(value: &mut Value, desc: &MessageDescriptor) {
    // Well-known types have their own JSON shapes (Struct, Timestamp, ...).
    if desc.package_name() == "google.protobuf" {
        return;
    }
    let Value::Object(map) = value else {
        return;
    };

    let keys: Vec<String> = map.keys().cloned().collect();
    for key in keys {
        if find_field(desc, &key).is_some() {
            continue;
        }
        let Some(stripped) = key.strip_suffix('_') else {
            continue;
        };
        if map.contains_key(stripped) || find_field(desc, stripped).is_none() {
            continue;
        }
        if let Some(v) = map.remove(&key) {
            tracing::debug!("Mapping fixture key '{}' to field '{}' in {}", key, stripped, desc.full_name());
            map.insert(stripped.to_string(), v);
        }
    }

    for (key, v) in map.iter_mut() {
        if let Some(field) = find_field(desc, key) {
            normalize_field_value(v, &field);
        }
    }
}

fn normalize_field_value(value: &mut Value, field: &FieldDescriptor) {
    let Kind::Message(message) = field.kind() else {
        return;
    };

    if field.is_map() {
        let value_field = message.map_entry_value_field();
        if let Value::Object(entries) = value {
            for entry in entries.values_mut() {
                normalize_field_value(entry, &value_field);
            }
        }
    } else if field.is_list() {
        if let Value::Array(items) = value {
            for item in items {
                normalize_field_names(item, &message);
            }
        }
    } else {
        normalize_field_names(value, &message);
    }
}

fn find_field(desc: &MessageDescriptor, key: &str) -> Option<FieldDescriptor> {
    desc.get_field_by_name(key)
        .or_else(|| desc.get_field_by_json_name(key))
}
