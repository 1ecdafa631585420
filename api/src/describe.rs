// Autograder
// Copyright 2026 The Autograder Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Machine-readable description of every registered endpoint.
//!
//! The describer walks the route table and, for each API route, emits the endpoint's
//! description text, its request/response type names and a flat map of JSON field names to type
//! ids.  Every distinct named type encountered along the way is classified as an alias, struct,
//! map or array.  The data comes from the same schemas the payload types declare for
//! themselves, so the description can never drift from the wire format.

use crate::routing::ApiRouter;
use schemars::JsonSchema;
use schemars::schema::{
    InstanceType, RootSchema, Schema, SchemaObject, SingleOrVec,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request fields that are part of the transport, not of any endpoint's contract.
const HIDDEN_FIELDS: &[&str] = &["root-user-nonce"];

/// The full description of an API surface.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
pub struct ApiDescription {
    /// Per-endpoint descriptions, keyed by endpoint path.
    pub endpoints: BTreeMap<String, EndpointDescription>,

    /// Every distinct named type referenced by the endpoints.
    pub types: BTreeMap<String, TypeDescription>,
}

/// The description of one endpoint.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
pub struct EndpointDescription {
    /// Human-readable description of what the endpoint does.
    pub description: String,

    /// Name of the request payload type.
    #[serde(rename = "request-type")]
    pub request_type: String,

    /// Name of the response content type.
    #[serde(rename = "response-type")]
    pub response_type: String,

    /// The request's JSON fields, keyed by name, with their type ids.
    pub input: BTreeMap<String, String>,

    /// The response's JSON fields, keyed by name, with their type ids.
    pub output: BTreeMap<String, String>,
}

/// The classification of a named type.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    /// A rename of some other type.
    #[default]
    Alias,

    /// A product type with named fields.
    Struct,

    /// A homogeneous key/value mapping.
    Map,

    /// A homogeneous sequence.
    Array,
}

/// The description of one named type.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
pub struct TypeDescription {
    /// What kind of type this is.
    pub category: TypeCategory,

    /// For aliases, the id of the underlying type.
    #[serde(default, rename = "alias-type", skip_serializing_if = "Option::is_none")]
    pub alias_type: Option<String>,

    /// For arrays, the id of the element type.
    #[serde(default, rename = "element-type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,

    /// For maps, the id of the key type.
    #[serde(default, rename = "key-type", skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,

    /// For maps, the id of the value type.
    #[serde(default, rename = "value-type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    /// For structs, the JSON fields keyed by name, with their type ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl<S: Clone + Send + Sync + 'static> ApiRouter<S> {
    /// Produces the description of every API route registered in this router.
    pub fn describe(&self) -> ApiDescription {
        let mut endpoints = BTreeMap::new();
        let mut types = BTreeMap::new();

        for route in self.routes() {
            let data = match route.api_data() {
                Some(data) => data,
                None => continue,
            };

            let request_schema = (data.request_schema)();
            let response_schema = (data.response_schema)();

            let input = top_level_fields(&request_schema, &mut types);
            let output = top_level_fields(&response_schema, &mut types);

            endpoints.insert(
                route.base_path.clone(),
                EndpointDescription {
                    description: data.description.to_owned(),
                    request_type: data.request_type.clone(),
                    response_type: data.response_type.clone(),
                    input,
                    output,
                },
            );
        }

        ApiDescription { endpoints, types }
    }
}

/// Extracts the JSON fields of a schema's top-level object, describing every named type they
/// reference into `types`.
fn top_level_fields(
    root: &RootSchema,
    types: &mut BTreeMap<String, TypeDescription>,
) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    collect_properties(&root.schema, &root.definitions, &mut properties);

    let mut fields = BTreeMap::new();
    for (name, schema) in properties {
        if HIDDEN_FIELDS.contains(&name.as_str()) {
            continue;
        }
        fields.insert(name, type_id(&schema, &root.definitions, types));
    }
    fields
}

/// Gathers the properties of `schema`, chasing references and flattened subschemas.
fn collect_properties(
    schema: &SchemaObject,
    definitions: &schemars::Map<String, Schema>,
    out: &mut BTreeMap<String, Schema>,
) {
    if let Some(reference) = &schema.reference {
        if let Some(Schema::Object(target)) = definitions.get(reference_name(reference)) {
            collect_properties(target, definitions, out);
        }
        return;
    }

    if let Some(object) = &schema.object {
        for (name, prop) in &object.properties {
            out.insert(name.clone(), prop.clone());
        }
    }

    // Flattened envelopes surface as merged subschemas; fold their fields in too.
    if let Some(subschemas) = &schema.subschemas {
        if let Some(all_of) = &subschemas.all_of {
            for sub in all_of {
                if let Schema::Object(sub) = sub {
                    collect_properties(sub, definitions, out);
                }
            }
        }
    }
}

/// Returns the bare definition name of a `$ref` path.
fn reference_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Computes the type id of a schema, describing named types into `types` as they are found.
fn type_id(
    schema: &Schema,
    definitions: &schemars::Map<String, Schema>,
    types: &mut BTreeMap<String, TypeDescription>,
) -> String {
    let schema = match schema {
        Schema::Bool(_) => return "any".to_owned(),
        Schema::Object(schema) => schema,
    };

    if let Some(reference) = &schema.reference {
        let name = reference_name(reference).to_owned();
        describe_named_type(&name, definitions, types);
        return name;
    }

    if let Some(instance_type) = &schema.instance_type {
        return instance_type_id(instance_type, schema, definitions, types);
    }

    // Optional references surface as a one-armed anyOf with a null sibling.
    if let Some(subschemas) = &schema.subschemas {
        if let Some(any_of) = &subschemas.any_of {
            for sub in any_of {
                if let Schema::Object(sub) = sub {
                    if sub.instance_type
                        == Some(SingleOrVec::Single(Box::new(InstanceType::Null)))
                    {
                        continue;
                    }
                }
                return type_id(sub, definitions, types);
            }
        }
        if let Some(all_of) = &subschemas.all_of {
            if let Some(first) = all_of.first() {
                return type_id(first, definitions, types);
            }
        }
    }

    "any".to_owned()
}

/// Computes the type id of a schema whose instance type is known.
fn instance_type_id(
    instance_type: &SingleOrVec<InstanceType>,
    schema: &SchemaObject,
    definitions: &schemars::Map<String, Schema>,
    types: &mut BTreeMap<String, TypeDescription>,
) -> String {
    let primary = match instance_type {
        SingleOrVec::Single(t) => **t,
        SingleOrVec::Vec(ts) => {
            *ts.iter().find(|t| **t != InstanceType::Null).unwrap_or(&InstanceType::Null)
        }
    };

    match primary {
        InstanceType::String => "string".to_owned(),
        InstanceType::Integer => "int".to_owned(),
        InstanceType::Number => "float".to_owned(),
        InstanceType::Boolean => "bool".to_owned(),
        InstanceType::Null => "null".to_owned(),

        InstanceType::Array => {
            let element = schema
                .array
                .as_ref()
                .and_then(|array| array.items.as_ref())
                .map(|items| match items {
                    SingleOrVec::Single(item) => type_id(item, definitions, types),
                    SingleOrVec::Vec(items) => items
                        .first()
                        .map(|item| type_id(item, definitions, types))
                        .unwrap_or_else(|| "any".to_owned()),
                })
                .unwrap_or_else(|| "any".to_owned());
            format!("[]{}", element)
        }

        InstanceType::Object => {
            let value = schema
                .object
                .as_ref()
                .and_then(|object| object.additional_properties.as_ref())
                .map(|value| type_id(value, definitions, types))
                .unwrap_or_else(|| "any".to_owned());
            format!("map[string]{}", value)
        }
    }
}

/// Ensures `name` has an entry in `types`, classifying its definition on first sight.
fn describe_named_type(
    name: &str,
    definitions: &schemars::Map<String, Schema>,
    types: &mut BTreeMap<String, TypeDescription>,
) {
    if types.contains_key(name) {
        return;
    }

    // Break reference cycles: the placeholder is replaced once the real description is known.
    types.insert(name.to_owned(), TypeDescription::default());

    let description = match definitions.get(name) {
        Some(Schema::Object(schema)) => describe_definition(schema, definitions, types),
        _ => TypeDescription {
            category: TypeCategory::Alias,
            alias_type: Some("any".to_owned()),
            ..TypeDescription::default()
        },
    };

    types.insert(name.to_owned(), description);
}

/// Classifies one named definition as an alias, struct, map or array.
fn describe_definition(
    schema: &SchemaObject,
    definitions: &schemars::Map<String, Schema>,
    types: &mut BTreeMap<String, TypeDescription>,
) -> TypeDescription {
    if let Some(object) = &schema.object {
        if !object.properties.is_empty() {
            let mut fields = BTreeMap::new();
            for (field_name, prop) in &object.properties {
                if HIDDEN_FIELDS.contains(&field_name.as_str()) {
                    continue;
                }
                fields.insert(field_name.clone(), type_id(prop, definitions, types));
            }
            return TypeDescription {
                category: TypeCategory::Struct,
                fields: Some(fields),
                ..TypeDescription::default()
            };
        }

        if let Some(value) = &object.additional_properties {
            return TypeDescription {
                category: TypeCategory::Map,
                key_type: Some("string".to_owned()),
                value_type: Some(type_id(value, definitions, types)),
                ..TypeDescription::default()
            };
        }
    }

    if let Some(instance_type) = &schema.instance_type {
        let id = instance_type_id(instance_type, schema, definitions, types);
        if let Some(element) = id.strip_prefix("[]") {
            return TypeDescription {
                category: TypeCategory::Array,
                element_type: Some(element.to_owned()),
                ..TypeDescription::default()
            };
        }
        if let Some(value) = id.strip_prefix("map[string]") {
            return TypeDescription {
                category: TypeCategory::Map,
                key_type: Some("string".to_owned()),
                value_type: Some(value.to_owned()),
                ..TypeDescription::default()
            };
        }
        return TypeDescription {
            category: TypeCategory::Alias,
            alias_type: Some(id),
            ..TypeDescription::default()
        };
    }

    TypeDescription {
        category: TypeCategory::Alias,
        alias_type: Some("any".to_owned()),
        ..TypeDescription::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::r#gen::SchemaGenerator;

    #[derive(JsonSchema)]
    struct Inner {
        /// Some value.
        #[allow(dead_code)]
        value: i32,
    }

    #[derive(JsonSchema)]
    struct Outer {
        #[allow(dead_code)]
        name: String,
        #[allow(dead_code)]
        inner: Inner,
        #[allow(dead_code)]
        scores: Vec<f64>,
        #[allow(dead_code)]
        labels: std::collections::BTreeMap<String, String>,
        #[serde(rename = "root-user-nonce")]
        #[allow(dead_code)]
        nonce: String,
    }

    #[test]
    fn test_top_level_fields_classify_and_hide() {
        let root = SchemaGenerator::default().into_root_schema_for::<Outer>();
        let mut types = BTreeMap::new();
        let fields = top_level_fields(&root, &mut types);

        assert_eq!(Some(&"string".to_owned()), fields.get("name"));
        assert_eq!(Some(&"Inner".to_owned()), fields.get("inner"));
        assert_eq!(Some(&"[]float".to_owned()), fields.get("scores"));
        assert_eq!(Some(&"map[string]string".to_owned()), fields.get("labels"));
        assert!(!fields.contains_key("root-user-nonce"));

        let inner = types.get("Inner").expect("Inner must have been described");
        assert_eq!(TypeCategory::Struct, inner.category);
        assert_eq!(
            Some(&"int".to_owned()),
            inner.fields.as_ref().unwrap().get("value")
        );
    }

    #[test]
    fn test_enum_types_describe_as_string_aliases() {
        #[derive(JsonSchema)]
        struct Holder {
            #[allow(dead_code)]
            role: autograder_core::model::ServerRole,
        }

        let root = SchemaGenerator::default().into_root_schema_for::<Holder>();
        let mut types = BTreeMap::new();
        let fields = top_level_fields(&root, &mut types);
        assert_eq!(Some(&"ServerRole".to_owned()), fields.get("role"));

        let role = types.get("ServerRole").expect("ServerRole must have been described");
        assert_eq!(TypeCategory::Alias, role.category);
        assert_eq!(Some("string".to_owned()), role.alias_type);
    }
}
