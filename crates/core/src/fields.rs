//! Entity field metadata and the schema introspector.
//!
//! Every editable entity declares its fields once, in order, as a static
//! [`EntitySchema`] table (see [`crate::schemas`]). [`introspect`] turns such a
//! table into the ordered list of [`FieldDescriptor`]s that drives form
//! rendering and form-submission parsing. System-managed columns are declared
//! in the tables too (they mirror the record shape) but never reach a form.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fields managed by the system that never appear in a generated form.
pub const SYSTEM_FIELDS: &[&str] = &["id", "createdAt", "updatedAt", "isDeleted", "createdBy"];

/// Check whether `name` is a system-managed field.
pub fn is_system_field(name: &str) -> bool {
    SYSTEM_FIELDS.contains(&name)
}

// ---------------------------------------------------------------------------
// Schema declarations
// ---------------------------------------------------------------------------

/// Primitive kind of a declared field, as stored on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Short single-line string.
    String,
    /// Free-form multi-line string.
    LongString,
    Email,
    Integer,
    Decimal,
    Boolean,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// One of a fixed set of values listed in the schema.
    Enum,
    /// Reference to another entity; options are attached per request.
    ForeignKey,
    /// Write-only secret such as a password. Never pre-filled.
    Secret,
    /// File reference (URL) populated by an upload.
    File,
    /// Record identifier.
    Id,
    /// Audit timestamp.
    Timestamp,
}

/// A default value usable in a `const` schema table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaticDefault {
    Text(&'static str),
    Integer(i64),
    Bool(bool),
}

impl StaticDefault {
    fn to_json(self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String(s.to_string()),
            Self::Integer(n) => serde_json::Value::from(n),
            Self::Bool(b) => serde_json::Value::Bool(b),
        }
    }
}

/// A static `(id, label)` choice for [`FieldKind::Enum`] fields.
pub type StaticChoice = (&'static str, &'static str);

/// One declared field of an entity schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    pub default: Option<StaticDefault>,
    pub choices: &'static [StaticChoice],
}

impl FieldSpec {
    /// A non-nullable field.
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            default: None,
            choices: &[],
        }
    }

    /// A nullable field. Maps to the same UI type as its base kind.
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
            default: None,
            choices: &[],
        }
    }

    pub const fn with_default(self, default: StaticDefault) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub const fn with_choices(self, choices: &'static [StaticChoice]) -> Self {
        Self { choices, ..self }
    }
}

/// The declared, ordered field table of one entity.
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    /// Entity name, used in log fields and error messages.
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// UI input type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Number,
    Boolean,
    Date,
    Select,
    Password,
    File,
}

impl FieldType {
    /// Map a primitive kind to its UI type. Nullability never changes the type.
    pub fn from_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::String | FieldKind::Id => Self::Text,
            FieldKind::LongString => Self::Textarea,
            FieldKind::Email => Self::Email,
            FieldKind::Integer | FieldKind::Decimal => Self::Number,
            FieldKind::Boolean => Self::Boolean,
            FieldKind::Date | FieldKind::Timestamp => Self::Date,
            FieldKind::Enum | FieldKind::ForeignKey => Self::Select,
            FieldKind::Secret => Self::Password,
            FieldKind::File => Self::File,
        }
    }
}

/// A selectable option of a `select` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectOption {
    pub id: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Describes one editable form field derived from an entity schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FieldDescriptor {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
}

impl FieldDescriptor {
    /// Build an ad hoc descriptor that does not come from a schema table.
    pub fn synthesized(field: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Self {
            field: field.into(),
            field_type,
            required,
            default_value: None,
            options: None,
        }
    }

    fn from_spec(spec: &FieldSpec) -> Self {
        let options = if spec.choices.is_empty() {
            None
        } else {
            Some(
                spec.choices
                    .iter()
                    .map(|(id, label)| SelectOption::new(*id, *label))
                    .collect(),
            )
        };

        Self {
            field: spec.name.to_string(),
            field_type: FieldType::from_kind(spec.kind),
            required: !spec.nullable,
            default_value: spec.default.map(StaticDefault::to_json),
            options,
        }
    }
}

// ---------------------------------------------------------------------------
// Introspection
// ---------------------------------------------------------------------------

/// Derive the ordered, editable field descriptors of `schema`.
///
/// System fields are skipped, declaration order is preserved, and a repeated
/// field name keeps only its first declaration. A schema without eligible
/// fields yields an empty vector.
pub fn introspect(schema: &EntitySchema) -> Vec<FieldDescriptor> {
    let mut seen = HashSet::new();
    schema
        .fields
        .iter()
        .filter(|spec| !is_system_field(spec.name))
        .filter(|spec| seen.insert(spec.name))
        .map(FieldDescriptor::from_spec)
        .collect()
}

/// Attach request-time options (e.g. rows of a referenced table) to `field`.
///
/// Returns `false` when no descriptor carries that name.
pub fn attach_options(
    descriptors: &mut [FieldDescriptor],
    field: &str,
    options: Vec<SelectOption>,
) -> bool {
    match descriptors.iter_mut().find(|d| d.field == field) {
        Some(descriptor) => {
            descriptor.options = Some(options);
            true
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: EntitySchema = EntitySchema {
        entity: "sample",
        fields: &[
            FieldSpec::required("id", FieldKind::Id),
            FieldSpec::required("companyName", FieldKind::String),
            FieldSpec::required("email", FieldKind::Email),
            FieldSpec::required("createdAt", FieldKind::Timestamp),
        ],
    };

    #[test]
    fn introspect_skips_system_fields_and_keeps_order() {
        let fields = introspect(&SAMPLE);
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, ["companyName", "email"]);
        assert_eq!(fields[1].field_type, FieldType::Email);
    }

    #[test]
    fn nullable_kind_keeps_base_type_and_is_not_required() {
        const SCHEMA: EntitySchema = EntitySchema {
            entity: "nullable",
            fields: &[
                FieldSpec::required("name", FieldKind::String),
                FieldSpec::optional("nickname", FieldKind::String),
            ],
        };
        let fields = introspect(&SCHEMA);
        assert_eq!(fields[0].field_type, fields[1].field_type);
        assert!(fields[0].required);
        assert!(!fields[1].required);
    }

    #[test]
    fn duplicate_names_keep_first_declaration() {
        const SCHEMA: EntitySchema = EntitySchema {
            entity: "dupes",
            fields: &[
                FieldSpec::required("title", FieldKind::String),
                FieldSpec::optional("title", FieldKind::LongString),
            ],
        };
        let fields = introspect(&SCHEMA);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_type, FieldType::Text);
    }

    #[test]
    fn only_system_fields_yields_empty() {
        const SCHEMA: EntitySchema = EntitySchema {
            entity: "empty",
            fields: &[
                FieldSpec::required("id", FieldKind::Id),
                FieldSpec::required("isDeleted", FieldKind::Boolean),
                FieldSpec::optional("createdBy", FieldKind::ForeignKey),
                FieldSpec::required("updatedAt", FieldKind::Timestamp),
            ],
        };
        assert!(introspect(&SCHEMA).is_empty());
    }

    #[test]
    fn defaults_and_choices_are_carried() {
        const SCHEMA: EntitySchema = EntitySchema {
            entity: "choices",
            fields: &[FieldSpec::required("outlook", FieldKind::Enum)
                .with_choices(&[("stable", "Stable"), ("negative", "Negative")])
                .with_default(StaticDefault::Text("stable"))],
        };
        let fields = introspect(&SCHEMA);
        assert_eq!(fields[0].field_type, FieldType::Select);
        assert_eq!(fields[0].default_value, Some(serde_json::json!("stable")));
        assert_eq!(fields[0].options.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn attach_options_targets_named_field() {
        let mut fields = introspect(&SAMPLE);
        assert!(attach_options(
            &mut fields,
            "companyName",
            vec![SelectOption::new("1", "Acme")]
        ));
        assert!(!attach_options(&mut fields, "missing", vec![]));
        assert_eq!(fields[0].options.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn descriptor_serializes_camel_case_with_type_key() {
        let fields = introspect(&SAMPLE);
        let json = serde_json::to_value(&fields[0]).unwrap();
        assert_eq!(json["field"], "companyName");
        assert_eq!(json["type"], "text");
        assert_eq!(json["required"], true);
        assert!(json.get("defaultValue").is_none());
    }
}
