//! Field tables for every editable entity.
//!
//! Tables list fields in record declaration order, system columns included.
//! Names are the camelCase keys used on the wire and in form bodies.

use crate::fields::{EntitySchema, FieldKind, FieldSpec, StaticDefault};
use crate::roles::{ROLE_ADMIN, ROLE_ANALYST};

const ID: FieldSpec = FieldSpec::required("id", FieldKind::Id);
const IS_DELETED: FieldSpec = FieldSpec::required("isDeleted", FieldKind::Boolean);
const CREATED_BY: FieldSpec = FieldSpec::optional("createdBy", FieldKind::ForeignKey);
const CREATED_AT: FieldSpec = FieldSpec::required("createdAt", FieldKind::Timestamp);
const UPDATED_AT: FieldSpec = FieldSpec::required("updatedAt", FieldKind::Timestamp);

/// Rating workflow statuses; ids match the `rating_statuses` seed rows.
pub const RATING_STATUS_CHOICES: &[(&str, &str)] = &[
    ("1", "Pending"),
    ("2", "In Progress"),
    ("3", "Under Review"),
    ("4", "Completed"),
    ("5", "Archived"),
];

pub const OUTLOOK_CHOICES: &[(&str, &str)] = &[
    ("stable", "Stable"),
    ("positive", "Positive"),
    ("negative", "Negative"),
    ("developing", "Developing"),
];

pub const ROLE_CHOICES: &[(&str, &str)] = &[(ROLE_ADMIN, "Administrator"), (ROLE_ANALYST, "Analyst")];

pub const CLIENT: EntitySchema = EntitySchema {
    entity: "client",
    fields: &[
        ID,
        FieldSpec::required("companyName", FieldKind::String),
        FieldSpec::required("email", FieldKind::Email),
        FieldSpec::optional("password", FieldKind::Secret),
        FieldSpec::optional("phone", FieldKind::String),
        FieldSpec::optional("address", FieldKind::LongString),
        FieldSpec::optional("contactPerson", FieldKind::String),
        FieldSpec::optional("industryId", FieldKind::ForeignKey),
        IS_DELETED,
        CREATED_BY,
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub const INDUSTRY: EntitySchema = EntitySchema {
    entity: "industry",
    fields: &[
        ID,
        FieldSpec::required("name", FieldKind::String),
        FieldSpec::optional("description", FieldKind::LongString),
        IS_DELETED,
        CREATED_BY,
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub const METHODOLOGY: EntitySchema = EntitySchema {
    entity: "methodology",
    fields: &[
        ID,
        FieldSpec::required("name", FieldKind::String),
        FieldSpec::optional("description", FieldKind::LongString),
        FieldSpec::optional("industryId", FieldKind::ForeignKey),
        FieldSpec::optional("documentUrl", FieldKind::String),
        IS_DELETED,
        CREATED_BY,
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub const QUESTIONNAIRE: EntitySchema = EntitySchema {
    entity: "questionnaire",
    fields: &[
        ID,
        FieldSpec::required("name", FieldKind::String),
        FieldSpec::optional("description", FieldKind::LongString),
        FieldSpec::required("templateUrl", FieldKind::String),
        IS_DELETED,
        CREATED_BY,
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub const RATING: EntitySchema = EntitySchema {
    entity: "rating",
    fields: &[
        ID,
        FieldSpec::required("clientId", FieldKind::ForeignKey),
        FieldSpec::optional("methodologyId", FieldKind::ForeignKey),
        FieldSpec::optional("questionnaireId", FieldKind::ForeignKey),
        FieldSpec::required("statusId", FieldKind::Enum)
            .with_choices(RATING_STATUS_CHOICES)
            .with_default(StaticDefault::Integer(1)),
        FieldSpec::required("ratingYear", FieldKind::Integer),
        FieldSpec::optional("ratingScore", FieldKind::String),
        FieldSpec::optional("outlook", FieldKind::Enum).with_choices(OUTLOOK_CHOICES),
        FieldSpec::optional("startDate", FieldKind::Date),
        FieldSpec::optional("endDate", FieldKind::Date),
        FieldSpec::optional("supervisorId", FieldKind::ForeignKey),
        FieldSpec::optional("primaryAnalystId", FieldKind::ForeignKey),
        FieldSpec::optional("secondaryAnalystId", FieldKind::ForeignKey),
        IS_DELETED,
        CREATED_BY,
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub const USER: EntitySchema = EntitySchema {
    entity: "user",
    fields: &[
        ID,
        FieldSpec::required("firstName", FieldKind::String),
        FieldSpec::required("lastName", FieldKind::String),
        FieldSpec::required("email", FieldKind::Email),
        FieldSpec::optional("password", FieldKind::Secret),
        FieldSpec::required("role", FieldKind::Enum)
            .with_choices(ROLE_CHOICES)
            .with_default(StaticDefault::Text(ROLE_ANALYST)),
        FieldSpec::required("isActive", FieldKind::Boolean).with_default(StaticDefault::Bool(true)),
        IS_DELETED,
        CREATED_AT,
        UPDATED_AT,
    ],
};
