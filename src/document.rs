//! Firestore REST document encoding for class records.
//!
//! Firestore wraps every field in a typed value object (`{"stringValue": "x"}`,
//! `{"integerValue": "2"}`, ...). This module maps [`NewClass`] onto that shape
//! and decodes listed documents back into [`ClassRecord`]s.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ClassRecord, NewClass, StudentEntry};

const FIELD_NAME: &str = "name";
const FIELD_STUDENTS: &str = "students";
const FIELD_CREATED_AT: &str = "createdAt";
const FIELD_TOTAL_STUDENTS: &str = "totalStudents";

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("document field `{0}` is missing")]
    MissingField(&'static str),
    #[error("document field `{field}` is not a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("document field `{0}` holds an invalid integer")]
    BadInteger(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(Option<()>),
    BooleanValue(bool),
    /// Int64 values travel as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(DateTime<Utc>),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(LatLng),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

/// Zero coordinates are omitted on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    pub next_page_token: Option<String>,
}

impl Document {
    /// Trailing path segment of the resource name,
    /// e.g. `projects/p/databases/(default)/documents/classes/<id>`.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

fn string(value: &str) -> Value {
    Value::StringValue(value.to_string())
}

fn encode_student(student: &StudentEntry) -> Value {
    let mut fields = BTreeMap::new();
    fields.insert("id".to_string(), string(&student.id));
    fields.insert("name".to_string(), string(&student.name));
    fields.insert("email".to_string(), string(&student.email));
    Value::MapValue(MapValue { fields })
}

pub fn encode_class(class: &NewClass) -> Document {
    let mut fields = BTreeMap::new();
    fields.insert(FIELD_NAME.to_string(), string(&class.name));
    fields.insert(
        FIELD_STUDENTS.to_string(),
        Value::ArrayValue(ArrayValue {
            values: class.students.iter().map(encode_student).collect(),
        }),
    );
    fields.insert(
        FIELD_CREATED_AT.to_string(),
        Value::TimestampValue(class.created_at),
    );
    fields.insert(
        FIELD_TOTAL_STUDENTS.to_string(),
        Value::IntegerValue(class.total_students.to_string()),
    );
    Document {
        fields,
        ..Document::default()
    }
}

fn decode_student(value: &Value) -> Result<StudentEntry, DecodeError> {
    let Value::MapValue(map) = value else {
        return Err(DecodeError::WrongType {
            field: FIELD_STUDENTS,
            expected: "list of maps",
        });
    };
    let text = |key: &str| match map.fields.get(key) {
        Some(Value::StringValue(s)) => s.clone(),
        _ => String::new(),
    };
    Ok(StudentEntry::new(text("id"), text("name"), text("email")))
}

pub fn decode_class(document: &Document) -> Result<ClassRecord, DecodeError> {
    let name = match document.fields.get(FIELD_NAME) {
        Some(Value::StringValue(name)) => name.clone(),
        Some(_) => {
            return Err(DecodeError::WrongType {
                field: FIELD_NAME,
                expected: "string",
            });
        }
        None => return Err(DecodeError::MissingField(FIELD_NAME)),
    };

    let students = match document.fields.get(FIELD_STUDENTS) {
        Some(Value::ArrayValue(array)) => array
            .values
            .iter()
            .map(decode_student)
            .collect::<Result<Vec<_>, _>>()?,
        Some(Value::NullValue(_)) | None => Vec::new(),
        Some(_) => {
            return Err(DecodeError::WrongType {
                field: FIELD_STUDENTS,
                expected: "list",
            });
        }
    };

    let created_at = match document.fields.get(FIELD_CREATED_AT) {
        Some(Value::TimestampValue(ts)) => *ts,
        _ => document.create_time.unwrap_or_default(),
    };

    let total_students = match document.fields.get(FIELD_TOTAL_STUDENTS) {
        Some(Value::IntegerValue(raw)) => raw
            .parse::<u32>()
            .map_err(|_| DecodeError::BadInteger(FIELD_TOTAL_STUDENTS))?,
        Some(Value::DoubleValue(v)) if *v >= 0.0 => *v as u32,
        _ => u32::try_from(students.len()).unwrap_or(u32::MAX),
    };

    Ok(ClassRecord {
        id: document.id().to_string(),
        name,
        students,
        created_at,
        total_students,
    })
}
