use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One roster row. Keys left out of a submitted row read as empty fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(default)]
pub struct StudentEntry {
    #[schema(example = "CS001")]
    pub id: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john@example.com")]
    pub email: String,
}

impl StudentEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// A row is valid when none of its fields is blank after trimming.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }

    pub fn field_mut(&mut self, field: StudentField) -> &mut String {
        match field {
            StudentField::Id => &mut self.id,
            StudentField::Name => &mut self.name,
            StudentField::Email => &mut self.email,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentField {
    Id,
    Name,
    Email,
}

/// A persisted class with its roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    #[schema(example = "q8ZbN3vXyT1kLmP0aBcD")]
    pub id: String,
    #[schema(example = "Mathematics 101")]
    pub name: String,
    pub students: Vec<StudentEntry>,
    #[schema(value_type = String, format = "date-time", example = "2025-11-24T06:00:00Z")]
    pub created_at: DateTime<Utc>,
    pub total_students: u32,
}

/// Document body written by `create_class`. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClass {
    pub name: String,
    pub students: Vec<StudentEntry>,
    pub created_at: DateTime<Utc>,
    pub total_students: u32,
}

impl NewClass {
    pub fn new(name: String, students: Vec<StudentEntry>) -> Self {
        let total_students = u32::try_from(students.len()).unwrap_or(u32::MAX);
        Self {
            name,
            students,
            created_at: Utc::now(),
            total_students,
        }
    }

    pub fn into_record(self, id: String) -> ClassRecord {
        ClassRecord {
            id,
            name: self.name,
            students: self.students,
            created_at: self.created_at,
            total_students: self.total_students,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_validity_ignores_whitespace() {
        assert!(StudentEntry::new("S1", "Alice", "a@x.com").is_valid());
        assert!(!StudentEntry::new("", "Bob", "b@x.com").is_valid());
        assert!(!StudentEntry::new("S2", "   ", "b@x.com").is_valid());
        assert!(!StudentEntry::default().is_valid());
    }

    #[test]
    fn test_student_with_missing_keys_deserializes_blank() {
        let student: StudentEntry =
            serde_json::from_str(r#"{"id":"S3","name":"Carol"}"#).unwrap();
        assert_eq!(student, StudentEntry::new("S3", "Carol", ""));
        assert!(!student.is_valid());
    }

    #[test]
    fn test_new_class_counts_students() {
        let class = NewClass::new(
            "CS101".into(),
            vec![
                StudentEntry::new("S1", "Alice", "a@x.com"),
                StudentEntry::new("S2", "Bob", "b@x.com"),
            ],
        );
        assert_eq!(class.total_students, 2);

        let record = class.into_record("abc".into());
        assert_eq!(record.id, "abc");
        assert_eq!(record.total_students as usize, record.students.len());
    }

    #[test]
    fn test_class_record_json_is_camel_case() {
        let record = NewClass::new("CS101".into(), vec![]).into_record("abc".into());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["totalStudents"], 0);
    }
}
