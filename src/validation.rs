use thiserror::Error;

use crate::models::StudentEntry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty class name")]
    EmptyClassName,
    #[error("no valid students")]
    NoValidStudents,
}

impl ValidationError {
    /// Text shown to the user in the error dialog.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::EmptyClassName => "Please enter a class name",
            ValidationError::NoValidStudents => {
                "Please add at least one valid student with all fields filled"
            }
        }
    }
}

pub fn validate_class_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyClassName)
    } else {
        Ok(trimmed)
    }
}

/// Roster rows split into the ones that will be persisted and the indices
/// of the ones that were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRows {
    pub students: Vec<StudentEntry>,
    pub dropped: Vec<usize>,
}

pub fn validate_rows(rows: &[StudentEntry]) -> Result<ValidRows, ValidationError> {
    let mut students = Vec::with_capacity(rows.len());
    let mut dropped = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if row.is_valid() {
            students.push(row.clone());
        } else {
            dropped.push(index);
        }
    }

    if students.is_empty() {
        return Err(ValidationError::NoValidStudents);
    }
    Ok(ValidRows { students, dropped })
}
