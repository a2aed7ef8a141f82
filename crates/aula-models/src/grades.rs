//! Grade models and bulk import results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

/// A row of `{schema}_notas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub registered_at: Option<String>,
}

/// One entry of a bulk grade submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct GradeCreate {
    #[validate(range(min = 1))]
    pub student_id: i64,
    #[validate(range(min = 1))]
    pub course_id: i64,
    pub grade: f64,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Insert body for `{schema}_notas`, stamped with the registration time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGrade {
    pub student_id: i64,
    pub course_id: i64,
    pub grade: f64,
    pub subject: Option<String>,
    pub registered_at: String,
}

impl GradeCreate {
    pub fn stamped(self, registered_at: &str) -> NewGrade {
        NewGrade {
            student_id: self.student_id,
            course_id: self.course_id,
            grade: self.grade,
            subject: self.subject,
            registered_at: registered_at.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GradeUpdate {
    pub grade: Option<f64>,
    pub subject: Option<String>,
}

impl GradeUpdate {
    pub fn to_patch(&self) -> Map<String, Value> {
        let mut patch = Map::new();
        if let Some(grade) = self.grade {
            patch.insert("grade".into(), Value::from(grade));
        }
        if let Some(subject) = &self.subject {
            patch.insert("subject".into(), Value::from(subject.trim()));
        }
        patch
    }
}

/// `{message, data}` envelope returned by grade writes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GradeWriteResponse<T> {
    pub message: String,
    pub data: T,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GradeImportResponse {
    pub message: String,
    pub inserted: Vec<Grade>,
    pub inserted_count: usize,
    /// Rows dropped because an id or the grade could not be read.
    pub skipped_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stamped_carries_timestamp() {
        let record = GradeCreate {
            student_id: 1,
            course_id: 2,
            grade: 87.5,
            subject: None,
        }
        .stamped("2024-06-01T10:00:00Z");
        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value["registered_at"], "2024-06-01T10:00:00Z");
        assert_eq!(value["subject"], Value::Null);
    }

    #[test]
    fn ids_are_validated() {
        let bad = GradeCreate {
            student_id: 0,
            course_id: 1,
            grade: 14.0,
            subject: None,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn update_patch() {
        let update: GradeUpdate = serde_json::from_value(json!({"grade": 70})).unwrap();
        let patch = update.to_patch();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["grade"], 70.0);
        assert!(GradeUpdate::default().to_patch().is_empty());
    }
}
