//! Course and enrollment models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use aula_core::serde::deserialize_blank_as_none;

/// A row of `{schema}_cursos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub codigo: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub profesor_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// DTO for creating or replacing a course.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CourseDto {
    #[validate(length(min = 1, max = 150))]
    pub nombre: String,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub codigo: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profesor_id: Option<i64>,
}

impl CourseDto {
    /// Columns written by a full update. Optional columns the client left out
    /// are cleared.
    pub fn to_replacement(&self) -> Map<String, Value> {
        let mut patch = Map::new();
        patch.insert("nombre".into(), Value::from(self.nombre.trim()));
        patch.insert("codigo".into(), self.codigo.clone().into());
        patch.insert("descripcion".into(), self.descripcion.clone().into());
        patch.insert("profesor_id".into(), self.profesor_id.into());
        patch
    }
}

/// A row of `{schema}_inscripciones`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Enrollment {
    pub id: i64,
    pub usuario_id: i64,
    pub curso_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /enroll`. Students and teachers are enrolled alike.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct EnrollmentDto {
    #[validate(range(min = 1))]
    pub usuario_id: i64,
    #[validate(range(min = 1))]
    pub curso_id: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignTeacherParams {
    pub profesor_id: i64,
}

/// Course together with the caller's link to it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyCourse {
    #[serde(flatten)]
    pub course: Course,
    /// `profesor` when the caller teaches it, `inscrito` when enrolled.
    pub relacion: String,
}
