//! Attendance records and excuses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Presente,
    Ausente,
    Tarde,
    Justificado,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Presente => "presente",
            AttendanceStatus::Ausente => "ausente",
            AttendanceStatus::Tarde => "tarde",
            AttendanceStatus::Justificado => "justificado",
        }
    }
}

/// A row of `{schema}_asistencias`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attendance {
    pub id: i64,
    pub estudiante_id: i64,
    pub curso_id: i64,
    pub fecha: NaiveDate,
    pub estado: AttendanceStatus,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default)]
    pub registrado_por: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttendanceCreate {
    #[validate(range(min = 1))]
    pub estudiante_id: i64,
    #[validate(range(min = 1))]
    pub curso_id: i64,
    pub fecha: NaiveDate,
    pub estado: AttendanceStatus,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub observaciones: Option<String>,
}

/// Insert body for `{schema}_asistencias`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAttendance {
    pub estudiante_id: i64,
    pub curso_id: i64,
    pub fecha: NaiveDate,
    pub estado: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
    pub registrado_por: i64,
}

impl AttendanceCreate {
    pub fn recorded_by(self, user_id: i64) -> NewAttendance {
        NewAttendance {
            estudiante_id: self.estudiante_id,
            curso_id: self.curso_id,
            fecha: self.fecha,
            estado: self.estado,
            observaciones: self.observaciones,
            registrado_por: user_id,
        }
    }
}

/// Entry of a bulk submission; course and date come from the session.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttendanceMark {
    #[validate(range(min = 1))]
    pub estudiante_id: i64,
    pub estado: AttendanceStatus,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub observaciones: Option<String>,
}

/// All marks taken in one class session.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttendanceSession {
    #[validate(range(min = 1))]
    pub curso_id: i64,
    pub fecha: NaiveDate,
    #[validate(length(min = 1), nested)]
    pub registros: Vec<AttendanceMark>,
}

impl AttendanceSession {
    pub fn into_records(self, user_id: i64) -> Vec<NewAttendance> {
        let (curso_id, fecha) = (self.curso_id, self.fecha);
        self.registros
            .into_iter()
            .map(|mark| NewAttendance {
                estudiante_id: mark.estudiante_id,
                curso_id,
                fecha,
                estado: mark.estado,
                observaciones: mark.observaciones,
                registrado_por: user_id,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttendanceUpdate {
    pub estado: Option<AttendanceStatus>,
    #[validate(length(max = 500))]
    pub observaciones: Option<String>,
}

impl AttendanceUpdate {
    pub fn to_patch(&self) -> Map<String, Value> {
        let mut patch = Map::new();
        if let Some(estado) = self.estado {
            patch.insert("estado".into(), Value::from(estado.as_str()));
        }
        if let Some(obs) = &self.observaciones {
            patch.insert("observaciones".into(), Value::from(obs.as_str()));
        }
        patch
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseAttendanceParams {
    /// Restricts the listing to one session date.
    pub fecha: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExcuseStatus {
    Pendiente,
    Aprobada,
    Rechazada,
}

impl ExcuseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExcuseStatus::Pendiente => "pendiente",
            ExcuseStatus::Aprobada => "aprobada",
            ExcuseStatus::Rechazada => "rechazada",
        }
    }
}

/// A row of `{schema}_excusas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Excuse {
    pub id: i64,
    pub estudiante_id: i64,
    pub curso_id: i64,
    pub fecha: NaiveDate,
    pub motivo: String,
    pub estado: ExcuseStatus,
    #[serde(default)]
    pub revisado_por: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ExcuseCreate {
    #[validate(range(min = 1))]
    pub curso_id: i64,
    pub fecha: NaiveDate,
    #[validate(length(min = 3, max = 1000))]
    pub motivo: String,
}

/// Insert body for `{schema}_excusas`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExcuse {
    pub estudiante_id: i64,
    pub curso_id: i64,
    pub fecha: NaiveDate,
    pub motivo: String,
    pub estado: ExcuseStatus,
}

impl ExcuseCreate {
    pub fn submitted_by(self, estudiante_id: i64) -> NewExcuse {
        NewExcuse {
            estudiante_id,
            curso_id: self.curso_id,
            fecha: self.fecha,
            motivo: self.motivo.trim().to_string(),
            estado: ExcuseStatus::Pendiente,
        }
    }
}

/// Decision on a pending excuse.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExcuseReview {
    pub estado: ExcuseStatus,
}
