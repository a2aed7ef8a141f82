//! User domain models and DTOs.
//!
//! Students, teachers and directors share one `usuarios` table per tenant
//! and are told apart by the `rol` column.

use std::fmt;
use std::str::FromStr;

use aula_core::serde::deserialize_blank_as_none;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::ModelError;

/// Closed set of roles the services act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Director,
    Profesor,
    Estudiante,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Director, Role::Profesor, Role::Estudiante];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Director => "director",
            Role::Profesor => "profesor",
            Role::Estudiante => "estudiante",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rol no válido. Debe ser uno de: {}",
            Role::ALL.map(Role::as_str).join(", ")
        )
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// A row of `{schema}_usuarios`.
///
/// `rol` is kept as stored; rows with roles outside [`Role`] still list
/// fine but never pass an authorization check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
    pub email: String,
    #[serde(default)]
    pub rol: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub fecha_nacimiento: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl UserProfile {
    pub fn role(&self) -> Option<Role> {
        self.rol.parse().ok()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}

impl TryFrom<Value> for UserProfile {
    type Error = ModelError;

    fn try_from(row: Value) -> Result<Self, Self::Error> {
        let profile: UserProfile =
            serde_json::from_value(row).map_err(|e| ModelError::Malformed(e.to_string()))?;
        if profile.email.trim().is_empty() {
            return Err(ModelError::EmptyEmail);
        }
        Ok(profile)
    }
}

/// DTO for creating a student or teacher.
#[derive(Deserialize, Serialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 100))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100))]
    pub apellido: String,
    #[validate(email)]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    #[validate(length(max = 30))]
    pub telefono: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    #[validate(length(max = 255))]
    pub direccion: Option<String>,
    #[serde(default)]
    pub fecha_nacimiento: Option<NaiveDate>,
}

/// DTO for creating a director. Directors carry no contact details.
#[derive(Deserialize, Serialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateDirectorDto {
    #[validate(length(min = 1, max = 100))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100))]
    pub apellido: String,
    #[validate(email)]
    pub email: String,
}

/// Insert body for `{schema}_usuarios`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewUser {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub rol: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<NaiveDate>,
}

impl CreateUserDto {
    pub fn into_new_user(self, rol: Role) -> NewUser {
        NewUser {
            nombre: self.nombre.trim().to_string(),
            apellido: self.apellido.trim().to_string(),
            email: self.email.trim().to_string(),
            rol,
            telefono: self.telefono,
            direccion: self.direccion,
            fecha_nacimiento: self.fecha_nacimiento,
        }
    }
}

impl CreateDirectorDto {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            nombre: self.nombre.trim().to_string(),
            apellido: self.apellido.trim().to_string(),
            email: self.email.trim().to_string(),
            rol: Role::Director,
            telefono: None,
            direccion: None,
            fecha_nacimiento: None,
        }
    }
}

/// Partial update of a person. Absent fields are left untouched.
#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 100))]
    pub nombre: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub apellido: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub telefono: Option<String>,
    #[validate(length(max = 255))]
    pub direccion: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub rol: Option<Role>,
}

impl UpdateUserDto {
    /// Columns to patch. Empty when the request carried no fields.
    pub fn to_patch(&self) -> Map<String, Value> {
        let mut patch = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                patch.insert(key.to_string(), value);
            }
        };
        put("nombre", self.nombre.as_deref().map(|v| Value::from(v.trim())));
        put(
            "apellido",
            self.apellido.as_deref().map(|v| Value::from(v.trim())),
        );
        put("email", self.email.as_deref().map(|v| Value::from(v.trim())));
        put("telefono", self.telefono.clone().map(Value::from));
        put("direccion", self.direccion.clone().map(Value::from));
        put(
            "fecha_nacimiento",
            self.fecha_nacimiento.map(|d| Value::from(d.to_string())),
        );
        put("rol", self.rol.map(|r| Value::from(r.as_str())));
        patch
    }
}

/// Body of `PATCH /users/{id}/role`.
///
/// `new_role` stays a string so an unknown value can be rejected with the
/// list of valid roles instead of a generic payload error.
#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct RoleUpdateDto {
    pub new_role: String,
}

impl RoleUpdateDto {
    pub fn role(&self) -> Result<Role, UnknownRole> {
        self.new_role.trim().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parsing_is_exact() {
        assert_eq!("director".parse::<Role>().unwrap(), Role::Director);
        assert_eq!("profesor".parse::<Role>().unwrap(), Role::Profesor);
        assert_eq!("estudiante".parse::<Role>().unwrap(), Role::Estudiante);
        assert!("admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_unknown_role_message_lists_roles() {
        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Rol no válido. Debe ser uno de: director, profesor, estudiante"
        );
    }

    #[test]
    fn test_profile_from_row() {
        let profile = UserProfile::try_from(json!({
            "id": 3,
            "nombre": "Ana",
            "apellido": "Rojas",
            "email": "ana@ucb.edu.bo",
            "rol": "profesor",
            "fecha_nacimiento": "1990-05-01",
            "created_at": "2024-01-01T00:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(profile.role(), Some(Role::Profesor));
        assert_eq!(profile.full_name(), "Ana Rojas");
        assert!(profile.telefono.is_none());
    }

    #[test]
    fn test_profile_with_unknown_role_has_no_role() {
        let profile = UserProfile::try_from(json!({
            "id": 1, "email": "x@ucb.edu.bo", "rol": "administrativo"
        }))
        .unwrap();
        assert_eq!(profile.role(), None);
    }

    #[test]
    fn test_profile_rejects_empty_email() {
        let err = UserProfile::try_from(json!({"id": 1, "email": "  ", "rol": "director"}));
        assert_eq!(err.unwrap_err(), ModelError::EmptyEmail);
    }

    #[test]
    fn test_create_dto_validation() {
        let dto = CreateUserDto {
            nombre: "".into(),
            apellido: "Perez".into(),
            email: "not-an-email".into(),
            telefono: None,
            direccion: None,
            fecha_nacimiento: None,
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("nombre"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_new_user_skips_missing_optionals() {
        let dto: CreateUserDto = serde_json::from_value(json!({
            "nombre": " Luis ",
            "apellido": "Vaca",
            "email": "luis@upb.edu.bo",
            "telefono": ""
        }))
        .unwrap();
        let body = serde_json::to_value(dto.into_new_user(Role::Estudiante)).unwrap();
        assert_eq!(
            body,
            json!({
                "nombre": "Luis",
                "apellido": "Vaca",
                "email": "luis@upb.edu.bo",
                "rol": "estudiante"
            })
        );
    }

    #[test]
    fn test_update_patch_only_carries_present_fields() {
        let dto = UpdateUserDto {
            nombre: Some("Carla".into()),
            rol: Some(Role::Profesor),
            ..UpdateUserDto::default()
        };
        let patch = dto.to_patch();
        assert_eq!(patch.len(), 2);
        assert_eq!(patch["nombre"], "Carla");
        assert_eq!(patch["rol"], "profesor");
        assert!(UpdateUserDto::default().to_patch().is_empty());
    }

    #[test]
    fn test_role_update_dto() {
        let ok = RoleUpdateDto {
            new_role: "director".into(),
        };
        assert_eq!(ok.role().unwrap(), Role::Director);
        let bad = RoleUpdateDto {
            new_role: "root".into(),
        };
        assert!(bad.role().is_err());
    }
}
