use anyhow::anyhow;
use aula_core::AppError;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// One message per failing rule, fields in alphabetical order.
fn format_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages = Vec::new();
    for (field, failures) in fields {
        for failure in failures {
            messages.push(match &failure.message {
                Some(msg) => msg.to_string(),
                None => format!("El campo {field} no es válido"),
            });
        }
    }
    messages.join(", ")
}

/// Field named in a serde "missing field `x`" message.
fn missing_field(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once("missing field `")?;
    rest.split('`').next()
}

fn bad_request(detail: String) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, anyhow!(detail))
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    if let JsonRejection::MissingJsonContentType(_) = rejection {
        return bad_request("Falta el encabezado 'Content-Type: application/json'".into());
    }

    let text = rejection.body_text();
    if let Some(field) = missing_field(&text) {
        bad_request(format!("El campo {field} es obligatorio"))
    } else if text.contains("invalid type") || text.contains("unknown variant") {
        bad_request("Tipo de dato inválido en la solicitud".into())
    } else {
        bad_request("Cuerpo de la solicitud inválido".into())
    }
}

fn validation_error(errors: &ValidationErrors) -> AppError {
    AppError::new(StatusCode::UNPROCESSABLE_ENTITY, anyhow!(format_errors(errors)))
}

/// JSON body that is validated with `validator` before the handler runs.
///
/// Malformed bodies are rejected with 400, failed validation with 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;
        match value.validate() {
            Ok(()) => Ok(ValidatedJson(value)),
            Err(errors) => Err(validation_error(&errors)),
        }
    }
}

/// JSON array body whose entries are each validated.
#[derive(Debug, Clone, Default)]
pub struct ValidatedJsonList<T>(pub Vec<T>);

impl<T, S> FromRequest<S> for ValidatedJsonList<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(values) = Json::<Vec<T>>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        if let Some(errors) = values.iter().find_map(|v| v.validate().err()) {
            return Err(validation_error(&errors));
        }
        Ok(ValidatedJsonList(values))
    }
}
