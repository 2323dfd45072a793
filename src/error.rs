use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::{json, Map, Value};
use thiserror::Error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

pub type WebResult<T, E = WebError> = Result<T, E>;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";

#[derive(Error, Debug)]
pub enum WebError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    Validation(Value),
    #[error("Malformed request body: {0}")]
    Payload(String),
    #[error("DBError: `{0}`")]
    Database(DieselError),
    #[error("PoolError: `{0}`")]
    Pool(#[from] PoolError),
    #[error("HashError: `{0}`")]
    Hash(#[from] bcrypt::BcryptError),
}

impl From<DieselError> for WebError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::NotFound => WebError::NotFound,
            DieselError::DatabaseError(
                kind @ (DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation),
                info,
            ) => {
                let message = match kind {
                    DatabaseErrorKind::ForeignKeyViolation => {
                        "Cannot delete or reference this object: it is still in use.".to_string()
                    }
                    _ => info.message().to_string(),
                };
                let mut errors = FieldErrors::new();
                errors.add(NON_FIELD_ERRORS, message);
                errors.into_error()
            }
            other => WebError::Database(other),
        }
    }
}

impl From<ValidationErrors> for WebError {
    fn from(e: ValidationErrors) -> Self {
        FieldErrors::from(e).into_error()
    }
}

impl ResponseError for WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebError::NotFound => StatusCode::NOT_FOUND,
            WebError::Validation(_) | WebError::Payload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            WebError::NotFound => HttpResponse::NotFound().finish(),
            WebError::Validation(body) => HttpResponse::BadRequest().json(body),
            WebError::Payload(msg) => {
                let mut errors = FieldErrors::new();
                errors.add(NON_FIELD_ERRORS, msg.clone());
                HttpResponse::BadRequest().json(Value::Object(errors.0))
            }
            other => HttpResponse::InternalServerError().json(json!({
                "detail": other.to_string()
            })),
        }
    }
}

/// Field name to message list map, rendered as the body of a 400 response.
///
/// Nested payloads (`address`, `main_phone`, list items) are rendered as
/// nested objects so clients can locate the offending value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors(Map<String, Value>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let entry = self
            .0
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(messages) = entry {
            messages.push(Value::String(message.into()));
        }
    }

    /// Attach the errors of a nested object under `field`; empty groups are dropped.
    pub fn nest(&mut self, field: &str, inner: FieldErrors) {
        if !inner.is_empty() {
            self.0.insert(field.to_string(), Value::Object(inner.0));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_error(self) -> WebError {
        WebError::Validation(Value::Object(self.0))
    }

    pub fn into_result(self) -> WebResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(e: ValidationErrors) -> Self {
        FieldErrors(collect(&e))
    }
}

fn collect(errors: &ValidationErrors) -> Map<String, Value> {
    let mut map = Map::new();
    for (field, kind) in errors.errors() {
        let value = match kind {
            ValidationErrorsKind::Field(list) => Value::Array(
                list.iter()
                    .map(|e| Value::String(message_for(e)))
                    .collect(),
            ),
            ValidationErrorsKind::Struct(inner) => Value::Object(collect(inner)),
            ValidationErrorsKind::List(items) => Value::Object(
                items
                    .iter()
                    .map(|(index, inner)| (index.to_string(), Value::Object(collect(inner))))
                    .collect(),
            ),
        };
        let key = match &**field {
            "__all__" => NON_FIELD_ERRORS.to_string(),
            other => other.to_string(),
        };
        map.insert(key, value);
    }
    map
}

fn message_for(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let param = |name: &str| error.params.get(name).map(|v| v.to_string());
    match &*error.code {
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => {
                format!("Ensure this field has between {min} and {max} characters.")
            }
            (Some(min), None) => format!("Ensure this field has at least {min} characters."),
            (None, Some(max)) => format!("Ensure this field has no more than {max} characters."),
            (None, None) => "Invalid length.".to_string(),
        },
        "range" => match param("min") {
            Some(min) => format!("Ensure this value is greater than or equal to {min}."),
            None => "Value out of range.".to_string(),
        },
        "url" => "Enter a valid URL.".to_string(),
        "email" => "Enter a valid email address.".to_string(),
        "required" => REQUIRED.to_string(),
        code => format!("Invalid value ({code})."),
    }
}
