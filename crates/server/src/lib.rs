use std::collections::BTreeMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::admin::ErrorResponse;
pub use server::{ServerState, SiteSettings, router, run_with_listener};

mod departments;
mod listing;
mod media;
mod profiles;
mod server;
mod site;
mod statuses;
mod users;

pub mod types {
    pub mod admin {
        pub use api_types::admin::{
            EntityInfo, ErrorResponse, ListResponse, ListRow, SearchParams, SiteInfo,
        };
    }

    pub mod status {
        pub use api_types::status::{StatusForm, StatusView};
        pub use engine::UserStatus;
    }

    pub mod department {
        pub use api_types::department::{DepartmentForm, DepartmentView};
        pub use engine::UserDepartment;
    }

    pub mod profile {
        pub use api_types::profile::{
            AvatarParams, ProfileForm, ProfileInlineEdit, ProfileListParams, ProfileView,
        };
        pub use engine::UserProfile;
    }

    pub mod user {
        pub use api_types::user::{UserForm, UserView};
        pub use engine::Identity;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::InvalidId(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidConfig(_) | EngineError::Storage(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorResponse {
    match err {
        EngineError::Validation(fields) => ErrorResponse {
            error: "validation failed".to_string(),
            fields: Some(
                fields
                    .iter()
                    .map(|(field, messages)| (field.clone(), messages.clone()))
                    .collect::<BTreeMap<_, _>>(),
            ),
        },
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            internal_error()
        }
        EngineError::Storage(io_err) => {
            tracing::error!("media storage error: {io_err}");
            internal_error()
        }
        EngineError::InvalidConfig(msg) => {
            tracing::error!("invalid configuration: {msg}");
            internal_error()
        }
        other => ErrorResponse {
            error: other.to_string(),
            fields: None,
        },
    }
}

fn internal_error() -> ErrorResponse {
    ErrorResponse {
        error: "internal server error".to_string(),
        fields: None,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error,
                    fields: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::FieldErrors;

    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let mut fields = FieldErrors::new();
        fields.add("status", "too long");
        let res = ServerError::from(EngineError::Validation(fields)).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn validation_body_lists_fields() {
        let mut fields = FieldErrors::new();
        fields.add("phone", "invalid");
        let body = body_for_engine_error(EngineError::Validation(fields));
        assert_eq!(
            body.fields.unwrap().get("phone"),
            Some(&vec!["invalid".to_string()])
        );
    }

    #[test]
    fn storage_maps_to_500_without_details() {
        let err = std::io::Error::other("disk full");
        let body = body_for_engine_error(EngineError::Storage(err));
        assert_eq!(body.error, "internal server error");
        let res = ServerError::from(EngineError::Storage(std::io::Error::other("x")))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
