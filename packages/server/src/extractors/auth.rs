use axum::{extract::FromRequestParts, http::request::Parts};
use enrollment_common::ActivationState;
use sea_orm::EntityTrait;

use crate::entity::student;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;
use crate::utils::permission::permissions_for;

/// Authenticated student extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Permissions follow the student's current activation state, not the one
/// the token was issued under. Permission checks happen via
/// `require_permission()` in the handler body.
pub struct AuthUser {
    pub student_id: i32,
    pub index: i32,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Returns `Ok(())` if the student has the given permission, `Err(PermissionDenied)` otherwise.
    pub fn require_permission(&self, permission: &str) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;
        let index: i32 = claims.sub.parse().map_err(|_| AppError::TokenInvalid)?;

        let student = student::Entity::find_by_id(claims.uid)
            .one(&state.db)
            .await?
            .filter(|s| s.index == index)
            .ok_or(AppError::TokenInvalid)?;

        let activation = student.activation();
        if activation == ActivationState::Pending {
            return Err(AppError::AccountNotActivated);
        }

        Ok(AuthUser {
            student_id: student.id,
            index: student.index,
            permissions: permissions_for(activation),
        })
    }
}
