//! services/api/src/web/principal.rs
//!
//! Resolves the authenticated user into a teacher identity, and enforces the
//! ownership rule shared by every workflow operation: a class that exists but
//! belongs to another teacher is reported as not found, never as forbidden,
//! so existence does not leak.

use uuid::Uuid;

use classflow_core::domain::{ClassSession, Teacher};
use classflow_core::ports::PortError;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Maps the authenticated user id onto their teacher record.
pub async fn resolve_teacher(state: &AppState, user_id: Uuid) -> Result<Teacher, ApiError> {
    state
        .db
        .get_teacher_by_user_id(user_id)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => {
                ApiError::Forbidden("no teacher profile for this account".to_string())
            }
            other => other.into(),
        })
}

/// Loads a class and verifies the caller owns it.
pub async fn owned_class(
    state: &AppState,
    teacher: &Teacher,
    class_id: Uuid,
) -> Result<ClassSession, ApiError> {
    let class = state.db.get_class(class_id).await?;
    if class.teacher_id != teacher.id {
        return Err(ApiError::NotFound(format!("Class {class_id} not found")));
    }
    Ok(class)
}
