use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{BodyPart, MuscleTest};
use crate::repositories::CatalogRepository;

#[derive(Clone)]
pub struct CatalogState {
    pub catalog_repo: CatalogRepository,
}

pub async fn list_body_parts(
    State(state): State<CatalogState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<BodyPart>>> {
    Ok(Json(state.catalog_repo.list_body_parts().await?))
}

pub async fn list_muscle_tests(
    State(state): State<CatalogState>,
    _auth_user: AuthUser,
    Path(body_part_id): Path<String>,
) -> Result<Json<Vec<MuscleTest>>> {
    if state.catalog_repo.find_body_part(&body_part_id).await?.is_none() {
        return Err(AppError::NotFound("Body part not found".to_string()));
    }
    Ok(Json(state.catalog_repo.list_muscle_tests(&body_part_id).await?))
}
