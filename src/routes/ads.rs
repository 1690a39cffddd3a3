//! Classified ad routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum_extra::extract::WithRejection;

use super::auth::AuthUser;
use super::error::ApiError;
use crate::services::ad::{self, Ad, AdCreate, AdFilter, AdListQuery, AdUpdate};
use crate::state::AppState;

/// `POST /ads`: create an ad owned by the caller.
pub async fn create_ad(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(body), _): WithRejection<Json<AdCreate>, ApiError>,
) -> Result<(StatusCode, Json<Ad>), ApiError> {
    let ad = ad::create_ad(&state.pool, auth.user.id, body).await?;
    Ok((StatusCode::CREATED, Json(ad)))
}

/// `GET /ads?skip=&limit=&category=&location=`: paginated listing.
pub async fn list_ads(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<AdListQuery>, ApiError>,
) -> Result<Json<Vec<Ad>>, ApiError> {
    let filter = AdFilter::from(query);
    let ads = ad::list_ads(&state.pool, &filter).await?;
    Ok(Json(ads))
}

/// `GET /ads/:id`: fetch one ad, counting the view.
pub async fn get_ad(State(state): State<AppState>, Path(ad_id): Path<String>) -> Result<Json<Ad>, ApiError> {
    let ad_id = ad::parse_ad_id(&ad_id)?;
    Ok(Json(ad::view_ad(&state.pool, ad_id).await?))
}

/// `PUT /ads/:id`: partial update by the owner.
pub async fn update_ad(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ad_id): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<AdUpdate>, ApiError>,
) -> Result<Json<Ad>, ApiError> {
    let ad_id = ad::parse_ad_id(&ad_id)?;
    let ad = ad::update_ad(&state.pool, ad_id, auth.user.id, body).await?;
    Ok(Json(ad))
}

/// `DELETE /ads/:id`: delete by the owner.
pub async fn delete_ad(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ad_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ad_id = ad::parse_ad_id(&ad_id)?;
    ad::delete_ad(&state.pool, ad_id, auth.user.id).await?;
    Ok(Json(serde_json::json!({ "message": "Ad deleted" })))
}

/// `POST /ads/:id/approve`: moderation, admins only.
pub async fn approve_ad(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ad_id): Path<String>,
) -> Result<Json<Ad>, ApiError> {
    let ad_id = ad::parse_ad_id(&ad_id)?;
    let ad = ad::approve_ad(&state.pool, ad_id, auth.user.role).await?;
    Ok(Json(ad))
}
