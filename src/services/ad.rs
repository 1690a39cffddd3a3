//! Classified ads: validation, CRUD, listing, moderation.
//!
//! DESIGN
//! ======
//! Request payloads are validated into normalized values before any write
//! runs. Ownership checks read the current owner first so callers get a
//! precise 404 vs 403, then the write itself is also guarded by `user_id` so
//! a concurrent delete cannot let a stale check through.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::services::user::Role;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const MAX_IMAGES: usize = 10;
pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 120;
const MAX_TITLE_LEN: usize = 120;
const MAX_DESCRIPTION_LEN: usize = 5000;
const MAX_SHORT_FIELD_LEN: usize = 100;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AdError {
    #[error("Ad not found")]
    NotFound(Uuid),
    #[error("invalid ad id")]
    InvalidId,
    #[error("Not authorized")]
    Forbidden(Uuid),
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AdError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid { field, reason: reason.into() }
    }
}

/// Row shape shared by every ad query.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Ad {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub age: Option<i32>,
    pub contact_info: Option<String>,
    pub images: Vec<String>,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub approved: bool,
    pub views: i64,
}

const AD_COLUMNS: &str =
    "id, title, description, category, location, age, contact_info, images, user_id, created_at, approved, views";

/// `POST /ads` body.
#[derive(Debug, Clone, Deserialize)]
pub struct AdCreate {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub age: Option<i32>,
    pub contact_info: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// `PUT /ads/:id` body. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub age: Option<i32>,
    pub contact_info: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Query string for `GET /ads`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub location: Option<String>,
}

/// Normalized listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdFilter {
    pub skip: i64,
    pub limit: i64,
    pub category: Option<String>,
    pub location: Option<String>,
}

impl From<AdListQuery> for AdFilter {
    fn from(query: AdListQuery) -> Self {
        let non_blank = |v: Option<String>| v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());
        Self {
            skip: query.skip.unwrap_or(0).max(0),
            limit: query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
            category: non_blank(query.category),
            location: non_blank(query.location),
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Parse a path segment into an ad id.
///
/// # Errors
///
/// Returns [`AdError::InvalidId`] if the segment is not a UUID.
pub fn parse_ad_id(raw: &str) -> Result<Uuid, AdError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AdError::InvalidId)
}

fn required_text(field: &'static str, value: &str, max_len: usize) -> Result<String, AdError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AdError::invalid(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(AdError::invalid(field, format!("must be at most {max_len} characters")));
    }
    Ok(trimmed.to_owned())
}

fn optional_text(field: &'static str, value: Option<&str>, max_len: usize) -> Result<Option<String>, AdError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required_text(field, v, max_len).map(Some),
    }
}

fn check_age(age: Option<i32>) -> Result<Option<i32>, AdError> {
    match age {
        Some(a) if !(MIN_AGE..=MAX_AGE).contains(&a) => {
            Err(AdError::invalid("age", format!("must be between {MIN_AGE} and {MAX_AGE}")))
        }
        other => Ok(other),
    }
}

fn check_images(images: Vec<String>) -> Result<Vec<String>, AdError> {
    if images.len() > MAX_IMAGES {
        return Err(AdError::invalid("images", format!("at most {MAX_IMAGES} images allowed")));
    }
    images
        .into_iter()
        .map(|url| {
            let url = url.trim().to_owned();
            if url.starts_with("https://") || url.starts_with("http://") {
                Ok(url)
            } else {
                Err(AdError::invalid("images", "each image must be an http(s) URL"))
            }
        })
        .collect()
}

impl AdCreate {
    /// Trim and bounds-check every field.
    ///
    /// # Errors
    ///
    /// Returns [`AdError::Invalid`] naming the first offending field.
    pub fn validate(self) -> Result<Self, AdError> {
        Ok(Self {
            title: required_text("title", &self.title, MAX_TITLE_LEN)?,
            description: required_text("description", &self.description, MAX_DESCRIPTION_LEN)?,
            category: required_text("category", &self.category, MAX_SHORT_FIELD_LEN)?,
            location: required_text("location", &self.location, MAX_SHORT_FIELD_LEN)?,
            age: check_age(self.age)?,
            contact_info: optional_text("contact_info", self.contact_info.as_deref(), MAX_SHORT_FIELD_LEN)?,
            images: check_images(self.images)?,
        })
    }
}

impl AdUpdate {
    /// Validate the fields that are present, leaving absent ones as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AdError::Invalid`] naming the first offending field.
    pub fn validate(self) -> Result<Self, AdError> {
        let required = |field, value: Option<String>, max_len| {
            value.map(|v| required_text(field, &v, max_len)).transpose()
        };
        Ok(Self {
            title: required("title", self.title, MAX_TITLE_LEN)?,
            description: required("description", self.description, MAX_DESCRIPTION_LEN)?,
            category: required("category", self.category, MAX_SHORT_FIELD_LEN)?,
            location: required("location", self.location, MAX_SHORT_FIELD_LEN)?,
            age: check_age(self.age)?,
            contact_info: optional_text("contact_info", self.contact_info.as_deref(), MAX_SHORT_FIELD_LEN)?,
            images: self.images.map(check_images).transpose()?,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.location.is_none()
            && self.age.is_none()
            && self.contact_info.is_none()
            && self.images.is_none()
    }
}

// =============================================================================
// CRUD
// =============================================================================

/// Create an ad owned by `user_id`.
///
/// # Errors
///
/// Returns a validation or database error.
pub async fn create_ad(pool: &PgPool, user_id: Uuid, input: AdCreate) -> Result<Ad, AdError> {
    let input = input.validate()?;
    let ad = sqlx::query_as::<_, Ad>(&format!(
        "INSERT INTO ads (user_id, title, description, category, location, age, contact_info, images)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {AD_COLUMNS}"
    ))
    .bind(user_id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.category)
    .bind(&input.location)
    .bind(input.age)
    .bind(&input.contact_info)
    .bind(&input.images)
    .fetch_one(pool)
    .await?;

    tracing::info!(ad_id = %ad.id, %user_id, category = %ad.category, "ad created");
    Ok(ad)
}

/// List ads, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_ads(pool: &PgPool, filter: &AdFilter) -> Result<Vec<Ad>, AdError> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {AD_COLUMNS} FROM ads WHERE TRUE"));
    if let Some(category) = &filter.category {
        qb.push(" AND lower(category) = lower(").push_bind(category.clone()).push(")");
    }
    if let Some(location) = &filter.location {
        qb.push(" AND lower(location) = lower(").push_bind(location.clone()).push(")");
    }
    qb.push(" ORDER BY created_at DESC, id DESC OFFSET ")
        .push_bind(filter.skip)
        .push(" LIMIT ")
        .push_bind(filter.limit);

    let ads = qb.build_query_as::<Ad>().fetch_all(pool).await?;
    Ok(ads)
}

/// Fetch one ad and count the view.
///
/// # Errors
///
/// Returns [`AdError::NotFound`] or a database error.
pub async fn view_ad(pool: &PgPool, ad_id: Uuid) -> Result<Ad, AdError> {
    sqlx::query_as::<_, Ad>(&format!("UPDATE ads SET views = views + 1 WHERE id = $1 RETURNING {AD_COLUMNS}"))
        .bind(ad_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AdError::NotFound(ad_id))
}

async fn fetch_ad(pool: &PgPool, ad_id: Uuid) -> Result<Ad, AdError> {
    sqlx::query_as::<_, Ad>(&format!("SELECT {AD_COLUMNS} FROM ads WHERE id = $1"))
        .bind(ad_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AdError::NotFound(ad_id))
}

async fn ensure_owner(pool: &PgPool, ad_id: Uuid, user_id: Uuid) -> Result<(), AdError> {
    let owner: Uuid = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM ads WHERE id = $1")
        .bind(ad_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AdError::NotFound(ad_id))?;
    if owner != user_id {
        return Err(AdError::Forbidden(ad_id));
    }
    Ok(())
}

/// Apply a partial update. Only the owner may update; non-owners are
/// refused before their payload is looked at.
///
/// # Errors
///
/// Returns [`AdError::NotFound`], [`AdError::Forbidden`], a validation error
/// or a database error.
pub async fn update_ad(pool: &PgPool, ad_id: Uuid, user_id: Uuid, update: AdUpdate) -> Result<Ad, AdError> {
    ensure_owner(pool, ad_id, user_id).await?;
    let update = update.validate()?;
    if update.is_empty() {
        return fetch_ad(pool, ad_id).await;
    }

    sqlx::query_as::<_, Ad>(&format!(
        "UPDATE ads SET
             title        = COALESCE($3, title),
             description  = COALESCE($4, description),
             category     = COALESCE($5, category),
             location     = COALESCE($6, location),
             age          = COALESCE($7, age),
             contact_info = COALESCE($8, contact_info),
             images       = COALESCE($9, images)
         WHERE id = $1 AND user_id = $2
         RETURNING {AD_COLUMNS}"
    ))
    .bind(ad_id)
    .bind(user_id)
    .bind(&update.title)
    .bind(&update.description)
    .bind(&update.category)
    .bind(&update.location)
    .bind(update.age)
    .bind(&update.contact_info)
    .bind(&update.images)
    .fetch_optional(pool)
    .await?
    .ok_or(AdError::NotFound(ad_id))
}

/// Delete an ad. Only the owner may delete.
///
/// # Errors
///
/// Returns [`AdError::NotFound`], [`AdError::Forbidden`] or a database error.
pub async fn delete_ad(pool: &PgPool, ad_id: Uuid, user_id: Uuid) -> Result<(), AdError> {
    ensure_owner(pool, ad_id, user_id).await?;
    let result = sqlx::query("DELETE FROM ads WHERE id = $1 AND user_id = $2")
        .bind(ad_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AdError::NotFound(ad_id));
    }
    tracing::info!(%ad_id, %user_id, "ad deleted");
    Ok(())
}

/// Mark an ad as approved. Admins only.
///
/// # Errors
///
/// Returns [`AdError::Forbidden`] for non-admins, [`AdError::NotFound`] or a
/// database error.
pub async fn approve_ad(pool: &PgPool, ad_id: Uuid, role: Role) -> Result<Ad, AdError> {
    if role != Role::Admin {
        return Err(AdError::Forbidden(ad_id));
    }
    let ad = sqlx::query_as::<_, Ad>(&format!("UPDATE ads SET approved = true WHERE id = $1 RETURNING {AD_COLUMNS}"))
        .bind(ad_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AdError::NotFound(ad_id))?;
    tracing::info!(%ad_id, "ad approved");
    Ok(ad)
}

#[cfg(test)]
#[path = "ad_test.rs"]
mod tests;
