use crate::api::export::events_to_csv;
use crate::api::rest::{first_query_value, ApiResult, AppState};
use crate::api::views::{self, AdminPage};
use crate::db::models::OpenFilter;
use crate::error::Error;
use crate::security::auth::AdminAccess;
use axum::extract::{RawQuery, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use log::info;

/// Optional subject filter shared by the admin routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectParams {
    pub id: Option<String>,
}

impl SubjectParams {
    /// The first `id` wins when the key is repeated
    pub fn from_query(query: Option<&str>) -> Self {
        Self {
            id: first_query_value(query, "id"),
        }
    }

    /// Empty filter means no filter
    fn filter(&self) -> Option<String> {
        self.id.clone().filter(|id| !id.is_empty())
    }
}

/// Create admin router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(list_opens))
        .route("/admin/download", get(download_opens))
        .route("/admin/clear", get(clear_opens))
        .route("/admin/delete", get(delete_subject))
}

/// Latest events as an HTML table
pub async fn list_opens(
    admin: AdminAccess,
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Html<String>> {
    let filter = SubjectParams::from_query(query.as_deref()).filter();

    let events = state
        .opens_repo
        .list(&OpenFilter::interactive(filter.clone()))
        .await?;
    let total = state.opens_repo.count(filter.as_deref()).await?;

    Ok(Html(views::admin_page(&AdminPage {
        token: &admin.token,
        filter: filter.as_deref(),
        events: &events,
        total,
    })))
}

/// Every matching event as a CSV attachment
pub async fn download_opens(
    _admin: AdminAccess,
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<impl IntoResponse> {
    let events = state
        .opens_repo
        .list(&OpenFilter::export(
            SubjectParams::from_query(query.as_deref()).filter(),
        ))
        .await?;
    let body = events_to_csv(&events)?;

    info!("Exported {} open events as CSV", events.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=opens.csv"),
        ],
        body,
    ))
}

/// Purge the whole event log
pub async fn clear_opens(
    admin: AdminAccess,
    State(state): State<AppState>,
) -> ApiResult<Html<String>> {
    let deleted = state.opens_repo.delete(None).await?;

    info!("Cleared all open events ({} rows)", deleted);

    Ok(Html(views::confirmation_page(
        &format!("Deleted all {} records.", deleted),
        &admin.token,
    )))
}

/// Delete every event of one subject; `id` is required
pub async fn delete_subject(
    admin: AdminAccess,
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Html<String>> {
    let subject_id = SubjectParams::from_query(query.as_deref())
        .id
        .ok_or_else(|| Error::BadRequest("Missing id parameter".to_string()))?;

    let deleted = state.opens_repo.delete(Some(subject_id.as_str())).await?;

    info!("Deleted {} open events for subject {:?}", deleted, subject_id);

    Ok(Html(views::confirmation_page(
        &format!("Deleted {} records for id {}.", deleted, subject_id),
        &admin.token,
    )))
}
