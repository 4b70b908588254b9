//! Package endpoints: the catalog of templates and the packages students own.

use crate::{
    api::{
        AppState,
        auth::CurrentUser,
        response::{Envelope, success, success_empty},
    },
    core::{accounting, catalog, parse_date},
    entities::{course_package, student_course_package},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A purchased package joined with its catalog template.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageView {
    pub id: i64,
    pub student_id: i64,
    pub course_package_id: i64,
    /// Catalog template name, if the template still exists
    pub package_name: Option<String>,
    /// Catalog template size in hours
    pub total_hours: Option<f64>,
    pub used_hours: f64,
    pub remaining_hours: f64,
    pub purchase_date: NaiveDate,
    pub expire_date: Option<NaiveDate>,
    pub status: String,
    pub notes: Option<String>,
}

impl PackageView {
    fn new(
        package: student_course_package::Model,
        template: Option<course_package::Model>,
    ) -> Self {
        Self {
            id: package.id,
            student_id: package.student_id,
            course_package_id: package.course_package_id,
            package_name: template.as_ref().map(|row| row.name.clone()),
            total_hours: template.as_ref().map(|row| row.total_hours),
            used_hours: package.used_hours,
            remaining_hours: package.remaining_hours,
            purchase_date: package.purchase_date,
            expire_date: package.expire_date,
            status: package.status,
            notes: package.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StudentPackagesQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// `GET /api/students/{id}/packages?active_only=`
pub async fn get_student_packages(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(student_id): Path<i64>,
    Query(query): Query<StudentPackagesQuery>,
) -> Result<Json<Envelope<Vec<PackageView>>>> {
    let rows = accounting::get_student_packages(&state.db, student_id, query.active_only).await?;
    Ok(success(
        rows.into_iter()
            .map(|(package, template)| PackageView::new(package, template))
            .collect(),
    ))
}

/// `GET /api/packages/{id}`
pub async fn get_package(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(package_id): Path<i64>,
) -> Result<Json<Envelope<PackageView>>> {
    let package = accounting::get_package_by_id(&state.db, package_id)
        .await?
        .ok_or(Error::PackageNotFound { id: package_id })?;
    let template = catalog::get_catalog_package(&state.db, package.course_package_id).await?;
    Ok(success(PackageView::new(package, template)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPackageRequest {
    pub student_id: i64,
    pub course_package_id: i64,
    /// `YYYY-MM-DD`, defaults to today
    pub purchase_date: Option<String>,
    /// `YYYY-MM-DD`
    pub expire_date: Option<String>,
    pub notes: Option<String>,
}

/// `POST /api/packages/add`
pub async fn add_package(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(request): Json<AddPackageRequest>,
) -> Result<Json<Envelope<PackageView>>> {
    let purchase_date = parse_given_date(request.purchase_date)?;
    let expire_date = parse_given_date(request.expire_date)?;

    let package = accounting::create_package(
        &state.db,
        request.student_id,
        request.course_package_id,
        purchase_date,
        expire_date,
        request.notes,
    )
    .await?;
    tracing::info!(
        student_id = request.student_id,
        package_id = package.id,
        "package sold"
    );

    let template = catalog::get_catalog_package(&state.db, package.course_package_id).await?;
    Ok(success(PackageView::new(package, template)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePackageRequest {
    pub used_hours: Option<f64>,
    /// `YYYY-MM-DD`
    pub purchase_date: Option<String>,
    /// `YYYY-MM-DD`; an empty string clears the expiry
    pub expire_date: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// `PUT /api/packages/{id}`
pub async fn update_package(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(package_id): Path<i64>,
    Json(request): Json<UpdatePackageRequest>,
) -> Result<Json<Envelope<PackageView>>> {
    let expire_date = match request.expire_date {
        None => None,
        Some(raw) if raw.is_empty() => Some(None),
        Some(raw) => Some(Some(parse_date(&raw)?)),
    };

    let package = accounting::update_package(
        &state.db,
        package_id,
        accounting::PackageChanges {
            used_hours: request.used_hours,
            purchase_date: parse_given_date(request.purchase_date)?,
            expire_date,
            status: request.status,
            notes: request.notes,
        },
    )
    .await?;

    let template = catalog::get_catalog_package(&state.db, package.course_package_id).await?;
    Ok(success(PackageView::new(package, template)))
}

/// `DELETE /api/packages/{id}`
pub async fn delete_package(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(package_id): Path<i64>,
) -> Result<Json<Envelope<()>>> {
    accounting::delete_package(&state.db, package_id).await?;
    tracing::info!(package_id, "package deleted");
    Ok(success_empty())
}

/// Catalog template fields exposed over the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPackageView {
    pub id: i64,
    pub name: String,
    pub total_hours: f64,
    pub status: String,
    pub notes: Option<String>,
}

impl From<course_package::Model> for CatalogPackageView {
    fn from(row: course_package::Model) -> Self {
        Self {
            id: row.id,
            name: row.name,
            total_hours: row.total_hours,
            status: row.status,
            notes: row.notes,
        }
    }
}

/// `GET /api/catalog-packages`
pub async fn list_catalog_packages(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Result<Json<Envelope<Vec<CatalogPackageView>>>> {
    let rows = catalog::list_catalog_packages(&state.db).await?;
    Ok(success(
        rows.into_iter().map(CatalogPackageView::from).collect(),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCatalogPackageRequest {
    pub name: String,
    pub total_hours: f64,
    pub notes: Option<String>,
}

/// `POST /api/catalog-packages/add`
pub async fn add_catalog_package(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(request): Json<AddCatalogPackageRequest>,
) -> Result<Json<Envelope<CatalogPackageView>>> {
    let row = catalog::create_catalog_package(
        &state.db,
        request.name,
        request.total_hours,
        request.notes,
    )
    .await?;
    Ok(success(CatalogPackageView::from(row)))
}

fn parse_given_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_date(&raw))
        .transpose()
}
