use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::auth::{CurrentUser, require_role};
use super::types::{ApproveReportRequest, CreateReportRequest, EstimateDto, EstimateParams, ReportDto};
use super::{ApiError, AppState, validation};
use crate::models::{EstimateQuery, NewReport, UserRole};

/// POST /reports
/// Submit a sale report. Starts unapproved and attributed to the caller.
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Json(payload): Json<CreateReportRequest>,
) -> Result<Json<ReportDto>, ApiError> {
    require_role(&current, &[UserRole::User, UserRole::Admin])?;

    validation::validate_make_model("Make", &payload.make)?;
    validation::validate_make_model("Model", &payload.model)?;
    validation::validate_year(payload.year)?;
    validation::validate_lat(payload.lat)?;
    validation::validate_lon(payload.lon)?;
    validation::validate_mileage(payload.mileage)?;
    validation::validate_price(payload.price)?;

    let fields = NewReport {
        price: payload.price,
        make: payload.make,
        model: payload.model,
        year: payload.year,
        lat: payload.lat,
        lon: payload.lon,
        mileage: payload.mileage,
    };

    let report = state.store().create_report(&fields, current.id).await?;
    Ok(Json(report.into()))
}

/// PATCH /reports/{id} (admin only)
/// Approve or reject a report.
pub async fn approve_report(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<ApproveReportRequest>,
) -> Result<Json<ReportDto>, ApiError> {
    require_role(&current, &[UserRole::Admin])?;
    let id = validation::validate_id(id)?;

    let report = state
        .store()
        .change_report_approval(id, payload.approved)
        .await?;

    Ok(Json(report.into()))
}

/// GET /reports
/// Estimate a resale price from approved reports.
pub async fn get_estimate(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Query(params): Query<EstimateParams>,
) -> Result<Json<EstimateDto>, ApiError> {
    require_role(&current, &[UserRole::User, UserRole::Admin])?;

    validation::validate_make_model("Make", &params.make)?;
    validation::validate_make_model("Model", &params.model)?;
    validation::validate_year(params.year)?;
    validation::validate_lat(params.lat)?;
    validation::validate_lon(params.lon)?;
    validation::validate_mileage(params.mileage)?;

    let query = EstimateQuery {
        make: params.make,
        model: params.model,
        year: params.year,
        lat: params.lat,
        lon: params.lon,
        mileage: params.mileage,
    };

    let price = state.store().estimate_price(&query).await?;
    Ok(Json(EstimateDto { price }))
}
