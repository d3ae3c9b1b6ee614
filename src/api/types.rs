use serde::{Deserialize, Serialize};

use crate::models::{Report, User, UserRole};

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub price: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub lat: i32,
    pub lon: i32,
    pub mileage: i32,
}

#[derive(Debug, Deserialize)]
pub struct ApproveReportRequest {
    pub approved: bool,
}

/// Estimate lookup parameters. Arrive as query-string values and are
/// coerced to integers during deserialization.
#[derive(Debug, Deserialize)]
pub struct EstimateParams {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub lat: i32,
    pub lon: i32,
    pub mileage: i32,
}

// ============================================================================
// Response types
// ============================================================================

/// User as serialized over the wire. The password hash never leaves the
/// service.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportDto {
    pub id: i32,
    pub price: i32,
    pub approved: bool,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub lat: i32,
    pub lon: i32,
    pub mileage: i32,
    pub user_id: i32,
}

impl From<Report> for ReportDto {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            price: report.price,
            approved: report.approved,
            make: report.make,
            model: report.model,
            year: report.year,
            lat: report.lat,
            lon: report.lon,
            mileage: report.mileage,
            user_id: report.user_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EstimateDto {
    pub price: Option<f64>,
}
