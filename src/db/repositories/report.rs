use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use thiserror::Error;
use tracing::info;

use crate::entities::reports;
use crate::models::report::NewReport;
use crate::models::{EstimateQuery, Report};

/// Tolerance windows for the estimate candidate filter.
const COORD_TOLERANCE: i32 = 5;
const YEAR_TOLERANCE: i32 = 3;

/// At most this many candidates are averaged per estimate.
const ESTIMATE_SAMPLE_SIZE: u64 = 3;

#[derive(Debug, Error)]
pub enum ReportStoreError {
    #[error("Report not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct ReportRepository {
    conn: DatabaseConnection,
}

impl ReportRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: reports::Model) -> Report {
        Report {
            id: model.id,
            price: model.price,
            approved: model.approved,
            make: model.make,
            model: model.model,
            year: model.year,
            lat: model.lat,
            lon: model.lon,
            mileage: model.mileage,
            user_id: model.user_id,
        }
    }

    /// Persist a new report for `user_id`. Reports always start unapproved.
    pub async fn create(
        &self,
        fields: &NewReport,
        user_id: i32,
    ) -> Result<Report, ReportStoreError> {
        let model = reports::ActiveModel {
            price: Set(fields.price),
            approved: Set(false),
            make: Set(fields.make.clone()),
            model: Set(fields.model.clone()),
            year: Set(fields.year),
            lat: Set(fields.lat),
            lon: Set(fields.lon),
            mileage: Set(fields.mileage),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        info!("Report {} submitted by user {}", model.id, user_id);
        Ok(Self::map_model(model))
    }

    /// Flip the approval flag. The only mutation a report ever sees.
    pub async fn change_approval(
        &self,
        id: i32,
        approved: bool,
    ) -> Result<Report, ReportStoreError> {
        let row = reports::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(ReportStoreError::NotFound)?;

        let mut active: reports::ActiveModel = row.into();
        active.approved = Set(approved);

        let updated = active.update(&self.conn).await?;
        info!("Report {} approval set to {}", updated.id, updated.approved);
        Ok(Self::map_model(updated))
    }

    /// Average price over up to three approved reports matching make/model
    /// exactly, lat/lon within ±5, year within ±3.
    ///
    /// Candidates are ordered by `ABS(mileage - ?)` descending before the
    /// cap, so the farthest-mileage matches win the three slots.
    // TODO: confirm whether the mileage ordering should be ascending;
    // descending biases the average toward mileage outliers inside the
    // tolerance band.
    pub async fn estimate(&self, query: &EstimateQuery) -> Result<Option<f64>, ReportStoreError> {
        let candidates = reports::Entity::find()
            .filter(reports::Column::Make.eq(&query.make))
            .filter(reports::Column::Model.eq(&query.model))
            .filter(reports::Column::Approved.eq(true))
            .filter(
                reports::Column::Lat
                    .between(query.lat - COORD_TOLERANCE, query.lat + COORD_TOLERANCE),
            )
            .filter(
                reports::Column::Lon
                    .between(query.lon - COORD_TOLERANCE, query.lon + COORD_TOLERANCE),
            )
            .filter(
                reports::Column::Year
                    .between(query.year - YEAR_TOLERANCE, query.year + YEAR_TOLERANCE),
            )
            .order_by_desc(Expr::cust_with_values("ABS(mileage - ?)", [query.mileage]))
            .limit(ESTIMATE_SAMPLE_SIZE)
            .all(&self.conn)
            .await?;

        if candidates.is_empty() {
            return Ok(None);
        }

        let sum: i64 = candidates.iter().map(|r| i64::from(r.price)).sum();
        #[allow(clippy::cast_precision_loss)]
        Ok(Some(sum as f64 / candidates.len() as f64))
    }
}
