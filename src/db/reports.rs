//! Database queries for reports.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::report::{self, ActiveModel, Column, Entity as Report};
use crate::error::{AppError, AppResult};
use crate::models::{DashboardSummary, Month, NgoReportSummary, ReportRecord};

use super::DbPool;

impl DbPool {
    /// Upsert a report by its natural key (ngo_id, month, year).
    ///
    /// A single atomic INSERT .. ON CONFLICT: on a key collision the existing
    /// row's attribute values are overwritten while id and created_at are
    /// left alone, so the original creation timestamp survives resubmission.
    pub async fn upsert_report(&self, record: &ReportRecord) -> AppResult<report::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            ngo_id: Set(record.ngo_id.clone()),
            ngo_name: Set(record.ngo_name()),
            month: Set(record.month.as_str().to_string()),
            year: Set(record.year),
            people_helped: Set(record.people_helped),
            events_conducted: Set(record.events_conducted),
            funds_utilized: Set(record.funds_utilized),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = Report::insert(model)
            .on_conflict(
                OnConflict::columns([Column::NgoId, Column::Month, Column::Year])
                    .update_columns([
                        Column::NgoName,
                        Column::PeopleHelped,
                        Column::EventsConducted,
                        Column::FundsUtilized,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to upsert report: {}", e)))?;

        Ok(result)
    }

    /// Get a report by its natural key.
    pub async fn get_report_by_natural_key(
        &self,
        ngo_id: &str,
        month: Month,
        year: i32,
    ) -> AppResult<Option<report::Model>> {
        let result = Report::find()
            .filter(Column::NgoId.eq(ngo_id))
            .filter(Column::Month.eq(month.as_str()))
            .filter(Column::Year.eq(year))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get report: {}", e)))?;

        Ok(result)
    }

    /// List reports, optionally filtered by month and/or year, newest first.
    pub async fn list_reports(
        &self,
        month: Option<Month>,
        year: Option<i32>,
    ) -> AppResult<Vec<report::Model>> {
        let mut select = Report::find();

        if let Some(month) = month {
            select = select.filter(Column::Month.eq(month.as_str()));
        }
        if let Some(year) = year {
            select = select.filter(Column::Year.eq(year));
        }

        let result = select
            .order_by_desc(Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list reports: {}", e)))?;

        Ok(result)
    }

    /// Aggregate one month's reports into dashboard totals plus a per-NGO
    /// breakdown. The list is returned whole; pagination is a client concern.
    pub async fn monthly_summary(&self, month: Month, year: i32) -> AppResult<DashboardSummary> {
        let reports = Report::find()
            .filter(Column::Month.eq(month.as_str()))
            .filter(Column::Year.eq(year))
            .order_by_asc(Column::NgoId)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query monthly reports: {}", e)))?;

        let total_people_helped = reports.iter().map(|r| i64::from(r.people_helped)).sum();
        let total_events_conducted = reports.iter().map(|r| i64::from(r.events_conducted)).sum();
        let total_funds_utilized = reports.iter().map(|r| r.funds_utilized).sum();

        let ngo_reports = reports
            .into_iter()
            .map(|r| NgoReportSummary {
                ngo_id: r.ngo_id,
                ngo_name: r.ngo_name,
                people_helped: r.people_helped,
                events_conducted: r.events_conducted,
                funds_utilized: r.funds_utilized,
            })
            .collect::<Vec<_>>();

        Ok(DashboardSummary {
            month,
            year,
            total_ngos_reporting: ngo_reports.len() as u64,
            total_people_helped,
            total_events_conducted,
            total_funds_utilized,
            ngo_reports,
        })
    }
}
