use crate::db::Database;
use crate::engine;
use crate::errors::{AppError, AppResult};
use crate::export;
use crate::models::{
    BillingSummary, BooleanResponse, CommissionReport, DashboardReport, ExportResponse,
    LeadCommissions, LeadRecord, ListLeadsFilters, MetaWeekRecord, MonthBucket, ProjectRecord,
    SaveLeadPayload, SaveMetaWeekPayload, SaveProjectPayload,
};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;

/// Facade over the record store and the reporting engine. One instance per
/// data directory; cheap to share behind an `Arc`.
pub struct TrackerCore {
    db: Database,
    app_data_dir: PathBuf,
}

impl TrackerCore {
    pub fn new(app_data_dir: PathBuf) -> AppResult<Arc<Self>> {
        std::fs::create_dir_all(&app_data_dir).map_err(|error| AppError::Io(error.to_string()))?;
        let db = Database::new(&app_data_dir.join("tracker.db"))?;
        Ok(Arc::new(Self { db, app_data_dir }))
    }

    // ─── Projects ───────────────────────────────────────────────────────────

    pub fn save_project(&self, payload: SaveProjectPayload) -> AppResult<ProjectRecord> {
        let project = self.db.save_project(payload)?;
        tracing::info!(project_id = %project.id, "project saved");
        Ok(project)
    }

    pub fn get_project(&self, project_id: &str) -> AppResult<Option<ProjectRecord>> {
        self.db.get_project(project_id)
    }

    pub fn list_projects(&self) -> AppResult<Vec<ProjectRecord>> {
        self.db.list_projects()
    }

    pub fn delete_project(&self, project_id: &str) -> AppResult<BooleanResponse> {
        let success = self.db.delete_project(project_id)?;
        if !success {
            tracing::warn!(project_id, "delete requested for unknown project");
        }
        Ok(BooleanResponse { success })
    }

    // ─── Leads ──────────────────────────────────────────────────────────────

    pub fn save_lead(&self, payload: SaveLeadPayload) -> AppResult<LeadRecord> {
        self.require_project(&payload.project_id)?;
        let lead = self.db.save_lead(payload)?;
        tracing::info!(lead_id = %lead.id, project_id = %lead.project_id, "lead saved");
        Ok(lead)
    }

    pub fn get_lead(&self, lead_id: &str) -> AppResult<Option<LeadRecord>> {
        self.db.get_lead(lead_id)
    }

    pub fn delete_lead(&self, lead_id: &str) -> AppResult<BooleanResponse> {
        let success = self.db.delete_lead(lead_id)?;
        Ok(BooleanResponse { success })
    }

    pub fn list_leads(
        &self,
        project_id: &str,
        filters: &ListLeadsFilters,
    ) -> AppResult<Vec<LeadRecord>> {
        if let Some(month) = filters.month {
            validate_month(month)?;
        }
        self.db.list_leads(project_id, filters)
    }

    /// Leads whose entry date falls in the inclusive range, for drilling
    /// through from a week row or comparison bar.
    pub fn leads_between(
        &self,
        project_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LeadRecord>> {
        if end < start {
            return Err(AppError::Validation(
                "range end must not precede range start".to_string(),
            ));
        }
        let leads = self.db.list_leads(project_id, &ListLeadsFilters::default())?;
        Ok(engine::leads_in_range(&leads, start, end))
    }

    pub fn lead_commissions(&self, lead_id: &str) -> AppResult<LeadCommissions> {
        let lead = self
            .db
            .get_lead(lead_id)?
            .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", lead_id)))?;
        Ok(engine::lead_commissions(&lead))
    }

    // ─── Meta weeks ─────────────────────────────────────────────────────────

    pub fn save_meta_week(&self, payload: SaveMetaWeekPayload) -> AppResult<MetaWeekRecord> {
        self.require_project(&payload.project_id)?;
        let week = self.db.save_meta_week(payload)?;
        tracing::info!(
            meta_week_id = %week.id,
            week_start = %week.week_start_date,
            "meta week saved"
        );
        Ok(week)
    }

    pub fn delete_meta_week(&self, meta_week_id: &str) -> AppResult<BooleanResponse> {
        let success = self.db.delete_meta_week(meta_week_id)?;
        Ok(BooleanResponse { success })
    }

    pub fn list_meta_weeks(&self, project_id: &str) -> AppResult<Vec<MetaWeekRecord>> {
        self.db.list_meta_weeks(project_id)
    }

    // ─── Reports ────────────────────────────────────────────────────────────

    /// Monthly funnel metrics plus the weekly breakdown. Meta weeks are
    /// passed in full; the bucketer decides which land inside the month's
    /// week ranges.
    pub fn dashboard(&self, project_id: &str, month: u32, year: i32) -> AppResult<DashboardReport> {
        validate_month(month)?;
        let project = self.require_project(project_id)?;
        let monthly_leads = self.monthly_leads(project_id, month, year)?;
        let meta_weeks = self.db.list_meta_weeks(project_id)?;

        Ok(DashboardReport {
            month,
            year,
            metrics: engine::funnel_metrics(&monthly_leads, project.weekly_goal),
            weeks: engine::bucket_into_weeks(
                &monthly_leads,
                &meta_weeks,
                month,
                year,
                project.weekly_goal,
            ),
        })
    }

    pub fn commissions(&self, project_id: &str, month: u32, year: i32) -> AppResult<CommissionReport> {
        validate_month(month)?;
        self.require_project(project_id)?;
        let monthly_leads = self.monthly_leads(project_id, month, year)?;
        Ok(engine::commission_report(&monthly_leads))
    }

    pub fn billing(&self, project_id: &str, month: u32, year: i32) -> AppResult<BillingSummary> {
        validate_month(month)?;
        self.require_project(project_id)?;
        let monthly_leads = self.monthly_leads(project_id, month, year)?;
        Ok(engine::billing_summary(&monthly_leads))
    }

    /// Six trailing calendar months ending at the anchor's month, oldest
    /// first.
    pub fn comparison(&self, project_id: &str, anchor: NaiveDate) -> AppResult<Vec<MonthBucket>> {
        self.require_project(project_id)?;
        let leads = self.db.list_leads(project_id, &ListLeadsFilters::default())?;
        let meta_weeks = self.db.list_meta_weeks(project_id)?;
        Ok(engine::rolling_months(&leads, &meta_weeks, anchor))
    }

    // ─── Exports ────────────────────────────────────────────────────────────

    pub fn export_dashboard(
        &self,
        project_id: &str,
        month: u32,
        year: i32,
        format: &str,
    ) -> AppResult<ExportResponse> {
        let report = self.dashboard(project_id, month, year)?;
        let contents = match format {
            "csv" => export::render_dashboard_csv(&report),
            "json" => serde_json::to_string_pretty(&report)?,
            _ => return Err(AppError::Io(format!("Unsupported export format {}", format))),
        };
        self.write_export(
            &format!("dashboard-{project_id}-{year}-{month:02}"),
            format,
            &contents,
        )
    }

    pub fn export_commissions(
        &self,
        project_id: &str,
        month: u32,
        year: i32,
        format: &str,
    ) -> AppResult<ExportResponse> {
        let report = self.commissions(project_id, month, year)?;
        let contents = match format {
            "csv" => export::render_commissions_csv(&report),
            "json" => serde_json::to_string_pretty(&report)?,
            _ => return Err(AppError::Io(format!("Unsupported export format {}", format))),
        };
        self.write_export(
            &format!("commissions-{project_id}-{year}-{month:02}"),
            format,
            &contents,
        )
    }

    pub fn export_billing(
        &self,
        project_id: &str,
        month: u32,
        year: i32,
        format: &str,
    ) -> AppResult<ExportResponse> {
        let summary = self.billing(project_id, month, year)?;
        let contents = match format {
            "csv" => export::render_billing_csv(&summary),
            "json" => serde_json::to_string_pretty(&summary)?,
            _ => return Err(AppError::Io(format!("Unsupported export format {}", format))),
        };
        self.write_export(
            &format!("billing-{project_id}-{year}-{month:02}"),
            format,
            &contents,
        )
    }

    pub fn export_comparison(
        &self,
        project_id: &str,
        anchor: NaiveDate,
        format: &str,
    ) -> AppResult<ExportResponse> {
        let buckets = self.comparison(project_id, anchor)?;
        let contents = match format {
            "csv" => export::render_comparison_csv(&buckets),
            "json" => serde_json::to_string_pretty(&buckets)?,
            _ => return Err(AppError::Io(format!("Unsupported export format {}", format))),
        };
        self.write_export(&format!("comparison-{project_id}-{anchor}"), format, &contents)
    }

    fn write_export(&self, name: &str, extension: &str, contents: &str) -> AppResult<ExportResponse> {
        let export_dir = self.app_data_dir.join("exports");
        std::fs::create_dir_all(&export_dir).map_err(|error| AppError::Io(error.to_string()))?;

        let safe_name = export::sanitize_filename_component(name);
        let output_path = export_dir.join(format!("{}.{}", safe_name, extension));
        if !output_path.starts_with(&export_dir) {
            return Err(AppError::Io("Resolved export path escaped export directory".to_string()));
        }
        std::fs::write(&output_path, contents).map_err(|error| AppError::Io(error.to_string()))?;
        tracing::info!(path = %output_path.display(), "report exported");
        Ok(ExportResponse {
            path: output_path.to_string_lossy().to_string(),
        })
    }

    // ─── Helpers ────────────────────────────────────────────────────────────

    fn monthly_leads(&self, project_id: &str, month: u32, year: i32) -> AppResult<Vec<LeadRecord>> {
        self.db.list_leads(
            project_id,
            &ListLeadsFilters {
                month: Some(month),
                year: Some(year),
                ..ListLeadsFilters::default()
            },
        )
    }

    fn require_project(&self, project_id: &str) -> AppResult<ProjectRecord> {
        self.db
            .get_project(project_id)?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", project_id)))
    }
}

fn validate_month(month: u32) -> AppResult<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "month must be between 1 and 12, got {}",
            month
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::TrackerCore;
    use crate::models::{FormType, SaveLeadPayload, SaveProjectPayload};

    fn payload(project_id: &str, entry: &str) -> SaveLeadPayload {
        SaveLeadPayload {
            id: None,
            project_id: project_id.to_string(),
            first_name: "Ana".to_string(),
            last_name: "García".to_string(),
            form_type: FormType::Guide,
            entry_date: entry.parse().expect("entry date"),
            contact_date: None,
            scheduled_call_date: None,
            meeting_outcome: None,
            result: None,
            sale_made: false,
            sale_amount: None,
            cash_collected: None,
            payment_method: None,
            installment_count: None,
            initial_payment: None,
            setter: None,
            closer: None,
            observations: None,
        }
    }

    #[test]
    fn month_out_of_range_is_a_validation_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = TrackerCore::new(dir.path().to_path_buf()).expect("core");
        let project = core
            .save_project(SaveProjectPayload {
                id: None,
                name: "Kickstart".to_string(),
                description: None,
                weekly_goal: None,
            })
            .expect("project");

        let err = core.dashboard(&project.id, 0, 2025).expect_err("invalid month");
        assert!(err.to_string().starts_with("VALIDATION"));
        let err = core.dashboard(&project.id, 13, 2025).expect_err("invalid month");
        assert!(err.to_string().starts_with("VALIDATION"));
    }

    #[test]
    fn saving_a_lead_for_an_unknown_project_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = TrackerCore::new(dir.path().to_path_buf()).expect("core");
        let err = core
            .save_lead(payload("missing-project", "2025-03-01"))
            .expect_err("unknown project");
        assert!(err.to_string().starts_with("NOT_FOUND"));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = TrackerCore::new(dir.path().to_path_buf()).expect("core");
        let project = core
            .save_project(SaveProjectPayload {
                id: None,
                name: "Kickstart".to_string(),
                description: None,
                weekly_goal: None,
            })
            .expect("project");
        let err = core
            .leads_between(
                &project.id,
                "2025-03-10".parse().expect("date"),
                "2025-03-01".parse().expect("date"),
            )
            .expect_err("reversed range");
        assert!(err.to_string().starts_with("VALIDATION"));
    }
}
