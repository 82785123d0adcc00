use crate::engine::period::monday_on_or_before;
use crate::errors::{AppError, AppResult};
use crate::models::{
    CallResult, FormType, LeadRecord, ListLeadsFilters, MeetingOutcome, MetaWeekRecord,
    PaymentMethod, ProjectRecord, SaveLeadPayload, SaveMetaWeekPayload, SaveProjectPayload,
};
use chrono::{Datelike, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!("schema.sql");

const DEFAULT_WEEKLY_GOAL: u32 = 50;

const LEAD_COLUMNS: &str = "id, project_id, first_name, last_name, form_type, entry_date, \
     contact_date, scheduled_call_date, meeting_outcome, result, sale_made, sale_amount, \
     cash_collected, payment_method, installment_count, initial_payment, setter, closer, \
     observations, created_at, updated_at";

#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| AppError::Io(error.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }

    // ─── Projects ───────────────────────────────────────────────────────────

    pub fn save_project(&self, payload: SaveProjectPayload) -> AppResult<ProjectRecord> {
        if payload.name.trim().is_empty() {
            return Err(AppError::Validation("project name must not be empty".to_string()));
        }
        let now = Utc::now();
        let weekly_goal = payload.weekly_goal.unwrap_or(DEFAULT_WEEKLY_GOAL);
        let conn = self.lock()?;

        let id = match payload.id {
            Some(id) => {
                let updated = conn.execute(
                    "UPDATE projects SET name = ?1, description = ?2, weekly_goal = ?3, updated_at = ?4
                     WHERE id = ?5",
                    params![payload.name, payload.description, weekly_goal, now.to_rfc3339(), id],
                )?;
                if updated == 0 {
                    return Err(AppError::NotFound(format!("Project {} not found", id)));
                }
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                conn.execute(
                    "INSERT INTO projects (id, name, description, weekly_goal, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        id,
                        payload.name,
                        payload.description,
                        weekly_goal,
                        now.to_rfc3339(),
                        now.to_rfc3339()
                    ],
                )?;
                id
            }
        };
        drop(conn);

        self.get_project(&id)?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))
    }

    pub fn get_project(&self, project_id: &str) -> AppResult<Option<ProjectRecord>> {
        let conn = self.lock()?;
        let project = conn
            .query_row(
                "SELECT id, name, description, weekly_goal, created_at, updated_at
                 FROM projects WHERE id = ?1",
                [project_id],
                map_project_row,
            )
            .optional()?;
        Ok(project)
    }

    pub fn list_projects(&self) -> AppResult<Vec<ProjectRecord>> {
        let conn = self.lock()?;
        let mut statement = conn.prepare(
            "SELECT id, name, description, weekly_goal, created_at, updated_at
             FROM projects ORDER BY created_at ASC",
        )?;
        let projects = statement
            .query_map([], map_project_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    pub fn delete_project(&self, project_id: &str) -> AppResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", [project_id])?;
        Ok(deleted > 0)
    }

    // ─── Leads ──────────────────────────────────────────────────────────────

    pub fn save_lead(&self, payload: SaveLeadPayload) -> AppResult<LeadRecord> {
        let now = Utc::now();
        let conn = self.lock()?;

        let id = match payload.id.clone() {
            Some(id) => {
                let updated = conn.execute(
                    "UPDATE leads SET
                       project_id = ?1, first_name = ?2, last_name = ?3, form_type = ?4,
                       entry_date = ?5, contact_date = ?6, scheduled_call_date = ?7,
                       meeting_outcome = ?8, result = ?9, sale_made = ?10, sale_amount = ?11,
                       cash_collected = ?12, payment_method = ?13, installment_count = ?14,
                       initial_payment = ?15, setter = ?16, closer = ?17, observations = ?18,
                       updated_at = ?19
                     WHERE id = ?20",
                    params![
                        payload.project_id,
                        payload.first_name,
                        payload.last_name,
                        payload.form_type.as_str(),
                        payload.entry_date,
                        payload.contact_date,
                        payload.scheduled_call_date,
                        payload.meeting_outcome.map(MeetingOutcome::as_str),
                        payload.result.map(CallResult::as_str),
                        payload.sale_made,
                        payload.sale_amount,
                        payload.cash_collected,
                        payload.payment_method.map(PaymentMethod::as_str),
                        payload.installment_count,
                        payload.initial_payment,
                        payload.setter,
                        payload.closer,
                        payload.observations,
                        now.to_rfc3339(),
                        id,
                    ],
                )?;
                if updated == 0 {
                    return Err(AppError::NotFound(format!("Lead {} not found", id)));
                }
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                conn.execute(
                    &format!(
                        "INSERT INTO leads ({LEAD_COLUMNS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                                 ?15, ?16, ?17, ?18, ?19, ?20, ?21)"
                    ),
                    params![
                        id,
                        payload.project_id,
                        payload.first_name,
                        payload.last_name,
                        payload.form_type.as_str(),
                        payload.entry_date,
                        payload.contact_date,
                        payload.scheduled_call_date,
                        payload.meeting_outcome.map(MeetingOutcome::as_str),
                        payload.result.map(CallResult::as_str),
                        payload.sale_made,
                        payload.sale_amount,
                        payload.cash_collected,
                        payload.payment_method.map(PaymentMethod::as_str),
                        payload.installment_count,
                        payload.initial_payment,
                        payload.setter,
                        payload.closer,
                        payload.observations,
                        now.to_rfc3339(),
                        now.to_rfc3339(),
                    ],
                )?;
                id
            }
        };
        drop(conn);

        self.get_lead(&id)?
            .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))
    }

    pub fn get_lead(&self, lead_id: &str) -> AppResult<Option<LeadRecord>> {
        let conn = self.lock()?;
        let lead = conn
            .query_row(
                &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"),
                [lead_id],
                map_lead_row,
            )
            .optional()?;
        Ok(lead)
    }

    pub fn delete_lead(&self, lead_id: &str) -> AppResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM leads WHERE id = ?1", [lead_id])?;
        Ok(deleted > 0)
    }

    /// Tenant-scoped lead listing, newest entry date first. With both
    /// `month` and `year` set this is the monthly view; otherwise the full
    /// list.
    pub fn list_leads(&self, project_id: &str, filters: &ListLeadsFilters) -> AppResult<Vec<LeadRecord>> {
        let mut query = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE project_id = ?");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(project_id.to_string())];

        if let (Some(month), Some(year)) = (filters.month, filters.year) {
            let (first_day, last_day) = crate::engine::period::month_bounds(month, year)
                .ok_or_else(|| AppError::Validation(format!("invalid month {}", month)))?;
            query.push_str(" AND entry_date >= ? AND entry_date <= ?");
            params_vec.push(Box::new(first_day));
            params_vec.push(Box::new(last_day));
        }
        if let Some(closer) = &filters.closer {
            query.push_str(" AND closer = ?");
            params_vec.push(Box::new(closer.clone()));
        }

        // LIMIT -1 is SQLite's "no limit".
        query.push_str(" ORDER BY entry_date DESC LIMIT ? OFFSET ?");
        params_vec.push(Box::new(filters.limit.map(i64::from).unwrap_or(-1)));
        params_vec.push(Box::new(i64::from(filters.offset.unwrap_or(0))));

        let conn = self.lock()?;
        let mut statement = conn.prepare(&query)?;
        let dyn_params: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|param| param.as_ref()).collect();
        let leads = statement
            .query_map(&dyn_params[..], map_lead_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(leads)
    }

    // ─── Meta weeks ─────────────────────────────────────────────────────────

    /// Persists a weekly ad-channel volume row. Any submitted date is
    /// normalized to the Monday of its week before storing; week number and
    /// year follow the ISO week of that Monday.
    pub fn save_meta_week(&self, payload: SaveMetaWeekPayload) -> AppResult<MetaWeekRecord> {
        let monday = monday_on_or_before(payload.week_date);
        let iso_week = monday.iso_week();
        let now = Utc::now();
        let conn = self.lock()?;

        let id = match payload.id {
            Some(id) => {
                let updated = conn.execute(
                    "UPDATE meta_weeks SET project_id = ?1, week_start_date = ?2, week_number = ?3,
                       year = ?4, leads_count = ?5, updated_at = ?6
                     WHERE id = ?7",
                    params![
                        payload.project_id,
                        monday,
                        iso_week.week(),
                        iso_week.year(),
                        payload.leads_count,
                        now.to_rfc3339(),
                        id,
                    ],
                )?;
                if updated == 0 {
                    return Err(AppError::NotFound(format!("Meta week {} not found", id)));
                }
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                conn.execute(
                    "INSERT INTO meta_weeks (id, project_id, week_start_date, week_number, year,
                       leads_count, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        id,
                        payload.project_id,
                        monday,
                        iso_week.week(),
                        iso_week.year(),
                        payload.leads_count,
                        now.to_rfc3339(),
                        now.to_rfc3339(),
                    ],
                )?;
                id
            }
        };

        let record = conn
            .query_row(
                "SELECT id, project_id, week_start_date, week_number, year, leads_count,
                   created_at, updated_at
                 FROM meta_weeks WHERE id = ?1",
                [&id],
                map_meta_week_row,
            )
            .optional()?;
        record.ok_or_else(|| AppError::NotFound(format!("Meta week {} not found", id)))
    }

    pub fn delete_meta_week(&self, meta_week_id: &str) -> AppResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM meta_weeks WHERE id = ?1", [meta_week_id])?;
        Ok(deleted > 0)
    }

    pub fn list_meta_weeks(&self, project_id: &str) -> AppResult<Vec<MetaWeekRecord>> {
        let conn = self.lock()?;
        let mut statement = conn.prepare(
            "SELECT id, project_id, week_start_date, week_number, year, leads_count,
               created_at, updated_at
             FROM meta_weeks WHERE project_id = ?1 ORDER BY week_start_date DESC",
        )?;
        let weeks = statement
            .query_map([project_id], map_meta_week_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(weeks)
    }
}

fn map_project_row(row: &Row<'_>) -> rusqlite::Result<ProjectRecord> {
    Ok(ProjectRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        weekly_goal: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn map_lead_row(row: &Row<'_>) -> rusqlite::Result<LeadRecord> {
    let form_type: String = row.get(4)?;
    Ok(LeadRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        form_type: FormType::parse(&form_type)
            .ok_or_else(|| bad_column(4, &form_type, "form type"))?,
        entry_date: row.get(5)?,
        contact_date: row.get(6)?,
        scheduled_call_date: row.get(7)?,
        meeting_outcome: parse_optional(row, 8, "meeting outcome", MeetingOutcome::parse)?,
        result: parse_optional(row, 9, "call result", CallResult::parse)?,
        sale_made: row.get(10)?,
        sale_amount: row.get(11)?,
        cash_collected: row.get(12)?,
        payment_method: parse_optional(row, 13, "payment method", PaymentMethod::parse)?,
        installment_count: row.get(14)?,
        initial_payment: row.get(15)?,
        setter: row.get(16)?,
        closer: row.get(17)?,
        observations: row.get(18)?,
        created_at: row.get(19)?,
        updated_at: row.get(20)?,
    })
}

fn map_meta_week_row(row: &Row<'_>) -> rusqlite::Result<MetaWeekRecord> {
    Ok(MetaWeekRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        week_start_date: row.get(2)?,
        week_number: row.get(3)?,
        year: row.get(4)?,
        leads_count: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn parse_optional<T>(
    row: &Row<'_>,
    index: usize,
    label: &str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(index)?;
    match raw {
        None => Ok(None),
        Some(value) => parse(&value)
            .map(Some)
            .ok_or_else(|| bad_column(index, &value, label)),
    }
}

fn bad_column(index: usize, value: &str, label: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        Type::Text,
        format!("unknown {label} {value:?}").into(),
    )
}
