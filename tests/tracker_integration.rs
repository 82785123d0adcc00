use chrono::NaiveDate;
use lead_ledger::models::{
    CallResult, FormType, MeetingOutcome, PaymentMethod, SaveLeadPayload, SaveMetaWeekPayload,
    SaveProjectPayload,
};
use lead_ledger::TrackerCore;
use std::sync::Arc;

fn core(dir: &tempfile::TempDir) -> Arc<TrackerCore> {
    TrackerCore::new(dir.path().to_path_buf()).expect("tracker core")
}

fn project(core: &TrackerCore, weekly_goal: u32) -> String {
    core.save_project(SaveProjectPayload {
        id: None,
        name: "Kickstart".to_string(),
        description: Some("coaching funnel".to_string()),
        weekly_goal: Some(weekly_goal),
    })
    .expect("project")
    .id
}

fn lead(project_id: &str, entry: &str) -> SaveLeadPayload {
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

fn sale(project_id: &str, entry: &str, closer: &str, amount: f64, cash: f64) -> SaveLeadPayload {
    SaveLeadPayload {
        scheduled_call_date: Some(entry.parse().expect("date")),
        meeting_outcome: Some(MeetingOutcome::Attended),
        result: Some(CallResult::Interested),
        sale_made: true,
        sale_amount: Some(amount),
        cash_collected: Some(cash),
        payment_method: Some(PaymentMethod::Cash),
        closer: Some(closer.to_string()),
        ..lead(project_id, entry)
    }
}

#[test]
fn march_dashboard_buckets_and_funnel() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = core(&dir);
    let project_id = project(&core, 50);

    // One lead in week 2 and one in week 3 of March 2025, plus a February
    // lead that must stay out of the month entirely.
    core.save_lead(lead(&project_id, "2025-03-04")).expect("lead");
    core.save_lead(lead(&project_id, "2025-03-12")).expect("lead");
    core.save_lead(lead(&project_id, "2025-02-27")).expect("lead");

    let report = core.dashboard(&project_id, 3, 2025).expect("dashboard");
    assert_eq!(report.metrics.total_leads, 2);
    assert_eq!(report.metrics.monthly_goal, 200);

    // March 2025 starts on a Saturday, so the first bucket opens on Monday
    // February 24th and the month spans six buckets.
    assert_eq!(report.weeks.len(), 6);
    assert_eq!(
        report.weeks[0].week_start,
        "2025-02-24".parse::<NaiveDate>().expect("date")
    );
    assert_eq!(report.weeks[0].manual_leads, 0);
    assert_eq!(report.weeks[1].manual_leads, 1);
    assert_eq!(report.weeks[2].manual_leads, 1);
    assert_eq!(report.weeks[1].percentage, 2.0);
}

#[test]
fn meta_week_dates_normalize_and_join_the_dashboard() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = core(&dir);
    let project_id = project(&core, 50);

    // Saved with a Wednesday; stored as Monday March 10th.
    let week = core
        .save_meta_week(SaveMetaWeekPayload {
            id: None,
            project_id: project_id.clone(),
            week_date: "2025-03-12".parse().expect("date"),
            leads_count: 35,
        })
        .expect("meta week");
    assert_eq!(
        week.week_start_date,
        "2025-03-10".parse::<NaiveDate>().expect("date")
    );

    let report = core.dashboard(&project_id, 3, 2025).expect("dashboard");
    assert_eq!(report.weeks[2].meta_leads, 35);
    assert_eq!(report.weeks[2].total_leads, 35);
    assert_eq!(report.weeks[2].percentage, 70.0);
}

#[test]
fn commission_and_billing_reports_agree_on_the_month() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = core(&dir);
    let project_id = project(&core, 50);

    core.save_lead(sale(&project_id, "2025-03-03", "Ana", 1000.0, 600.0))
        .expect("lead");
    core.save_lead(sale(&project_id, "2025-03-10", "Ben", 2000.0, 2000.0))
        .expect("lead");
    core.save_lead(lead(&project_id, "2025-03-11")).expect("lead");

    let commissions = core.commissions(&project_id, 3, 2025).expect("commissions");
    assert_eq!(commissions.total_sales, 2);
    assert_eq!(commissions.setter_commission_from_sales, 210.0);
    assert_eq!(commissions.closer_commission_from_cash, 208.0);
    assert_eq!(commissions.closer_breakdown.len(), 2);
    // Ben leads the breakdown on total commission.
    assert_eq!(commissions.closer_breakdown[0].closer, "Ben");

    let billing = core.billing(&project_id, 3, 2025).expect("billing");
    assert_eq!(billing.total_revenue, commissions.total_revenue);
    assert_eq!(billing.pending_payments, 400.0);
    assert_eq!(billing.average_sale_value, 1500.0);
    assert_eq!(billing.by_payment_method.len(), 1);
    assert_eq!(billing.by_payment_method[0].count, 2);
}

#[test]
fn comparison_window_trails_six_months() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = core(&dir);
    let project_id = project(&core, 50);

    core.save_lead(sale(&project_id, "2024-12-15", "Ana", 1500.0, 1500.0))
        .expect("lead");
    core.save_lead(lead(&project_id, "2025-03-02")).expect("lead");
    core.save_lead(lead(&project_id, "2024-08-01")).expect("lead");

    let buckets = core
        .comparison(&project_id, "2025-03-15".parse().expect("anchor"))
        .expect("comparison");
    assert_eq!(buckets.len(), 6);
    assert_eq!((buckets[0].year, buckets[0].month), (2024, 10));
    assert_eq!(buckets[2].label, "Dic");
    assert_eq!(buckets[2].sales, 1);
    assert_eq!(buckets[2].revenue, 1500.0);
    assert_eq!(buckets[5].manual_leads, 1);

    // The August lead predates the window.
    let placed: u32 = buckets.iter().map(|bucket| bucket.manual_leads).sum();
    assert_eq!(placed, 2);
}

#[test]
fn exports_land_under_the_data_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = core(&dir);
    let project_id = project(&core, 50);
    core.save_lead(sale(&project_id, "2025-03-03", "Ana", 1000.0, 600.0))
        .expect("lead");

    let response = core
        .export_dashboard(&project_id, 3, 2025, "csv")
        .expect("export");
    let path = std::path::Path::new(&response.path);
    assert!(path.starts_with(dir.path().join("exports")));
    let contents = std::fs::read_to_string(path).expect("export contents");
    assert!(contents.lines().any(|line| line.starts_with("TOTAL,")));

    let commissions = core
        .export_commissions(&project_id, 3, 2025, "json")
        .expect("export");
    let contents = std::fs::read_to_string(&commissions.path).expect("export contents");
    assert!(contents.contains("\"closerBreakdown\""));
    assert!(contents.contains("Ana"));

    let err = core
        .export_billing(&project_id, 3, 2025, "xlsx")
        .expect_err("unsupported format");
    assert!(err.to_string().contains("Unsupported export format"));
}

#[test]
fn deleting_a_project_cascades_to_its_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = core(&dir);
    let project_id = project(&core, 50);
    let saved = core
        .save_lead(lead(&project_id, "2025-03-04"))
        .expect("lead");

    let deleted = core.delete_project(&project_id).expect("delete");
    assert!(deleted.success);
    assert!(core.get_lead(&saved.id).expect("get lead").is_none());
}
