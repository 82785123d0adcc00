use crate::models::{CallResult, FunnelMetrics, LeadRecord, MeetingOutcome};

/// Monthly goal is a fixed four-week multiple of the weekly goal, regardless
/// of how many week buckets the calendar actually produces. Deliberate
/// simplification carried over from the original system.
const WEEKS_PER_MONTH: u32 = 4;

fn rate(numerator: u32, denominator: u32) -> f64 {
    if denominator > 0 {
        f64::from(numerator) / f64::from(denominator) * 100.0
    } else {
        0.0
    }
}

/// Funnel counts, revenue totals and conversion rates for one month of
/// leads. Callers pass the output of `filter_by_month`; null amounts count
/// as zero and every rate resolves to exactly 0 on a zero denominator.
pub fn funnel_metrics(monthly_leads: &[LeadRecord], weekly_goal: u32) -> FunnelMetrics {
    let monthly_goal = weekly_goal * WEEKS_PER_MONTH;
    let total_leads = monthly_leads.len() as u32;
    let scheduled = monthly_leads
        .iter()
        .filter(|lead| lead.scheduled_call_date.is_some())
        .count() as u32;
    let attended = outcome_count(monthly_leads, MeetingOutcome::Attended);
    let cancelled = outcome_count(monthly_leads, MeetingOutcome::Cancelled);
    let no_show = outcome_count(monthly_leads, MeetingOutcome::NoShow);
    let offers_given = monthly_leads
        .iter()
        .filter(|lead| lead.result.is_some_and(|result| result != CallResult::Declined))
        .count() as u32;
    let sales = monthly_leads.iter().filter(|lead| lead.sale_made).count() as u32;
    let total_revenue: f64 = monthly_leads.iter().map(|lead| lead.sale_amount.unwrap_or(0.0)).sum();
    let total_cash_collected: f64 = monthly_leads
        .iter()
        .map(|lead| lead.cash_collected.unwrap_or(0.0))
        .sum();

    FunnelMetrics {
        weekly_goal,
        monthly_goal,
        total_leads,
        scheduled,
        attended,
        cancelled,
        no_show,
        offers_given,
        sales,
        total_revenue,
        total_cash_collected,
        scheduled_rate: rate(scheduled, monthly_goal),
        show_rate: rate(attended, scheduled),
        close_rate: rate(sales, scheduled),
    }
}

fn outcome_count(leads: &[LeadRecord], outcome: MeetingOutcome) -> u32 {
    leads
        .iter()
        .filter(|lead| lead.meeting_outcome == Some(outcome))
        .count() as u32
}
