//! CSV renderers for the report exports. Rendering is pure; the tracker
//! owns filesystem placement.

use crate::models::{BillingSummary, CommissionReport, DashboardReport, MonthBucket};

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn row(fields: &[String]) -> String {
    let mut line = fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn percent(value: f64) -> String {
    format!("{value:.1}")
}

/// Monthly dashboard sheet: a summary block followed by the weekly
/// breakdown and a TOTAL row over the month's buckets.
pub fn render_dashboard_csv(report: &DashboardReport) -> String {
    let metrics = &report.metrics;
    let mut out = String::new();
    out.push_str(&row(&["Metric".to_string(), "Value".to_string()]));
    out.push_str(&row(&["Month".to_string(), format!("{}-{:02}", report.year, report.month)]));
    out.push_str(&row(&["Weekly goal".to_string(), metrics.weekly_goal.to_string()]));
    out.push_str(&row(&["Monthly goal".to_string(), metrics.monthly_goal.to_string()]));
    out.push_str(&row(&["Total leads".to_string(), metrics.total_leads.to_string()]));
    out.push_str(&row(&["Scheduled".to_string(), metrics.scheduled.to_string()]));
    out.push_str(&row(&["Attended".to_string(), metrics.attended.to_string()]));
    out.push_str(&row(&["Cancelled".to_string(), metrics.cancelled.to_string()]));
    out.push_str(&row(&["No-show".to_string(), metrics.no_show.to_string()]));
    out.push_str(&row(&["Offers given".to_string(), metrics.offers_given.to_string()]));
    out.push_str(&row(&["Sales".to_string(), metrics.sales.to_string()]));
    out.push_str(&row(&["Revenue".to_string(), money(metrics.total_revenue)]));
    out.push_str(&row(&["Cash collected".to_string(), money(metrics.total_cash_collected)]));
    out.push_str(&row(&["Scheduled rate %".to_string(), percent(metrics.scheduled_rate)]));
    out.push_str(&row(&["Show rate %".to_string(), percent(metrics.show_rate)]));
    out.push_str(&row(&["Close rate %".to_string(), percent(metrics.close_rate)]));
    out.push('\n');

    out.push_str(&row(&[
        "Week".to_string(),
        "Start".to_string(),
        "End".to_string(),
        "Manual leads".to_string(),
        "Meta leads".to_string(),
        "Total leads".to_string(),
        "Goal".to_string(),
        "Goal %".to_string(),
    ]));
    for week in &report.weeks {
        out.push_str(&row(&[
            week.week.to_string(),
            week.week_start.to_string(),
            week.week_end.to_string(),
            week.manual_leads.to_string(),
            week.meta_leads.to_string(),
            week.total_leads.to_string(),
            week.goal.to_string(),
            percent(week.percentage),
        ]));
    }

    let manual: u32 = report.weeks.iter().map(|week| week.manual_leads).sum();
    let meta: u32 = report.weeks.iter().map(|week| week.meta_leads).sum();
    let total: u32 = report.weeks.iter().map(|week| week.total_leads).sum();
    let goal: u32 = report.weeks.iter().map(|week| week.goal).sum();
    let percentage = if goal > 0 {
        f64::from(total) / f64::from(goal) * 100.0
    } else {
        0.0
    };
    out.push_str(&row(&[
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        manual.to_string(),
        meta.to_string(),
        total.to_string(),
        goal.to_string(),
        percent(percentage),
    ]));
    out
}

pub fn render_commissions_csv(report: &CommissionReport) -> String {
    let mut out = String::new();
    out.push_str(&row(&["Metric".to_string(), "Value".to_string()]));
    out.push_str(&row(&["Total sales".to_string(), report.total_sales.to_string()]));
    out.push_str(&row(&["Total revenue".to_string(), money(report.total_revenue)]));
    out.push_str(&row(&["Total cash collected".to_string(), money(report.total_cash_collected)]));
    out.push_str(&row(&[
        "Setter commission (sales)".to_string(),
        money(report.setter_commission_from_sales),
    ]));
    out.push_str(&row(&[
        "Setter commission (cash)".to_string(),
        money(report.setter_commission_from_cash),
    ]));
    out.push_str(&row(&[
        "Closer commission (sales)".to_string(),
        money(report.closer_commission_from_sales),
    ]));
    out.push_str(&row(&[
        "Closer commission (cash)".to_string(),
        money(report.closer_commission_from_cash),
    ]));
    out.push('\n');

    out.push_str(&row(&[
        "Closer".to_string(),
        "Sales".to_string(),
        "Revenue".to_string(),
        "Cash collected".to_string(),
        "Commission (sales)".to_string(),
        "Commission (cash)".to_string(),
        "Total commission".to_string(),
    ]));
    for entry in &report.closer_breakdown {
        out.push_str(&row(&[
            entry.closer.clone(),
            entry.sales.to_string(),
            money(entry.revenue),
            money(entry.cash_collected),
            money(entry.commission_from_sales),
            money(entry.commission_from_cash),
            money(entry.total_commission),
        ]));
    }
    out
}

pub fn render_comparison_csv(buckets: &[MonthBucket]) -> String {
    let mut out = row(&[
        "Year".to_string(),
        "Month".to_string(),
        "Label".to_string(),
        "Manual leads".to_string(),
        "Meta leads".to_string(),
        "Sales".to_string(),
        "Revenue".to_string(),
        "Cash collected".to_string(),
    ]);
    for bucket in buckets {
        out.push_str(&row(&[
            bucket.year.to_string(),
            bucket.month.to_string(),
            bucket.label.clone(),
            bucket.manual_leads.to_string(),
            bucket.meta_leads.to_string(),
            bucket.sales.to_string(),
            money(bucket.revenue),
            money(bucket.cash_collected),
        ]));
    }
    out
}

pub fn render_billing_csv(summary: &BillingSummary) -> String {
    let mut out = String::new();
    out.push_str(&row(&["Metric".to_string(), "Value".to_string()]));
    out.push_str(&row(&["Total sales".to_string(), summary.total_sales.to_string()]));
    out.push_str(&row(&["Total revenue".to_string(), money(summary.total_revenue)]));
    out.push_str(&row(&["Total cash collected".to_string(), money(summary.total_cash_collected)]));
    out.push_str(&row(&["Pending payments".to_string(), money(summary.pending_payments)]));
    out.push_str(&row(&["Average sale value".to_string(), money(summary.average_sale_value)]));
    out.push_str(&row(&["Collection rate %".to_string(), percent(summary.collection_rate)]));
    out.push('\n');

    out.push_str(&row(&[
        "Payment method".to_string(),
        "Sales".to_string(),
        "Amount".to_string(),
    ]));
    for total in &summary.by_payment_method {
        out.push_str(&row(&[
            total.method.as_str().to_string(),
            total.count.to_string(),
            money(total.amount),
        ]));
    }
    out
}

pub(crate) fn sanitize_filename_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    let candidate: String = out.trim_matches('_').chars().take(120).collect();
    if candidate.is_empty() {
        "report".to_string()
    } else {
        candidate
    }
}
