use chrono::{Datelike, NaiveDate};

use crate::models::{LeadRecord, MetaWeekRecord, MonthBucket};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

fn month_label(month: u32) -> String {
    MONTH_ABBREVIATIONS
        .get(month as usize - 1)
        .map(|label| (*label).to_string())
        .unwrap_or_default()
}

/// `months_back` calendar months before the anchor's month, as (year, month).
fn shift_back(anchor: NaiveDate, months_back: u32) -> (i32, u32) {
    let absolute = anchor.year() * 12 + anchor.month0() as i32 - months_back as i32;
    (absolute.div_euclid(12), absolute.rem_euclid(12) as u32 + 1)
}

/// Six-month trailing comparison, oldest bucket first. Leads land in the
/// bucket matching their `entry_date`'s (year, month); meta weeks match on
/// `week_start_date`. Records outside the window are silently dropped.
/// Sale figures only accumulate where `sale_made` is set.
pub fn rolling_months(
    leads: &[LeadRecord],
    meta_weeks: &[MetaWeekRecord],
    anchor: NaiveDate,
) -> Vec<MonthBucket> {
    let mut buckets: Vec<MonthBucket> = (0..6)
        .rev()
        .map(|months_back| {
            let (year, month) = shift_back(anchor, months_back);
            MonthBucket {
                year,
                month,
                label: month_label(month),
                manual_leads: 0,
                meta_leads: 0,
                sales: 0,
                revenue: 0.0,
                cash_collected: 0.0,
            }
        })
        .collect();

    for lead in leads {
        let key = (lead.entry_date.year(), lead.entry_date.month());
        let Some(bucket) = buckets
            .iter_mut()
            .find(|bucket| (bucket.year, bucket.month) == key)
        else {
            continue;
        };
        bucket.manual_leads += 1;
        if lead.sale_made {
            bucket.sales += 1;
            bucket.revenue += lead.sale_amount.unwrap_or(0.0);
            bucket.cash_collected += lead.cash_collected.unwrap_or(0.0);
        }
    }

    for week in meta_weeks {
        let key = (week.week_start_date.year(), week.week_start_date.month());
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|bucket| (bucket.year, bucket.month) == key)
        {
            bucket.meta_leads += week.leads_count;
        }
    }

    buckets
}
