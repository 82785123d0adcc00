use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{LeadRecord, MetaWeekRecord, WeekBucket};

/// Monday of the week containing `date` (the date itself when it already is
/// a Monday).
pub fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First and last day of the given calendar month, or `None` for an invalid
/// month number.
pub fn month_bounds(month: u32, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first - Duration::days(1)))
}

/// Leads whose `entry_date` falls in the given calendar month. The entry
/// date is the sole partition key for every monthly and weekly view; no
/// other date field on the lead participates in bucketing.
pub fn filter_by_month(leads: &[LeadRecord], month: u32, year: i32) -> Vec<LeadRecord> {
    leads
        .iter()
        .filter(|lead| lead.entry_date.month() == month && lead.entry_date.year() == year)
        .cloned()
        .collect()
}

/// Inclusive entry-date range filter, used when drilling through from a bar
/// or week row to the underlying leads.
pub fn leads_in_range(leads: &[LeadRecord], start: NaiveDate, end: NaiveDate) -> Vec<LeadRecord> {
    leads
        .iter()
        .filter(|lead| lead.entry_date >= start && lead.entry_date <= end)
        .cloned()
        .collect()
}

/// Splits a month into consecutive 7-day buckets starting at the Monday on
/// or before the 1st, stopping once a bucket would begin past the month's
/// last day. Depending on calendar alignment this yields 4 to 6 buckets;
/// short months are never padded.
///
/// Manual leads are counted from the month's own leads, so a first bucket
/// that starts in the previous month cannot pull in foreign leads. Meta
/// weeks count wherever their Monday lands inside a bucket's range.
pub fn bucket_into_weeks(
    leads: &[LeadRecord],
    meta_weeks: &[MetaWeekRecord],
    month: u32,
    year: i32,
    weekly_goal: u32,
) -> Vec<WeekBucket> {
    let Some((first_day, last_day)) = month_bounds(month, year) else {
        return Vec::new();
    };
    let monthly_leads = filter_by_month(leads, month, year);
    let monday = monday_on_or_before(first_day);

    let mut buckets = Vec::new();
    for i in 0..6u32 {
        let week_start = monday + Duration::days(i64::from(i) * 7);
        if week_start > last_day {
            break;
        }
        let week_end = week_start + Duration::days(6);

        let manual_leads = monthly_leads
            .iter()
            .filter(|lead| lead.entry_date >= week_start && lead.entry_date <= week_end)
            .count() as u32;
        let meta_leads = meta_weeks
            .iter()
            .filter(|week| week.week_start_date >= week_start && week.week_start_date <= week_end)
            .map(|week| week.leads_count)
            .sum::<u32>();
        let total_leads = manual_leads + meta_leads;
        let percentage = if weekly_goal > 0 {
            f64::from(total_leads) / f64::from(weekly_goal) * 100.0
        } else {
            0.0
        };

        buckets.push(WeekBucket {
            week: i + 1,
            week_start,
            week_end,
            manual_leads,
            meta_leads,
            total_leads,
            goal: weekly_goal,
            percentage,
        });
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::{bucket_into_weeks, filter_by_month, leads_in_range, monday_on_or_before, month_bounds};
    use crate::engine::testutil::{lead, meta_week};
    use chrono::NaiveDate;

    #[test]
    fn monday_is_identity_on_mondays() {
        let monday: NaiveDate = "2025-03-03".parse().expect("date");
        assert_eq!(monday_on_or_before(monday), monday);
        let sunday: NaiveDate = "2025-03-09".parse().expect("date");
        assert_eq!(monday_on_or_before(sunday), monday);
    }

    #[test]
    fn month_bounds_handle_december() {
        let (first, last) = month_bounds(12, 2025).expect("bounds");
        assert_eq!(first, "2025-12-01".parse::<NaiveDate>().expect("date"));
        assert_eq!(last, "2025-12-31".parse::<NaiveDate>().expect("date"));
        assert!(month_bounds(13, 2025).is_none());
    }

    #[test]
    fn filter_by_month_uses_entry_date_only() {
        let leads = vec![lead("2025-03-03"), lead("2025-03-31"), lead("2025-04-01")];
        let filtered = filter_by_month(&leads, 3, 2025);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn week_buckets_cover_the_scenario_month() {
        // March 2025: the 1st is a Saturday, so the first bucket starts on
        // Monday Feb 24 and March needs 6 buckets to reach the 31st.
        let leads = vec![lead("2025-03-03"), lead("2025-03-10")];
        let buckets = bucket_into_weeks(&leads, &[], 3, 2025, 50);
        assert_eq!(buckets.len(), 6);
        assert_eq!(buckets[0].week_start, "2025-02-24".parse::<NaiveDate>().expect("date"));
        assert_eq!(buckets[1].manual_leads, 1); // Mar 3-9
        assert_eq!(buckets[2].manual_leads, 1); // Mar 10-16
        assert_eq!(buckets[1].percentage, 2.0);
    }

    #[test]
    fn no_lead_is_dropped_or_double_counted_across_buckets() {
        let leads = vec![
            lead("2025-03-01"),
            lead("2025-03-02"),
            lead("2025-03-15"),
            lead("2025-03-31"),
            lead("2025-04-02"),
        ];
        let buckets = bucket_into_weeks(&leads, &[], 3, 2025, 50);
        let bucketed: u32 = buckets.iter().map(|week| week.manual_leads).sum();
        assert_eq!(bucketed as usize, filter_by_month(&leads, 3, 2025).len());
    }

    #[test]
    fn meta_weeks_sum_into_their_bucket() {
        let buckets = bucket_into_weeks(&[], &[meta_week("2025-03-03", 12), meta_week("2025-03-10", 5)], 3, 2025, 10);
        assert_eq!(buckets[1].meta_leads, 12);
        assert_eq!(buckets[2].meta_leads, 5);
        assert_eq!(buckets[1].total_leads, 12);
        assert_eq!(buckets[1].percentage, 120.0);
    }

    #[test]
    fn zero_goal_yields_zero_percentage() {
        let buckets = bucket_into_weeks(&[lead("2025-03-03")], &[], 3, 2025, 0);
        assert!(buckets.iter().all(|week| week.percentage == 0.0));
    }

    #[test]
    fn short_month_emits_fewer_buckets() {
        // February 2027: Feb 1 is a Monday and the 28th ends the 4th week.
        let buckets = bucket_into_weeks(&[], &[], 2, 2027, 50);
        assert_eq!(buckets.len(), 4);
    }

    #[test]
    fn range_selection_is_inclusive() {
        let leads = vec![lead("2025-03-03"), lead("2025-03-09"), lead("2025-03-10")];
        let start: NaiveDate = "2025-03-03".parse().expect("date");
        let end: NaiveDate = "2025-03-09".parse().expect("date");
        assert_eq!(leads_in_range(&leads, start, end).len(), 2);
    }
}
