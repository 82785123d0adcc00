use std::cmp::Ordering;

use crate::models::{CloserCommission, CommissionReport, LeadCommissions, LeadRecord};

/// Setters earn 7% of both the contracted amount and the cash actually
/// collected; closers earn 8% of each.
pub const SETTER_RATE: f64 = 0.07;
pub const CLOSER_RATE: f64 = 0.08;

/// Monthly commission report over leads with a closed sale. Totals and the
/// per-closer breakdown only accumulate leads where `sale_made` is set;
/// leads without a closer contribute to the totals but not the breakdown.
pub fn commission_report(monthly_leads: &[LeadRecord]) -> CommissionReport {
    let mut total_sales = 0u32;
    let mut total_revenue = 0.0;
    let mut total_cash_collected = 0.0;
    let mut breakdown: Vec<CloserCommission> = Vec::new();

    for lead in monthly_leads.iter().filter(|lead| lead.sale_made) {
        let sale_amount = lead.sale_amount.unwrap_or(0.0);
        let cash_collected = lead.cash_collected.unwrap_or(0.0);
        total_sales += 1;
        total_revenue += sale_amount;
        total_cash_collected += cash_collected;

        let Some(closer) = lead.closer.as_deref() else {
            continue;
        };
        let index = match breakdown.iter().position(|entry| entry.closer == closer) {
            Some(index) => index,
            None => {
                breakdown.push(CloserCommission {
                    closer: closer.to_string(),
                    sales: 0,
                    revenue: 0.0,
                    cash_collected: 0.0,
                    commission_from_sales: 0.0,
                    commission_from_cash: 0.0,
                    total_commission: 0.0,
                });
                breakdown.len() - 1
            }
        };
        let entry = &mut breakdown[index];
        entry.sales += 1;
        entry.revenue += sale_amount;
        entry.cash_collected += cash_collected;
    }

    for entry in &mut breakdown {
        entry.commission_from_sales = entry.revenue * CLOSER_RATE;
        entry.commission_from_cash = entry.cash_collected * CLOSER_RATE;
        entry.total_commission = entry.commission_from_sales + entry.commission_from_cash;
    }
    // sort_by is stable, so equal commissions keep insertion order.
    breakdown.sort_by(|a, b| {
        b.total_commission
            .partial_cmp(&a.total_commission)
            .unwrap_or(Ordering::Equal)
    });

    CommissionReport {
        total_sales,
        total_revenue,
        total_cash_collected,
        setter_commission_from_sales: total_revenue * SETTER_RATE,
        setter_commission_from_cash: total_cash_collected * SETTER_RATE,
        closer_commission_from_sales: total_revenue * CLOSER_RATE,
        closer_commission_from_cash: total_cash_collected * CLOSER_RATE,
        closer_breakdown: breakdown,
    }
}

/// Cash-based display commissions for a single table row.
pub fn lead_commissions(lead: &LeadRecord) -> LeadCommissions {
    let sale_amount = lead.sale_amount.unwrap_or(0.0);
    let cash_collected = lead.cash_collected.unwrap_or(0.0);
    LeadCommissions {
        setter_commission_sale: sale_amount * SETTER_RATE,
        setter_commission_cash: cash_collected * SETTER_RATE,
        closer_commission: cash_collected * CLOSER_RATE,
    }
}

#[cfg(test)]
mod tests {
    use super::{commission_report, lead_commissions};
    use crate::engine::testutil::{lead, sale};

    #[test]
    fn single_sale_commissions_are_linear() {
        let report = commission_report(&[sale("2025-03-10", None, 1000.0, 600.0)]);
        assert_eq!(report.setter_commission_from_cash, 42.0);
        assert_eq!(report.closer_commission_from_cash, 48.0);
        assert_eq!(report.setter_commission_from_sales, 70.0);
        assert_eq!(report.closer_commission_from_sales, 80.0);
    }

    #[test]
    fn per_closer_totals_accumulate() {
        let leads = vec![
            sale("2025-03-03", Some("Ana"), 1000.0, 500.0),
            sale("2025-03-10", Some("Ana"), 1500.0, 800.0),
        ];
        let report = commission_report(&leads);
        assert_eq!(report.closer_breakdown.len(), 1);
        let ana = &report.closer_breakdown[0];
        assert_eq!(ana.sales, 2);
        assert_eq!(ana.cash_collected, 1300.0);
        assert_eq!(ana.commission_from_cash, 104.0);
        assert_eq!(ana.total_commission, 2500.0 * 0.08 + 104.0);
    }

    #[test]
    fn breakdown_sorts_descending_and_keeps_tie_order() {
        let leads = vec![
            sale("2025-03-03", Some("Ana"), 100.0, 100.0),
            sale("2025-03-04", Some("Ben"), 100.0, 100.0),
            sale("2025-03-05", Some("Carla"), 900.0, 900.0),
        ];
        let report = commission_report(&leads);
        let order: Vec<&str> = report.closer_breakdown.iter().map(|entry| entry.closer.as_str()).collect();
        assert_eq!(order, vec!["Carla", "Ana", "Ben"]);
    }

    #[test]
    fn unclosed_leads_and_null_closers_stay_out_of_the_breakdown() {
        let mut no_sale = lead("2025-03-03");
        no_sale.cash_collected = Some(400.0);
        let leads = vec![no_sale, sale("2025-03-04", None, 700.0, 700.0)];
        let report = commission_report(&leads);
        assert_eq!(report.total_sales, 1);
        assert_eq!(report.total_cash_collected, 700.0);
        assert!(report.closer_breakdown.is_empty());
    }

    #[test]
    fn row_commissions_treat_nulls_as_zero() {
        let commissions = lead_commissions(&lead("2025-03-03"));
        assert_eq!(commissions.setter_commission_sale, 0.0);
        assert_eq!(commissions.closer_commission, 0.0);

        let commissions = lead_commissions(&sale("2025-03-04", Some("Ben"), 2000.0, 2000.0));
        assert_eq!(commissions.setter_commission_cash, 140.0);
        assert_eq!(commissions.closer_commission, 160.0);
    }
}
