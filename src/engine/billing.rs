use crate::models::{BillingSummary, LeadRecord, PaymentMethodTotal};

/// Financial month view: revenue and cash totals over every lead in the
/// month (amounts normally only exist on sale rows, but malformed data is
/// summed as-is), pending balance, average ticket, collection rate, and a
/// per-payment-method split of closed sales in first-seen order.
pub fn billing_summary(monthly_leads: &[LeadRecord]) -> BillingSummary {
    let total_sales = monthly_leads.iter().filter(|lead| lead.sale_made).count() as u32;
    let total_revenue: f64 = monthly_leads.iter().map(|lead| lead.sale_amount.unwrap_or(0.0)).sum();
    let total_cash_collected: f64 = monthly_leads
        .iter()
        .map(|lead| lead.cash_collected.unwrap_or(0.0))
        .sum();
    let pending_payments = total_revenue - total_cash_collected;
    let average_sale_value = if total_sales > 0 {
        total_revenue / f64::from(total_sales)
    } else {
        0.0
    };
    let collection_rate = if total_revenue > 0.0 {
        total_cash_collected / total_revenue * 100.0
    } else {
        0.0
    };

    let mut by_payment_method: Vec<PaymentMethodTotal> = Vec::new();
    for lead in monthly_leads.iter().filter(|lead| lead.sale_made) {
        let Some(method) = lead.payment_method else {
            continue;
        };
        let index = match by_payment_method.iter().position(|total| total.method == method) {
            Some(index) => index,
            None => {
                by_payment_method.push(PaymentMethodTotal {
                    method,
                    count: 0,
                    amount: 0.0,
                });
                by_payment_method.len() - 1
            }
        };
        by_payment_method[index].count += 1;
        by_payment_method[index].amount += lead.sale_amount.unwrap_or(0.0);
    }

    BillingSummary {
        total_sales,
        total_revenue,
        total_cash_collected,
        pending_payments,
        average_sale_value,
        collection_rate,
        by_payment_method,
    }
}
