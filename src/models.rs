use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which intake form produced a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormType {
    Guide,
    Calculator,
    Dashboard,
    NewProgram,
}

impl FormType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guide => "guide",
            Self::Calculator => "calculator",
            Self::Dashboard => "dashboard",
            Self::NewProgram => "new-program",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "guide" => Some(Self::Guide),
            "calculator" => Some(Self::Calculator),
            "dashboard" => Some(Self::Dashboard),
            "new-program" => Some(Self::NewProgram),
            _ => None,
        }
    }
}

/// Outcome of a scheduled sales meeting. The four states mirror the intake
/// form exactly; `None` on the lead means the meeting has not been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingOutcome {
    Attended,
    Cancelled,
    NoShow,
    Declined,
}

impl MeetingOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attended => "attended",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no-show",
            Self::Declined => "declined",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "attended" => Some(Self::Attended),
            "cancelled" => Some(Self::Cancelled),
            "no-show" => Some(Self::NoShow),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

/// Where the conversation stands after the meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallResult {
    Interested,
    FollowUp,
    Declined,
}

impl CallResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interested => "interested",
            Self::FollowUp => "follow-up",
            Self::Declined => "declined",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "interested" => Some(Self::Interested),
            "follow-up" => Some(Self::FollowUp),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Cash,
    Installments,
    Sequra,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Installments => "installments",
            Self::Sequra => "sequra",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(Self::Cash),
            "installments" => Some(Self::Installments),
            "sequra" => Some(Self::Sequra),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub weekly_goal: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProjectPayload {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub weekly_goal: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub id: String,
    pub project_id: String,
    pub first_name: String,
    pub last_name: String,
    pub form_type: FormType,
    pub entry_date: NaiveDate,
    pub contact_date: Option<NaiveDate>,
    pub scheduled_call_date: Option<NaiveDate>,
    pub meeting_outcome: Option<MeetingOutcome>,
    pub result: Option<CallResult>,
    pub sale_made: bool,
    pub sale_amount: Option<f64>,
    pub cash_collected: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
    pub installment_count: Option<u32>,
    pub initial_payment: Option<f64>,
    pub setter: Option<String>,
    pub closer: Option<String>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLeadPayload {
    pub id: Option<String>,
    pub project_id: String,
    pub first_name: String,
    pub last_name: String,
    pub form_type: FormType,
    pub entry_date: NaiveDate,
    pub contact_date: Option<NaiveDate>,
    pub scheduled_call_date: Option<NaiveDate>,
    pub meeting_outcome: Option<MeetingOutcome>,
    pub result: Option<CallResult>,
    #[serde(default)]
    pub sale_made: bool,
    pub sale_amount: Option<f64>,
    pub cash_collected: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
    pub installment_count: Option<u32>,
    pub initial_payment: Option<f64>,
    pub setter: Option<String>,
    pub closer: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListLeadsFilters {
    /// Calendar month 1-12; both `month` and `year` must be set for the
    /// monthly view, otherwise the full list is returned.
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub closer: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Weekly lead volume imported from the ad-forms channel. `week_start_date`
/// is always the Monday of its week; the store normalizes on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaWeekRecord {
    pub id: String,
    pub project_id: String,
    pub week_start_date: NaiveDate,
    pub week_number: u32,
    pub year: i32,
    pub leads_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMetaWeekPayload {
    pub id: Option<String>,
    pub project_id: String,
    /// Any day of the target week; persisted as its Monday.
    pub week_date: NaiveDate,
    pub leads_count: u32,
}

// ─── Engine output ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    /// 1-based position within the month.
    pub week: u32,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub manual_leads: u32,
    pub meta_leads: u32,
    pub total_leads: u32,
    pub goal: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelMetrics {
    pub weekly_goal: u32,
    pub monthly_goal: u32,
    pub total_leads: u32,
    pub scheduled: u32,
    pub attended: u32,
    pub cancelled: u32,
    pub no_show: u32,
    pub offers_given: u32,
    pub sales: u32,
    pub total_revenue: f64,
    pub total_cash_collected: f64,
    pub scheduled_rate: f64,
    pub show_rate: f64,
    pub close_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub month: u32,
    pub year: i32,
    pub metrics: FunnelMetrics,
    pub weeks: Vec<WeekBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloserCommission {
    pub closer: String,
    pub sales: u32,
    pub revenue: f64,
    pub cash_collected: f64,
    pub commission_from_sales: f64,
    pub commission_from_cash: f64,
    pub total_commission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionReport {
    pub total_sales: u32,
    pub total_revenue: f64,
    pub total_cash_collected: f64,
    pub setter_commission_from_sales: f64,
    pub setter_commission_from_cash: f64,
    pub closer_commission_from_sales: f64,
    pub closer_commission_from_cash: f64,
    /// Sorted descending by `total_commission`; ties keep insertion order.
    pub closer_breakdown: Vec<CloserCommission>,
}

/// At-a-glance commission figures for a single list row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCommissions {
    pub setter_commission_sale: f64,
    pub setter_commission_cash: f64,
    pub closer_commission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    /// Abbreviated month name, capitalized.
    pub label: String,
    pub manual_leads: u32,
    pub meta_leads: u32,
    pub sales: u32,
    pub revenue: f64,
    pub cash_collected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodTotal {
    pub method: PaymentMethod,
    pub count: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSummary {
    pub total_sales: u32,
    pub total_revenue: f64,
    pub total_cash_collected: f64,
    pub pending_payments: f64,
    pub average_sale_value: f64,
    pub collection_rate: f64,
    pub by_payment_method: Vec<PaymentMethodTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanResponse {
    pub success: bool,
}
