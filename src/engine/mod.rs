//! Period aggregation and commission computation over tenant-scoped
//! snapshots. Every function here is pure: it reads immutable slices the
//! caller already fetched and returns plain data, so re-running on a fresh
//! snapshot is idempotent.

pub mod billing;
pub mod commissions;
pub mod comparison;
pub mod funnel;
pub mod period;

pub use billing::billing_summary;
pub use commissions::{commission_report, lead_commissions};
pub use comparison::rolling_months;
pub use funnel::funnel_metrics;
pub use period::{bucket_into_weeks, filter_by_month, leads_in_range, monday_on_or_before};
