//! Document models.

mod call;
mod report;
mod user;

pub use call::{ActiveCall, CallRecord, CallState};
pub use report::{Report, ReportFilter, ReportStatus};
pub use user::{BanStatus, DEFAULT_REASON, QuarantineStatus, UserRecord};
