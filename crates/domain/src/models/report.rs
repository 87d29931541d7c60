//! Date-window practice reports.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest window a single report may cover, in days.
pub const MAX_WINDOW_DAYS: i64 = 366;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportWindowError {
    #[error("'from' must not be after 'to'")]
    Inverted,

    #[error("Report window cannot exceed 366 days")]
    TooLong,
}

/// Query parameters for `GET /reports/summary`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

impl DateWindow {
    /// Resolves a requested window.
    ///
    /// With no bounds, the calendar month containing `today` is used. A
    /// missing `to` ends the month of `from`; a missing `from` starts the
    /// month of `to`.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, ReportWindowError> {
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            (Some(from), None) => (from, month_end(from)),
            (None, Some(to)) => (month_start(to), to),
            (None, None) => (month_start(today), month_end(today)),
        };

        if from > to {
            return Err(ReportWindowError::Inverted);
        }
        if (to - from) + Duration::days(1) > Duration::days(MAX_WINDOW_DAYS) {
            return Err(ReportWindowError::TooLong);
        }
        Ok(Self { from, to })
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub scheduled: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub total: i64,
}

impl AppointmentSummary {
    pub fn new(scheduled: i64, completed: i64, cancelled: i64) -> Self {
        Self {
            scheduled,
            completed,
            cancelled,
            total: scheduled + completed + cancelled,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub cancelled: i64,
    pub total: i64,
    /// `(present + late) / (total - cancelled)`, `None` when nothing counts.
    pub attendance_rate: Option<f64>,
}

impl AttendanceSummary {
    pub fn new(present: i64, absent: i64, late: i64, cancelled: i64) -> Self {
        let total = present + absent + late + cancelled;
        let denominator = total - cancelled;
        let attendance_rate = if denominator > 0 {
            Some((present + late) as f64 / denominator as f64)
        } else {
            None
        };
        Self {
            present,
            absent,
            late,
            cancelled,
            total,
            attendance_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTotal {
    pub count: i64,
    pub net_cents: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub pending: StatusTotal,
    pub paid: StatusTotal,
    pub overdue: StatusTotal,
    /// Net amount of every payment due in the window.
    pub billed_cents: i64,
}

impl PaymentSummary {
    pub fn new(pending: StatusTotal, paid: StatusTotal, overdue: StatusTotal) -> Self {
        Self {
            billed_cents: pending.net_cents + paid.net_cents + overdue.net_cents,
            pending,
            paid,
            overdue,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub appointments: AppointmentSummary,
    pub attendance: AttendanceSummary,
    pub payments: PaymentSummary,
    pub new_patients: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_window_is_current_month() {
        let window = DateWindow::resolve(None, None, date(2024, 2, 14)).unwrap();
        assert_eq!(window.from, date(2024, 2, 1));
        assert_eq!(window.to, date(2024, 2, 29));
        assert_eq!(window.days(), 29);
    }

    #[test]
    fn test_december_month_end() {
        let window = DateWindow::resolve(None, None, date(2023, 12, 3)).unwrap();
        assert_eq!(window.to, date(2023, 12, 31));
    }

    #[test]
    fn test_partial_bounds() {
        let today = date(2024, 6, 1);
        let from_only = DateWindow::resolve(Some(date(2024, 3, 10)), None, today).unwrap();
        assert_eq!(from_only.to, date(2024, 3, 31));

        let to_only = DateWindow::resolve(None, Some(date(2024, 3, 10)), today).unwrap();
        assert_eq!(to_only.from, date(2024, 3, 1));
    }

    #[test]
    fn test_inverted_window() {
        assert_eq!(
            DateWindow::resolve(Some(date(2024, 3, 2)), Some(date(2024, 3, 1)), date(2024, 3, 1)),
            Err(ReportWindowError::Inverted)
        );
    }

    #[test]
    fn test_window_span_limit() {
        let today = date(2024, 1, 1);
        assert!(
            DateWindow::resolve(Some(date(2024, 1, 1)), Some(date(2024, 12, 31)), today).is_ok()
        );
        assert_eq!(
            DateWindow::resolve(Some(date(2022, 12, 31)), Some(date(2024, 1, 1)), today),
            Err(ReportWindowError::TooLong)
        );
    }

    #[test]
    fn test_attendance_rate() {
        let summary = AttendanceSummary::new(6, 2, 2, 5);
        assert_eq!(summary.total, 15);
        assert_eq!(summary.attendance_rate, Some(0.8));
    }

    #[test]
    fn test_attendance_rate_none_when_only_cancelled() {
        assert_eq!(AttendanceSummary::new(0, 0, 0, 3).attendance_rate, None);
        assert_eq!(AttendanceSummary::default().attendance_rate, None);
    }

    #[test]
    fn test_payment_summary_billed() {
        let summary = PaymentSummary::new(
            StatusTotal { count: 1, net_cents: 1000 },
            StatusTotal { count: 2, net_cents: 5000 },
            StatusTotal { count: 1, net_cents: 700 },
        );
        assert_eq!(summary.billed_cents, 6700);
    }

    #[test]
    fn test_appointment_summary_total() {
        assert_eq!(AppointmentSummary::new(3, 4, 1).total, 8);
    }
}
