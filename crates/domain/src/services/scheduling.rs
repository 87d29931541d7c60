//! Booking rules that involve more than one record.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::professional::{Professional, WorkDay};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("{name} does not work on {day}s")]
    OutsideWorkDays { name: String, day: &'static str },

    #[error("{name} is inactive and cannot take appointments")]
    InactiveProfessional { name: String },
}

/// Checks that `professional` can be booked on `date`.
pub fn check_availability(
    professional: &Professional,
    date: NaiveDate,
) -> Result<(), SchedulingError> {
    if !professional.active {
        return Err(SchedulingError::InactiveProfessional {
            name: professional.name.clone(),
        });
    }
    if !professional.works_on(date) {
        return Err(SchedulingError::OutsideWorkDays {
            name: professional.name.clone(),
            day: WorkDay::of(date).as_str(),
        });
    }
    Ok(())
}
