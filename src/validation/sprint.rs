use chrono::{DateTime, Utc};

use crate::db::enums::SprintStatus;
use crate::db::models::sprint::Sprint;
use crate::error::AppError;

pub fn validate_sprint_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::validation(
            "Sprint start date must be before its end date",
        ));
    }
    Ok(())
}

/// A sprint can only start inside its date window and only an active sprint can complete.
pub fn validate_sprint_transition(
    sprint: &Sprint,
    next: SprintStatus,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    match next {
        SprintStatus::Active if now < sprint.start_date || now > sprint.end_date => Err(
            AppError::validation("Cannot start sprint outside of its date range"),
        ),
        SprintStatus::Completed if sprint.status != SprintStatus::Active => Err(
            AppError::validation("Cannot complete a sprint that is not active"),
        ),
        _ => Ok(()),
    }
}
