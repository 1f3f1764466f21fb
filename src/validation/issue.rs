use std::collections::HashSet;

use validator::ValidationError;

use crate::db::models::issue::IssueOrderPatch;
use crate::error::AppError;

pub fn validate_issue_title(title: &str) -> Result<(), ValidationError> {
    let message = if title.trim().is_empty() {
        "Issue title is required"
    } else if title.chars().count() > 255 {
        "Issue title is too long (max 255 characters)"
    } else {
        return Ok(());
    };

    let mut error = ValidationError::new("invalid_title");
    error.message = Some(message.into());
    Err(error)
}

/// A reorder batch may mention each issue once and never uses negative ranks.
pub fn validate_order_patches(patches: &[IssueOrderPatch]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(patches.len());
    for patch in patches {
        if patch.order < 0 {
            return Err(AppError::validation(format!(
                "Issue {} has a negative order",
                patch.id
            )));
        }
        if !seen.insert(patch.id) {
            return Err(AppError::validation(format!(
                "Issue {} appears more than once",
                patch.id
            )));
        }
    }
    Ok(())
}
