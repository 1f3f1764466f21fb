use validator::ValidationError;

/// Project keys prefix issue identifiers, so only letters, digits, `-` and `_` are allowed.
pub fn validate_project_key(project_key: &str) -> Result<(), ValidationError> {
    if !project_key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        let mut error = ValidationError::new("invalid_project_key");
        error.message = Some(
            "Project key can only contain letters, numbers, hyphens, and underscores".into(),
        );
        return Err(error);
    }
    Ok(())
}
