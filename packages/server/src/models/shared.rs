use serde::Deserialize;

use crate::error::AppError;

/// Offset-based paging used by the list endpoints.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Maximum number of rows to return (1-100).
    pub limit: Option<u64>,
    /// Number of rows to skip. Default: 0.
    pub offset: Option<u64>,
}

impl PageQuery {
    /// Resolve `(limit, offset)` with the endpoint's default page size.
    pub fn resolve(&self, default_limit: u64) -> Result<(u64, u64), AppError> {
        resolve_page(self.limit, self.offset, default_limit)
    }
}

/// Offsets are bound as signed 64-bit integers by the database drivers.
const MAX_OFFSET: u64 = i64::MAX as u64;

pub fn resolve_page(
    limit: Option<u64>,
    offset: Option<u64>,
    default_limit: u64,
) -> Result<(u64, u64), AppError> {
    let offset = offset.unwrap_or(0);
    if offset > MAX_OFFSET {
        return Err(AppError::Validation(format!(
            "offset must be at most {MAX_OFFSET}"
        )));
    }
    Ok((limit.unwrap_or(default_limit).clamp(1, 100), offset))
}

/// Trim a required free-text field, rejecting blanks and overlong values.
pub fn required_text(value: Option<&str>, max_chars: usize) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max_chars {
        return None;
    }
    Some(trimmed.to_string())
}

/// Validate an optional byte size field (must be >= 0 when present).
pub fn validate_optional_size(size: Option<i64>, name: &str) -> Result<(), AppError> {
    match size {
        Some(size) if size < 0 => Err(AppError::Validation(format!("{name} must be >= 0"))),
        _ => Ok(()),
    }
}

pub fn parse_id(raw: &str, what: &str) -> Result<uuid::Uuid, AppError> {
    uuid::Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid {what} ID")))
}
