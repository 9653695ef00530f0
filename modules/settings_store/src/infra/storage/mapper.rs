//! Query row to model mappers

use crate::contract::RawSetting;
use sea_orm::{DbErr, QueryResult};

/// Read a settings row using the configured column names
///
/// The value column may be NULL; the key column may not.
pub fn raw_setting_from_row(
    row: &QueryResult,
    key_field: &str,
    value_field: &str,
) -> Result<RawSetting, DbErr> {
    let key: String = row.try_get("", key_field)?;
    let value: Option<String> = row.try_get("", value_field)?;
    Ok(RawSetting { key, value })
}
