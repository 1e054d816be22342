//! Codecs for id lists packed into a single scalar field.
//!
//! Two encodings are in use:
//!
//! - **Recipient lists** (`Notification::recipient_ids`) are always a JSON
//!   array of strings.
//! - **Assignee fields** (`Task::assignee_id`) are empty for "unassigned", a
//!   bare id for a single assignee, or a JSON array once there is more than
//!   one.
//!
//! Call sites never parse these by hand; they go through the functions below.

use crate::{Error, Result, id::EmployeeId};

// ─── Recipient lists ─────────────────────────────────────────────────────────

/// Encode ids as a compact JSON array of strings.
pub fn encode_id_list<I, T>(ids: I) -> String
where
  I: IntoIterator<Item = T>,
  T: AsRef<str>,
{
  let values: Vec<serde_json::Value> = ids
    .into_iter()
    .map(|id| serde_json::Value::from(id.as_ref()))
    .collect();
  serde_json::Value::Array(values).to_string()
}

/// Strictly decode a JSON array of strings.
///
/// Returns [`Error::MalformedIdList`] on anything else; callers decide how to
/// degrade.
pub fn decode_id_list(raw: &str) -> Result<Vec<String>> {
  serde_json::from_str::<Vec<String>>(raw).map_err(|source| {
    Error::MalformedIdList {
      raw: raw.to_owned(),
      source,
    }
  })
}

// ─── Assignee fields ─────────────────────────────────────────────────────────

/// Encode canonical employee ids for storage in `Task::assignee_id`.
///
/// Zero ids encode as the empty string, one as the bare id, several as a JSON
/// array.
pub fn encode_assignee_field(ids: &[EmployeeId]) -> String {
  match ids {
    [] => String::new(),
    [single] => single.as_str().to_owned(),
    many => encode_id_list(many),
  }
}

/// Decode a stored assignee field. Never fails.
///
/// A malformed JSON array decodes as unassigned. A bare value is returned as
/// is; on legacy rows it may be an account id rather than an employee id.
pub fn decode_assignee_field(raw: &str) -> Vec<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Vec::new();
  }
  if !trimmed.starts_with('[') {
    return vec![trimmed.to_owned()];
  }
  match decode_id_list(trimmed) {
    Ok(ids) => ids
      .into_iter()
      .map(|id| id.trim().to_owned())
      .filter(|id| !id.is_empty())
      .collect(),
    Err(e) => {
      tracing::warn!(error = %e, "treating malformed assignee field as unassigned");
      Vec::new()
    }
  }
}
