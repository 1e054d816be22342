//! Recipient resolution.

use taskdesk_core::{
  id::{AccountId, WorkspaceId},
  store::DirectoryStore,
};

use crate::{Error, Result};

/// Who a notification is for, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  SingleUser(AccountId),
  MultipleUsers(Vec<AccountId>),
  /// Every employee of the workspace, by account id.
  AllUsersInWorkspace(WorkspaceId),
}

/// Resolve `target` to a non-empty, duplicate-free list of account ids.
///
/// Explicit ids pass through unchanged; they are already account ids on
/// every path that builds a [`Target`]. Resolving to nobody is a
/// [`Error::RecipientResolution`]; callers decide whether that is fatal.
pub async fn resolve_recipients<S: DirectoryStore>(
  store: &S,
  target: &Target,
) -> Result<Vec<AccountId>> {
  let resolved = match target {
    Target::SingleUser(id) => dedup(std::iter::once(id.clone())),
    Target::MultipleUsers(ids) => dedup(ids.iter().cloned()),
    Target::AllUsersInWorkspace(ws) => {
      let employees = store
        .list_employees(Some(ws))
        .await
        .map_err(Error::store)?;
      let resolved = dedup(employees.into_iter().map(|e| e.user_id));
      if resolved.is_empty() {
        return Err(Error::RecipientResolution(format!(
          "workspace {ws} has no employees"
        )));
      }
      resolved
    }
  };

  if resolved.is_empty() {
    return Err(Error::RecipientResolution(
      "target names no users".to_string(),
    ));
  }
  Ok(resolved)
}

/// Drop blanks and repeats, keeping first-seen order.
fn dedup(ids: impl Iterator<Item = AccountId>) -> Vec<AccountId> {
  let mut out: Vec<AccountId> = Vec::new();
  for id in ids {
    let id = AccountId::from(id.as_str().trim());
    if !id.as_str().is_empty() && !out.contains(&id) {
      out.push(id);
    }
  }
  out
}
