//! Assignee normalization and matching.
//!
//! Callers hand over assignee ids without knowing which identity space they
//! come from. Before a task is written every id is converted to its employee
//! id; on the way back out, stored ids may still be legacy account ids.

use taskdesk_core::{
  codec::encode_assignee_field,
  id::{AccountId, EmployeeId},
  store::DirectoryStore,
  task::Task,
  visibility::Requester,
};

use crate::{Result, identity::IdentityResolver};

/// Canonical employee ids for `raw_ids`, in input order without repeats.
///
/// Ids that name nobody are logged and dropped so one bad id does not block
/// assignment to the rest.
pub async fn canonical_assignees<S: DirectoryStore>(
  store: &S,
  raw_ids: &[String],
) -> Result<Vec<EmployeeId>> {
  let resolver = IdentityResolver::new(store);
  let mut canonical: Vec<EmployeeId> = Vec::with_capacity(raw_ids.len());

  for raw in raw_ids {
    match resolver.to_employee_identity(raw).await? {
      Some(id) if !canonical.contains(&id) => canonical.push(id),
      Some(_) => {}
      None => tracing::warn!(assignee = %raw, "dropping assignee that matches no employee"),
    }
  }

  Ok(canonical)
}

/// Normalize `raw_ids` and encode them for `Task::assignee_id`.
pub async fn normalize_assignee_input<S: DirectoryStore>(
  store: &S,
  raw_ids: &[String],
) -> Result<String> {
  let canonical = canonical_assignees(store, raw_ids).await?;
  Ok(encode_assignee_field(&canonical))
}

/// Account ids for stored assignee ids, skipping any that resolve to nobody.
pub async fn assignee_accounts<S: DirectoryStore>(
  store: &S,
  assignee_ids: &[String],
) -> Result<Vec<AccountId>> {
  let resolver = IdentityResolver::new(store);
  let mut accounts: Vec<AccountId> = Vec::with_capacity(assignee_ids.len());

  for id in assignee_ids {
    match resolver.to_account_identity(id).await? {
      Some(account) if !accounts.contains(&account) => accounts.push(account),
      Some(_) => {}
      None => tracing::warn!(assignee = %id, "stored assignee has no account"),
    }
  }

  Ok(accounts)
}

/// Whether `requester` is among `task`'s assignees, in either identity space.
pub fn is_assigned_to(task: &Task, requester: &Requester) -> bool {
  task
    .assignees()
    .iter()
    .any(|id| requester.answers_to(id))
}

/// How a task's assignees changed, in canonical employee ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssigneeDiff {
  /// Newly assigned.
  pub added: Vec<EmployeeId>,
  /// Assigned both before and after.
  pub kept:  Vec<EmployeeId>,
}

/// Compare two assignee lists by the person they name rather than by string,
/// so a legacy account id and the matching employee id count as the same
/// assignee.
pub async fn diff_assignees<S: DirectoryStore>(
  store: &S,
  before: &[String],
  after: &[String],
) -> Result<AssigneeDiff> {
  let before = canonical_assignees(store, before).await?;
  let (kept, added) = canonical_assignees(store, after)
    .await?
    .into_iter()
    .partition(|id| before.contains(id));
  Ok(AssigneeDiff { added, kept })
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use taskdesk_core::{
    account::NewAccount,
    codec::decode_assignee_field,
    id::{TaskId, WorkspaceId},
    task::{TaskPriority, TaskStatus},
    workspace::NewEmployee,
  };
  use taskdesk_store_sqlite::SqliteStore;

  use super::*;

  /// Creates accounts with employee records; returns `(account, employee)`
  /// pairs.
  async fn seeded(n: usize) -> (SqliteStore, Vec<(AccountId, EmployeeId)>) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut people = Vec::new();
    for i in 0..n {
      let account = store
        .add_account(NewAccount {
          email:         format!("user{i}@example.com"),
          name:          format!("User {i}"),
          labels:        vec![],
          password_hash: String::new(),
        })
        .await
        .unwrap();
      let employee = store
        .add_employee(NewEmployee {
          user_id:       account.account_id.clone(),
          workspace_id:  WorkspaceId::from("W"),
          name:          format!("User {i}"),
          email:         account.email.clone(),
          department:    None,
          employee_code: None,
        })
        .await
        .unwrap();
      people.push((account.account_id, employee.employee_id));
    }
    (store, people)
  }

  fn task_with(assignee_id: &str) -> Task {
    Task {
      task_id:      TaskId::from("t1"),
      workspace_id: WorkspaceId::from("W"),
      title:        "t".into(),
      description:  None,
      status:       TaskStatus::Todo,
      priority:     TaskPriority::Medium,
      due_date:     None,
      assignee_id:  assignee_id.into(),
      created_by:   AccountId::from("admin"),
      created_at:   Utc::now(),
      updated_at:   Utc::now(),
    }
  }

  #[tokio::test]
  async fn round_trip_is_independent_of_input_identity_space() {
    let (store, people) = seeded(3).await;
    let expected: Vec<String> =
      people.iter().map(|(_, e)| e.to_string()).collect();

    let as_accounts: Vec<String> = people.iter().map(|(a, _)| a.to_string()).collect();
    let as_employees: Vec<String> = expected.clone();
    let mixed = vec![
      people[0].0.to_string(),
      people[1].1.to_string(),
      people[2].0.to_string(),
    ];

    for input in [as_accounts, as_employees, mixed] {
      let encoded = normalize_assignee_input(&store, &input).await.unwrap();
      assert_eq!(decode_assignee_field(&encoded), expected);
    }
  }

  #[tokio::test]
  async fn cardinality_picks_the_encoding() {
    let (store, people) = seeded(2).await;

    let none = normalize_assignee_input(&store, &[]).await.unwrap();
    assert_eq!(none, "");

    let one = normalize_assignee_input(&store, &[people[0].0.to_string()])
      .await
      .unwrap();
    assert_eq!(one, people[0].1.as_str());

    let two = normalize_assignee_input(
      &store,
      &[people[0].0.to_string(), people[1].0.to_string()],
    )
    .await
    .unwrap();
    assert!(two.starts_with('['), "{two}");
  }

  #[tokio::test]
  async fn invalid_ids_are_dropped_not_fatal() {
    let (store, people) = seeded(2).await;
    let input = vec![
      people[0].0.to_string(),
      "no-such-person".to_string(),
      people[1].1.to_string(),
    ];
    let canonical = canonical_assignees(&store, &input).await.unwrap();
    assert_eq!(canonical, vec![people[0].1.clone(), people[1].1.clone()]);
  }

  #[tokio::test]
  async fn all_invalid_means_unassigned() {
    let (store, _) = seeded(0).await;
    let encoded = normalize_assignee_input(&store, &["ghost".to_string()])
      .await
      .unwrap();
    assert_eq!(encoded, "");
  }

  #[tokio::test]
  async fn duplicates_collapse_across_identity_spaces() {
    let (store, people) = seeded(1).await;
    let (account, employee) = &people[0];
    let canonical =
      canonical_assignees(&store, &[account.to_string(), employee.to_string()])
        .await
        .unwrap();
    assert_eq!(canonical, vec![employee.clone()]);
  }

  #[tokio::test]
  async fn stored_assignees_map_back_to_accounts() {
    let (store, people) = seeded(2).await;
    // One current employee id and one legacy account id.
    let stored = vec![people[0].1.to_string(), people[1].0.to_string()];
    let accounts = assignee_accounts(&store, &stored).await.unwrap();
    assert_eq!(accounts, vec![people[0].0.clone(), people[1].0.clone()]);
  }

  #[test]
  fn assignment_matches_either_identity() {
    let me = Requester::new("acct-A".into(), Some("emp-A".into()));
    assert!(is_assigned_to(&task_with(r#"["emp-A","emp-B"]"#), &me));
    assert!(is_assigned_to(&task_with("acct-A"), &me), "legacy bare account id");
    assert!(!is_assigned_to(&task_with("emp-C"), &me));
    assert!(!is_assigned_to(&task_with(""), &me));
    assert!(!is_assigned_to(&task_with("[broken"), &me));
  }

  #[tokio::test]
  async fn diff_matches_legacy_ids_to_their_employee() {
    let (store, people) = seeded(3).await;
    let before = vec![people[0].0.to_string(), people[1].1.to_string()];
    let after = vec![people[0].1.to_string(), people[2].0.to_string()];

    let diff = diff_assignees(&store, &before, &after).await.unwrap();
    assert_eq!(diff.added, vec![people[2].1.clone()]);
    assert_eq!(diff.kept, vec![people[0].1.clone()]);

    let same = diff_assignees(&store, &before, &before).await.unwrap();
    assert!(same.added.is_empty());
    assert_eq!(same.kept.len(), 2);
  }
}
