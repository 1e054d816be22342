//! End-to-end behaviour of fan-out, visibility and access control against a
//! real (in-memory) SQLite store.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicUsize, Ordering},
};

use taskdesk_core::{
  account::{Account, NewAccount},
  codec::{decode_assignee_field, encode_id_list},
  id::{AccountId, EmployeeId, NotificationId, WorkspaceId},
  notification::{
    NewNotification, Notification, NotificationKind, NotificationPriority, PushToken,
    RECENT_NOTIFICATION_WINDOW,
  },
  store::{DirectoryStore, NotificationQuery, NotificationStore},
  task::{NewTask, TaskPriority, TaskStatus},
  visibility::Requester,
  workspace::{NewEmployee, NewWorkspace},
};
use taskdesk_store_sqlite::SqliteStore;

use crate::{
  Error, FanOut, Notice, PushMessage, PushTransport, Target, access,
  assignees::{is_assigned_to, normalize_assignee_input},
  identity::IdentityResolver,
};

const ADMIN_EMAIL: &str = "boss@example.com";

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("push service unavailable")]
struct Unavailable;

/// Every send fails.
#[derive(Default)]
struct DeadTransport {
  calls: AtomicUsize,
}

impl PushTransport for DeadTransport {
  type Error = Unavailable;

  async fn send(&self, _token: &str, _message: &PushMessage) -> Result<(), Unavailable> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Err(Unavailable)
  }
}

/// Every send succeeds and is recorded.
#[derive(Default)]
struct RecordingTransport {
  sent: Mutex<Vec<(String, PushMessage)>>,
}

impl PushTransport for RecordingTransport {
  type Error = Unavailable;

  async fn send(&self, token: &str, message: &PushMessage) -> Result<(), Unavailable> {
    self.sent.lock().unwrap().push((token.to_owned(), message.clone()));
    Ok(())
  }
}

#[derive(Debug, thiserror::Error)]
#[error("disk full")]
struct DiskFull;

/// A notification store whose writes always fail.
#[derive(Default)]
struct ReadOnlyStore {
  token_lookups: AtomicUsize,
}

impl NotificationStore for ReadOnlyStore {
  type Error = DiskFull;

  async fn insert_notification(&self, _input: NewNotification) -> Result<Notification, DiskFull> {
    Err(DiskFull)
  }

  async fn get_notification(&self, _id: &NotificationId) -> Result<Option<Notification>, DiskFull> {
    Ok(None)
  }

  async fn query_notifications(
    &self,
    _query: &NotificationQuery,
  ) -> Result<Vec<Notification>, DiskFull> {
    Ok(vec![])
  }

  async fn mark_read(&self, _id: &NotificationId) -> Result<bool, DiskFull> { Err(DiskFull) }

  async fn delete_notification(&self, _id: &NotificationId) -> Result<bool, DiskFull> {
    Err(DiskFull)
  }

  async fn register_push_token(
    &self,
    _account: AccountId,
    _token: String,
    _platform: Option<String>,
  ) -> Result<PushToken, DiskFull> {
    Err(DiskFull)
  }

  async fn remove_push_token(&self, _owner: &AccountId, _token: &str) -> Result<bool, DiskFull> {
    Err(DiskFull)
  }

  async fn push_tokens_for(&self, _accounts: &[AccountId]) -> Result<Vec<PushToken>, DiskFull> {
    self.token_lookups.fetch_add(1, Ordering::SeqCst);
    Ok(vec![])
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

struct Person {
  account:  Account,
  employee: EmployeeId,
}

impl Person {
  fn requester(&self) -> Requester {
    Requester::new(self.account.account_id.clone(), Some(self.employee.clone()))
  }
}

async fn account(store: &SqliteStore, email: &str, labels: &[&str]) -> Account {
  store
    .add_account(NewAccount {
      email:         email.into(),
      name:          email.split('@').next().unwrap_or(email).into(),
      labels:        labels.iter().map(|l| l.to_string()).collect(),
      password_hash: String::new(),
    })
    .await
    .unwrap()
}

async fn person(store: &SqliteStore, ws: &WorkspaceId, email: &str) -> Person {
  let account = account(store, email, &[]).await;
  let employee = store
    .add_employee(NewEmployee {
      user_id:       account.account_id.clone(),
      workspace_id:  ws.clone(),
      name:          account.name.clone(),
      email:         email.into(),
      department:    None,
      employee_code: None,
    })
    .await
    .unwrap();
  Person {
    account,
    employee: employee.employee_id,
  }
}

async fn workspace(store: &SqliteStore, name: &str, admin: &Account) -> WorkspaceId {
  store
    .add_workspace(NewWorkspace {
      name:       name.into(),
      created_by: admin.account_id.clone(),
    })
    .await
    .unwrap()
    .workspace_id
}

fn notice(ws: &WorkspaceId, by: &Account, kind: NotificationKind) -> Notice {
  Notice {
    title:        "Heads up".into(),
    message:      "Standup moved to 10:00".into(),
    kind,
    priority:     NotificationPriority::Medium,
    workspace_id: ws.clone(),
    created_by:   by.account_id.clone(),
    task_id:      None,
  }
}

// ─── Fan-out ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_push_does_not_undo_persistence() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let admin = account(&store, ADMIN_EMAIL, &[]).await;
  let ws = workspace(&store, "Ops", &admin).await;
  let alice = person(&store, &ws, "alice@example.com").await;
  store
    .register_push_token(alice.account.account_id.clone(), "tok-a".into(), None)
    .await
    .unwrap();

  let transport = Arc::new(DeadTransport::default());
  let fanout = FanOut::new(Arc::clone(&store), Arc::clone(&transport));
  let report = fanout
    .send(
      notice(&ws, &admin, NotificationKind::General),
      &Target::SingleUser(alice.account.account_id.clone()),
    )
    .await
    .unwrap();

  assert_eq!(report.push.attempted, 1);
  assert_eq!(report.push.succeeded, 0);
  assert_eq!(report.push.failed, 1);
  assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

  let stored = store
    .get_notification(&report.notification.notification_id)
    .await
    .unwrap()
    .expect("notification persisted");
  assert!(!stored.is_read);
  assert_eq!(stored.recipients().unwrap(), vec![alice.account.account_id.to_string()]);
}

#[tokio::test]
async fn persistence_failure_skips_push() {
  let store = Arc::new(ReadOnlyStore::default());
  let transport = Arc::new(RecordingTransport::default());
  let fanout = FanOut::new(Arc::clone(&store), Arc::clone(&transport));

  let admin = AccountId::from("admin");
  let err = fanout
    .deliver(
      Notice {
        title:        "t".into(),
        message:      "m".into(),
        kind:         NotificationKind::General,
        priority:     NotificationPriority::Low,
        workspace_id: WorkspaceId::from("W"),
        created_by:   admin,
        task_id:      None,
      },
      vec![AccountId::from("u1")],
    )
    .await
    .unwrap_err();

  assert!(matches!(err, Error::NotificationPersistence(_)), "{err}");
  assert_eq!(store.token_lookups.load(Ordering::SeqCst), 0);
  assert!(transport.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn blank_title_is_rejected_before_any_write() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let fanout = FanOut::new(Arc::clone(&store), Arc::new(RecordingTransport::default()));

  let mut bad = Notice {
    title:        "   ".into(),
    message:      "m".into(),
    kind:         NotificationKind::General,
    priority:     NotificationPriority::Low,
    workspace_id: WorkspaceId::from("W"),
    created_by:   AccountId::from("admin"),
    task_id:      None,
  };
  let err = fanout
    .send(bad.clone(), &Target::SingleUser("u1".into()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)), "{err}");

  bad.title = "ok".into();
  bad.message = String::new();
  let err = fanout
    .send(bad, &Target::SingleUser("u1".into()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)), "{err}");

  let all = store
    .query_notifications(&NotificationQuery::default())
    .await
    .unwrap();
  assert!(all.is_empty());
}

#[tokio::test]
async fn same_request_twice_creates_two_documents() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let admin = account(&store, ADMIN_EMAIL, &[]).await;
  let ws = workspace(&store, "Ops", &admin).await;
  let alice = person(&store, &ws, "alice@example.com").await;
  let fanout = FanOut::new(Arc::clone(&store), Arc::new(RecordingTransport::default()));

  let target = Target::SingleUser(alice.account.account_id.clone());
  let first = fanout
    .send(notice(&ws, &admin, NotificationKind::General), &target)
    .await
    .unwrap();
  let second = fanout
    .send(notice(&ws, &admin, NotificationKind::General), &target)
    .await
    .unwrap();
  assert_ne!(
    first.notification.notification_id,
    second.notification.notification_id
  );

  let seen = access::visible_notifications(&*store, &alice.requester(), None)
    .await
    .unwrap();
  assert_eq!(seen.len(), 2);
}

// ─── Read state and deletion ─────────────────────────────────────────────────

#[tokio::test]
async fn read_state_is_shared_between_recipients() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let admin = account(&store, ADMIN_EMAIL, &[]).await;
  let ws = workspace(&store, "Ops", &admin).await;
  let a = person(&store, &ws, "a@example.com").await;
  let b = person(&store, &ws, "b@example.com").await;
  let outsider = person(&store, &ws, "c@example.com").await;

  let fanout = FanOut::new(Arc::clone(&store), Arc::new(RecordingTransport::default()));
  let report = fanout
    .send(
      notice(&ws, &admin, NotificationKind::General),
      &Target::MultipleUsers(vec![
        a.account.account_id.clone(),
        b.account.account_id.clone(),
      ]),
    )
    .await
    .unwrap();
  let id = report.notification.notification_id;

  assert_eq!(access::unread_count(&*store, &b.requester(), None).await.unwrap(), 1);

  // A non-recipient cannot flip it.
  let updated = access::mark_read(&*store, &outsider.requester(), &[id.clone()])
    .await
    .unwrap();
  assert_eq!(updated, 0);
  assert_eq!(access::unread_count(&*store, &b.requester(), None).await.unwrap(), 1);

  let updated = access::mark_read(
    &*store,
    &a.requester(),
    &[id.clone(), NotificationId::from("missing")],
  )
  .await
  .unwrap();
  assert_eq!(updated, 1);

  let as_b = access::visible_notifications(&*store, &b.requester(), None)
    .await
    .unwrap();
  assert_eq!(as_b.len(), 1);
  assert!(as_b[0].is_read);
  assert_eq!(access::unread_count(&*store, &b.requester(), None).await.unwrap(), 0);
}

#[tokio::test]
async fn only_admins_delete() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let admin = account(&store, "root@example.com", &["admin"]).await;
  let ws = workspace(&store, "Ops", &admin).await;
  let a = person(&store, &ws, "a@example.com").await;

  let fanout = FanOut::new(Arc::clone(&store), Arc::new(RecordingTransport::default()));
  let id = fanout
    .send(
      notice(&ws, &admin, NotificationKind::General),
      &Target::SingleUser(a.account.account_id.clone()),
    )
    .await
    .unwrap()
    .notification
    .notification_id;

  let err = access::delete_notification(&*store, &a.account, ADMIN_EMAIL, &id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Authorization(_)), "{err}");
  assert!(store.get_notification(&id).await.unwrap().is_some());

  assert!(
    access::delete_notification(&*store, &admin, ADMIN_EMAIL, &id)
      .await
      .unwrap()
  );
  assert!(store.get_notification(&id).await.unwrap().is_none());
  assert!(
    !access::delete_notification(&*store, &admin, ADMIN_EMAIL, &id)
      .await
      .unwrap()
  );
}

fn raw_notification(ws: &WorkspaceId, recipient_ids: String) -> NewNotification {
  NewNotification {
    title:         "Heads up".into(),
    message:       "Written by an older client".into(),
    kind:          NotificationKind::General,
    priority:      NotificationPriority::Low,
    recipient_ids,
    workspace_id:  ws.clone(),
    created_by:    AccountId::from("admin"),
    task_id:       None,
  }
}

#[tokio::test]
async fn malformed_recipient_list_falls_back_to_substring_match() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let admin = account(&store, ADMIN_EMAIL, &[]).await;
  let ws = workspace(&store, "Ops", &admin).await;
  let a = person(&store, &ws, "a@example.com").await;
  let outsider = person(&store, &ws, "c@example.com").await;

  let id = store
    .insert_notification(raw_notification(&ws, format!("not-json[{}", a.account.account_id)))
    .await
    .unwrap()
    .notification_id;

  assert_eq!(access::unread_count(&store, &a.requester(), None).await.unwrap(), 1);
  assert_eq!(access::unread_count(&store, &outsider.requester(), None).await.unwrap(), 0);
  assert!(
    access::visible_notifications(&store, &outsider.requester(), None)
      .await
      .unwrap()
      .is_empty()
  );

  let updated = access::mark_read(&store, &outsider.requester(), &[id.clone()])
    .await
    .unwrap();
  assert_eq!(updated, 0);
  assert_eq!(access::unread_count(&store, &a.requester(), None).await.unwrap(), 1);

  let updated = access::mark_read(&store, &a.requester(), &[id]).await.unwrap();
  assert_eq!(updated, 1);
  assert_eq!(access::unread_count(&store, &a.requester(), None).await.unwrap(), 0);
}

#[tokio::test]
async fn reads_only_consider_the_most_recent_window() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let admin = account(&store, ADMIN_EMAIL, &[]).await;
  let ws = workspace(&store, "Ops", &admin).await;
  let a = person(&store, &ws, "a@example.com").await;
  let recipients = encode_id_list(std::slice::from_ref(&a.account.account_id));

  let mut ids = Vec::with_capacity(RECENT_NOTIFICATION_WINDOW + 1);
  for _ in 0..=RECENT_NOTIFICATION_WINDOW {
    let n = store
      .insert_notification(raw_notification(&ws, recipients.clone()))
      .await
      .unwrap();
    ids.push(n.notification_id);
  }

  let visible = access::visible_notifications(&store, &a.requester(), None)
    .await
    .unwrap();
  assert_eq!(visible.len(), RECENT_NOTIFICATION_WINDOW);
  assert_eq!(visible[0].notification_id, ids[RECENT_NOTIFICATION_WINDOW]);
  assert!(visible.iter().all(|n| n.notification_id != ids[0]));
  assert_eq!(
    access::unread_count(&store, &a.requester(), None).await.unwrap(),
    RECENT_NOTIFICATION_WINDOW
  );
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn workspace_broadcast_reaches_every_employee() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let admin = account(&store, ADMIN_EMAIL, &[]).await;
  let ws = workspace(&store, "Ops", &admin).await;
  let other_ws = workspace(&store, "Sales", &admin).await;
  let staff = [
    person(&store, &ws, "a@example.com").await,
    person(&store, &ws, "b@example.com").await,
    person(&store, &ws, "c@example.com").await,
  ];
  store
    .register_push_token(staff[0].account.account_id.clone(), "tok-a".into(), None)
    .await
    .unwrap();
  store
    .register_push_token(staff[2].account.account_id.clone(), "tok-c".into(), None)
    .await
    .unwrap();

  let transport = Arc::new(RecordingTransport::default());
  let fanout = FanOut::new(Arc::clone(&store), Arc::clone(&transport));
  let mut announcement = notice(&ws, &admin, NotificationKind::AdminMessage);
  announcement.priority = NotificationPriority::High;
  let report = fanout
    .send(announcement, &Target::AllUsersInWorkspace(ws.clone()))
    .await
    .unwrap();

  assert_eq!(report.recipients.len(), 3);
  assert_eq!(report.push.succeeded, 2);
  {
    let sent = transport.sent.lock().unwrap();
    let (_, message) = &sent[0];
    assert_eq!(message.data["type"], "admin_message");
    assert_eq!(message.data["priority"], "high");
  }

  for member in &staff {
    let in_ws = access::visible_notifications(&*store, &member.requester(), Some(&ws))
      .await
      .unwrap();
    assert_eq!(in_ws.len(), 1);
    let elsewhere = access::visible_notifications(&*store, &member.requester(), Some(&other_ws))
      .await
      .unwrap();
    assert!(elsewhere.is_empty());
  }

  let managed = access::workspace_broadcasts(&*store, &admin, ADMIN_EMAIL, &ws)
    .await
    .unwrap();
  assert_eq!(managed.len(), 1);
  let err = access::workspace_broadcasts(&*store, &staff[0].account, ADMIN_EMAIL, &ws)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Authorization(_)), "{err}");
}

#[tokio::test]
async fn broadcast_to_empty_workspace_writes_nothing() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let admin = account(&store, ADMIN_EMAIL, &[]).await;
  let ws = workspace(&store, "Empty", &admin).await;
  let fanout = FanOut::new(Arc::clone(&store), Arc::new(RecordingTransport::default()));

  let err = fanout
    .send(
      notice(&ws, &admin, NotificationKind::AdminMessage),
      &Target::AllUsersInWorkspace(ws.clone()),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::RecipientResolution(_)), "{err}");
  assert!(
    store
      .query_notifications(&NotificationQuery::default())
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn assigning_a_task_notifies_the_assignee() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let admin = account(&store, ADMIN_EMAIL, &[]).await;
  let ws = workspace(&store, "Ops", &admin).await;
  let alice = person(&store, &ws, "alice@example.com").await;
  let bob = person(&store, &ws, "bob@example.com").await;

  // The caller supplies an account id; storage gets the employee id.
  let assignee_field =
    normalize_assignee_input(&*store, &[alice.account.account_id.to_string()])
      .await
      .unwrap();
  assert_eq!(assignee_field, alice.employee.as_str());

  let task = store
    .add_task(NewTask {
      workspace_id: ws.clone(),
      title:        "Ship release".into(),
      description:  None,
      status:       TaskStatus::Todo,
      priority:     TaskPriority::High,
      due_date:     None,
      assignee_id:  assignee_field,
      created_by:   admin.account_id.clone(),
    })
    .await
    .unwrap();

  let fanout = FanOut::new(Arc::clone(&store), Arc::new(RecordingTransport::default()));
  let report = fanout
    .notify_task(
      &task,
      &decode_assignee_field(&task.assignee_id),
      NotificationKind::TaskAssigned,
      "You have been assigned a task".into(),
      &admin.account_id,
    )
    .await
    .unwrap()
    .expect("assignee resolved");
  assert_eq!(report.recipients, vec![alice.account.account_id.clone()]);

  let resolver = IdentityResolver::new(&*store);
  let as_alice = resolver.requester(&alice.account.account_id).await.unwrap();
  let seen = access::visible_notifications(&*store, &as_alice, None)
    .await
    .unwrap();
  assert_eq!(seen.len(), 1);
  assert_eq!(seen[0].kind, NotificationKind::TaskAssigned);
  assert_eq!(seen[0].priority, NotificationPriority::High);
  assert_eq!(seen[0].task_id.as_ref(), Some(&task.task_id));
  assert_eq!(seen[0].title, "New task: Ship release");

  let as_bob = resolver.requester(&bob.account.account_id).await.unwrap();
  assert!(
    access::visible_notifications(&*store, &as_bob, None)
      .await
      .unwrap()
      .is_empty()
  );

  // "My tasks" matches under either identity.
  let tasks = store.list_tasks(Some(&ws)).await.unwrap();
  let mine: Vec<_> = tasks.iter().filter(|t| is_assigned_to(t, &as_alice)).collect();
  assert_eq!(mine.len(), 1);
  let account_only = Requester::new(alice.account.account_id.clone(), None);
  assert!(!is_assigned_to(&task, &account_only));
  assert!(!tasks.iter().any(|t| is_assigned_to(t, &as_bob)));
}

#[tokio::test]
async fn task_without_resolvable_assignees_sends_nothing() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let admin = account(&store, ADMIN_EMAIL, &[]).await;
  let ws = workspace(&store, "Ops", &admin).await;
  let task = store
    .add_task(NewTask {
      workspace_id: ws,
      title:        "Orphan".into(),
      description:  None,
      status:       TaskStatus::Backlog,
      priority:     TaskPriority::Low,
      due_date:     None,
      assignee_id:  String::new(),
      created_by:   admin.account_id.clone(),
    })
    .await
    .unwrap();

  let fanout = FanOut::new(Arc::clone(&store), Arc::new(RecordingTransport::default()));
  let outcome = fanout
    .notify_task(
      &task,
      &["ghost".to_string()],
      NotificationKind::TaskUpdate,
      "changed".into(),
      &admin.account_id,
    )
    .await
    .unwrap();
  assert!(outcome.is_none());
}
