//! Reconciliation between account ids and employee-record ids.
//!
//! The same person has two stable identifiers and historical call paths use
//! them interchangeably. Anything that compares identities goes through
//! [`IdentityResolver`] instead of comparing raw strings.

use taskdesk_core::{
  id::{AccountId, EmployeeId},
  store::DirectoryStore,
  visibility::Requester,
};

use crate::{Error, Result};

pub struct IdentityResolver<'a, S> {
  store: &'a S,
}

impl<'a, S: DirectoryStore> IdentityResolver<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Canonical employee id for `raw`, which may be either kind of id.
  ///
  /// An employee whose `user_id` equals `raw` wins; otherwise `raw` is tried
  /// as an employee id directly. `None` means `raw` names nobody.
  pub async fn to_employee_identity(&self, raw: &str) -> Result<Option<EmployeeId>> {
    let raw = raw.trim();
    if raw.is_empty() {
      return Ok(None);
    }

    if let Some(employee) = self
      .store
      .find_employee_by_user(&AccountId::from(raw))
      .await
      .map_err(Error::store)?
    {
      return Ok(Some(employee.employee_id));
    }

    Ok(
      self
        .store
        .get_employee(&EmployeeId::from(raw))
        .await
        .map_err(Error::store)?
        .map(|employee| employee.employee_id),
    )
  }

  /// Account id for a stored assignee id.
  ///
  /// Stored ids are employee ids, except on legacy rows where they may be
  /// account ids; both are accepted.
  pub async fn to_account_identity(&self, raw: &str) -> Result<Option<AccountId>> {
    let raw = raw.trim();
    if raw.is_empty() {
      return Ok(None);
    }

    if let Some(employee) = self
      .store
      .get_employee(&EmployeeId::from(raw))
      .await
      .map_err(Error::store)?
    {
      return Ok(Some(employee.user_id));
    }

    let as_account = AccountId::from(raw);
    if self
      .store
      .find_employee_by_user(&as_account)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Ok(Some(as_account));
    }

    Ok(
      self
        .store
        .get_account(&as_account)
        .await
        .map_err(Error::store)?
        .map(|account| account.account_id),
    )
  }

  /// Both identities of the account making a request.
  pub async fn requester(&self, account: &AccountId) -> Result<Requester> {
    let employee = self
      .store
      .find_employee_by_user(account)
      .await
      .map_err(Error::store)?;
    Ok(Requester::new(
      account.clone(),
      employee.map(|e| e.employee_id),
    ))
  }
}
