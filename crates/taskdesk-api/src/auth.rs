//! HTTP Basic authentication against the accounts table.
//!
//! The username is the account email; the password is checked against the
//! account's argon2 PHC string.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::{self, SaltString},
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;
use taskdesk_core::{account::Account, store::DirectoryStore};

use crate::{AppState, Store, error::ApiError};

/// The authenticated caller's account.
pub struct CurrentUser(pub Account);

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Split a `Basic` authorization header into `(email, password)`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let encoded = value.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (email, password) = creds.split_once(':')?;
  Some((email.to_string(), password.to_string()))
}

/// Resolve the request's credentials to an account.
pub async fn authenticate<S: DirectoryStore>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Account, ApiError> {
  let (email, password) = basic_credentials(headers).ok_or(ApiError::Unauthorized)?;

  let account = store
    .find_account_by_email(&email)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  // Accounts provisioned without a password cannot log in.
  if account.password_hash.is_empty() {
    return Err(ApiError::Unauthorized);
  }
  let parsed = PasswordHash::new(&account.password_hash).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(account)
}

impl<S: Store> FromRequestParts<AppState<S>> for CurrentUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let account = authenticate(&parts.headers, &*state.store).await?;
    Ok(CurrentUser(account))
  }
}
