use std::fmt::Debug;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use log::*;

use crate::{
    db_types::{NewUser, UserAccount},
    traits::{AuthApiError, UserManagement},
};

/// `AuthApi` registers users and checks their credentials. Passwords are stored as Argon2id PHC strings.
pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    /// Creates a user and an empty wallet for them.
    ///
    /// Fails with [`AuthApiError::UserAlreadyExists`] if the login is taken, or
    /// [`AuthApiError::InvalidCredentials`] if the login or password is blank.
    pub async fn register(&self, user: NewUser) -> Result<UserAccount, AuthApiError> {
        let login = user.login.trim();
        if login.is_empty() {
            return Err(AuthApiError::InvalidCredentials("Login cannot be empty".into()));
        }
        if user.password.reveal().is_empty() {
            return Err(AuthApiError::InvalidCredentials("Password cannot be empty".into()));
        }
        let password = user.password.reveal().clone();
        let hash = run_blocking(move || hash_password(&password)).await?;
        let (account, _) = self.db.create_user_with_wallet(login, &hash).await?;
        info!("🔑️ New user {login} registered as #{}", account.id);
        Ok(account)
    }

    /// Checks a login and password. Any mismatch, including an unknown login, is reported as
    /// [`AuthApiError::WrongCredentials`].
    pub async fn login(&self, user: NewUser) -> Result<UserAccount, AuthApiError> {
        let login = user.login.trim();
        let account = match self.db.fetch_user_by_login(login).await? {
            Some(account) => account,
            None => {
                debug!("🔑️ Login attempt for unknown user {login}");
                return Err(AuthApiError::WrongCredentials);
            },
        };
        let password = user.password.reveal().clone();
        let hash = account.password_hash.clone();
        if !run_blocking(move || verify_password(&password, &hash)).await? {
            debug!("🔑️ Wrong password for user {login}");
            return Err(AuthApiError::WrongCredentials);
        }
        debug!("🔑️ User {login} logged in");
        Ok(account)
    }
}

/// Runs password hashing on the blocking thread pool, off the request workers.
async fn run_blocking<T, F>(f: F) -> Result<T, AuthApiError>
where
    F: FnOnce() -> Result<T, AuthApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| AuthApiError::PasswordHashError(e.to_string()))?
}

pub fn hash_password(password: &str) -> Result<String, AuthApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthApiError::PasswordHashError(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthApiError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthApiError::PasswordHashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hashes_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
        assert!(verify_password("correct horse", "not a hash").is_err());
    }
}
