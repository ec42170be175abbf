//! Authentication gate - email + secret login against stored credentials

use thiserror::Error;
use tracing::{info, warn};

use crate::db::Database;
use crate::models::Credential;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Preencha todos os campos.")]
    MissingFields,
    #[error("Este e-mail já está cadastrado.")]
    EmailTaken,
    /// Same message for unknown email and wrong secret
    #[error("E-mail ou senha incorretos.")]
    InvalidCredentials,
    #[error("storage failure")]
    Storage(#[from] anyhow::Error),
}

fn validate(email: &str, secret: &str) -> Result<(), AuthError> {
    if email.is_empty() || secret.is_empty() {
        return Err(AuthError::MissingFields);
    }
    Ok(())
}

/// Create a credential record. Returns the authenticated email.
pub fn register(db: &Database, email: &str, secret: &str) -> Result<String, AuthError> {
    validate(email, secret)?;

    let users = db.get_users()?;
    if users.iter().any(|u| u.email == email) {
        warn!("registration rejected: email already registered");
        return Err(AuthError::EmailTaken);
    }

    db.save_user(&Credential {
        email: email.to_string(),
        secret: secret.to_string(),
    })?;
    info!(email, "registered new identity");
    Ok(email.to_string())
}

/// Exact-match lookup of email and secret. Returns the authenticated email.
pub fn login(db: &Database, email: &str, secret: &str) -> Result<String, AuthError> {
    validate(email, secret)?;

    let users = db.get_users()?;
    match users.iter().find(|u| u.email == email && u.secret == secret) {
        Some(user) => {
            info!(email, "login succeeded");
            Ok(user.email.clone())
        }
        None => Err(AuthError::InvalidCredentials),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_login() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(register(&db, "ana@x.com", "segredo").unwrap(), "ana@x.com");
        assert_eq!(login(&db, "ana@x.com", "segredo").unwrap(), "ana@x.com");
    }

    #[test]
    fn test_register_duplicate_keeps_first() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "ana@x.com", "first").unwrap();

        let err = register(&db, "ana@x.com", "second").unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        let users = db.get_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].secret, "first");
        assert!(login(&db, "ana@x.com", "first").is_ok());
        assert!(login(&db, "ana@x.com", "second").is_err());
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "ana@x.com", "segredo").unwrap();

        let wrong_secret = login(&db, "ana@x.com", "errado").unwrap_err();
        let unknown_email = login(&db, "bob@x.com", "segredo").unwrap_err();

        assert!(matches!(wrong_secret, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_secret.to_string(), unknown_email.to_string());
    }

    #[test]
    fn test_login_is_exact_match() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "ana@x.com", "Segredo").unwrap();
        assert!(login(&db, "ana@x.com", "segredo").is_err());
        assert!(login(&db, "ANA@x.com", "Segredo").is_err());
    }

    #[test]
    fn test_empty_fields_rejected_without_state_change() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(register(&db, "", "x"), Err(AuthError::MissingFields)));
        assert!(matches!(register(&db, "a@x.com", ""), Err(AuthError::MissingFields)));
        assert!(matches!(login(&db, "", ""), Err(AuthError::MissingFields)));
        assert!(db.get_users().unwrap().is_empty());
    }
}
