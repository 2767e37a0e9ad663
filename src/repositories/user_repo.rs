use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, User, UserRole};

#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<i64> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?")?;
            let result = stmt.query_row([&id], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Lookup is case-insensitive; emails are stored lowercased.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let email = email.trim().to_lowercase();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM users WHERE email = ?")?;
            let result = stmt.query_row([&email], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Create a user. Fails with `Conflict` when the email is taken.
    pub async fn create(&self, email: &str, password: &str, role: UserRole) -> Result<User> {
        let password_hash = hash_password(password)?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            role,
            disclaimer_accepted_at: None,
            created_at: Utc::now(),
        };

        let pool = self.pool.clone();
        let row = user.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            let inserted = conn.execute(
                "INSERT INTO users (id, email, password_hash, role, created_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(email) DO NOTHING",
                rusqlite::params![
                    row.id,
                    row.email,
                    row.password_hash,
                    row.role.as_str(),
                    row.created_at
                ],
            )?;
            if inserted == 0 {
                return Err(AppError::Conflict("Email is already registered".to_string()));
            }
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(user)
    }

    /// Register a new account; the very first account becomes admin.
    ///
    /// The role is decided inside one IMMEDIATE transaction, so two
    /// simultaneous first registrations cannot both see an empty table.
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        let password_hash = hash_password(password)?;
        let id = Uuid::new_v4().to_string();
        let email = email.trim().to_lowercase();
        let now = Utc::now();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let inserted = tx.execute(
                "INSERT INTO users (id, email, password_hash, role, created_at)
                 SELECT ?1, ?2, ?3,
                        CASE WHEN EXISTS (SELECT 1 FROM users) THEN ?4 ELSE ?5 END,
                        ?6
                 WHERE true
                 ON CONFLICT(email) DO NOTHING",
                rusqlite::params![
                    id,
                    email,
                    password_hash,
                    UserRole::User.as_str(),
                    UserRole::Admin.as_str(),
                    now
                ],
            )?;
            if inserted == 0 {
                return Err(AppError::Conflict("Email is already registered".to_string()));
            }
            let user = tx.query_row("SELECT * FROM users WHERE id = ?", [&id], User::from_row)?;
            tx.commit()?;
            Ok(user)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = self.find_by_email(email).await?;

        match user {
            Some(user) => {
                if verify_password(password, &user.password_hash)? {
                    Ok(Some(user))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    /// Record disclaimer acceptance. The first acceptance timestamp is kept;
    /// returns the effective timestamp.
    pub async fn accept_disclaimer(&self, id: &str) -> Result<DateTime<Utc>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let now = Utc::now();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "UPDATE users SET disclaimer_accepted_at = ?
                 WHERE id = ? AND disclaimer_accepted_at IS NULL",
                rusqlite::params![now, id],
            )?;
            let accepted_at: Option<Option<DateTime<Utc>>> = conn
                .query_row(
                    "SELECT disclaimer_accepted_at FROM users WHERE id = ?",
                    [&id],
                    |row| row.get(0),
                )
                .optional()?;
            accepted_at
                .flatten()
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::PasswordHash)?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::migrations::run_migrations_for_tests;

    fn repo() -> UserRepository {
        let pool = create_memory_pool().unwrap();
        run_migrations_for_tests(&pool).unwrap();
        UserRepository::new(pool)
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_first_registered_user_is_admin() {
        let repo = repo();
        let first = repo.register("first@example.com", "password1").await.unwrap();
        let second = repo.register("second@example.com", "password2").await.unwrap();
        assert_eq!(first.role, UserRole::Admin);
        assert_eq!(second.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_case_insensitively() {
        let repo = repo();
        repo.register("jo@example.com", "password1").await.unwrap();
        let err = repo.register("JO@example.com ", "password2").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_accept_disclaimer_keeps_first_timestamp() {
        let repo = repo();
        let user = repo.register("jo@example.com", "password1").await.unwrap();
        let first = repo.accept_disclaimer(&user.id).await.unwrap();
        let second = repo.accept_disclaimer(&user.id).await.unwrap();
        assert_eq!(first, second);

        let reloaded = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(reloaded.has_accepted_disclaimer());
    }

    #[tokio::test]
    async fn test_accept_disclaimer_unknown_user() {
        let repo = repo();
        let err = repo.accept_disclaimer("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_registrations_yield_one_admin() {
        let path = std::env::temp_dir().join(format!("physiotrack-{}.db", Uuid::new_v4()));
        let pool = crate::db::create_pool(path.to_str().unwrap()).unwrap();
        crate::migrations::run_migrations(&pool).unwrap();
        let repo = UserRepository::new(pool);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.register(&format!("user{}@example.com", i), "password1")
                        .await
                })
            })
            .collect();

        let mut admins = 0;
        for handle in handles {
            let user = handle.await.unwrap().unwrap();
            if user.role == UserRole::Admin {
                admins += 1;
            }
        }
        assert_eq!(admins, 1);
        assert_eq!(repo.count().await.unwrap(), 8);

        drop(repo);
        let _ = std::fs::remove_file(&path);
    }
}
