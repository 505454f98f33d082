use crate::db::models::{DEFAULT_AVATAR, DbAccount, DbProfile, NewSuperuser, ProfileRole};
use crate::error::BootError;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, is_superuser, is_staff, \
                               is_active, date_joined";

/// Build a pool without opening a connection; the first query does that.
///
/// `acquire_timeout` bounds how long a single readiness probe may hang.
/// SQLite creates a missing file but not a missing directory, so the
/// directory holding the database file is created here.
pub fn lazy_pool(database_url: &str, acquire_timeout: Duration) -> Result<SqlitePool, BootError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    ensure_parent_dir(connect_opts.get_filename())?;
    let pool = SqlitePoolOptions::new()
        .acquire_timeout(acquire_timeout)
        .connect_lazy_with(connect_opts);
    Ok(pool)
}

fn ensure_parent_dir(db_file: &Path) -> Result<(), BootError> {
    // in-memory databases are named `:memory:` or `file:...`
    let name = db_file.to_string_lossy();
    if name.starts_with(':') || name.starts_with("file:") {
        return Ok(());
    }
    match db_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
            std::fs::create_dir_all(dir)?;
            info!(path = %dir.display(), "created database directory");
            Ok(())
        }
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct AccountsStorage {
    pool: SqlitePool,
}

impl AccountsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheapest round trip that proves a connection can be acquired.
    pub async fn ping(&self) -> Result<(), BootError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<DbAccount>, BootError> {
        let row = sqlx::query_as::<_, DbAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM auth_user WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a superuser together with its default profile in one transaction.
    pub async fn insert_superuser(&self, new: NewSuperuser) -> Result<DbAccount, BootError> {
        let mut tx = self.pool.begin().await?;

        let account = sqlx::query_as::<_, DbAccount>(&format!(
            r#"INSERT INTO auth_user (
                username, email, password_hash, is_superuser, is_staff, is_active, date_joined
            ) VALUES (?, ?, ?, 1, 1, 1, ?)
            RETURNING {ACCOUNT_COLUMNS}"#
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO accounts_profile (user_id, avatar, role) VALUES (?, ?, ?)")
            .bind(account.id)
            .bind(DEFAULT_AVATAR)
            .bind(ProfileRole::default())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(account)
    }

    pub async fn profile_for(&self, user_id: i64) -> Result<Option<DbProfile>, BootError> {
        let row = sqlx::query_as::<_, DbProfile>(
            "SELECT id, user_id, avatar, bio, role FROM accounts_profile WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn count_accounts(&self) -> Result<i64, BootError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM auth_user")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::apply_pending;

    async fn memory_storage() -> AccountsStorage {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("memory url")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .expect("open in-memory sqlite");
        apply_pending(&pool).await.expect("migrate");
        AccountsStorage::new(pool)
    }

    fn new_superuser(username: &str) -> NewSuperuser {
        NewSuperuser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$2b$04$notarealhash".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_creates_account_and_profile() {
        let storage = memory_storage().await;
        let account = storage
            .insert_superuser(new_superuser("admin"))
            .await
            .expect("insert");

        assert!(account.is_superuser && account.is_staff && account.is_active);
        let fetched = storage
            .find_by_username("admin")
            .await
            .expect("query")
            .expect("present");
        assert_eq!(fetched, account);

        let profile = storage
            .profile_for(account.id)
            .await
            .expect("query")
            .expect("profile created");
        assert_eq!(profile.role, ProfileRole::Student);
        assert_eq!(profile.avatar, DEFAULT_AVATAR);
        assert_eq!(profile.bio, None);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_database_error() {
        let storage = memory_storage().await;
        storage
            .insert_superuser(new_superuser("admin"))
            .await
            .expect("first insert");
        let err = storage
            .insert_superuser(new_superuser("admin"))
            .await
            .expect_err("unique username");
        assert!(matches!(err, BootError::DatabaseError(_)));
        assert_eq!(storage.count_accounts().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn missing_username_is_none() {
        let storage = memory_storage().await;
        assert!(
            storage
                .find_by_username("nobody")
                .await
                .expect("query")
                .is_none()
        );
    }

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "assignmate-{tag}-{}-{}",
            std::process::id(),
            nanos
        ))
    }

    #[tokio::test]
    async fn lazy_pool_creates_missing_database_directory() {
        let root = scratch_dir("lazy-pool");
        let db_path = root.join("nested/data/db.sqlite");
        let url = format!("sqlite://{}", db_path.display());

        let storage = AccountsStorage::new(
            lazy_pool(&url, Duration::from_secs(1)).expect("pool"),
        );
        assert!(db_path.parent().expect("parent").is_dir());
        storage.ping().await.expect("database opens");
        assert!(db_path.is_file());

        storage.pool().close().await;
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn lazy_pool_fails_fast_when_directory_cannot_exist() {
        let root = scratch_dir("lazy-pool-file");
        std::fs::create_dir_all(&root).expect("scratch dir");
        let blocker = root.join("not-a-dir");
        std::fs::write(&blocker, b"").expect("blocker file");
        let url = format!("sqlite://{}", blocker.join("db.sqlite").display());

        let err = lazy_pool(&url, Duration::from_secs(1)).expect_err("parent is a file");
        assert!(matches!(err, BootError::Io(_)));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn lazy_pool_leaves_memory_urls_alone() {
        let storage = AccountsStorage::new(
            lazy_pool("sqlite::memory:", Duration::from_secs(1)).expect("pool"),
        );
        storage.ping().await.expect("memory database opens");
    }
}
