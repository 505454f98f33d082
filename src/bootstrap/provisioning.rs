use crate::bootstrap::store::Store;
use crate::config::SuperuserSettings;
use crate::db::{DbAccount, NewSuperuser};
use crate::error::BootError;
use tracing::info;

/// Outcome of [`ensure_superuser`].
#[derive(Debug, Clone, PartialEq)]
pub enum Provisioned {
    Created(DbAccount),
    AlreadyPresent(DbAccount),
}

impl Provisioned {
    pub fn account(&self) -> &DbAccount {
        match self {
            Provisioned::Created(a) | Provisioned::AlreadyPresent(a) => a,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Provisioned::Created(_))
    }
}

/// Create the configured superuser unless an account with that username exists.
///
/// Keyed on username only: a different username on a later start produces a
/// second account, never an update of the first.
pub async fn ensure_superuser<S: Store>(
    store: &S,
    settings: &SuperuserSettings,
) -> Result<Provisioned, BootError> {
    if let Some(existing) = store.find_account(&settings.username).await? {
        info!(username = %existing.username, "Superuser already exists.");
        return Ok(Provisioned::AlreadyPresent(existing));
    }

    let password_hash = hash_password(&settings.password, settings.hash_cost).await?;
    let new = NewSuperuser {
        username: settings.username.clone(),
        email: settings.email.clone(),
        password_hash,
    };

    match store.create_superuser(new).await {
        Ok(account) => {
            info!(username = %account.username, id = account.id, "Superuser created.");
            Ok(Provisioned::Created(account))
        }
        // another starter inserted the same username between our check and insert
        Err(err) if is_unique_violation(&err) => {
            match store.find_account(&settings.username).await? {
                Some(existing) => {
                    info!(username = %existing.username, "Superuser already exists.");
                    Ok(Provisioned::AlreadyPresent(existing))
                }
                None => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

/// bcrypt is CPU-bound, so it runs on the blocking pool.
async fn hash_password(password: &str, cost: u32) -> Result<String, BootError> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

fn is_unique_violation(err: &BootError) -> bool {
    match err {
        BootError::DatabaseError(sqlx::Error::Database(db)) => db.is_unique_violation(),
        _ => false,
    }
}
