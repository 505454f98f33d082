use crate::db::migrations::apply_pending;
use crate::db::{AccountsStorage, DbAccount, NewSuperuser};
use crate::error::BootError;

/// Persistence operations the boot sequence depends on.
pub trait Store {
    /// Connectivity check used by the readiness gate.
    fn ping(&self) -> impl Future<Output = Result<(), BootError>> + Send;

    /// Apply pending schema migrations, returning how many ran.
    fn migrate(&self) -> impl Future<Output = Result<usize, BootError>> + Send;

    fn find_account(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<DbAccount>, BootError>> + Send;

    fn create_superuser(
        &self,
        new: NewSuperuser,
    ) -> impl Future<Output = Result<DbAccount, BootError>> + Send;
}

impl Store for AccountsStorage {
    async fn ping(&self) -> Result<(), BootError> {
        AccountsStorage::ping(self).await
    }

    async fn migrate(&self) -> Result<usize, BootError> {
        apply_pending(self.pool()).await
    }

    async fn find_account(&self, username: &str) -> Result<Option<DbAccount>, BootError> {
        self.find_by_username(username).await
    }

    async fn create_superuser(&self, new: NewSuperuser) -> Result<DbAccount, BootError> {
        self.insert_superuser(new).await
    }
}
