use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of `auth_user`. The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbAccount {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// Row of `accounts_profile`, one per account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbProfile {
    pub id: i64,
    pub user_id: i64,
    pub avatar: String,
    pub bio: Option<String>,
    pub role: ProfileRole,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ProfileRole {
    #[default]
    Student,
    Teacher,
}

/// Insert payload for a privileged account; `password_hash` is already bcrypt'd.
#[derive(Debug, Clone)]
pub struct NewSuperuser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

pub const DEFAULT_AVATAR: &str = "default.jpg";
