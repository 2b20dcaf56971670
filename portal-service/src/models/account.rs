//! Account model - a portal login with a single role.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account roles. Stored and serialized lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Employee, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, so `"User"` and `"user"` name the same role.
impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            "user" => Ok(Role::User),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Account entity as persisted in the `accounts` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub id_number: String,
    pub account_number: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime,
}

impl Account {
    pub fn new(
        full_name: String,
        id_number: String,
        account_number: String,
        password_hash: String,
        role: Role,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            full_name,
            id_number,
            account_number,
            password_hash,
            role,
            created_at: DateTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_ignores_case() {
        assert_eq!("User".parse::<Role>(), Ok(Role::User));
        assert_eq!(" EMPLOYEE ".parse::<Role>(), Ok(Role::Employee));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
