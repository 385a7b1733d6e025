use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// The role assigned to a catalog account.
///
/// The `users.user_role` column stores the integer form; `Member` is the
/// default for self-registered accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Member,
    Librarian,
    Admin,
}

impl UserRole {
    /// Returns the integer stored in the `users.user_role` column.
    pub fn as_db_value(&self) -> i32 {
        match self {
            UserRole::Member => 1,
            UserRole::Librarian => 2,
            UserRole::Admin => 3,
        }
    }

    /// Maps a `users.user_role` column value back to a role.
    pub fn from_db_value(value: i32) -> Result<Self, CoreError> {
        match value {
            1 => Ok(UserRole::Member),
            2 => Ok(UserRole::Librarian),
            3 => Ok(UserRole::Admin),
            other => Err(CoreError::UnknownRole(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_db_value() {
        for role in [UserRole::Member, UserRole::Librarian, UserRole::Admin] {
            assert_eq!(UserRole::from_db_value(role.as_db_value()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_value_is_rejected() {
        assert!(UserRole::from_db_value(0).is_err());
        assert!(UserRole::from_db_value(42).is_err());
    }
}
