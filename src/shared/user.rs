//! Public user profile
//!
//! The shape of a user as other members see it. Password hashes and session
//! data never leave the backend.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User as exposed by `/api/auth/me` and the member listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserProfile {
    /// "First Last", used by clients that don't show nicknames
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            nickname: "ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        };
        assert_eq!(profile.full_name(), "Ada Lovelace");
    }
}
