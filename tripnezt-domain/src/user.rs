use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Pending,
    Approved,
    Rejected,
    Blocked,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
            UserStatus::Rejected => "rejected",
            UserStatus::Blocked => "blocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(UserStatus::Active),
            "pending" => Some(UserStatus::Pending),
            "approved" => Some(UserStatus::Approved),
            "rejected" => Some(UserStatus::Rejected),
            "blocked" => Some(UserStatus::Blocked),
            _ => None,
        }
    }
}

/// Authentication identity plus role and approval status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// An admin role only counts once the account is approved; the
    /// primary admin bypasses the approval gate entirely.
    pub fn can_operate(&self, primary_admin_email: &str) -> bool {
        if self.role != Role::Admin {
            return false;
        }
        if self.email.eq_ignore_ascii_case(primary_admin_email) {
            return true;
        }
        self.status == UserStatus::Approved
    }

    pub fn is_blocked(&self) -> bool {
        self.status == UserStatus::Blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: Role, status: UserStatus, email: &str) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: "Tester".to_string(),
            email: email.to_string(),
            role,
            status,
            phone: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn approved_admin_can_operate() {
        let p = profile(Role::Admin, UserStatus::Approved, "ops@example.in");
        assert!(p.can_operate("admin@tripnezt.in"));
    }

    #[test]
    fn pending_admin_cannot_operate() {
        let p = profile(Role::Admin, UserStatus::Pending, "ops@example.in");
        assert!(!p.can_operate("admin@tripnezt.in"));
    }

    #[test]
    fn primary_admin_bypasses_the_gate() {
        let p = profile(Role::Admin, UserStatus::Pending, "Admin@Tripnezt.in");
        assert!(p.can_operate("admin@tripnezt.in"));
    }

    #[test]
    fn regular_user_never_operates() {
        let p = profile(Role::User, UserStatus::Approved, "user@example.in");
        assert!(!p.can_operate("admin@tripnezt.in"));
    }
}
