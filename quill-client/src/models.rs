use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Public account fields as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List entry: a post plus its author's public fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogListEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_name: String,
    pub author_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: AccountInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SigninResponse {
    pub message: String,
    pub token: String,
    pub user: AccountInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogsResponse {
    pub message: String,
    pub count: usize,
    pub blogs: Vec<BlogListEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogResponse {
    pub message: String,
    pub blog: BlogPost,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct BlogBody {
    pub title: String,
    pub content: String,
}

/// The credential held by a signed-in client: the bearer token plus the
/// account identity cached at signin time.
///
/// The cached identity only drives what the client chooses to display; the
/// server re-derives every decision from the verified token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub account: AccountInfo,
}

impl Credential {
    /// Whether the UI should offer an edit action for a post owned by
    /// `account_id`: owner or admin.
    pub fn can_edit(&self, account_id: i64) -> bool {
        self.account.id == account_id || self.account.role == Role::Admin
    }

    /// Whether the UI should offer a delete action: admin only.
    pub fn can_delete(&self) -> bool {
        self.account.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(id: i64, role: Role) -> Credential {
        Credential {
            token: "token".to_string(),
            account: AccountInfo {
                id,
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                role,
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn edit_is_offered_to_owner_and_admin() {
        assert!(credential(1, Role::User).can_edit(1));
        assert!(!credential(2, Role::User).can_edit(1));
        assert!(credential(3, Role::Admin).can_edit(1));
    }

    #[test]
    fn delete_is_offered_to_admin_only() {
        assert!(!credential(1, Role::User).can_delete());
        assert!(credential(3, Role::Admin).can_delete());
    }

    #[test]
    fn roles_deserialize_from_lowercase() {
        assert_eq!(
            serde_json::from_str::<Role>("\"admin\"").unwrap(),
            Role::Admin
        );
        assert_eq!(serde_json::from_str::<Role>("\"user\"").unwrap(), Role::User);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }
}
