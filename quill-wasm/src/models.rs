use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub account_id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub author_name: String,
    pub author_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub account_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: AccountInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SigninResponse {
    pub message: String,
    pub token: String,
    pub user: AccountInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlogsResponse {
    pub message: String,
    pub count: usize,
    pub blogs: Vec<Blog>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlogMutationResponse {
    pub message: String,
    pub blog: BlogPost,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogBody {
    pub title: String,
    pub content: String,
}

impl AccountInfo {
    /// Whether the edit button should render for a blog owned by
    /// `account_id`. Advisory only; the server re-checks on every request.
    pub fn can_edit(&self, account_id: i64) -> bool {
        self.id == account_id || self.role == Role::Admin
    }

    /// Whether the delete button should render. Admins only.
    pub fn can_delete(&self) -> bool {
        self.role == Role::Admin
    }
}
