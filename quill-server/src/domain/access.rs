//! Access decisions for posts.
//!
//! Pure functions over the verified principal and the stored post. The
//! principal always comes from a verified token; ids in request bodies are
//! never consulted.

use crate::domain::account::Role;
use crate::domain::post::Post;
use serde::{Deserialize, Serialize};

/// The verified identity decoded from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub name: String,
}

/// Any authenticated account may create posts. Anonymous callers are
/// rejected upstream by the bearer-token extractor.
pub fn can_create(_principal: &Principal) -> bool {
    true
}

/// Reading and listing posts is public.
#[allow(dead_code)]
pub fn can_read(_principal: Option<&Principal>, _post: &Post) -> bool {
    true
}

/// The post's owner or an admin may update it.
pub fn can_update(principal: &Principal, post: &Post) -> bool {
    principal.id == post.account_id || principal.role == Role::Admin
}

/// Only admins may delete. Ownership alone is not enough.
pub fn can_delete(principal: &Principal, _post: &Post) -> bool {
    principal.role == Role::Admin
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn principal(id: i64, role: Role) -> Principal {
        Principal {
            id,
            email: format!("user{}@example.com", id),
            role,
            name: format!("User {}", id),
        }
    }

    fn post(id: i64, account_id: i64) -> Post {
        let now = Utc::now();
        Post {
            id,
            title: "title".to_string(),
            content: "content".to_string(),
            account_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_can_update_own_post() {
        let owner = principal(1, Role::User);
        assert!(can_update(&owner, &post(7, 1)));
    }

    #[test]
    fn other_user_cannot_update_post() {
        let other = principal(2, Role::User);
        assert!(!can_update(&other, &post(7, 1)));
    }

    #[test]
    fn admin_can_update_any_post() {
        let admin = principal(3, Role::Admin);
        assert!(can_update(&admin, &post(7, 1)));
    }

    #[test]
    fn only_admin_can_delete() {
        let owner = principal(1, Role::User);
        let other = principal(2, Role::User);
        let admin = principal(3, Role::Admin);
        let p = post(7, 1);

        assert!(!can_delete(&owner, &p));
        assert!(!can_delete(&other, &p));
        assert!(can_delete(&admin, &p));
    }

    #[test]
    fn anyone_authenticated_can_create() {
        assert!(can_create(&principal(1, Role::User)));
        assert!(can_create(&principal(2, Role::Admin)));
    }

    #[test]
    fn reading_is_public() {
        let p = post(7, 1);
        assert!(can_read(None, &p));
        assert!(can_read(Some(&principal(2, Role::User)), &p));
    }
}
