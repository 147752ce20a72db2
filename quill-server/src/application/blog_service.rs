use crate::data::post_repository::PostRepository;
use crate::domain::access;
use crate::domain::post::{CreatePostRequest, PostResponse, PostWithAuthor, UpdatePostRequest};
use crate::domain::{DomainError, Principal};
use std::sync::Arc;

pub struct BlogService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
}

impl BlogService {
    pub fn new(post_repo: Arc<dyn PostRepository + Send + Sync>) -> Self {
        Self { post_repo }
    }

    /// Create a post owned by the acting principal. The owner always comes
    /// from the verified token, never from the request body.
    pub async fn create_post(
        &self,
        principal: &Principal,
        req: CreatePostRequest,
    ) -> Result<PostResponse, DomainError> {
        validate_post_fields(&req.title, &req.content)?;

        if !access::can_create(principal) {
            return Err(DomainError::Forbidden);
        }

        let post = self
            .post_repo
            .create(&req.title, &req.content, principal.id)
            .await?;

        tracing::info!("Post created: id={}, account_id={}", post.id, principal.id);

        Ok(PostResponse::from(post))
    }

    /// Update title and content. Validation runs first, then the lookup,
    /// then the access decision; the store is only touched afterwards.
    pub async fn update_post(
        &self,
        principal: &Principal,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostResponse, DomainError> {
        validate_post_fields(&req.title, &req.content)?;

        let post = self
            .post_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound)?;

        if !access::can_update(principal, &post) {
            tracing::warn!(
                "Account {} denied update of post {} owned by {}",
                principal.id,
                id,
                post.account_id
            );
            return Err(DomainError::Forbidden);
        }

        let updated = self.post_repo.update(id, &req.title, &req.content).await?;

        tracing::info!("Post updated: id={}, account_id={}", id, principal.id);

        Ok(PostResponse::from(updated))
    }

    pub async fn delete_post(&self, principal: &Principal, id: i64) -> Result<(), DomainError> {
        let post = self
            .post_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound)?;

        if !access::can_delete(principal, &post) {
            tracing::warn!(
                "Account {} denied delete of post {} owned by {}",
                principal.id,
                id,
                post.account_id
            );
            return Err(DomainError::Forbidden);
        }

        self.post_repo.delete(id).await?;

        tracing::info!("Post deleted: id={}, by account_id={}", id, principal.id);

        Ok(())
    }

    pub async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        self.post_repo.list_with_authors().await
    }
}

fn validate_post_fields(title: &str, content: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Missing required fields: title, content".to_string(),
        ));
    }
    Ok(())
}
