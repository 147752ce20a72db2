use crate::application::{AuthService, BlogService};
use crate::domain::account::{AccountResponse, SigninRequest, SignupRequest};
use crate::domain::post::{CreatePostRequest, PostResponse, PostWithAuthor, UpdatePostRequest};
use crate::domain::{DomainError, Principal};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

#[derive(serde::Serialize)]
struct SignupResponse {
    message: String,
    user: AccountResponse,
}

#[derive(serde::Serialize)]
struct SigninResponse {
    message: String,
    token: String,
    user: AccountResponse,
}

#[derive(serde::Serialize)]
struct BlogsResponse {
    message: String,
    count: usize,
    blogs: Vec<PostWithAuthor>,
}

#[derive(serde::Serialize)]
struct BlogResponse {
    message: String,
    blog: PostResponse,
}

// Преобразование DomainError в HttpResponse
fn error_to_response(err: DomainError) -> HttpResponse {
    let status_code = err.to_status_code();

    if status_code == 500 {
        // The cause stays in the logs; clients get a fixed message.
        tracing::error!("Request failed: {}", err);
        return HttpResponse::InternalServerError()
            .json(serde_json::json!({ "error": "Internal server error" }));
    }

    let message = err.to_string();
    match status_code {
        400 => HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
        401 => HttpResponse::Unauthorized().json(serde_json::json!({ "error": message })),
        403 => HttpResponse::Forbidden().json(serde_json::json!({ "error": message })),
        404 => HttpResponse::NotFound().json(serde_json::json!({ "error": message })),
        409 => HttpResponse::Conflict().json(serde_json::json!({ "error": message })),
        _ => HttpResponse::InternalServerError()
            .json(serde_json::json!({ "error": "Internal server error" })),
    }
}

/// Malformed or incomplete JSON bodies get the same `{error}` shape as every
/// other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        let response = HttpResponse::BadRequest().json(serde_json::json!({ "error": message }));
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

/// A non-numeric id in the path is a blog that does not exist.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let response =
            HttpResponse::NotFound().json(serde_json::json!({ "error": "Blog not found" }));
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/signup", web::post().to(signup))
        .route("/signin", web::post().to(signin))
        .route("/blogs", web::get().to(list_blogs))
        .route("/blogs", web::post().to(create_blog))
        .route("/blogs/{id}", web::put().to(update_blog))
        .route("/blogs/{id}", web::delete().to(delete_blog));
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Server is running" }))
}

// ============== Auth Handlers ==============

pub async fn signup(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<SignupRequest>,
) -> impl Responder {
    match auth_service.register(req.into_inner()).await {
        Ok(user) => HttpResponse::Created().json(SignupResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn signin(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<SigninRequest>,
) -> impl Responder {
    match auth_service.login(req.into_inner()).await {
        Ok((token, user)) => HttpResponse::Ok().json(SigninResponse {
            message: "Signin successful".to_string(),
            token,
            user,
        }),
        Err(err) => error_to_response(err),
    }
}

// ============== Blog Handlers ==============

pub async fn list_blogs(blog_service: web::Data<Arc<BlogService>>) -> impl Responder {
    match blog_service.list_posts().await {
        Ok(blogs) => HttpResponse::Ok().json(BlogsResponse {
            message: "Blogs retrieved successfully".to_string(),
            count: blogs.len(),
            blogs,
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_blog(
    principal: Principal,
    blog_service: web::Data<Arc<BlogService>>,
    body: web::Json<CreatePostRequest>,
) -> impl Responder {
    tracing::debug!("Creating blog for account_id={}", principal.id);

    match blog_service
        .create_post(&principal, body.into_inner())
        .await
    {
        Ok(blog) => HttpResponse::Created().json(BlogResponse {
            message: "Blog created successfully".to_string(),
            blog,
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn update_blog(
    principal: Principal,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> impl Responder {
    let blog_id = path.into_inner();

    tracing::debug!("Updating blog id={} for account_id={}", blog_id, principal.id);

    match blog_service
        .update_post(&principal, blog_id, body.into_inner())
        .await
    {
        Ok(blog) => HttpResponse::Ok().json(BlogResponse {
            message: "Blog updated successfully".to_string(),
            blog,
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_blog(
    principal: Principal,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let blog_id = path.into_inner();

    tracing::debug!("Deleting blog id={} for account_id={}", blog_id, principal.id);

    match blog_service.delete_post(&principal, blog_id).await {
        Ok(()) => HttpResponse::Ok()
            .json(serde_json::json!({ "message": "Blog deleted successfully" })),
        Err(err) => error_to_response(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::account_repository::AccountRepository;
    use crate::data::post_repository::PostRepository;
    use crate::domain::account::{Account, Role};
    use crate::domain::Post;
    use crate::infrastructure::jwt::JwtService;
    use actix_http::Request;
    use actix_web::body::BoxBody;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::{test, App};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MemoryAccountRepository {
        accounts: Mutex<Vec<Account>>,
        next_id: AtomicI64,
    }

    impl MemoryAccountRepository {
        fn get(&self, id: i64) -> Option<Account> {
            self.accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == id)
                .cloned()
        }
    }

    #[async_trait]
    impl AccountRepository for MemoryAccountRepository {
        async fn create(
            &self,
            name: &str,
            email: &str,
            password_hash: &str,
            role: Role,
        ) -> Result<Account, DomainError> {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.iter().any(|a| a.email == email) {
                return Err(DomainError::EmailAlreadyRegistered);
            }
            let account = Account {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                role,
                created_at: Utc::now(),
            };
            accounts.push(account.clone());
            Ok(account)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.email == email)
                .cloned())
        }
    }

    struct MemoryPostRepository {
        posts: Mutex<Vec<Post>>,
        next_id: AtomicI64,
        accounts: Arc<MemoryAccountRepository>,
    }

    impl MemoryPostRepository {
        fn new(accounts: Arc<MemoryAccountRepository>) -> Self {
            Self {
                posts: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(0),
                accounts,
            }
        }
    }

    #[async_trait]
    impl PostRepository for MemoryPostRepository {
        async fn create(
            &self,
            title: &str,
            content: &str,
            account_id: i64,
        ) -> Result<Post, DomainError> {
            let now = Utc::now();
            let post = Post {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                title: title.to_string(),
                content: content.to_string(),
                account_id,
                created_at: now,
                updated_at: now,
            };
            self.posts.lock().unwrap().push(post.clone());
            Ok(post)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self
                .posts
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned())
        }

        async fn update(
            &self,
            id: i64,
            title: &str,
            content: &str,
        ) -> Result<Post, DomainError> {
            let mut posts = self.posts.lock().unwrap();
            let post = posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(DomainError::PostNotFound)?;
            post.title = title.to_string();
            post.content = content.to_string();
            post.updated_at = Utc::now();
            Ok(post.clone())
        }

        async fn delete(&self, id: i64) -> Result<(), DomainError> {
            let mut posts = self.posts.lock().unwrap();
            let before = posts.len();
            posts.retain(|p| p.id != id);
            if posts.len() == before {
                Err(DomainError::PostNotFound)
            } else {
                Ok(())
            }
        }

        async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
            let mut posts = self.posts.lock().unwrap().clone();
            posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            posts
                .into_iter()
                .map(|p| {
                    let author = self.accounts.get(p.account_id).ok_or_else(|| {
                        DomainError::InternalError("author missing".to_string())
                    })?;
                    Ok(PostWithAuthor {
                        id: p.id,
                        title: p.title,
                        content: p.content,
                        account_id: p.account_id,
                        created_at: p.created_at,
                        updated_at: p.updated_at,
                        author_name: author.name,
                        author_email: author.email,
                    })
                })
                .collect()
        }
    }

    async fn init_app(
    ) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
        let accounts = Arc::new(MemoryAccountRepository::default());
        let posts = Arc::new(MemoryPostRepository::new(accounts.clone()));
        let jwt_service = Arc::new(JwtService::new("handler-test-secret-0123456789abcdef", 7));
        let auth_service = Arc::new(AuthService::new(accounts, jwt_service.clone()));
        let blog_service = Arc::new(BlogService::new(posts));

        test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(path_config())
                .app_data(web::Data::new(auth_service))
                .app_data(web::Data::new(blog_service))
                .app_data(web::Data::new(jwt_service))
                .configure(routes),
        )
        .await
    }

    async fn signup(
        app: &(impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>),
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> ServiceResponse<BoxBody> {
        let mut body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
        });
        if let Some(role) = role {
            body["role"] = serde_json::json!(role);
        }
        let req = test::TestRequest::post()
            .uri("/signup")
            .set_json(&body)
            .to_request();
        test::call_service(app, req).await
    }

    async fn signin_token(
        app: &(impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>),
        email: &str,
        password: &str,
    ) -> String {
        let req = test::TestRequest::post()
            .uri("/signin")
            .set_json(serde_json::json!({ "email": email, "password": password }))
            .to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_blog_with_token(
        app: &(impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>),
        token: &str,
        title: &str,
        content: &str,
    ) -> serde_json::Value {
        let req = test::TestRequest::post()
            .uri("/blogs")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({ "title": title, "content": content }))
            .to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), 201);
        test::read_body_json(resp).await
    }

    async fn list_blogs_body(
        app: &(impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>),
    ) -> serde_json::Value {
        let req = test::TestRequest::get().uri("/blogs").to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), 200);
        test::read_body_json(resp).await
    }

    #[actix_rt::test]
    async fn health_responds_ok() {
        let app = init_app().await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_rt::test]
    async fn signup_never_exposes_password_material() {
        let app = init_app().await;
        let resp = signup(&app, "Alice", "alice@example.com", "secret1", None).await;
        assert_eq!(resp.status(), 201);

        let raw = test::read_body(resp).await;
        let raw = std::str::from_utf8(&raw).unwrap();
        assert!(!raw.contains("password"));

        let body: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(body["user"]["email"], "alice@example.com");
        assert_eq!(body["user"]["role"], "user");
    }

    #[actix_rt::test]
    async fn duplicate_email_conflicts() {
        let app = init_app().await;
        let first = signup(&app, "Alice", "a@b.com", "secret1", None).await;
        assert_eq!(first.status(), 201);

        let second = signup(&app, "Other Alice", "a@b.com", "secret2", None).await;
        assert_eq!(second.status(), 409);
        let body: serde_json::Value = test::read_body_json(second).await;
        assert_eq!(body["error"], "Email already registered");
    }

    #[actix_rt::test]
    async fn signup_rejects_invalid_fields() {
        let app = init_app().await;

        let short_password = signup(&app, "Alice", "alice@example.com", "12345", None).await;
        assert_eq!(short_password.status(), 400);

        let bad_email = signup(&app, "Alice", "not-an-email", "secret1", None).await;
        assert_eq!(bad_email.status(), 400);

        let short_name = signup(&app, "A", "alice@example.com", "secret1", None).await;
        assert_eq!(short_name.status(), 400);

        let bad_role = signup(&app, "Alice", "alice@example.com", "secret1", Some("root")).await;
        assert_eq!(bad_role.status(), 400);
    }

    #[actix_rt::test]
    async fn signin_failures_are_indistinguishable() {
        let app = init_app().await;
        let resp = signup(&app, "Alice", "alice@example.com", "secret1", None).await;
        assert_eq!(resp.status(), 201);

        let wrong_password = test::TestRequest::post()
            .uri("/signin")
            .set_json(serde_json::json!({ "email": "alice@example.com", "password": "wrong1" }))
            .to_request();
        let wrong_password = test::call_service(&app, wrong_password).await;
        assert_eq!(wrong_password.status(), 401);
        let wrong_password_body: serde_json::Value = test::read_body_json(wrong_password).await;

        let unknown_email = test::TestRequest::post()
            .uri("/signin")
            .set_json(serde_json::json!({ "email": "nobody@example.com", "password": "secret1" }))
            .to_request();
        let unknown_email = test::call_service(&app, unknown_email).await;
        assert_eq!(unknown_email.status(), 401);
        let unknown_email_body: serde_json::Value = test::read_body_json(unknown_email).await;

        assert_eq!(wrong_password_body, unknown_email_body);
    }

    #[actix_rt::test]
    async fn create_requires_bearer_token() {
        let app = init_app().await;

        let req = test::TestRequest::post()
            .uri("/blogs")
            .set_json(serde_json::json!({ "title": "T", "content": "C" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing authorization header");

        // The store stays untouched.
        let blogs = list_blogs_body(&app).await;
        assert_eq!(blogs["count"], 0);
    }

    #[actix_rt::test]
    async fn malformed_authorization_header_is_rejected() {
        let app = init_app().await;

        let req = test::TestRequest::post()
            .uri("/blogs")
            .insert_header(("Authorization", "Token abc"))
            .set_json(serde_json::json!({ "title": "T", "content": "C" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let req = test::TestRequest::post()
            .uri("/blogs")
            .insert_header(("Authorization", "Bearer not.a.token"))
            .set_json(serde_json::json!({ "title": "T", "content": "C" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid token");
    }

    #[actix_rt::test]
    async fn create_then_list_includes_author_fields() {
        let app = init_app().await;
        signup(&app, "Alice", "alice@example.com", "secret1", None).await;
        let token = signin_token(&app, "alice@example.com", "secret1").await;

        let created = create_blog_with_token(&app, &token, "First post", "Hello").await;
        let blog_id = created["blog"]["id"].as_i64().unwrap();

        let blogs = list_blogs_body(&app).await;
        assert_eq!(blogs["count"], 1);
        let entries = blogs["blogs"].as_array().unwrap();
        let matching: Vec<_> = entries
            .iter()
            .filter(|b| b["id"].as_i64() == Some(blog_id))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0]["title"], "First post");
        assert_eq!(matching[0]["author_name"], "Alice");
        assert_eq!(matching[0]["author_email"], "alice@example.com");
    }

    #[actix_rt::test]
    async fn owner_is_taken_from_token_not_body() {
        let app = init_app().await;
        signup(&app, "Alice", "alice@example.com", "secret1", None).await;
        let token = signin_token(&app, "alice@example.com", "secret1").await;

        // An account_id smuggled into the body is ignored.
        let req = test::TestRequest::post()
            .uri("/blogs")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({
                "title": "T",
                "content": "C",
                "account_id": 999,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["blog"]["account_id"], 1);
    }

    #[actix_rt::test]
    async fn update_validates_before_lookup() {
        let app = init_app().await;
        signup(&app, "Alice", "alice@example.com", "secret1", None).await;
        let token = signin_token(&app, "alice@example.com", "secret1").await;

        // Empty fields fail with 400 even when the id does not exist.
        let req = test::TestRequest::put()
            .uri("/blogs/999")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({ "title": "", "content": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_rt::test]
    async fn non_numeric_id_is_not_found() {
        let app = init_app().await;
        signup(&app, "Alice", "alice@example.com", "secret1", None).await;
        let token = signin_token(&app, "alice@example.com", "secret1").await;

        let req = test::TestRequest::delete()
            .uri("/blogs/abc")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_rt::test]
    async fn update_missing_post_is_not_found() {
        let app = init_app().await;
        signup(&app, "Alice", "alice@example.com", "secret1", None).await;
        let token = signin_token(&app, "alice@example.com", "secret1").await;

        let req = test::TestRequest::put()
            .uri("/blogs/999")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({ "title": "T", "content": "C" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_rt::test]
    async fn ownership_and_role_govern_mutations() {
        let app = init_app().await;
        signup(&app, "Alice", "alice@example.com", "secret1", None).await;
        signup(&app, "Bob", "bob@example.com", "secret2", None).await;
        signup(&app, "Carol", "carol@example.com", "secret3", Some("admin")).await;

        let alice = signin_token(&app, "alice@example.com", "secret1").await;
        let bob = signin_token(&app, "bob@example.com", "secret2").await;
        let carol = signin_token(&app, "carol@example.com", "secret3").await;

        let created = create_blog_with_token(&app, &alice, "Alice's post", "Hello").await;
        let blog_id = created["blog"]["id"].as_i64().unwrap();

        // Another user cannot update someone else's post.
        let req = test::TestRequest::put()
            .uri(&format!("/blogs/{}", blog_id))
            .insert_header(("Authorization", format!("Bearer {}", bob)))
            .set_json(serde_json::json!({ "title": "Hijacked", "content": "X" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);

        // The owner can.
        let req = test::TestRequest::put()
            .uri(&format!("/blogs/{}", blog_id))
            .insert_header(("Authorization", format!("Bearer {}", alice)))
            .set_json(serde_json::json!({ "title": "Edited", "content": "Hello again" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // So can an admin.
        let req = test::TestRequest::put()
            .uri(&format!("/blogs/{}", blog_id))
            .insert_header(("Authorization", format!("Bearer {}", carol)))
            .set_json(serde_json::json!({ "title": "Moderated", "content": "Hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // Ownership is not enough for deletion.
        let req = test::TestRequest::delete()
            .uri(&format!("/blogs/{}", blog_id))
            .insert_header(("Authorization", format!("Bearer {}", alice)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);

        // Admins delete; the post disappears from the list.
        let req = test::TestRequest::delete()
            .uri(&format!("/blogs/{}", blog_id))
            .insert_header(("Authorization", format!("Bearer {}", carol)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let blogs = list_blogs_body(&app).await;
        assert_eq!(blogs["count"], 0);

        // Deleting again keeps reporting not-found, never a server error.
        for _ in 0..2 {
            let req = test::TestRequest::delete()
                .uri(&format!("/blogs/{}", blog_id))
                .insert_header(("Authorization", format!("Bearer {}", carol)))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 404);
        }
    }
}
