use crate::error::ClientError;
use crate::models::{
    AccountInfo, BlogBody, BlogPost, BlogResponse, BlogsResponse, Credential, ErrorResponse,
    MessageResponse, SigninRequest, SigninResponse, SignupRequest, SignupResponse,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

/// HTTP client for the blog API. A successful signin stores a [`Credential`];
/// every protected request constructor attaches it as a bearer header.
#[derive(Debug, Clone)]
pub struct BlogClient {
    client: Client,
    base_url: String,
    credential: Option<Credential>,
}

impl BlogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            credential: None,
        }
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Forget the held credential (logout). The server keeps no session
    /// state, so dropping the token is all a logout is.
    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    fn add_auth_header(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(credential) = &self.credential {
            request = request.bearer_auth(&credential.token);
        }
        request
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn health(&self) -> Result<String, ClientError> {
        let url = self.url("/health");
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.json::<MessageResponse>().await?;
                Ok(body.message)
            }
            status => Err(ClientError::TransportError(format!(
                "HTTP {}: health check failed",
                status
            ))),
        }
    }

    /// Register a new account. No credential is stored: the server does not
    /// issue a token at signup, so a signin has to follow.
    pub async fn signup(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Option<String>,
    ) -> Result<AccountInfo, ClientError> {
        let req = SignupRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role,
        };

        tracing::debug!("Signing up account for email: {}", req.email);

        let url = self.url("/signup");
        let response = self.client.post(&url).json(&req).send().await?;

        match response.status() {
            StatusCode::CREATED => {
                let body = response.json::<SignupResponse>().await?;
                Ok(body.user)
            }
            status => Err(self.error_from_response(status, response).await),
        }
    }

    /// Sign in and hold the returned credential for later requests.
    pub async fn signin(
        &mut self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Credential, ClientError> {
        let req = SigninRequest {
            email: email.into(),
            password: password.into(),
        };

        tracing::debug!("Signing in account for email: {}", req.email);

        let url = self.url("/signin");
        let response = self.client.post(&url).json(&req).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.json::<SigninResponse>().await?;
                let credential = Credential {
                    token: body.token,
                    account: body.user,
                };
                self.credential = Some(credential.clone());
                Ok(credential)
            }
            status => Err(self.error_from_response(status, response).await),
        }
    }

    pub async fn list_blogs(&self) -> Result<BlogsResponse, ClientError> {
        let url = self.url("/blogs");
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<BlogsResponse>().await?),
            status => Err(self.error_from_response(status, response).await),
        }
    }

    pub async fn create_blog(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<BlogPost, ClientError> {
        let url = self.url("/blogs");
        let body = BlogBody {
            title: title.into(),
            content: content.into(),
        };

        let response = self
            .add_auth_header(self.client.post(&url))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                let body = response.json::<BlogResponse>().await?;
                Ok(body.blog)
            }
            status => Err(self.error_from_response(status, response).await),
        }
    }

    pub async fn update_blog(
        &self,
        id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<BlogPost, ClientError> {
        let url = self.url(&format!("/blogs/{}", id));
        let body = BlogBody {
            title: title.into(),
            content: content.into(),
        };

        let response = self
            .add_auth_header(self.client.put(&url))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.json::<BlogResponse>().await?;
                Ok(body.blog)
            }
            status => Err(self.error_from_response(status, response).await),
        }
    }

    pub async fn delete_blog(&self, id: i64) -> Result<(), ClientError> {
        let url = self.url(&format!("/blogs/{}", id));
        let response = self.add_auth_header(self.client.delete(&url)).send().await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(self.error_from_response(status, response).await),
        }
    }

    /// Shape a non-success response into a [`ClientError`], preferring the
    /// server's own `{error}` message when it parses.
    async fn error_from_response(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> ClientError {
        let message = match response.text().await {
            Ok(text) => match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(body) => body.error,
                Err(_) => text,
            },
            Err(e) => return ClientError::HttpError(e),
        };

        match status {
            StatusCode::BAD_REQUEST => ClientError::BadRequest(message),
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound,
            StatusCode::CONFLICT => ClientError::Conflict(message),
            _ => ClientError::TransportError(format!("HTTP {}: {}", status, message)),
        }
    }
}
