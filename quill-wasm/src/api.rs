use crate::models::*;
use gloo_net::http::Request;
use gloo_storage::{LocalStorage, Storage};
use serde::{de::DeserializeOwned, Serialize};

const API_BASE: &str = "http://localhost:5000";
const TOKEN_KEY: &str = "quill_token";
const USER_KEY: &str = "quill_user";

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            base_url: API_BASE.to_string(),
        }
    }

    pub fn save_credential(token: &str, user: &AccountInfo) {
        if let Err(e) = LocalStorage::set(TOKEN_KEY, token) {
            web_sys::console::log_1(&format!("Failed to save token: {:?}", e).into());
        }
        if let Err(e) = LocalStorage::set(USER_KEY, user) {
            web_sys::console::log_1(&format!("Failed to save user: {:?}", e).into());
        }
    }

    pub fn get_token() -> Option<String> {
        LocalStorage::get(TOKEN_KEY).ok()
    }

    /// The identity cached at signin time. Drives rendering only; the server
    /// never sees it.
    pub fn get_user() -> Option<AccountInfo> {
        LocalStorage::get(USER_KEY).ok()
    }

    pub fn clear_credential() {
        LocalStorage::delete(TOKEN_KEY);
        LocalStorage::delete(USER_KEY);
    }

    fn auth_header() -> String {
        match Self::get_token() {
            Some(token) => format!("Bearer {}", token),
            None => String::new(),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<&impl Serialize>,
        requires_auth: bool,
    ) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);

        // Создаем базовый запрос в зависимости от метода
        let request_builder = match method {
            "GET" => Request::get(&url),
            "POST" => Request::post(&url),
            "PUT" => Request::put(&url),
            "DELETE" => Request::delete(&url),
            _ => return Err(format!("Unsupported method: {}", method)),
        };

        // Добавляем заголовки
        let request_builder = request_builder.header("Content-Type", "application/json");

        let request_builder = if requires_auth {
            let auth_header = Self::auth_header();
            if !auth_header.is_empty() {
                request_builder.header("Authorization", &auth_header)
            } else {
                request_builder
            }
        } else {
            request_builder
        };

        // Создаем и отправляем запрос
        let response = if let Some(body) = body {
            let body_json = serde_json::to_string(body)
                .map_err(|e| format!("Failed to serialize request: {}", e))?;

            request_builder
                .body(body_json)
                .map_err(|e| format!("Failed to set request body: {}", e))?
                .send()
                .await
                .map_err(|e| format!("Network error: {}", e))?
        } else {
            request_builder
                .send()
                .await
                .map_err(|e| format!("Network error: {}", e))?
        };

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;

        if (200..300).contains(&status) {
            serde_json::from_str(&text).map_err(|e| format!("Failed to parse response: {}", e))
        } else {
            // Пытаемся распарсить сообщение об ошибке
            match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => Err(err.error),
                Err(_) => Err(format!("HTTP {}: {}", status, text)),
            }
        }
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<SignupResponse, String> {
        self.request("POST", "/signup", Some(req), false).await
    }

    pub async fn signin(&self, req: &SigninRequest) -> Result<SigninResponse, String> {
        self.request("POST", "/signin", Some(req), false).await
    }

    pub async fn list_blogs(&self) -> Result<BlogsResponse, String> {
        self.request("GET", "/blogs", None::<&()>, false).await
    }

    pub async fn create_blog(&self, req: &BlogBody) -> Result<BlogPost, String> {
        let response: BlogMutationResponse =
            self.request("POST", "/blogs", Some(req), true).await?;
        Ok(response.blog)
    }

    pub async fn update_blog(&self, id: i64, req: &BlogBody) -> Result<BlogPost, String> {
        let response: BlogMutationResponse = self
            .request("PUT", &format!("/blogs/{}", id), Some(req), true)
            .await?;
        Ok(response.blog)
    }

    pub async fn delete_blog(&self, id: i64) -> Result<(), String> {
        self.request::<serde_json::Value>("DELETE", &format!("/blogs/{}", id), None::<&()>, true)
            .await?;
        Ok(())
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
