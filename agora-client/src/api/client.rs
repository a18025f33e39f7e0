use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult};
use crate::auth::AuthHandle;
use agora_types::*;

pub const DEFAULT_BASE_URL: &str = "https://gorest.co.in/public/v2";

/// The slice of the GoRest surface the controllers depend on.
///
/// `ApiClient` is the production implementation; tests script responses
/// through a stub behind the same trait.
#[async_trait]
pub trait Api: Send + Sync {
    async fn users(&self) -> ApiResult<Vec<User>>;
    async fn user(&self, id: i64) -> ApiResult<User>;
    async fn user_posts(&self, user_id: i64) -> ApiResult<Vec<Post>>;
    async fn posts(&self) -> ApiResult<Vec<Post>>;
    async fn comments_for_post(&self, post_id: i64) -> ApiResult<Vec<PostComment>>;
    async fn create_post(&self, request: CreatePostRequest) -> ApiResult<Post>;
    async fn create_comment(
        &self,
        post_id: i64,
        request: CreateCommentRequest,
    ) -> ApiResult<PostComment>;
    async fn create_reply(&self, request: CreateReplyRequest) -> ApiResult<PostComment>;
    async fn update_post(&self, id: i64, request: UpdatePostRequest) -> ApiResult<Post>;
    /// Resolves the token's owner: GoRest returns the authenticated user
    /// first when `/users` is called with a bearer token.
    async fn current_user(&self) -> ApiResult<Option<User>>;
}

/// HTTP client for the GoRest public API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: AuthHandle,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, auth: AuthHandle) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            auth,
        }
    }

    /// Attaches the bearer token when one is present.
    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = self.auth.token() {
            req.bearer_auth(token)
        } else {
            req
        }
    }

    /// Decodes a response, mapping error statuses onto the API taxonomy.
    ///
    /// A 401 or 403 invalidates the stored token before the error is
    /// surfaced, so the rest of the app observes a signed-out state.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match status.as_u16() {
            401 => {
                self.auth.invalidate();
                Err(ApiError::Unauthorized(error_text))
            }
            403 => {
                self.auth.invalidate();
                Err(ApiError::Forbidden(error_text))
            }
            404 => Err(ApiError::NotFound(error_text)),
            400 | 422 => Err(ApiError::BadRequest(error_text)),
            _ => Err(ApiError::Api(error_text)),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {url}");
        let response = self.with_auth(self.client.get(&url)).send().await?;
        self.handle_response(response).await
    }

    /// The user-facing views do not consume todos yet; the endpoint is
    /// exposed for library callers.
    pub async fn todos(&self) -> ApiResult<Vec<Todo>> {
        self.get_json("/todos").await
    }
}

#[async_trait]
impl Api for ApiClient {
    async fn users(&self) -> ApiResult<Vec<User>> {
        self.get_json("/users").await
    }

    async fn user(&self, id: i64) -> ApiResult<User> {
        self.get_json(&format!("/users/{id}")).await
    }

    async fn user_posts(&self, user_id: i64) -> ApiResult<Vec<Post>> {
        self.get_json(&format!("/users/{user_id}/posts")).await
    }

    async fn posts(&self) -> ApiResult<Vec<Post>> {
        self.get_json("/posts").await
    }

    async fn comments_for_post(&self, post_id: i64) -> ApiResult<Vec<PostComment>> {
        self.get_json(&format!("/posts/{post_id}/comments")).await
    }

    async fn create_post(&self, request: CreatePostRequest) -> ApiResult<Post> {
        let url = format!("{}/posts", self.base_url);
        log::debug!("POST {url}");
        let req = self.with_auth(self.client.post(&url).json(&request));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn create_comment(
        &self,
        post_id: i64,
        request: CreateCommentRequest,
    ) -> ApiResult<PostComment> {
        let url = format!("{}/posts/{}/comments", self.base_url, post_id);
        log::debug!("POST {url}");
        let req = self.with_auth(self.client.post(&url).json(&request));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn create_reply(&self, request: CreateReplyRequest) -> ApiResult<PostComment> {
        let url = format!("{}/comments", self.base_url);
        log::debug!("POST {url}");
        let req = self.with_auth(self.client.post(&url).json(&request));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn update_post(&self, id: i64, request: UpdatePostRequest) -> ApiResult<Post> {
        let url = format!("{}/posts/{}", self.base_url, id);
        log::debug!("PATCH {url}");
        let req = self.with_auth(self.client.patch(&url).json(&request));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn current_user(&self) -> ApiResult<Option<User>> {
        let users: Vec<User> = self.get_json("/users").await?;
        Ok(users.into_iter().next())
    }
}
