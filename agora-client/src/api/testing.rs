//! Scripted [`Api`] implementation for controller tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Api, ApiError, ApiResult};
use agora_types::*;

type Queue<T> = Mutex<VecDeque<ApiResult<T>>>;

/// Replays queued responses and counts calls per endpoint. A call with no
/// scripted response fails loudly so tests notice unexpected traffic.
#[derive(Default)]
pub struct StubApi {
    users: Queue<Vec<User>>,
    user: Queue<User>,
    user_posts: Queue<Vec<Post>>,
    posts: Queue<Vec<Post>>,
    comments: Queue<Vec<PostComment>>,
    created_posts: Queue<Post>,
    created_comments: Queue<PostComment>,
    created_replies: Queue<PostComment>,
    updated_posts: Queue<Post>,
    current_user: Queue<Option<User>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().get(endpoint).copied().unwrap_or(0)
    }

    fn bump(&self, endpoint: &'static str) {
        *self.calls.lock().unwrap().entry(endpoint).or_insert(0) += 1;
    }

    fn take<T>(&self, queue: &Queue<T>, endpoint: &'static str) -> ApiResult<T> {
        self.bump(endpoint);
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Api(format!("no scripted response for {endpoint}"))))
    }

    pub fn script_users(&self, result: ApiResult<Vec<User>>) {
        self.users.lock().unwrap().push_back(result);
    }

    pub fn script_user(&self, result: ApiResult<User>) {
        self.user.lock().unwrap().push_back(result);
    }

    pub fn script_user_posts(&self, result: ApiResult<Vec<Post>>) {
        self.user_posts.lock().unwrap().push_back(result);
    }

    pub fn script_posts(&self, result: ApiResult<Vec<Post>>) {
        self.posts.lock().unwrap().push_back(result);
    }

    pub fn script_comments(&self, result: ApiResult<Vec<PostComment>>) {
        self.comments.lock().unwrap().push_back(result);
    }

    pub fn script_create_post(&self, result: ApiResult<Post>) {
        self.created_posts.lock().unwrap().push_back(result);
    }

    pub fn script_create_comment(&self, result: ApiResult<PostComment>) {
        self.created_comments.lock().unwrap().push_back(result);
    }

    pub fn script_create_reply(&self, result: ApiResult<PostComment>) {
        self.created_replies.lock().unwrap().push_back(result);
    }

    pub fn script_update_post(&self, result: ApiResult<Post>) {
        self.updated_posts.lock().unwrap().push_back(result);
    }

    pub fn script_current_user(&self, result: ApiResult<Option<User>>) {
        self.current_user.lock().unwrap().push_back(result);
    }
}

#[async_trait]
impl Api for StubApi {
    async fn users(&self) -> ApiResult<Vec<User>> {
        self.take(&self.users, "users")
    }

    async fn user(&self, _id: i64) -> ApiResult<User> {
        self.take(&self.user, "user")
    }

    async fn user_posts(&self, _user_id: i64) -> ApiResult<Vec<Post>> {
        self.take(&self.user_posts, "user_posts")
    }

    async fn posts(&self) -> ApiResult<Vec<Post>> {
        self.take(&self.posts, "posts")
    }

    async fn comments_for_post(&self, _post_id: i64) -> ApiResult<Vec<PostComment>> {
        self.take(&self.comments, "comments_for_post")
    }

    async fn create_post(&self, _request: CreatePostRequest) -> ApiResult<Post> {
        self.take(&self.created_posts, "create_post")
    }

    async fn create_comment(
        &self,
        _post_id: i64,
        _request: CreateCommentRequest,
    ) -> ApiResult<PostComment> {
        self.take(&self.created_comments, "create_comment")
    }

    async fn create_reply(&self, _request: CreateReplyRequest) -> ApiResult<PostComment> {
        self.take(&self.created_replies, "create_reply")
    }

    async fn update_post(&self, _id: i64, _request: UpdatePostRequest) -> ApiResult<Post> {
        self.take(&self.updated_posts, "update_post")
    }

    async fn current_user(&self) -> ApiResult<Option<User>> {
        self.take(&self.current_user, "current_user")
    }
}

pub fn stub_error() -> ApiError {
    ApiError::Api("scripted failure".to_string())
}

pub fn post(id: i64, title: &str, body: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        body: body.to_string(),
        likes: 0,
        image_url: None,
        comments: None,
    }
}

pub fn comment(id: i64, post_id: i64, name: &str) -> PostComment {
    PostComment {
        id,
        post_id,
        parent_id: None,
        name: name.to_string(),
        email: "user@example.com".to_string(),
        body: "body".to_string(),
        likes: 0,
    }
}

pub fn user(id: i64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        gender: Gender::Female,
        status: UserStatus::Active,
    }
}
