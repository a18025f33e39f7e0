use serde::{Deserialize, Serialize};

use crate::enums::{Gender, TodoStatus, UserStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub status: UserStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    /// GoRest omits this field; locally created posts start at zero.
    #[serde(default)]
    pub likes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Embedded comments, populated only by the profile detail view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<PostComment>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostComment {
    pub id: i64,
    pub post_id: i64,
    /// Present when the comment is a reply to another comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub likes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub due_on: String,
    pub status: TodoStatus,
}

// Request payloads for the GoRest API

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub name: String,
    pub email: String,
    pub body: String,
}

/// Reply creation goes through `POST /comments`; the body carries the
/// post and parent comment ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReplyRequest {
    pub name: String,
    pub email: String,
    pub body: String,
    pub post_id: i64,
    pub parent_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub body: String,
}
