//! Upstream payloads and response views

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// User id to display name, in the order the source listed them.
pub type Users = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub userid: u64,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub postid: u64,
    #[serde(default)]
    pub content: String,
}

/// Body of `GET /users`.
#[derive(Debug, Default, Deserialize)]
pub struct UsersPayload {
    #[serde(default)]
    pub users: Users,
}

/// Body of `GET /users/{id}/posts`.
#[derive(Debug, Default, Deserialize)]
pub struct PostsPayload {
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Body of `GET /posts/{id}/comments`.
#[derive(Debug, Default, Deserialize)]
pub struct CommentsPayload {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUser {
    pub user_id: String,
    pub name: String,
    pub comment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: u64,
    pub user_id: u64,
    pub user_name: String,
    pub content: String,
    pub comment_count: usize,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<TopUser>,
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<PostView>,
}
