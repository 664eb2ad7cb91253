//! Where users, posts and comments come from
//!
//! `SocialSource` is infallible: an implementation backed by the network
//! resolves its own failures to fallback data before returning.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use eval_client::Fetcher;
use tracing::{debug, info};

use crate::cache::{TtlCache, ttl_cache};
use crate::mock;
use crate::model::{Comment, CommentsPayload, Post, PostsPayload, Users, UsersPayload};

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to the social graph.
///
/// Uses `Pin<Box<dyn Future>>` return types so sources can be held as
/// `Arc<dyn SocialSource>`.
pub trait SocialSource: Send + Sync {
    /// Identifier for logging (e.g. "remote", "mock")
    fn id(&self) -> &str;

    fn users(&self) -> SourceFuture<'_, Users>;

    fn user_posts<'a>(&'a self, user_id: &'a str) -> SourceFuture<'a, Vec<Post>>;

    fn post_comments(&self, post_id: u64) -> SourceFuture<'_, Vec<Comment>>;
}

/// Evaluation API source with a per-key TTL cache.
///
/// Only non-empty upstream results are cached. Empty or failed results are
/// replaced by the static table and retried on the next call.
pub struct RemoteSource {
    fetcher: Fetcher,
    users: TtlCache<Users>,
    posts: TtlCache<Vec<Post>>,
    comments: TtlCache<Vec<Comment>>,
}

impl RemoteSource {
    pub fn new(fetcher: Fetcher, ttl: Duration) -> Self {
        Self {
            fetcher,
            users: ttl_cache(ttl),
            posts: ttl_cache(ttl),
            comments: ttl_cache(ttl),
        }
    }

    async fn fetch_users(&self) -> Users {
        const KEY: &str = "users";
        if let Some(users) = self.users.get(KEY).await {
            debug!("using cached users");
            return users;
        }

        let payload: UsersPayload = self
            .fetcher
            .fetch_or("users", &[], UsersPayload::default)
            .await;
        if payload.users.is_empty() {
            info!("no users from upstream, using mock users");
            return mock::users();
        }
        debug!(count = payload.users.len(), "fetched users");
        self.users.insert(KEY.to_string(), payload.users.clone()).await;
        payload.users
    }

    async fn fetch_user_posts(&self, user_id: &str) -> Vec<Post> {
        let key = format!("user_posts_{user_id}");
        if let Some(posts) = self.posts.get(&key).await {
            debug!(user_id, "using cached posts");
            return posts;
        }

        let endpoint = format!("users/{user_id}/posts");
        let payload: PostsPayload = self
            .fetcher
            .fetch_or(&endpoint, &[], PostsPayload::default)
            .await;
        if payload.posts.is_empty() {
            info!(user_id, "no posts from upstream, using mock posts");
            return mock::user_posts(user_id);
        }
        debug!(user_id, count = payload.posts.len(), "fetched posts");
        self.posts.insert(key, payload.posts.clone()).await;
        payload.posts
    }

    async fn fetch_post_comments(&self, post_id: u64) -> Vec<Comment> {
        let key = format!("post_comments_{post_id}");
        if let Some(comments) = self.comments.get(&key).await {
            debug!(post_id, "using cached comments");
            return comments;
        }

        let endpoint = format!("posts/{post_id}/comments");
        let payload: CommentsPayload = self
            .fetcher
            .fetch_or(&endpoint, &[], CommentsPayload::default)
            .await;
        if payload.comments.is_empty() {
            debug!(post_id, "no comments from upstream, using mock comments");
            return mock::post_comments(post_id);
        }
        self.comments.insert(key, payload.comments.clone()).await;
        payload.comments
    }
}

impl SocialSource for RemoteSource {
    fn id(&self) -> &str {
        "remote"
    }

    fn users(&self) -> SourceFuture<'_, Users> {
        Box::pin(self.fetch_users())
    }

    fn user_posts<'a>(&'a self, user_id: &'a str) -> SourceFuture<'a, Vec<Post>> {
        Box::pin(self.fetch_user_posts(user_id))
    }

    fn post_comments(&self, post_id: u64) -> SourceFuture<'_, Vec<Comment>> {
        Box::pin(self.fetch_post_comments(post_id))
    }
}

/// Serves only the static table.
pub struct MockSource;

impl SocialSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn users(&self) -> SourceFuture<'_, Users> {
        Box::pin(async { mock::users() })
    }

    fn user_posts<'a>(&'a self, user_id: &'a str) -> SourceFuture<'a, Vec<Post>> {
        Box::pin(async move { mock::user_posts(user_id) })
    }

    fn post_comments(&self, post_id: u64) -> SourceFuture<'_, Vec<Comment>> {
        Box::pin(async move { mock::post_comments(post_id) })
    }
}
