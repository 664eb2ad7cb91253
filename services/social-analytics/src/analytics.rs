//! Aggregated view over users, posts and comment counts
//!
//! A store is rebuilt from scratch by [`AnalyticsStore::collect`]; the views
//! only read it. Maps keep insertion order so ties resolve to source order.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{Post, PostView, TopUser, Users};
use crate::source::SocialSource;

#[derive(Debug, Default, Clone)]
pub struct AnalyticsStore {
    users: Users,
    /// Every post in fetch order, repeats included
    posts: Vec<Post>,
    user_post_counts: IndexMap<String, usize>,
    /// Total comments on each author's posts; authors without posts are absent
    user_comment_counts: IndexMap<String, usize>,
    /// Latest copy of each post with its comment count
    post_comments: IndexMap<u64, (Post, usize)>,
}

/// Store totals reported on `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub users: usize,
    pub posts: usize,
    pub users_with_posts: usize,
    pub comments: usize,
}

impl AnalyticsStore {
    /// Walk users, then each user's posts, then each post's comments.
    pub async fn collect(source: &dyn SocialSource) -> Self {
        let users = source.users().await;

        let mut posts = Vec::new();
        let mut user_post_counts = IndexMap::with_capacity(users.len());
        for user_id in users.keys() {
            let user_posts = source.user_posts(user_id).await;
            user_post_counts.insert(user_id.clone(), user_posts.len());
            posts.extend(user_posts);
        }

        let mut user_comment_counts: IndexMap<String, usize> = IndexMap::new();
        let mut post_comments = IndexMap::with_capacity(posts.len());
        for post in &posts {
            let count = source.post_comments(post.id).await.len();
            debug!(post_id = post.id, count, "counted comments");
            post_comments.insert(post.id, (post.clone(), count));
            *user_comment_counts
                .entry(post.userid.to_string())
                .or_default() += count;
        }

        info!(
            source = source.id(),
            users = users.len(),
            posts = posts.len(),
            "analytics store refreshed"
        );
        Self {
            users,
            posts,
            user_post_counts,
            user_comment_counts,
            post_comments,
        }
    }

    fn user_name(&self, user_id: &str) -> String {
        self.users
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| format!("User {user_id}"))
    }

    fn view(&self, post: &Post, comment_count: usize) -> PostView {
        PostView {
            id: post.id,
            user_id: post.userid,
            user_name: self.user_name(&post.userid.to_string()),
            content: post.content.clone(),
            comment_count,
        }
    }

    /// Authors ranked by total comments received, descending.
    pub fn top_users(&self, limit: usize) -> Vec<TopUser> {
        let mut ranked: Vec<(&String, &usize)> = self.user_comment_counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1));
        ranked
            .into_iter()
            .take(limit)
            .map(|(user_id, &comment_count)| TopUser {
                user_id: user_id.clone(),
                name: self.user_name(user_id),
                comment_count,
            })
            .collect()
    }

    /// Highest post ids first.
    pub fn latest_posts(&self, limit: usize) -> Vec<PostView> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.id.cmp(&a.id));
        posts
            .into_iter()
            .take(limit)
            .map(|post| {
                let count = self.post_comments.get(&post.id).map_or(0, |(_, c)| *c);
                self.view(post, count)
            })
            .collect()
    }

    /// Every post sharing the highest comment count.
    pub fn popular_posts(&self) -> Vec<PostView> {
        let Some(max) = self.post_comments.values().map(|(_, c)| *c).max() else {
            return Vec::new();
        };
        self.post_comments
            .values()
            .filter(|(_, count)| *count == max)
            .map(|(post, count)| self.view(post, *count))
            .collect()
    }

    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            users: self.users.len(),
            posts: self.posts.len(),
            users_with_posts: self.user_post_counts.values().filter(|&&n| n > 0).count(),
            comments: self.post_comments.values().map(|(_, c)| c).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Comment;
    use crate::source::{MockSource, SourceFuture};
    use std::collections::HashMap;

    /// In-memory source with explicit posts and per-post comment counts.
    struct FixedSource {
        users: Users,
        posts: Vec<Post>,
        comments: HashMap<u64, usize>,
    }

    impl FixedSource {
        fn new(users: &[(&str, &str)], posts: &[(u64, u64)], comments: &[(u64, usize)]) -> Self {
            Self {
                users: users
                    .iter()
                    .map(|(id, name)| (id.to_string(), name.to_string()))
                    .collect(),
                posts: posts
                    .iter()
                    .map(|&(id, userid)| Post {
                        id,
                        userid,
                        content: format!("post {id}"),
                    })
                    .collect(),
                comments: comments.iter().copied().collect(),
            }
        }
    }

    impl SocialSource for FixedSource {
        fn id(&self) -> &str {
            "fixed"
        }

        fn users(&self) -> SourceFuture<'_, Users> {
            Box::pin(async { self.users.clone() })
        }

        fn user_posts<'a>(&'a self, user_id: &'a str) -> SourceFuture<'a, Vec<Post>> {
            Box::pin(async move {
                self.posts
                    .iter()
                    .filter(|p| p.userid.to_string() == user_id)
                    .cloned()
                    .collect()
            })
        }

        fn post_comments(&self, post_id: u64) -> SourceFuture<'_, Vec<Comment>> {
            Box::pin(async move {
                let count = self.comments.get(&post_id).copied().unwrap_or(0);
                (0..count as u64)
                    .map(|i| Comment {
                        id: post_id * 100 + i,
                        postid: post_id,
                        content: String::new(),
                    })
                    .collect()
            })
        }
    }

    #[tokio::test]
    async fn top_users_from_mock_table() {
        let store = AnalyticsStore::collect(&MockSource).await;
        let top = store.top_users(5);

        let ranked: Vec<_> = top
            .iter()
            .map(|u| (u.user_id.as_str(), u.name.as_str(), u.comment_count))
            .collect();
        assert_eq!(
            ranked,
            [
                ("1", "John Doe", 5),
                ("2", "Jane Doe", 1),
                ("3", "Alice Smith", 1),
                ("4", "Bob Johnson", 0),
            ]
        );
    }

    #[tokio::test]
    async fn top_users_limited_and_ties_keep_source_order() {
        let source = FixedSource::new(
            &[("1", "a"), ("2", "b"), ("3", "c"), ("4", "d"), ("5", "e"), ("6", "f")],
            &[(10, 1), (20, 2), (30, 3), (40, 4), (50, 5), (60, 6)],
            &[(10, 1), (20, 4), (30, 1), (40, 1), (50, 1), (60, 1)],
        );
        let store = AnalyticsStore::collect(&source).await;
        let ids: Vec<_> = store
            .top_users(5)
            .into_iter()
            .map(|u| u.user_id)
            .collect();
        assert_eq!(ids, ["2", "1", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn latest_posts_descending_id() {
        let store = AnalyticsStore::collect(&MockSource).await;
        let latest: Vec<_> = store
            .latest_posts(5)
            .iter()
            .map(|p| (p.id, p.comment_count))
            .collect();
        assert_eq!(latest, [(105, 0), (104, 1), (103, 1), (102, 2), (101, 3)]);
    }

    #[tokio::test]
    async fn latest_posts_limited() {
        let source = FixedSource::new(
            &[("1", "a")],
            &[(3, 1), (9, 1), (1, 1), (7, 1), (5, 1), (8, 1)],
            &[],
        );
        let store = AnalyticsStore::collect(&source).await;
        let ids: Vec<_> = store.latest_posts(5).iter().map(|p| p.id).collect();
        assert_eq!(ids, [9, 8, 7, 5, 3]);
    }

    #[tokio::test]
    async fn popular_posts_single_max() {
        let store = AnalyticsStore::collect(&MockSource).await;
        let popular = store.popular_posts();
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].id, 101);
        assert_eq!(popular[0].user_name, "John Doe");
        assert_eq!(popular[0].comment_count, 3);
    }

    #[tokio::test]
    async fn popular_posts_returns_all_ties() {
        let source = FixedSource::new(
            &[("1", "a"), ("2", "b")],
            &[(11, 1), (12, 1), (21, 2)],
            &[(11, 2), (12, 1), (21, 2)],
        );
        let store = AnalyticsStore::collect(&source).await;
        let ids: Vec<_> = store.popular_posts().iter().map(|p| p.id).collect();
        assert_eq!(ids, [11, 21]);
    }

    #[tokio::test]
    async fn posts_without_comments_are_all_popular() {
        let source = FixedSource::new(&[("1", "a")], &[(1, 1), (2, 1)], &[]);
        let store = AnalyticsStore::collect(&source).await;
        assert_eq!(store.popular_posts().len(), 2);
    }

    #[tokio::test]
    async fn unknown_author_gets_placeholder_name() {
        // user 1's feed contains a post attributed to user 9
        let mut source = FixedSource::new(&[("1", "a")], &[], &[(5, 1)]);
        source.posts.push(Post {
            id: 5,
            userid: 9,
            content: String::new(),
        });
        let store = AnalyticsStore::collect(&UserOneFeed(source)).await;

        let top = store.top_users(5);
        assert_eq!(top[0].user_id, "9");
        assert_eq!(top[0].name, "User 9");
        assert_eq!(store.latest_posts(5)[0].user_name, "User 9");
    }

    /// Returns every post for user "1" regardless of author.
    struct UserOneFeed(FixedSource);

    impl SocialSource for UserOneFeed {
        fn id(&self) -> &str {
            "user-one-feed"
        }

        fn users(&self) -> SourceFuture<'_, Users> {
            self.0.users()
        }

        fn user_posts<'a>(&'a self, user_id: &'a str) -> SourceFuture<'a, Vec<Post>> {
            Box::pin(async move {
                if user_id == "1" {
                    self.0.posts.clone()
                } else {
                    Vec::new()
                }
            })
        }

        fn post_comments(&self, post_id: u64) -> SourceFuture<'_, Vec<Comment>> {
            self.0.post_comments(post_id)
        }
    }

    #[tokio::test]
    async fn empty_source_yields_empty_views() {
        let source = FixedSource::new(&[], &[], &[]);
        let store = AnalyticsStore::collect(&source).await;
        assert!(store.top_users(5).is_empty());
        assert!(store.latest_posts(5).is_empty());
        assert!(store.popular_posts().is_empty());
        assert_eq!(
            store.summary(),
            StoreSummary {
                users: 0,
                posts: 0,
                users_with_posts: 0,
                comments: 0
            }
        );
    }

    #[tokio::test]
    async fn summary_counts_mock_table() {
        let store = AnalyticsStore::collect(&MockSource).await;
        assert_eq!(
            store.summary(),
            StoreSummary {
                users: 5,
                posts: 5,
                users_with_posts: 4,
                comments: 7
            }
        );
    }
}
