//! Static social data served when the evaluation API is unavailable

use serde::Serialize;

use crate::model::{Comment, Post, Users};

const USERS: &[(&str, &str)] = &[
    ("1", "John Doe"),
    ("2", "Jane Doe"),
    ("3", "Alice Smith"),
    ("4", "Bob Johnson"),
    ("5", "Charlie Brown"),
];

const POSTS: &[(u64, u64, &str)] = &[
    (101, 1, "Post about technology"),
    (102, 1, "Post about science"),
    (103, 2, "Post about art"),
    (104, 3, "Post about music"),
    (105, 4, "Post about sports"),
];

/// (comment id, post id, content); post 105 has an empty comment list.
const COMMENTS: &[(u64, u64, &str)] = &[
    (1001, 101, "Great post!"),
    (1002, 101, "I agree!"),
    (1003, 101, "Nice content!"),
    (1004, 102, "Interesting!"),
    (1005, 102, "I learned something new!"),
    (1006, 103, "Beautiful art!"),
    (1007, 104, "I love music too!"),
];

/// Post ids that have a comment list in the table, including empty ones.
const COMMENTED_POSTS: &[u64] = &[101, 102, 103, 104, 105];

pub fn users() -> Users {
    USERS
        .iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect()
}

fn post(&(id, userid, content): &(u64, u64, &str)) -> Post {
    Post {
        id,
        userid,
        content: content.to_string(),
    }
}

/// Posts written by `user_id`. Non-numeric ids match nothing.
pub fn user_posts(user_id: &str) -> Vec<Post> {
    POSTS
        .iter()
        .filter(|(_, userid, _)| userid.to_string() == user_id)
        .map(post)
        .collect()
}

pub fn post_comments(post_id: u64) -> Vec<Comment> {
    COMMENTS
        .iter()
        .filter(|(_, postid, _)| *postid == post_id)
        .map(|&(id, postid, content)| Comment {
            id,
            postid,
            content: content.to_string(),
        })
        .collect()
}

/// Entry counts reported by the `/test` diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MockDataSize {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
}

pub fn size() -> MockDataSize {
    MockDataSize {
        users: USERS.len(),
        posts: POSTS.len(),
        comments: COMMENTED_POSTS.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_in_table_order() {
        let users = users();
        let names: Vec<_> = users.values().map(String::as_str).collect();
        assert_eq!(
            names,
            ["John Doe", "Jane Doe", "Alice Smith", "Bob Johnson", "Charlie Brown"]
        );
    }

    #[test]
    fn user_posts_filters_by_author() {
        let ids: Vec<_> = user_posts("1").iter().map(|p| p.id).collect();
        assert_eq!(ids, [101, 102]);
        assert!(user_posts("5").is_empty());
        assert!(user_posts("abc").is_empty());
    }

    #[test]
    fn comment_counts_per_post() {
        let counts: Vec<_> = COMMENTED_POSTS
            .iter()
            .map(|&id| post_comments(id).len())
            .collect();
        assert_eq!(counts, [3, 2, 1, 1, 0]);
        assert!(post_comments(999).is_empty());
    }

    #[test]
    fn size_counts_tables() {
        assert_eq!(
            size(),
            MockDataSize {
                users: 5,
                posts: 5,
                comments: 5
            }
        );
    }
}
