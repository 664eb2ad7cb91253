//! Service-owned state shared by all handlers

use std::sync::Arc;

use eval_auth::TokenManager;
use tokio::sync::RwLock;

use crate::analytics::{AnalyticsStore, StoreSummary};
use crate::model::{PostView, TopUser};
use crate::source::SocialSource;

pub const TOP_USERS_LIMIT: usize = 5;
pub const LATEST_POSTS_LIMIT: usize = 5;

/// Latest analytics snapshot plus the source it is rebuilt from.
///
/// A refresh collects without holding the lock and then swaps the store in,
/// so readers never wait on upstream calls.
pub struct ServiceState {
    source: Arc<dyn SocialSource>,
    store: RwLock<AnalyticsStore>,
    tokens: Arc<TokenManager>,
}

impl ServiceState {
    pub fn new(source: Arc<dyn SocialSource>, tokens: Arc<TokenManager>) -> Self {
        Self {
            source,
            store: RwLock::new(AnalyticsStore::default()),
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub async fn refresh(&self) {
        let fresh = AnalyticsStore::collect(self.source.as_ref()).await;
        *self.store.write().await = fresh;
    }

    pub async fn top_users(&self) -> Vec<TopUser> {
        self.refresh().await;
        self.store.read().await.top_users(TOP_USERS_LIMIT)
    }

    pub async fn latest_posts(&self) -> Vec<PostView> {
        self.refresh().await;
        self.store.read().await.latest_posts(LATEST_POSTS_LIMIT)
    }

    pub async fn popular_posts(&self) -> Vec<PostView> {
        self.refresh().await;
        self.store.read().await.popular_posts()
    }

    /// Totals of the current snapshot, without refreshing.
    pub async fn summary(&self) -> StoreSummary {
        self.store.read().await.summary()
    }
}
