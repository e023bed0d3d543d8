//! Work post directory: external collaborator boundary.
//!
//! The ledger does not own post data; it only checks that a `PostId` refers
//! to an existing, active work post before allocating equipment to it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use sentinela_core::PostId;

/// A work post (site/contract location) as seen by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPost {
    pub id: PostId,
    pub name: String,
    pub active: bool,
}

/// Read-only view onto the post directory collaborator.
pub trait PostDirectory: Send + Sync {
    fn find(&self, id: PostId) -> Option<WorkPost>;
}

impl<P> PostDirectory for Arc<P>
where
    P: PostDirectory + ?Sized,
{
    fn find(&self, id: PostId) -> Option<WorkPost> {
        (**self).find(id)
    }
}

/// In-memory post directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPostDirectory {
    posts: RwLock<HashMap<PostId, WorkPost>>,
}

impl InMemoryPostDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, post: WorkPost) {
        if let Ok(mut posts) = self.posts.write() {
            posts.insert(post.id, post);
        }
    }
}

impl PostDirectory for InMemoryPostDirectory {
    fn find(&self, id: PostId) -> Option<WorkPost> {
        self.posts.read().ok()?.get(&id).cloned()
    }
}
