//! # Posts
//!
//! Create, list, fetch and delete posts. Bodies are validated and redacted
//! before they reach the store; ids come from the document's post sequence.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::content::ContentPolicy;
use crate::store::{Document, Entity, Post, RecordId, RecordStore, StoreError, StoreResult};

/// Ordering applied by [`PostsManager::list`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}', expected asc or desc", other)),
        }
    }
}

/// Filter and ordering for a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Only posts by this author
    pub author_id: Option<RecordId>,
    pub order: SortOrder,
}

pub struct PostsManager {
    store: Arc<RecordStore>,
    policy: ContentPolicy,
}

impl PostsManager {
    pub fn new(store: Arc<RecordStore>, policy: ContentPolicy) -> Self {
        Self { store, policy }
    }

    /// Validate `body` and store it as a new post
    pub fn create(&self, body: &str, author_id: RecordId) -> StoreResult<Post> {
        let body = self.policy.validate(body).map_err(|e| {
            warn!(author_id, error = %e, "post rejected");
            e
        })?;

        let post = self.store.mutate_with(|doc| {
            let id = doc.next_post_id();
            let post = Post {
                id,
                body,
                author_id,
            };
            doc.posts.insert(id, post.clone());
            Ok(post)
        })?;

        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    pub fn list(&self, options: ListOptions) -> StoreResult<Vec<Post>> {
        let doc = self.store.read()?;

        // BTreeMap iterates in ascending id order
        let mut posts: Vec<Post> = doc
            .posts
            .into_values()
            .filter(|p| options.author_id.map_or(true, |a| p.author_id == a))
            .collect();

        if options.order == SortOrder::Desc {
            posts.reverse();
        }

        debug!(count = posts.len(), ?options, "posts listed");
        Ok(posts)
    }

    pub fn get_by_id(&self, id: RecordId) -> StoreResult<Post> {
        self.store
            .read()?
            .posts
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(Entity::Post, id))
    }

    /// Remove a post without checking who wrote it
    pub fn delete_by_id(&self, id: RecordId) -> StoreResult<()> {
        self.store.mutate(|mut doc: Document| {
            doc.posts
                .remove(&id)
                .ok_or_else(|| StoreError::not_found(Entity::Post, id))?;
            Ok(doc)
        })?;

        info!(post_id = id, "post deleted");
        Ok(())
    }

    /// Remove a post only if `requester_id` wrote it
    ///
    /// The authorship check and the delete share one critical section.
    pub fn delete_owned(&self, id: RecordId, requester_id: RecordId) -> StoreResult<()> {
        self.store.mutate_with(|doc| {
            let post = doc
                .posts
                .get(&id)
                .ok_or_else(|| StoreError::not_found(Entity::Post, id))?;

            if post.author_id != requester_id {
                return Err(StoreError::NotAuthor {
                    post_id: id,
                    requester_id,
                });
            }

            doc.posts.remove(&id);
            Ok(())
        })?;

        info!(post_id = id, requester_id, "post deleted by author");
        Ok(())
    }
}
