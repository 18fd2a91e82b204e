//! Post storage.

use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock};

use super::PostRepository;

#[derive(Debug, Clone)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the author when creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: String,
}

struct Posts {
    next_id: u64,
    // oldest first
    entries: Vec<Post>,
}

pub struct PostStore {
    inner: RwLock<Posts>,
}

impl PostStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Posts {
                next_id: 1,
                entries: Vec::new(),
            }),
        }
    }
}

impl Default for PostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PostRepository for PostStore {
    fn create(&self, post: NewPost) -> Post {
        let mut posts = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let created = Post {
            id: posts.next_id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            created_at: Utc::now(),
        };
        posts.next_id += 1;
        posts.entries.push(created.clone());
        created
    }

    fn list(&self) -> Vec<Post> {
        let posts = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        posts.entries.iter().rev().cloned().collect()
    }
}
