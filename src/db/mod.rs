//! In-memory storage behind repository traits.
//!
//! The authentication core only talks to [`UserRepository`]; handlers reach
//! both repositories through a cloneable [`Database`] handle.

mod posts;
mod user;

use std::sync::Arc;

pub use posts::{NewPost, Post, PostStore};
pub use user::{Password, User, UserStore};

/// Errors returned by repository writes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email is already registered")]
    DuplicateEmail,
}

/// User lookups required by the authentication core.
pub trait UserRepository: Send + Sync {
    fn find_by_id(&self, id: &str) -> Option<User>;
    fn find_by_email(&self, email: &str) -> Option<User>;
    /// Insert a new user. Fails if the email is taken (exact match).
    fn insert(&self, user: User) -> Result<(), StoreError>;
}

pub trait PostRepository: Send + Sync {
    fn create(&self, post: NewPost) -> Post;
    /// All posts, newest first.
    fn list(&self) -> Vec<Post>;
}

#[derive(Clone)]
pub struct Database {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl Database {
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { users, posts }
    }

    /// Empty in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(UserStore::new()), Arc::new(PostStore::new()))
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    pub fn posts(&self) -> &dyn PostRepository {
        self.posts.as_ref()
    }
}
