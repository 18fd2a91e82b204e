use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use super::{StoreError, UserRepository};

/// Plain-text password.
///
/// Passwords are stored and compared verbatim; there is no hashing. `Debug`
/// never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password: Password,
    pub name: String,
}

impl User {
    /// New user with a random UUID id.
    pub fn new(email: impl Into<String>, password: Password, name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            password,
            name: name.into(),
        }
    }
}

#[derive(Default)]
struct Users {
    by_id: HashMap<String, User>,
    // email -> id
    by_email: HashMap<String, String>,
}

#[derive(Default)]
pub struct UserStore {
    inner: RwLock<Users>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user by id. Returns whether a user was removed.
    pub fn remove(&self, id: &str) -> bool {
        let mut users = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match users.by_id.remove(id) {
            Some(user) => {
                users.by_email.remove(&user.email);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserRepository for UserStore {
    fn find_by_id(&self, id: &str) -> Option<User> {
        let users = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        users.by_id.get(id).cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<User> {
        let users = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned()
    }

    fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if users.by_email.contains_key(&user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        users.by_email.insert(user.email.clone(), user.id.clone());
        users.by_id.insert(user.id.clone(), user);
        Ok(())
    }
}
