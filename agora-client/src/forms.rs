//! Form state for the controllers.
//!
//! Required fields must be non-blank; user email must look like an
//! address. Invalid submissions are silently blocked by the controllers,
//! never surfaced as errors.

use agora_types::{Gender, UserStatus};

#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub title: String,
    pub body: String,
}

impl PostForm {
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.body.trim().is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    pub name: String,
    pub body: String,
}

impl CommentForm {
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.body.trim().is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub status: UserStatus,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            gender: Gender::Female,
            status: UserStatus::Active,
        }
    }
}

impl UserForm {
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && looks_like_email(&self.email)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn looks_like_email(s: &str) -> bool {
    let s = s.trim();
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}
