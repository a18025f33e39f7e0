use std::sync::Arc;

use agora_types::User;

use crate::api::Api;
use crate::forms::UserForm;
use crate::optimistic;
use crate::pagination;

pub const PAGE_SIZE: usize = 7;

/// Proponent directory: loads all users once, then filters, paginates,
/// adds, and removes purely client-side.
pub struct ProfilesController {
    api: Arc<dyn Api>,

    pub users: Vec<User>,
    pub filtered: Vec<User>,
    pub visible: Vec<User>,
    pub page: usize,
    pub search_term: String,
    pub form: UserForm,
    pub error: Option<String>,
}

impl ProfilesController {
    pub fn new(api: Arc<dyn Api>) -> Self {
        Self {
            api,
            users: Vec::new(),
            filtered: Vec::new(),
            visible: Vec::new(),
            page: 1,
            search_term: String::new(),
            form: UserForm::default(),
            error: None,
        }
    }

    pub async fn load_users(&mut self) {
        match self.api.users().await {
            Ok(users) => {
                self.users = users;
                self.filtered = self.users.clone();
                self.apply_pagination();
            }
            Err(e) => {
                log::error!("Failed to load users: {e}");
                self.error = Some("Failed to load users".to_string());
            }
        }
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.filtered.len(), PAGE_SIZE)
    }

    fn apply_pagination(&mut self) {
        self.visible = pagination::window(&self.filtered, self.page, PAGE_SIZE);
    }

    /// Filters on a case-insensitive name substring and resets to page 1.
    pub fn on_search_term(&mut self, term: &str) {
        self.search_term = term.to_lowercase();
        self.refilter();
        self.page = 1;
        self.apply_pagination();
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page;
        self.apply_pagination();
    }

    /// Adds a user purely client-side under a timestamp id; no network
    /// round-trip, unlike the post flows.
    pub fn add_user(&mut self) {
        if !self.form.is_valid() {
            return;
        }
        let user = User {
            id: optimistic::temp_id(),
            name: self.form.name.trim().to_string(),
            email: self.form.email.trim().to_string(),
            gender: self.form.gender,
            status: self.form.status,
        };
        self.users.insert(0, user);
        self.refilter();
        self.page = 1;
        self.apply_pagination();
        self.form.reset();
    }

    /// Removes a user purely client-side.
    pub fn remove_user(&mut self, id: i64) {
        self.users.retain(|u| u.id != id);
        self.refilter();
        self.page = 1;
        self.apply_pagination();
    }

    fn refilter(&mut self) {
        if self.search_term.trim().is_empty() {
            self.filtered = self.users.clone();
        } else {
            self.filtered = self
                .users
                .iter()
                .filter(|u| u.name.to_lowercase().contains(&self.search_term))
                .cloned()
                .collect();
        }
    }
}
