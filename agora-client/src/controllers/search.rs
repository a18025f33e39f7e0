use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;

use agora_types::{Post, UpdatePostRequest};

use crate::api::Api;
use crate::forms::PostForm;

pub const DEBOUNCE: Duration = Duration::from_millis(250);

/// Client-side search over the full post collection, with debounced
/// filtering and optimistic inline edits.
pub struct SearchController {
    api: Arc<dyn Api>,

    all_posts: Vec<Post>,
    pub filtered: Vec<Post>,
    pub loading: bool,
    pub error: Option<String>,

    /// Raw query text waiting out the debounce window.
    pending: Option<(String, Instant)>,
    /// Last raw value that went through, for change suppression.
    last_raw: String,
    /// Last applied query, normalized; drives highlighting.
    last_query: String,

    pub editing_post: Option<i64>,
    pub edit_form: PostForm,
}

impl SearchController {
    pub fn new(api: Arc<dyn Api>) -> Self {
        Self {
            api,
            all_posts: Vec::new(),
            filtered: Vec::new(),
            loading: false,
            error: None,
            pending: None,
            last_raw: String::new(),
            last_query: String::new(),
            editing_post: None,
            edit_form: PostForm::default(),
        }
    }

    /// Loads the backing collection once. Failure leaves it empty and sets
    /// the error surface; search stays usable (and vacuous).
    pub async fn load_posts(&mut self) {
        self.loading = true;
        self.error = None;
        match self.api.posts().await {
            Ok(posts) => {
                self.all_posts = posts;
                self.filtered.clear();
            }
            Err(e) => {
                log::error!("Failed to load posts for search: {e}");
                self.error = Some("Failed to load posts".to_string());
                self.all_posts.clear();
                self.filtered.clear();
            }
        }
        self.loading = false;
    }

    /// Records a query edit; it takes effect once the debounce window has
    /// elapsed and `poll` runs.
    pub fn set_query(&mut self, text: &str) {
        self.pending = Some((text.to_string(), Instant::now() + DEBOUNCE));
    }

    pub fn clear(&mut self) {
        self.set_query("");
    }

    /// Applies a pending query whose debounce window has passed. Unchanged
    /// values are suppressed. Called from the event loop tick.
    pub fn poll(&mut self, now: Instant) {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if !due {
            return;
        }
        let Some((raw, _)) = self.pending.take() else {
            return;
        };
        if raw == self.last_raw {
            return;
        }
        self.last_raw = raw.clone();
        self.apply_query(&raw);
    }

    fn apply_query(&mut self, raw: &str) {
        self.error = None;
        let text = raw.trim().to_lowercase();
        self.last_query = text.clone();

        // An empty query shows nothing rather than everything.
        if text.is_empty() {
            self.filtered = Vec::new();
            return;
        }
        self.filtered = self
            .all_posts
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&text) || p.body.to_lowercase().contains(&text)
            })
            .cloned()
            .collect();
    }

    pub fn start_edit(&mut self, post_id: i64) {
        let Some(post) = self.all_posts.iter().find(|p| p.id == post_id) else {
            return;
        };
        self.editing_post = Some(post_id);
        self.edit_form.title = post.title.clone();
        self.edit_form.body = post.body.clone();
    }

    pub fn cancel_edit(&mut self) {
        self.editing_post = None;
        self.edit_form.reset();
    }

    /// Applies the edit to both the backing collection and the current
    /// result view, then issues the update. A failed update surfaces a
    /// message but the local edit stands (last writer wins).
    ///
    /// Only the title is required here; clearing a body is a legal edit,
    /// unlike the feed's edit form.
    pub async fn save_edit(&mut self, post_id: i64) {
        if self.editing_post != Some(post_id) || self.edit_form.title.trim().is_empty() {
            return;
        }
        let title = self.edit_form.title.clone();
        let body = self.edit_form.body.clone();

        if let Some(post) = self.all_posts.iter_mut().find(|p| p.id == post_id) {
            post.title = title.clone();
            post.body = body.clone();
        }
        if let Some(post) = self.filtered.iter_mut().find(|p| p.id == post_id) {
            post.title = title.clone();
            post.body = body.clone();
        }
        self.cancel_edit();

        let request = UpdatePostRequest { title, body };
        if let Err(e) = self.api.update_post(post_id, request).await {
            log::error!("Failed to save post {post_id}: {e}");
            self.error = Some("Failed to save changes".to_string());
        }
    }

    /// Escapes `text` for HTML and wraps every case-insensitive occurrence
    /// of the last applied query in a highlight span.
    pub fn highlight(&self, text: &str) -> String {
        let escaped = escape_html(text);
        if self.last_query.is_empty() {
            return escaped;
        }
        let pattern = format!("(?i){}", regex::escape(&self.last_query));
        let Ok(re) = Regex::new(&pattern) else {
            return escaped;
        };
        re.replace_all(&escaped, |caps: &regex::Captures<'_>| {
            format!("<span class=\"hl\">{}</span>", &caps[0])
        })
        .into_owned()
    }

    pub fn results(&self) -> &[Post] {
        &self.filtered
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
