use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use agora_types::{CreateCommentRequest, CreatePostRequest, CreateReplyRequest, Post, PostComment};

use crate::api::Api;
use crate::auth::{AuthHandle, READY_TIMEOUT};
use crate::forms::{CommentForm, PostForm};
use crate::optimistic;
use crate::pagination;
use crate::store::PostStore;

pub const PAGE_SIZE: usize = 8;

/// The comment composer carries no identity field, so submissions go out
/// under a fixed placeholder address.
pub const PLACEHOLDER_EMAIL: &str = "user@example.com";

/// Owns the post feed: loading through the shared store, client-side
/// pagination, and the optimistic create/comment/reply/like/edit flows.
pub struct PostsController {
    api: Arc<dyn Api>,
    auth: AuthHandle,
    store: PostStore,

    pub posts: Vec<Post>,
    /// The window for the current page.
    pub visible: Vec<Post>,
    pub page: usize,
    pub comments: HashMap<i64, Vec<PostComment>>,

    pub new_post_form: PostForm,
    pub edit_form: PostForm,
    pub comment_forms: HashMap<i64, CommentForm>,
    pub reply_forms: HashMap<i64, HashMap<i64, CommentForm>>,

    pub show_new_post_form: bool,
    /// Post being edited, as (id, index into `posts`).
    pub editing_post: Option<(i64, usize)>,
    /// Post whose comment thread is open.
    pub expanded_post: Option<i64>,
    pub loading_comments: bool,
    /// Post whose "add comment" panel is open.
    pub active_comment_post: Option<i64>,
    /// Comment currently being replied to.
    pub replying_to: Option<i64>,

    posting_post: bool,
    posting_comment: HashSet<i64>,
    posting_reply: HashSet<(i64, i64)>,

    /// Transient snack-bar style notification.
    pub message: Option<String>,
}

impl PostsController {
    pub fn new(api: Arc<dyn Api>, auth: AuthHandle, store: PostStore) -> Self {
        Self {
            api,
            auth,
            store,
            posts: Vec::new(),
            visible: Vec::new(),
            page: 1,
            comments: HashMap::new(),
            new_post_form: PostForm::default(),
            edit_form: PostForm::default(),
            comment_forms: HashMap::new(),
            reply_forms: HashMap::new(),
            show_new_post_form: false,
            editing_post: None,
            expanded_post: None,
            loading_comments: false,
            active_comment_post: None,
            replying_to: None,
            posting_post: false,
            posting_comment: HashSet::new(),
            posting_reply: HashSet::new(),
            message: None,
        }
    }

    /// Startup entry point: waits briefly for a bearer token to be
    /// published, then loads the feed either way. The feed is readable
    /// without auth; only mutations require the token.
    pub async fn initialize(&mut self) {
        if self.auth.wait_ready(READY_TIMEOUT).await.is_none() {
            log::info!("No bearer token after startup wait; continuing unauthenticated");
        }
        self.load_posts().await;
    }

    /// Adopts the shared store when it is warm; fetches otherwise. A fetch
    /// failure notifies and leaves the list empty, with no automatic retry.
    pub async fn load_posts(&mut self) {
        if let Some(cached) = self.store.snapshot() {
            self.posts = cached;
            self.setup_forms_for_posts();
            self.apply_pagination();
            return;
        }

        match self.api.posts().await {
            Ok(posts) => {
                self.posts = posts;
                self.store.replace(self.posts.clone());
                self.setup_forms_for_posts();
                self.apply_pagination();
            }
            Err(e) => {
                log::error!("Failed to load posts: {e}");
                self.message = Some("Failed to load posts".to_string());
            }
        }
    }

    fn setup_forms_for_posts(&mut self) {
        for post in &self.posts {
            self.comment_forms.entry(post.id).or_default();
            self.reply_forms.entry(post.id).or_default();
        }
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.posts.len(), PAGE_SIZE)
    }

    /// Moves to page `n`; out-of-range requests leave the state unchanged.
    pub fn go_to_page(&mut self, n: usize) {
        if n < 1 || n > self.total_pages() {
            return;
        }
        self.page = n;
        self.apply_pagination();
    }

    fn apply_pagination(&mut self) {
        self.visible = pagination::window(&self.posts, self.page, PAGE_SIZE);
    }

    pub fn is_posting(&self) -> bool {
        self.posting_post
    }

    pub fn is_commenting(&self, post_id: i64) -> bool {
        self.posting_comment.contains(&post_id)
    }

    pub fn is_replying(&self, post_id: i64, parent_id: i64) -> bool {
        self.posting_reply.contains(&(post_id, parent_id))
    }

    /// Publishes the new-post form: resolve the token's user, stage the
    /// post at the front of the feed, then settle against the create call.
    pub async fn submit_new_post(&mut self) {
        if !self.new_post_form.is_valid() || self.posting_post || !self.auth.is_signed_in() {
            return;
        }
        self.posting_post = true;

        let user_id = match self.api.current_user().await {
            Ok(Some(user)) => user.id,
            Ok(None) => {
                self.message = Some("Invalid token: no user found".to_string());
                self.posting_post = false;
                return;
            }
            Err(e) => {
                log::error!("Failed to resolve current user: {e}");
                self.message = Some("Failed to retrieve user info".to_string());
                self.posting_post = false;
                return;
            }
        };

        let temp_id = optimistic::temp_id();
        let staged = Post {
            id: temp_id,
            title: self.new_post_form.title.clone(),
            body: self.new_post_form.body.clone(),
            likes: 0,
            image_url: None,
            comments: None,
        };
        let request = CreatePostRequest {
            title: staged.title.clone(),
            body: staged.body.clone(),
            user_id,
        };

        optimistic::stage_front(&mut self.posts, staged);
        self.store.replace(self.posts.clone());
        self.apply_pagination();

        match self.api.create_post(request).await {
            Ok(created) => {
                let created_id = created.id;
                optimistic::commit(&mut self.posts, temp_id, created, |p| p.id);
                self.store.replace(self.posts.clone());
                self.apply_pagination();
                self.comment_forms.entry(created_id).or_default();
                self.reply_forms.entry(created_id).or_default();
                self.new_post_form.reset();
                self.show_new_post_form = false;
                self.message = Some("Post published".to_string());
            }
            Err(e) => {
                optimistic::roll_back(&mut self.posts, temp_id, |p| p.id);
                self.store.replace(self.posts.clone());
                self.apply_pagination();
                log::error!("Failed to publish post: {e}");
                self.message = Some("Failed to publish post".to_string());
            }
        }
        self.posting_post = false;
    }

    /// Toggles the "add comment" panel for a post, resetting its form when
    /// it opens.
    pub fn prepare_new_comment(&mut self, post_id: i64) {
        if self.active_comment_post == Some(post_id) {
            self.active_comment_post = None;
            return;
        }
        self.active_comment_post = Some(post_id);
        self.comment_forms.entry(post_id).or_default().reset();
    }

    pub async fn submit_comment(&mut self, post_id: i64) {
        let Some(form) = self.comment_forms.get(&post_id) else {
            return;
        };
        if !form.is_valid() || self.posting_comment.contains(&post_id) {
            return;
        }
        let name = form.name.clone();
        let body = form.body.clone();

        let temp_id = optimistic::temp_id();
        let staged = PostComment {
            id: temp_id,
            post_id,
            parent_id: None,
            name: name.clone(),
            email: PLACEHOLDER_EMAIL.to_string(),
            body: body.clone(),
            likes: 0,
        };
        optimistic::stage_back(self.comments.entry(post_id).or_default(), staged);
        self.posting_comment.insert(post_id);

        let request = CreateCommentRequest {
            name,
            email: PLACEHOLDER_EMAIL.to_string(),
            body,
        };
        match self.api.create_comment(post_id, request).await {
            Ok(created) => {
                let thread = self.comments.entry(post_id).or_default();
                optimistic::commit(thread, temp_id, created, |c| c.id);
                if let Some(form) = self.comment_forms.get_mut(&post_id) {
                    form.reset();
                }
                self.active_comment_post = None;
                self.message = Some("Comment added".to_string());
            }
            Err(e) => {
                if let Some(thread) = self.comments.get_mut(&post_id) {
                    optimistic::roll_back(thread, temp_id, |c| c.id);
                }
                log::error!("Failed to add comment: {e}");
                self.message = Some("Failed to add comment".to_string());
            }
        }
        self.posting_comment.remove(&post_id);
    }

    /// Opens the reply composer under a comment, resetting its form when
    /// it already exists.
    pub fn reply_to_comment(&mut self, post_id: i64, parent_id: i64) {
        self.replying_to = Some(parent_id);
        self.reply_forms
            .entry(post_id)
            .or_default()
            .entry(parent_id)
            .or_default()
            .reset();
    }

    pub async fn submit_reply(&mut self, post_id: i64, parent_id: i64) {
        let Some(form) = self
            .reply_forms
            .get(&post_id)
            .and_then(|forms| forms.get(&parent_id))
        else {
            return;
        };
        if !form.is_valid() || self.posting_reply.contains(&(post_id, parent_id)) {
            return;
        }
        let name = form.name.clone();
        let body = form.body.clone();

        let temp_id = optimistic::temp_id();
        let staged = PostComment {
            id: temp_id,
            post_id,
            parent_id: Some(parent_id),
            name: name.clone(),
            email: PLACEHOLDER_EMAIL.to_string(),
            body: body.clone(),
            likes: 0,
        };
        optimistic::stage_back(self.comments.entry(post_id).or_default(), staged);
        self.posting_reply.insert((post_id, parent_id));

        let request = CreateReplyRequest {
            name,
            email: PLACEHOLDER_EMAIL.to_string(),
            body,
            post_id,
            parent_id,
        };
        match self.api.create_reply(request).await {
            Ok(created) => {
                let thread = self.comments.entry(post_id).or_default();
                optimistic::commit(thread, temp_id, created, |c| c.id);
                if let Some(form) = self
                    .reply_forms
                    .get_mut(&post_id)
                    .and_then(|forms| forms.get_mut(&parent_id))
                {
                    form.reset();
                }
                self.replying_to = None;
                self.message = Some("Reply sent".to_string());
            }
            Err(e) => {
                if let Some(thread) = self.comments.get_mut(&post_id) {
                    optimistic::roll_back(thread, temp_id, |c| c.id);
                }
                log::error!("Failed to send reply: {e}");
                self.message = Some("Failed to send reply".to_string());
            }
        }
        self.posting_reply.remove(&(post_id, parent_id));
    }

    /// Opens or closes a post's comment thread, fetching it on first open.
    /// The loading flag is cleared on both settle paths.
    pub async fn toggle_comments(&mut self, post_id: i64) {
        if self.expanded_post == Some(post_id) {
            self.expanded_post = None;
            return;
        }
        self.expanded_post = Some(post_id);

        if self.comments.contains_key(&post_id) {
            return;
        }
        self.loading_comments = true;
        match self.api.comments_for_post(post_id).await {
            Ok(thread) => {
                let forms = self.reply_forms.entry(post_id).or_default();
                for comment in &thread {
                    forms.entry(comment.id).or_default();
                }
                self.comments.insert(post_id, thread);
            }
            Err(e) => {
                log::error!("Failed to load comments for post {post_id}: {e}");
                self.message = Some("Failed to load comments".to_string());
            }
        }
        self.loading_comments = false;
    }

    /// Local-only like counter; the store is kept in step.
    pub fn like_post(&mut self, post_id: i64) {
        let Some(post) = self.posts.iter_mut().find(|p| p.id == post_id) else {
            return;
        };
        post.likes += 1;
        self.store.replace(self.posts.clone());
        self.apply_pagination();
    }

    pub fn like_comment(&mut self, post_id: i64, comment_id: i64) {
        if let Some(comment) = self
            .comments
            .get_mut(&post_id)
            .and_then(|thread| thread.iter_mut().find(|c| c.id == comment_id))
        {
            comment.likes += 1;
        }
    }

    /// Loads a post's fields into the edit form.
    pub fn start_edit(&mut self, post_id: i64) {
        let Some(index) = self.posts.iter().position(|p| p.id == post_id) else {
            return;
        };
        self.editing_post = Some((post_id, index));
        self.edit_form.title = self.posts[index].title.clone();
        self.edit_form.body = self.posts[index].body.clone();
    }

    /// Applies the edit locally (no network call) and syncs the store.
    pub fn submit_edit(&mut self, post_id: i64) {
        if !self.edit_form.is_valid() {
            return;
        }
        let index = match self.editing_post {
            Some((id, index)) if id == post_id => Some(index),
            _ => self.posts.iter().position(|p| p.id == post_id),
        };
        if let Some(index) = index {
            self.posts[index].title = self.edit_form.title.clone();
            self.posts[index].body = self.edit_form.body.clone();
            self.store.replace(self.posts.clone());
            self.apply_pagination();
        }
        self.editing_post = None;
        self.edit_form.reset();
    }

    /// Takes the pending notification, clearing it.
    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }
}
