use std::collections::HashMap;
use std::sync::Arc;

use agora_types::{Post, PostComment, User};

use crate::api::Api;
use crate::controllers::posts::PLACEHOLDER_EMAIL;
use crate::forms::CommentForm;
use crate::optimistic;

/// One proponent's profile: the user record, their posts, and each post's
/// comments, fetched with per-branch failure isolation.
pub struct ProfileDetailController {
    api: Arc<dyn Api>,

    pub user: Option<User>,
    pub posts: Vec<Post>,
    pub comment_forms: HashMap<i64, CommentForm>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProfileDetailController {
    pub fn new(api: Arc<dyn Api>) -> Self {
        Self {
            api,
            user: None,
            posts: Vec::new(),
            comment_forms: HashMap::new(),
            loading: false,
            error: None,
        }
    }

    /// Loads the user, their posts, then each post's comments. A failure in
    /// any branch degrades that branch to empty instead of failing the view.
    pub async fn load(&mut self, user_id: i64) {
        self.loading = true;
        self.error = None;

        match self.api.user(user_id).await {
            Ok(mut user) => {
                user.name = user.name.trim().to_string();
                self.user = Some(user);
            }
            Err(e) => {
                log::error!("Failed to load user {user_id}: {e}");
                self.error = Some("Unable to load user".to_string());
                self.user = None;
            }
        }

        self.posts = match self.api.user_posts(user_id).await {
            Ok(posts) => posts,
            Err(e) => {
                log::error!("Failed to load posts for user {user_id}: {e}");
                Vec::new()
            }
        };

        for post in &mut self.posts {
            self.comment_forms.insert(post.id, CommentForm::default());
            post.comments = match self.api.comments_for_post(post.id).await {
                Ok(comments) => Some(comments),
                Err(e) => {
                    log::error!("Failed to load comments for post {}: {e}", post.id);
                    Some(Vec::new())
                }
            };
        }

        self.loading = false;
    }

    /// Appends a comment to the post purely client-side. No network call:
    /// this view's composer has always been local-only, unlike the post
    /// list's, and the two are deliberately kept distinct.
    pub fn submit_comment(&mut self, post_id: i64) {
        let Some(form) = self.comment_forms.get(&post_id) else {
            return;
        };
        if !form.is_valid() {
            return;
        }
        let comment = PostComment {
            id: optimistic::temp_id(),
            post_id,
            parent_id: None,
            name: form.name.clone(),
            email: PLACEHOLDER_EMAIL.to_string(),
            body: form.body.clone(),
            likes: 0,
        };

        if let Some(post) = self.posts.iter_mut().find(|p| p.id == post_id) {
            post.comments.get_or_insert_with(Vec::new).push(comment);
        }
        if let Some(form) = self.comment_forms.get_mut(&post_id) {
            form.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{comment, post, stub_error, user, StubApi};

    #[tokio::test]
    async fn loads_user_posts_and_comments() {
        let api = Arc::new(StubApi::new());
        api.script_user(Ok(user(3, "  Ana ")));
        api.script_user_posts(Ok(vec![post(10, "a", "b"), post(11, "c", "d")]));
        api.script_comments(Ok(vec![comment(1, 10, "n")]));
        api.script_comments(Ok(Vec::new()));

        let mut detail = ProfileDetailController::new(api.clone());
        detail.load(3).await;

        assert_eq!(detail.user.as_ref().unwrap().name, "Ana", "name is trimmed");
        assert_eq!(detail.posts.len(), 2);
        assert_eq!(detail.posts[0].comments.as_ref().unwrap().len(), 1);
        assert!(detail.posts[1].comments.as_ref().unwrap().is_empty());
        assert!(detail.comment_forms.contains_key(&10));
        assert!(!detail.loading);
    }

    #[tokio::test]
    async fn user_failure_degrades_but_posts_still_load() {
        let api = Arc::new(StubApi::new());
        api.script_user(Err(stub_error()));
        api.script_user_posts(Ok(vec![post(10, "a", "b")]));
        api.script_comments(Ok(Vec::new()));

        let mut detail = ProfileDetailController::new(api.clone());
        detail.load(3).await;

        assert!(detail.user.is_none());
        assert_eq!(detail.error.as_deref(), Some("Unable to load user"));
        assert_eq!(detail.posts.len(), 1);
    }

    #[tokio::test]
    async fn comment_fetch_failure_substitutes_an_empty_thread() {
        let api = Arc::new(StubApi::new());
        api.script_user(Ok(user(3, "Ana")));
        api.script_user_posts(Ok(vec![post(10, "a", "b"), post(11, "c", "d")]));
        api.script_comments(Err(stub_error()));
        api.script_comments(Ok(vec![comment(2, 11, "n")]));

        let mut detail = ProfileDetailController::new(api.clone());
        detail.load(3).await;

        assert!(detail.posts[0].comments.as_ref().unwrap().is_empty());
        assert_eq!(detail.posts[1].comments.as_ref().unwrap().len(), 1);
        assert!(detail.error.is_none(), "branch failures do not fail the view");
    }

    #[tokio::test]
    async fn composer_appends_locally_without_network() {
        let api = Arc::new(StubApi::new());
        api.script_user(Ok(user(3, "Ana")));
        api.script_user_posts(Ok(vec![post(10, "a", "b")]));
        api.script_comments(Ok(Vec::new()));

        let mut detail = ProfileDetailController::new(api.clone());
        detail.load(3).await;

        {
            let form = detail.comment_forms.get_mut(&10).unwrap();
            form.name = "n".to_string();
            form.body = "local comment".to_string();
        }
        detail.submit_comment(10);

        let thread = detail.posts[0].comments.as_ref().unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].body, "local comment");
        assert_eq!(thread[0].email, PLACEHOLDER_EMAIL);
        assert_eq!(api.call_count("create_comment"), 0);
        assert!(!detail.comment_forms[&10].is_valid(), "form is reset");
    }

    #[tokio::test]
    async fn invalid_composer_is_silently_blocked() {
        let api = Arc::new(StubApi::new());
        api.script_user(Ok(user(3, "Ana")));
        api.script_user_posts(Ok(vec![post(10, "a", "b")]));
        api.script_comments(Ok(Vec::new()));

        let mut detail = ProfileDetailController::new(api.clone());
        detail.load(3).await;
        detail.submit_comment(10);

        assert!(detail.posts[0].comments.as_ref().unwrap().is_empty());
    }
}
