use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use agora_client::api::ApiClient;
use agora_client::auth::AuthHandle;
use agora_client::config::Config;
use agora_client::controllers::{
    PostsController, ProfileDetailController, ProfilesController, SearchController,
};
use agora_client::logging;
use agora_client::session::SessionStore;
use agora_client::store::PostStore;

const USAGE: &str = "\
agora - a client for the GoRest public API

Usage:
  agora posts [page]        show a page of the post feed
  agora search <query>      search post titles and bodies
  agora users [page]        list proponent profiles
  agora user <id>           show one profile with posts and comments
  agora login <token>       store a GoRest bearer token
  agora logout              forget the stored token
";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init_logging(&config.log)?;

    let store = SessionStore::new()?;
    let auth = AuthHandle::new(store)?;
    let api = Arc::new(ApiClient::new(config.base_url.clone(), auth.clone()));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("posts");

    match command {
        "posts" => {
            let page = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
            show_posts(api, auth, page).await;
        }
        "search" => {
            let Some(query) = args.get(1) else {
                eprint!("{USAGE}");
                std::process::exit(2);
            };
            run_search(api, query).await;
        }
        "users" => {
            let page = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
            show_users(api, page).await;
        }
        "user" => {
            let Some(id) = args.get(1).and_then(|s| s.parse().ok()) else {
                eprint!("{USAGE}");
                std::process::exit(2);
            };
            show_user(api, id).await;
        }
        "login" => {
            let Some(token) = args.get(1) else {
                eprint!("{USAGE}");
                std::process::exit(2);
            };
            auth.sign_in(token)?;
            println!("Token stored.");
        }
        "logout" => {
            auth.sign_out()?;
            println!("Token removed.");
        }
        _ => {
            eprint!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn show_posts(api: Arc<ApiClient>, auth: AuthHandle, page: usize) {
    let mut posts = PostsController::new(api, auth, PostStore::new());
    posts.initialize().await;

    if let Some(message) = posts.take_message() {
        eprintln!("{message}");
    }
    posts.go_to_page(page);

    println!("Page {page} of {}", posts.total_pages());
    for post in &posts.visible {
        println!("#{}  {}  ({} likes)", post.id, post.title, post.likes);
    }
}

async fn run_search(api: Arc<ApiClient>, query: &str) {
    let mut search = SearchController::new(api);
    search.load_posts().await;
    if let Some(error) = &search.error {
        eprintln!("{error}");
        return;
    }

    search.set_query(query);
    tokio::time::sleep(agora_client::controllers::search::DEBOUNCE).await;
    search.poll(Instant::now());

    for post in search.results() {
        println!("#{}  {}", post.id, search.highlight(&post.title));
    }
}

async fn show_users(api: Arc<ApiClient>, page: usize) {
    let mut profiles = ProfilesController::new(api);
    profiles.load_users().await;
    if let Some(error) = &profiles.error {
        eprintln!("{error}");
        return;
    }
    profiles.go_to_page(page);

    println!("Page {page} of {}", profiles.total_pages());
    for user in &profiles.visible {
        println!(
            "#{}  {}  <{}>  [{} / {}]",
            user.id,
            user.name,
            user.email,
            user.gender.as_str(),
            user.status.as_str()
        );
    }
}

async fn show_user(api: Arc<ApiClient>, id: i64) {
    let mut detail = ProfileDetailController::new(api);
    detail.load(id).await;
    if let Some(error) = &detail.error {
        eprintln!("{error}");
    }

    if let Some(user) = &detail.user {
        println!("{}  <{}>", user.name, user.email);
    }
    for post in &detail.posts {
        println!("\n#{}  {}", post.id, post.title);
        for comment in post.comments.as_deref().unwrap_or_default() {
            println!("    {} - {}", comment.name, comment.body);
        }
    }
}
