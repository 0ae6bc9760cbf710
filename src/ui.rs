// UI layer: an interactive menu built on `dialoguer`, with `indicatif`
// spinners while requests are in flight. Browsing goes through
// `routes::History`, so "Back" returns to the listing at the row that was
// selected before.

use crate::api::{envelope_data, ApiClient, ArticleDraft, CategoryDraft, QueryParams, ThumbnailFile};
use crate::error::ApiError;
use crate::routes::{History, Route, ScrollPosition};
use anyhow::Result;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Main interactive menu. Runs until the user chooses "Exit".
pub async fn main_menu(api: ApiClient) -> Result<()> {
    loop {
        let session = if api.session().has_token() { "logged in" } else { "guest" };
        println!("[{session}] {}", api.base_url());

        let items = [
            "Browse articles",
            "Open path",
            "Login",
            "Verify session",
            "Logout",
            "Dashboard",
            "Top articles",
            "Categories",
            "New article",
            "Manage article",
            "Upload thumbnail",
            "Delete uploaded file",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => browse(&api, &Route::Home.path()).await?,
            1 => {
                let path: String = Input::new().with_prompt("Path").default("/".into()).interact_text()?;
                browse(&api, &path).await?;
            }
            2 => handle_login(&api).await?,
            3 => report(with_spinner("Verifying...", api.auth().verify()).await),
            4 => {
                with_spinner("Logging out...", api.auth().logout()).await;
                println!("Logged out.");
            }
            5 => {
                let range: String = Input::new()
                    .with_prompt("Range")
                    .default(crate::api::DEFAULT_RANGE.into())
                    .interact_text()?;
                report(with_spinner("Loading dashboard...", api.analytics().get_dashboard(Some(range.as_str()))).await);
            }
            6 => {
                let limit: u32 = Input::new()
                    .with_prompt("How many")
                    .default(crate::api::DEFAULT_TOP_LIMIT)
                    .interact_text()?;
                report(with_spinner("Loading...", api.analytics().get_top_articles(Some(limit), None)).await);
            }
            7 => handle_categories(&api).await?,
            8 => handle_new_article(&api).await?,
            9 => handle_manage_article(&api).await?,
            10 => {
                if !api.session().has_token() {
                    println!("You should login first to upload a thumbnail.");
                    continue;
                }
                let path: String = Input::new().with_prompt("Image file path").interact_text()?;
                match ThumbnailFile::from_path(&path).await {
                    Ok(file) => report(with_spinner("Uploading...", api.uploads().upload_thumbnail(file)).await),
                    Err(e) => println!("Upload failed: {e:#}"),
                }
            }
            11 => {
                let filename: String = Input::new().with_prompt("Filename").interact_text()?;
                report(with_spinner("Deleting...", api.uploads().delete_file(&filename)).await);
            }
            _ => break,
        }
    }
    Ok(())
}

enum Nav {
    Open(String),
    Back,
    Menu,
}

/// Show pages starting at `path` until the user returns to the menu or runs
/// out of history. Each browse starts from an empty history.
async fn browse(api: &ApiClient, path: &str) -> Result<()> {
    let mut history = History::new();
    let mut visit = history.push(path);
    loop {
        println!("\n== {} ==", visit.title);
        let nav = match &visit.route {
            Route::Home => listing_page(api, &mut history, visit.scroll).await?,
            Route::ArticleById(id) => {
                article_page(api, with_spinner("Loading...", api.articles().get_by_id(id)).await).await?
            }
            Route::ArticleBySlug(slug) => {
                article_page(api, with_spinner("Loading...", api.articles().get_by_slug(slug)).await).await?
            }
        };
        visit = match nav {
            Nav::Open(path) => history.push(&path),
            Nav::Back => match history.back() {
                Some(previous) => previous,
                None => return Ok(()),
            },
            Nav::Menu => return Ok(()),
        };
    }
}

async fn listing_page(api: &ApiClient, history: &mut History, scroll: ScrollPosition) -> Result<Nav> {
    let query = QueryParams::new().with("status", "published");
    let payload = match with_spinner("Loading articles...", api.articles().get_all(&query)).await {
        Ok(payload) => payload,
        Err(e) => {
            println!("Could not load articles: {e}");
            return Ok(Nav::Menu);
        }
    };

    let articles = list_items(envelope_data(&payload), "articles");
    if articles.is_empty() {
        println!("No articles yet.");
        return Ok(Nav::Menu);
    }
    let mut labels: Vec<String> = articles.iter().map(|a| field(a, "title")).collect();
    labels.push("<- Menu".into());

    let selected = Select::new()
        .items(&labels)
        .default(scroll.top.min(labels.len() - 1))
        .interact()?;
    let Some(article) = articles.get(selected) else {
        return Ok(Nav::Menu);
    };
    history.save_scroll(ScrollPosition { top: selected });

    let route = match (id_of(article), article.get("slug").and_then(Value::as_str)) {
        (Some(id), _) => Route::ArticleById(id),
        (None, Some(slug)) => Route::ArticleBySlug(slug.to_string()),
        (None, None) => {
            println!("Article has neither id nor slug.");
            return Ok(Nav::Menu);
        }
    };
    Ok(Nav::Open(route.path()))
}

async fn article_page(api: &ApiClient, loaded: Result<Value, ApiError>) -> Result<Nav> {
    let payload = match loaded {
        Ok(payload) => payload,
        Err(e) => {
            println!("Could not load article: {e}");
            return Ok(Nav::Back);
        }
    };
    let article = article_of(&payload);
    println!("{}\n", field(article, "title"));
    println!("{}", field(article, "content"));

    let id = id_of(article);
    if let Some(id) = &id {
        if let Err(e) = api.analytics().increment_view(id).await {
            tracing::debug!(error = %e, "view not counted");
        }
    }

    loop {
        let items = ["<- Back", "Toggle like", "Like status", "Menu"];
        let choice = Select::new().items(&items).default(0).interact()?;
        if choice == 0 {
            return Ok(Nav::Back);
        }
        if choice == 3 {
            return Ok(Nav::Menu);
        }
        let Some(id) = &id else {
            println!("Article has no id.");
            continue;
        };
        if choice == 1 {
            report(api.analytics().toggle_like(id).await);
        } else {
            report(api.analytics().get_like_status(id).await);
        }
    }
}

async fn handle_login(api: &ApiClient) -> Result<()> {
    let username: String = Input::new().with_prompt("Username").interact_text()?;
    let password: String = Password::new().with_prompt("Password").interact()?;

    match with_spinner("Logging in...", api.auth().login(&username, &password)).await {
        Ok(_) => println!("Welcome {username}!"),
        Err(e) => println!("Login failed: {e}"),
    }
    Ok(())
}

async fn handle_categories(api: &ApiClient) -> Result<()> {
    let items = ["List", "Show one", "Create", "Rename", "Delete", "<- Menu"];
    match Select::new().items(&items).default(0).interact()? {
        0 => report(with_spinner("Loading...", api.categories().get_all(&QueryParams::new())).await),
        1 => {
            let id: String = Input::new().with_prompt("Category id").interact_text()?;
            report(with_spinner("Loading...", api.categories().get_by_id(&id)).await);
        }
        2 => {
            let name: String = Input::new().with_prompt("Name").interact_text()?;
            let description: String = Input::new()
                .with_prompt("Description")
                .allow_empty(true)
                .interact_text()?;
            let draft = CategoryDraft {
                name,
                description: non_empty(description),
                ..Default::default()
            };
            report(with_spinner("Creating...", api.categories().create(&draft)).await);
        }
        3 => {
            let id: String = Input::new().with_prompt("Category id").interact_text()?;
            let name: String = Input::new().with_prompt("New name").interact_text()?;
            let draft = CategoryDraft {
                name,
                ..Default::default()
            };
            report(with_spinner("Saving...", api.categories().update(&id, &draft)).await);
        }
        4 => {
            let id: String = Input::new().with_prompt("Category id").interact_text()?;
            if Confirm::new().with_prompt("Delete this category?").interact()? {
                report(with_spinner("Deleting...", api.categories().delete(&id)).await);
            }
        }
        _ => {}
    }
    Ok(())
}

async fn handle_new_article(api: &ApiClient) -> Result<()> {
    let title: String = Input::new().with_prompt("Title").interact_text()?;
    let slug: String = Input::new().with_prompt("Slug").allow_empty(true).interact_text()?;
    let excerpt: String = Input::new().with_prompt("Excerpt").allow_empty(true).interact_text()?;
    let content: String = Input::new().with_prompt("Content").interact_text()?;
    let category: String = Input::new()
        .with_prompt("Category id")
        .allow_empty(true)
        .interact_text()?;

    let draft = ArticleDraft {
        title,
        content,
        slug: non_empty(slug),
        excerpt: non_empty(excerpt),
        category_id: non_empty(category),
        ..Default::default()
    };
    report(with_spinner("Creating...", api.articles().create(&draft)).await);
    Ok(())
}

async fn handle_manage_article(api: &ApiClient) -> Result<()> {
    let id: String = Input::new().with_prompt("Article id").interact_text()?;
    let items = ["Publish", "Archive", "Edit title", "Delete", "<- Menu"];
    match Select::new().items(&items).default(0).interact()? {
        0 => report(with_spinner("Publishing...", api.articles().publish(&id)).await),
        1 => report(with_spinner("Archiving...", api.articles().archive(&id)).await),
        2 => {
            let current = api.articles().get_by_id(&id).await;
            let current = match current {
                Ok(payload) => payload,
                Err(e) => {
                    println!("Could not load article: {e}");
                    return Ok(());
                }
            };
            let article = article_of(&current);
            let title: String = Input::new()
                .with_prompt("Title")
                .default(field(article, "title"))
                .interact_text()?;
            let draft = ArticleDraft {
                title,
                content: field(article, "content"),
                ..Default::default()
            };
            report(with_spinner("Saving...", api.articles().update(&id, &draft)).await);
        }
        3 => {
            if Confirm::new().with_prompt("Delete this article?").interact()? {
                report(with_spinner("Deleting...", api.articles().delete(&id)).await);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Print a payload's data, or the normalized error.
fn report(result: Result<Value, ApiError>) {
    match result {
        Ok(payload) => match serde_json::to_string_pretty(envelope_data(&payload)) {
            Ok(text) => println!("{text}"),
            Err(_) => println!("{payload}"),
        },
        Err(e) => println!("Request failed: {e}"),
    }
}

/// Run a request while a spinner ticks.
async fn with_spinner<F: Future>(message: &'static str, request: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    let output = request.await;
    spinner.finish_and_clear();
    output
}

// Lists come back either bare or wrapped under a named key.
fn list_items(data: &Value, key: &str) -> Vec<Value> {
    data.as_array()
        .or_else(|| data.get(key).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}

// Single-article responses may nest the record under `article`.
fn article_of(payload: &Value) -> &Value {
    let data = envelope_data(payload);
    data.get("article").unwrap_or(data)
}

fn id_of(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
