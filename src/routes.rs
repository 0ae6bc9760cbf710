// Client-side navigation: which page a path shows, what the page is titled,
// and where the view should be scrolled when it is shown.

pub const DEFAULT_TITLE: &str = "Jon AI Lab";
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    ArticleById(String),
    ArticleBySlug(String),
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::ArticleById(_) => "ArticleById",
            Route::ArticleBySlug(_) => "ArticleBySlug",
        }
    }

    pub fn title(&self) -> Option<&'static str> {
        match self {
            Route::Home => Some("Jon AI Lab - Blog"),
            Route::ArticleById(_) | Route::ArticleBySlug(_) => Some("Article - Jon AI Lab"),
        }
    }

    /// Canonical path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Home => HOME_PATH.to_string(),
            Route::ArticleById(id) => format!("/article/{id}"),
            Route::ArticleBySlug(slug) => format!("/article/slug/{slug}"),
        }
    }
}

/// Result of matching a path against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub route: Route,
    pub title: &'static str,
    /// Set when the requested path did not match and we fell back to home.
    pub redirected_from: Option<String>,
}

/// Match a path. Query strings and fragments are ignored; unknown paths
/// redirect to the listing.
pub fn resolve(path: &str) -> Resolved {
    let bare = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = bare.split('/').filter(|s| !s.is_empty()).collect();

    let matched = match segments.as_slice() {
        [] => Some(Route::Home),
        ["article", "slug", slug] => Some(Route::ArticleBySlug(slug.to_string())),
        ["article", id] => Some(Route::ArticleById(id.to_string())),
        _ => None,
    };

    match matched {
        Some(route) => Resolved {
            title: route.title().unwrap_or(DEFAULT_TITLE),
            route,
            redirected_from: None,
        },
        None => Resolved {
            route: Route::Home,
            title: Route::Home.title().unwrap_or(DEFAULT_TITLE),
            redirected_from: Some(path.to_string()),
        },
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollPosition {
    pub top: usize,
}

/// Where to scroll after navigating: restore the saved position on
/// back/forward, otherwise go to the top.
pub fn scroll_behavior(saved: Option<ScrollPosition>) -> ScrollPosition {
    saved.unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    route: Route,
    scroll: ScrollPosition,
}

/// Back/forward stacks around the current page. Each entry remembers the
/// scroll position it was left at.
#[derive(Debug, Clone)]
pub struct History {
    back: Vec<Entry>,
    current: Entry,
    forward: Vec<Entry>,
}

/// What a navigation landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub route: Route,
    pub title: &'static str,
    pub scroll: ScrollPosition,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            back: Vec::new(),
            current: Entry {
                route: Route::Home,
                scroll: ScrollPosition::default(),
            },
            forward: Vec::new(),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current.route
    }

    /// Record where the current page is scrolled to before leaving it.
    pub fn save_scroll(&mut self, scroll: ScrollPosition) {
        self.current.scroll = scroll;
    }

    /// Push a new page. Always lands at the top and drops the forward stack.
    pub fn push(&mut self, path: &str) -> Visit {
        let resolved = resolve(path);
        if let Some(from) = &resolved.redirected_from {
            tracing::debug!(%from, "unknown route, redirecting home");
        }
        tracing::debug!(route = resolved.route.name(), "navigating");
        let next = Entry {
            route: resolved.route,
            scroll: scroll_behavior(None),
        };
        self.back.push(std::mem::replace(&mut self.current, next));
        self.forward.clear();
        self.visit(resolved.title)
    }

    pub fn back(&mut self) -> Option<Visit> {
        let previous = self.back.pop()?;
        self.forward.push(std::mem::replace(&mut self.current, previous));
        Some(self.restore())
    }

    pub fn forward(&mut self) -> Option<Visit> {
        let next = self.forward.pop()?;
        self.back.push(std::mem::replace(&mut self.current, next));
        Some(self.restore())
    }

    fn restore(&self) -> Visit {
        let title = self.current.route.title().unwrap_or(DEFAULT_TITLE);
        Visit {
            route: self.current.route.clone(),
            title,
            scroll: scroll_behavior(Some(self.current.scroll)),
        }
    }

    fn visit(&self, title: &'static str) -> Visit {
        Visit {
            route: self.current.route.clone(),
            title,
            scroll: self.current.scroll,
        }
    }
}
