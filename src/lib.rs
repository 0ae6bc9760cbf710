// Library root
// -----------
// This crate exposes the blog API client as a library. The binary
// (`main.rs`) wires it to an interactive terminal front-end.
//
// Module responsibilities:
// - `api`: the `ApiClient` and its resource groups (auth, articles,
//   categories, analytics, uploads).
// - `session`: the held bearer token and its persisted copy.
// - `middleware`: request/response steps run around every call (token
//   injection, session reset on 401).
// - `error`: the normalized `ApiError` every call returns.
// - `config`: environment-driven settings.
// - `routes`: client-side navigation (route table, titles, history).
// - `ui`: terminal flows that drive the client.
pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod ui;

pub use api::{ApiClient, Payload, QueryParams};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorDetail, ErrorKind};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
