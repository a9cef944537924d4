#![doc = "The `taskkeeper` library crate."]
#![doc = ""]
#![doc = "Session tokens, the authentication gate, owner-scoped tasks and the account"]
#![doc = "deletion cascade, plus the routing, persistence and error handling around them."]
#![doc = "The binary (`main.rs`) only loads configuration and wires these together."]

pub mod accounts;
pub mod auth;
pub mod config;
pub mod emails;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
