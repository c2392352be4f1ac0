//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use crate::web::token::TokenKeys;
use grocerymart_core::ports::{AccountStore, CatalogStore, OrderStore};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub orders: Arc<dyn OrderStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub token_keys: Arc<TokenKeys>,
    pub config: Arc<Config>,
}
