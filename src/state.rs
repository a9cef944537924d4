use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::emails::Mailer;
use crate::store::Store;

/// Shared dependencies handed to every handler through `web::Data<AppState>`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenCodec,
    pub mailer: Arc<dyn Mailer>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenCodec,
        mailer: Arc<dyn Mailer>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            store,
            tokens,
            mailer,
            bcrypt_cost,
        }
    }
}
