use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::mail::MailProvider;

/// Shared application state. The connection mutex is the serialization point
/// for every mutation path: capacity checks and their dependent writes run
/// inside one transaction while the lock is held.
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub mail: Box<dyn MailProvider>,
}
