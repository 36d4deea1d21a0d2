pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod preview;
pub mod templates;

pub use db::DbPool;

use config::Config;
use preview::PreviewRenderer;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub renderer: PreviewRenderer,
}

impl AppState {
    pub fn new(config: Config, db: DbPool, renderer: PreviewRenderer) -> Self {
        Self {
            config,
            db,
            renderer,
        }
    }
}
