pub mod config;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;

pub use state::AppState;

/// Register every route on an app or test service
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(handlers::health::health)
        .service(handlers::query::query);
}
