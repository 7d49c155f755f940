use std::sync::Arc;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use crate::catalog;
use crate::catalog::domain::CatalogService;
use crate::catalog::factory::create_catalog_service;
use crate::circulation;
use crate::circulation::domain::CirculationService;
use crate::circulation::factory::create_circulation_service;
use crate::core::command::CommandError;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::hold;
use crate::hold::domain::HoldService;
use crate::hold::factory::create_hold_service;
use crate::notifications;
use crate::notifications::domain::NotificationService;
use crate::notifications::factory::create_notification_service;
use crate::patrons;
use crate::patrons::domain::PatronService;
use crate::patrons::factory::create_patron_service;

// AppState is built once per process so every request shares the same engine
// and therefore the same per-item locks.
#[derive(Clone)]
pub struct AppState {
    pub config: Configuration,
    pub store: RepositoryStore,
    pub(crate) holds: Arc<dyn HoldService>,
    pub(crate) notifications: Arc<dyn NotificationService>,
    pub(crate) circulation: Arc<dyn CirculationService>,
    pub(crate) catalog: Arc<dyn CatalogService>,
    pub(crate) patrons: Arc<dyn PatronService>,
}

impl AppState {
    pub async fn build(config: Configuration, store: RepositoryStore) -> AppState {
        let holds = create_hold_service(&config, store).await;
        let notifications = create_notification_service(&config, store).await;
        let circulation = create_circulation_service(&config, store, holds.clone()).await;
        let catalog: Arc<dyn CatalogService> = Arc::from(create_catalog_service(&config, store).await);
        let patrons: Arc<dyn PatronService> = Arc::from(create_patron_service(&config, store).await);
        AppState {
            config,
            store,
            holds,
            notifications,
            circulation,
            catalog,
            patrons,
        }
    }
}

pub fn build_router(state: AppState) -> Router<(), lambda_http::Body> {
    Router::new()
        .route("/books", post(catalog::controller::add_book))
        .route("/books/:book_id", get(catalog::controller::find_book_by_id))
        .route("/books/:book_id/queue", get(hold::controller::list_item_queue))
        .route("/books/:book_id/borrow", post(circulation::controller::borrow_book))
        .route("/books/:book_id/return", post(circulation::controller::return_book))
        .route("/books/:book_id/process-return", post(hold::controller::process_return))
        .route("/patrons", post(patrons::controller::add_patron))
        .route("/patrons/:patron_id", get(patrons::controller::find_patron_by_id))
        .route("/patrons/:patron_id/holds", get(hold::controller::list_patron_holds))
        .route("/patrons/:patron_id/notifications", get(notifications::controller::list_unread))
        .route("/notifications/:notification_id/read", post(notifications::controller::mark_read))
        .route("/holds", post(hold::controller::place_hold))
        .route("/holds/:hold_id", get(hold::controller::get_hold))
        .route("/holds/:hold_id/cancel", post(hold::controller::cancel_hold))
        .route("/holds/:hold_id/fulfill", post(hold::controller::fulfill_hold))
        .route("/holds/:hold_id/borrow", post(circulation::controller::borrow_on_hold))
        .route("/waiting-lists", get(hold::controller::list_waiting_lists))
        .route("/maintenance/sweep", post(hold::controller::sweep_expired))
        .route("/maintenance/reminders", post(hold::controller::send_reminders))
        .with_state(state)
}

pub(crate) type ServerError = (StatusCode, String);

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    (StatusCode::BAD_REQUEST, format!("{}", err))
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Database { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err))
            }
            CommandError::Unavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, format!("{:?}", err))
            }
            CommandError::DuplicateKey { .. } => {
                (StatusCode::CONFLICT, format!("{:?}", err))
            }
            CommandError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, format!("{:?}", err))
            }
            CommandError::Rejected { .. } => {
                (StatusCode::CONFLICT, format!("{:?}", err))
            }
            CommandError::Conflict { .. } => {
                (StatusCode::CONFLICT, format!("{:?}", err))
            }
            CommandError::Runtime { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err))
            }
            CommandError::Serialization { .. } => {
                (StatusCode::BAD_REQUEST, format!("{:?}", err))
            }
            CommandError::Validation { .. } => {
                (StatusCode::BAD_REQUEST, format!("{:?}", err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use crate::core::command::CommandError;
    use crate::core::controller::{AppState, build_router, ServerError};
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;

    #[tokio::test]
    async fn test_should_build_router_for_memory_store() {
        let state = AppState::build(Configuration::new("test"), RepositoryStore::InMemory).await;
        assert_eq!(RepositoryStore::InMemory, state.store);
        let _ = build_router(state);
    }

    #[tokio::test]
    async fn test_should_map_command_errors_to_status() {
        let (status, _) = ServerError::from(CommandError::NotFound { message: "x".to_string() });
        assert_eq!(StatusCode::NOT_FOUND, status);
        let (status, _) = ServerError::from(CommandError::Rejected { message: "x".to_string(), reason_code: None });
        assert_eq!(StatusCode::CONFLICT, status);
        let (status, _) = ServerError::from(CommandError::Unavailable { message: "x".to_string(), retryable: true });
        assert_eq!(StatusCode::SERVICE_UNAVAILABLE, status);
        let (status, _) = ServerError::from(CommandError::Validation { message: "x".to_string(), reason_code: None });
        assert_eq!(StatusCode::BAD_REQUEST, status);
    }
}
