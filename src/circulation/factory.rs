use std::sync::Arc;
use crate::catalog::factory::create_catalog_service;
use crate::circulation::domain::CirculationService;
use crate::circulation::domain::service::CirculationServiceImpl;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::create_publisher;
use crate::hold::domain::HoldService;
use crate::patrons::factory::create_patron_service;

// the hold service is shared so returns go through the same per-book locks
pub(crate) async fn create_circulation_service(config: &Configuration, store: RepositoryStore,
                                               hold_service: Arc<dyn HoldService>) -> Arc<dyn CirculationService> {
    let catalog_svc = create_catalog_service(config, store).await;
    let patron_svc = create_patron_service(config, store).await;
    let publisher = create_publisher(store.gateway_publisher()).await;
    Arc::new(CirculationServiceImpl::new(patron_svc, catalog_svc, hold_service, publisher))
}
