use async_trait::async_trait;
use tracing::debug;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::domain::PatronService;
use crate::patrons::dto::PatronDto;
use crate::patrons::repository::PatronRepository;

pub(crate) struct PatronServiceImpl {
    patron_repository: Box<dyn PatronRepository>,
}

impl PatronServiceImpl {
    pub(crate) fn new(_config: &Configuration, patron_repository: Box<dyn PatronRepository>) -> Self {
        PatronServiceImpl {
            patron_repository,
        }
    }
}

#[async_trait]
impl PatronService for PatronServiceImpl {
    async fn add_patron(&self, patron: &PatronDto) -> LibraryResult<PatronDto> {
        if patron.email.trim().is_empty() {
            return Err(LibraryError::validation("patron email is required", Some("400".to_string())));
        }
        if !self.patron_repository.find_by_email(patron.email.as_str()).await?.is_empty() {
            return Err(LibraryError::duplicate_key(format!("patron with email {} already exists", patron.email).as_str()));
        }
        self.patron_repository.create(&PatronEntity::from(patron)).await?;
        debug!("registered patron {}", patron.patron_id);
        Ok(patron.clone())
    }

    async fn find_patron_by_id(&self, id: &str) -> LibraryResult<PatronDto> {
        self.patron_repository.get(id).await.map(|p| PatronDto::from(&p))
    }

    async fn is_known_patron(&self, id: &str) -> LibraryResult<bool> {
        match self.patron_repository.get(id).await {
            Ok(_) => Ok(true),
            Err(LibraryError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
