pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::patrons::dto::PatronDto;

// PatronService is the identity collaborator of the hold engine: it only answers
// whether a patron id is known. Registration keeps one patron per email.
#[async_trait]
pub(crate) trait PatronService: Sync + Send {
    async fn add_patron(&self, patron: &PatronDto) -> LibraryResult<PatronDto>;
    async fn find_patron_by_id(&self, id: &str) -> LibraryResult<PatronDto>;
    // false only when the store positively has no such patron
    async fn is_known_patron(&self, id: &str) -> LibraryResult<bool>;
}
