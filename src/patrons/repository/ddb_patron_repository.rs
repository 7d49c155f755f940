use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::repository::PatronRepository;
use crate::utils::ddb::{add_filter_expr, delete_by_key, from_ddb, get_by_key, MAX_PAGE_SIZE, parse_date_attribute, parse_number_attribute, parse_string_attribute, put_new, string_date, to_ddb_page};

const PATRON_KEY: &str = "patron_id";

#[derive(Debug)]
pub(crate) struct DDBPatronRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBPatronRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<PatronEntity> for DDBPatronRepository {
    async fn create(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        put_new(&self.client, self.table_name.as_str(), PATRON_KEY, entity).await
    }

    async fn update(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key(PATRON_KEY, AttributeValue::S(entity.patron_id.clone()))
            .update_expression("SET version = :version, email = :email, first_name = :first, last_name = :last, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":email", AttributeValue::S(entity.email.to_string()))
            .expression_attribute_values(":first", AttributeValue::S(entity.first_name.to_string()))
            .expression_attribute_values(":last", AttributeValue::S(entity.last_name.to_string()))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<PatronEntity> {
        get_by_key(&self.client, self.table_name.as_str(), PATRON_KEY, id).await
            .map(|item| PatronEntity::from(&item))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        delete_by_key(&self.client, self.table_name.as_str(), PATRON_KEY, id).await
    }

    // Note you cannot use certain reserved words per https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        let email = predicate.get("email")
            .ok_or_else(|| LibraryError::validation("email is required to query patrons", None))?;
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let exclusive_start_key = to_ddb_page(page);
        let mut request = self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .limit(cmp::min(page_size, MAX_PAGE_SIZE) as i32)
            .consistent_read(false)
            .set_exclusive_start_key(exclusive_start_key)
            .key_condition_expression("email = :email")
            .expression_attribute_values(":email", AttributeValue::S(email.to_string()));
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            if k != "email" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                request = request.expression_attribute_values(format!(":{}", ks), AttributeValue::S(v.to_string()));
            }
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        request
            .send()
            .await.map_err(LibraryError::from).map(|res| {
            let records = res.items().unwrap_or_default().iter().map(PatronEntity::from).collect();
            from_ddb(page, page_size, res.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl PatronRepository for DDBPatronRepository {
    async fn find_by_email(&self, email: &str) -> LibraryResult<Vec<PatronEntity>> {
        let predicate = HashMap::from([
            ("email".to_string(), email.to_string()),
        ]);
        let res = self.query(&predicate, None, 50).await?;
        Ok(res.records)
    }
}


impl From<&HashMap<String, AttributeValue>> for PatronEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        PatronEntity {
            patron_id: parse_string_attribute("patron_id", map).unwrap_or_default(),
            version: parse_number_attribute("version", map),
            first_name: parse_string_attribute("first_name", map).unwrap_or_default(),
            last_name: parse_string_attribute("last_name", map).unwrap_or_default(),
            email: parse_string_attribute("email", map).unwrap_or_default(),
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use lazy_static::lazy_static;

    use crate::core::repository::{Repository, RepositoryStore};
    use crate::patrons::domain::model::PatronEntity;
    use crate::patrons::repository::PatronRepository;
    use crate::patrons::repository::ddb_patron_repository::DDBPatronRepository;
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "patrons").await;
                let _ = create_table(&client, "patrons", "patron_id", "email", "created_at").await;
                client
            });
    }

    #[tokio::test]
    #[ignore = "requires local dynamodb"]
    async fn test_should_create_get_patrons() {
        let patron_repo = DDBPatronRepository::new(CLIENT.get().await.clone(), "patrons", "patrons_ndx");
        let patron = PatronEntity::new("ddb@org.cc");
        assert_eq!(1, patron_repo.create(&patron).await.expect("should create patron"));

        let loaded = patron_repo.get(patron.patron_id.as_str()).await.expect("should return patron");
        assert_eq!(patron.patron_id, loaded.patron_id);
        let found = patron_repo.find_by_email("ddb@org.cc").await.expect("should find patron");
        assert!(found.iter().any(|p| p.patron_id == patron.patron_id));
    }
}
