use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{BookStatus, LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::ddb::{add_filter_expr, delete_by_key, from_ddb, get_by_key, MAX_PAGE_SIZE, parse_date_attribute, parse_number_attribute, parse_string_attribute, put_new, string_date, to_ddb_page};

const BOOK_KEY: &str = "book_id";

// DDBBookRepository keeps catalog entries in a table keyed by book_id with a
// (book_status, isbn) index.
#[derive(Debug)]
pub struct DDBBookRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBBookRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }

    // predicates without the status key cannot use the index
    async fn scan(&self, predicate: &HashMap<String, String>,
                  page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let mut request = self.client
            .scan()
            .table_name(self.table_name.as_str())
            .set_exclusive_start_key(to_ddb_page(page))
            .limit(cmp::min(page_size, MAX_PAGE_SIZE) as i32);
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            let ks = add_filter_expr(k.as_str(), &mut filter_expr);
            request = request.expression_attribute_values(format!(":{}", ks), AttributeValue::S(v.to_string()));
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        let res = request.send().await.map_err(LibraryError::from)?;
        let records = res.items().unwrap_or_default().iter().map(BookEntity::from).collect();
        Ok(from_ddb(page, page_size, res.last_evaluated_key(), records))
    }
}

#[async_trait]
impl Repository<BookEntity> for DDBBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        put_new(&self.client, self.table_name.as_str(), BOOK_KEY, entity).await
    }

    // the stored version must match the one the entity was read at
    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        self.client
            .update_item()
            .table_name(self.table_name.as_str())
            .key(BOOK_KEY, AttributeValue::S(entity.book_id.clone()))
            .update_expression("SET version = :version, title = :title, isbn = :isbn, book_status = :book_status, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":title", AttributeValue::S(entity.title.to_string()))
            .expression_attribute_values(":isbn", AttributeValue::S(entity.isbn.to_string()))
            .expression_attribute_values(":book_status", AttributeValue::S(entity.book_status.to_string()))
            .expression_attribute_values(":updated_at", string_date(entity.updated_at))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        get_by_key(&self.client, self.table_name.as_str(), BOOK_KEY, id).await
            .map(|item| BookEntity::from(&item))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        delete_by_key(&self.client, self.table_name.as_str(), BOOK_KEY, id).await
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let status = match predicate.get("book_status") {
            Some(status) => BookStatus::from(status.to_string()),
            None => return self.scan(predicate, page, page_size).await,
        };
        let mut key_cond = String::from("book_status = :book_status");
        let mut request = self.client
            .query()
            .table_name(self.table_name.as_str())
            .index_name(self.index_name.as_str())
            .limit(cmp::min(page_size, MAX_PAGE_SIZE) as i32)
            .set_exclusive_start_key(to_ddb_page(page))
            .expression_attribute_values(":book_status", AttributeValue::S(status.to_string()));
        if let Some(isbn) = predicate.get("isbn") {
            key_cond.push_str(" AND isbn = :isbn");
            request = request.expression_attribute_values(":isbn", AttributeValue::S(isbn.to_string()));
        }
        let mut filter_expr = String::new();
        for (k, v) in predicate.iter().filter(|(k, _)| *k != "book_status" && *k != "isbn") {
            let ks = add_filter_expr(k.as_str(), &mut filter_expr);
            request = request.expression_attribute_values(format!(":{}", ks), AttributeValue::S(v.to_string()));
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        let res = request.key_condition_expression(key_cond).send().await.map_err(LibraryError::from)?;
        let records = res.items().unwrap_or_default().iter().map(BookEntity::from).collect();
        Ok(from_ddb(page, page_size, res.last_evaluated_key(), records))
    }
}

impl BookRepository for DDBBookRepository {}

impl From<&HashMap<String, AttributeValue>> for BookEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        BookEntity {
            version: parse_number_attribute("version", map),
            book_id: parse_string_attribute("book_id", map).unwrap_or_default(),
            isbn: parse_string_attribute("isbn", map).unwrap_or_default(),
            title: parse_string_attribute("title", map).unwrap_or_default(),
            book_status: BookStatus::from(parse_string_attribute("book_status", map).unwrap_or_default()),
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use lazy_static::lazy_static;

    use crate::books::domain::model::BookEntity;
    use crate::books::repository::ddb_book_repository::DDBBookRepository;
    use crate::core::library::{BookStatus, LibraryError};
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "books").await;
                let _ = create_table(&client, "books", "book_id", "book_status", "isbn").await;
                client
            });
    }

    #[tokio::test]
    #[ignore = "requires local dynamodb"]
    async fn test_should_create_get_books() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "books", "books_ndx");
        let book = BookEntity::new("isbn", "test book", BookStatus::Available);
        let size = books_repo.create(&book).await.expect("should create book");
        assert_eq!(1, size);

        let loaded = books_repo.get(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(book.book_id, loaded.book_id);
    }

    #[tokio::test]
    #[ignore = "requires local dynamodb"]
    async fn test_should_reject_stale_book_update() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "books", "books_ndx");
        let mut book = BookEntity::new("isbn", "test book", BookStatus::Available);
        books_repo.create(&book).await.expect("should create book");

        book.book_status = BookStatus::OnHold;
        let size = books_repo.update(&book).await.expect("should update book");
        assert_eq!(1, size);
        let loaded = books_repo.get(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(BookStatus::OnHold, loaded.book_status);
        assert_eq!(1, loaded.version);

        let stale = books_repo.update(&book).await;
        assert!(matches!(stale, Err(LibraryError::Conflict { .. })));
    }

    #[tokio::test]
    #[ignore = "requires local dynamodb"]
    async fn test_should_query_books_by_status_and_isbn() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "books", "books_ndx");
        for i in 0..20 {
            let book = BookEntity::new(format!("isbn_q{}", i / 10).as_str(),
                                       format!("title_{}", i / 10).as_str(), BookStatus::CheckedOut);
            books_repo.create(&book).await.expect("should create book");
        }
        let predicate = HashMap::from([
            ("book_status".to_string(), BookStatus::CheckedOut.to_string()),
            ("isbn".to_string(), "isbn_q0".to_string()),
        ]);
        let res = books_repo.query(&predicate, None, 200).await.expect("should return books");
        assert_eq!(10, res.records.len());
        let by_isbn = HashMap::from([("isbn".to_string(), "isbn_q1".to_string())]);
        let res = books_repo.query(&by_isbn, None, 200).await.expect("should return books");
        assert!(res.records.iter().all(|b| b.isbn == "isbn_q1"));
    }

    #[tokio::test]
    #[ignore = "requires local dynamodb"]
    async fn test_should_create_delete_books() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "books", "books_ndx");
        let book = BookEntity::new("isbn", "test book", BookStatus::Available);
        books_repo.create(&book).await.expect("should create book");

        let deleted = books_repo.delete(book.book_id.as_str()).await.expect("should delete book");
        assert_eq!(1, deleted);

        let loaded = books_repo.get(book.book_id.as_str()).await;
        assert!(loaded.is_err());
    }
}
