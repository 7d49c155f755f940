use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem, Update};
use chrono::{NaiveDateTime, Utc};

use crate::books::domain::model::BookEntity;
use crate::core::library::{HoldStatus, LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::hold::domain::model::HoldEntity;
use crate::hold::repository::{HoldRepository, HoldTransaction};
use crate::notifications::domain::model::NotificationEntity;
use crate::utils::ddb::{add_filter_expr, delete_by_key, from_ddb, get_by_key, MAX_PAGE_SIZE, opt_number, opt_string, opt_string_date, parse_bool_attribute, parse_date_attribute, parse_item, parse_number_attribute, parse_opt_number_attribute, parse_string_attribute, put_new, string_date, to_ddb_page};

// DynamoDB caps a transaction at 100 items
const MAX_TRANSACTION_ITEMS: usize = 100;

const HOLD_UPDATE_EXPR: &str = "SET version = :version, hold_status = :hold_status, queue_rank = :queue_rank, expires_at = :expires_at, fulfilled_at = :fulfilled_at, cancelled_at = :cancelled_at, notes = :notes, reminder_sent = :reminder_sent, updated_at = :updated_at";

const HOLD_KEY: &str = "hold_id";

#[derive(Debug)]
pub struct DDBHoldRepository {
    client: Client,
    table_name: String,
    index_name: String,
    books_table: String,
    notifications_table: String,
}

impl DDBHoldRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str,
                      books_table: &str, notifications_table: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
            books_table: books_table.to_string(),
            notifications_table: notifications_table.to_string(),
        }
    }

    // Scans the whole table page by page with strongly consistent reads.
    async fn scan_all(&self, filter_expr: &str,
                      values: HashMap<String, AttributeValue>) -> LibraryResult<Vec<HoldEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let mut holds = vec![];
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let res = self.client
                .scan()
                .table_name(table_name)
                .consistent_read(true)
                .filter_expression(filter_expr)
                .set_expression_attribute_values(Some(values.clone()))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await.map_err(LibraryError::from)?;
            holds.extend(res.items.as_ref().unwrap_or(&vec![]).iter().map(HoldEntity::from));
            exclusive_start_key = res.last_evaluated_key().cloned();
            if exclusive_start_key.is_none() {
                break;
            }
        }
        Ok(holds)
    }

    fn book_update(&self, book: &BookEntity) -> TransactWriteItem {
        let update = Update::builder()
            .table_name(self.books_table.as_str())
            .key("book_id", AttributeValue::S(book.book_id.clone()))
            .update_expression("SET version = :version, book_status = :book_status, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(book.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((book.version + 1).to_string()))
            .expression_attribute_values(":book_status", AttributeValue::S(book.book_status.to_string()))
            .expression_attribute_values(":updated_at", string_date(book.updated_at))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .build();
        TransactWriteItem::builder().update(update).build()
    }

    fn hold_put(&self, hold: &HoldEntity) -> LibraryResult<TransactWriteItem> {
        let put = Put::builder()
            .table_name(self.table_name.as_str())
            .set_item(Some(parse_item(serde_json::to_value(hold)?)?))
            .condition_expression("attribute_not_exists(hold_id)")
            .build();
        Ok(TransactWriteItem::builder().put(put).build())
    }

    fn hold_update(&self, hold: &HoldEntity) -> TransactWriteItem {
        let update = Update::builder()
            .table_name(self.table_name.as_str())
            .key("hold_id", AttributeValue::S(hold.hold_id.clone()))
            .update_expression(HOLD_UPDATE_EXPR)
            .set_expression_attribute_values(Some(hold_update_values(hold)))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .build();
        TransactWriteItem::builder().update(update).build()
    }

    fn notification_put(&self, notification: &NotificationEntity) -> LibraryResult<TransactWriteItem> {
        let put = Put::builder()
            .table_name(self.notifications_table.as_str())
            .set_item(Some(parse_item(serde_json::to_value(notification)?)?))
            .condition_expression("attribute_not_exists(notification_id)")
            .build();
        Ok(TransactWriteItem::builder().put(put).build())
    }
}

fn hold_update_values(hold: &HoldEntity) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (":old_version".to_string(), AttributeValue::N(hold.version.to_string())),
        (":version".to_string(), AttributeValue::N((hold.version + 1).to_string())),
        (":hold_status".to_string(), AttributeValue::S(hold.hold_status.to_string())),
        (":queue_rank".to_string(), opt_number(hold.queue_rank)),
        (":expires_at".to_string(), opt_string_date(hold.expires_at)),
        (":fulfilled_at".to_string(), opt_string_date(hold.fulfilled_at)),
        (":cancelled_at".to_string(), opt_string_date(hold.cancelled_at)),
        (":notes".to_string(), opt_string(&hold.notes)),
        (":reminder_sent".to_string(), AttributeValue::Bool(hold.reminder_sent)),
        (":updated_at".to_string(), string_date(hold.updated_at)),
    ])
}

fn active_status_values() -> HashMap<String, AttributeValue> {
    HashMap::from([
        (":waiting".to_string(), AttributeValue::S(HoldStatus::Waiting.to_string())),
        (":ready".to_string(), AttributeValue::S(HoldStatus::Ready.to_string())),
    ])
}

#[async_trait]
impl Repository<HoldEntity> for DDBHoldRepository {
    async fn create(&self, entity: &HoldEntity) -> LibraryResult<usize> {
        put_new(&self.client, self.table_name.as_str(), HOLD_KEY, entity).await
    }

    async fn update(&self, entity: &HoldEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .update_item()
            .table_name(table_name)
            .key(HOLD_KEY, AttributeValue::S(entity.hold_id.clone()))
            .update_expression(HOLD_UPDATE_EXPR)
            .set_expression_attribute_values(Some(hold_update_values(entity)))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<HoldEntity> {
        get_by_key(&self.client, self.table_name.as_str(), HOLD_KEY, id).await
            .map(|item| HoldEntity::from(&item))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        delete_by_key(&self.client, self.table_name.as_str(), HOLD_KEY, id).await
    }

    // Pages through the book_id index. Index reads are eventually consistent,
    // so the hold engine never builds a queue from this.
    // Note you cannot use certain reserved words per https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<HoldEntity>> {
        let book_id = predicate.get("book_id")
            .ok_or_else(|| LibraryError::validation("book_id is required to query holds", None))?;
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
            .key_condition_expression("book_id = :book_id")
            .expression_attribute_values(":book_id", AttributeValue::S(book_id.to_string()));
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            if k == "book_id" {
                continue;
            }
            let ks = add_filter_expr(k.as_str(), &mut filter_expr);
            request = request.expression_attribute_values(format!(":{}", ks), AttributeValue::S(v.to_string()));
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        request
            .send()
            .await.map_err(LibraryError::from).map(|res| {
            let records = res.items().unwrap_or_default().iter().map(HoldEntity::from).collect();
            from_ddb(page, page_size, res.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl HoldRepository for DDBHoldRepository {
    // The queue must include holds committed a moment ago, so this reads the
    // base table consistently instead of the book_id index.
    async fn find_by_book(&self, book_id: &str) -> LibraryResult<Vec<HoldEntity>> {
        let mut values = active_status_values();
        values.insert(":book_id".to_string(), AttributeValue::S(book_id.to_string()));
        self.scan_all("book_id = :book_id AND hold_status IN (:waiting, :ready)", values).await
    }

    async fn find_by_patron(&self, patron_id: &str) -> LibraryResult<Vec<HoldEntity>> {
        let mut values = active_status_values();
        values.insert(":patron_id".to_string(), AttributeValue::S(patron_id.to_string()));
        self.scan_all("patron_id = :patron_id AND hold_status IN (:waiting, :ready)", values).await
    }

    async fn find_by_status(&self, status: HoldStatus) -> LibraryResult<Vec<HoldEntity>> {
        let values = HashMap::from([
            (":hold_status".to_string(), AttributeValue::S(status.to_string())),
        ]);
        self.scan_all("hold_status = :hold_status", values).await
    }

    async fn find_ready_expiring_before(&self, cutoff: NaiveDateTime) -> LibraryResult<Vec<HoldEntity>> {
        let values = HashMap::from([
            (":hold_status".to_string(), AttributeValue::S(HoldStatus::Ready.to_string())),
            (":cutoff".to_string(), string_date(cutoff)),
        ]);
        let holds = self.scan_all("hold_status = :hold_status AND expires_at < :cutoff", values).await?;
        Ok(holds.into_iter().filter(|h| h.expires_at.is_some()).collect())
    }

    async fn commit(&self, txn: &HoldTransaction) -> LibraryResult<usize> {
        if txn.size() > MAX_TRANSACTION_ITEMS {
            return Err(LibraryError::validation(
                format!("transaction for book {} has {} writes, limit is {}",
                        txn.book.book_id, txn.size(), MAX_TRANSACTION_ITEMS).as_str(), None));
        }
        let mut items = vec![self.book_update(&txn.book)];
        for hold in &txn.created {
            items.push(self.hold_put(hold)?);
        }
        for hold in &txn.updated {
            items.push(self.hold_update(hold));
        }
        for notification in &txn.notifications {
            items.push(self.notification_put(notification)?);
        }
        let size = items.len();
        self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await.map(|_| size).map_err(LibraryError::from)
    }
}

impl From<&HashMap<String, AttributeValue>> for HoldEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        HoldEntity {
            hold_id: parse_string_attribute("hold_id", map).unwrap_or_default(),
            version: parse_number_attribute("version", map),
            branch_id: parse_string_attribute("branch_id", map).unwrap_or_default(),
            book_id: parse_string_attribute("book_id", map).unwrap_or_default(),
            patron_id: parse_string_attribute("patron_id", map).unwrap_or_default(),
            hold_status: HoldStatus::from(parse_string_attribute("hold_status", map).unwrap_or_default()),
            queue_rank: parse_opt_number_attribute("queue_rank", map),
            expires_at: parse_date_attribute("expires_at", map),
            fulfilled_at: parse_date_attribute("fulfilled_at", map),
            cancelled_at: parse_date_attribute("cancelled_at", map),
            notes: parse_string_attribute("notes", map),
            reminder_sent: parse_bool_attribute("reminder_sent", map),
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}
