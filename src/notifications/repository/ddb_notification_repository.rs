use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult, NotificationCategory, PaginatedResult};
use crate::core::repository::Repository;
use crate::notifications::domain::model::NotificationEntity;
use crate::notifications::repository::NotificationRepository;
use crate::utils::ddb::{add_filter_expr, delete_by_key, from_ddb, get_by_key, MAX_PAGE_SIZE, parse_bool_attribute, parse_date_attribute, parse_number_attribute, parse_string_attribute, put_new, string_date, to_ddb_page};

const NOTIFICATION_KEY: &str = "notification_id";

#[derive(Debug)]
pub struct DDBNotificationRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBNotificationRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<NotificationEntity> for DDBNotificationRepository {
    async fn create(&self, entity: &NotificationEntity) -> LibraryResult<usize> {
        put_new(&self.client, self.table_name.as_str(), NOTIFICATION_KEY, entity).await
    }

    async fn update(&self, entity: &NotificationEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key(NOTIFICATION_KEY, AttributeValue::S(entity.notification_id.clone()))
            .update_expression("SET version = :version, is_read = :is_read, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":is_read", AttributeValue::Bool(entity.is_read))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<NotificationEntity> {
        get_by_key(&self.client, self.table_name.as_str(), NOTIFICATION_KEY, id).await
            .map(|item| NotificationEntity::from(&item))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        delete_by_key(&self.client, self.table_name.as_str(), NOTIFICATION_KEY, id).await
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<NotificationEntity>> {
        let patron_id = predicate.get("patron_id")
            .ok_or_else(|| LibraryError::validation("patron_id is required to query notifications", None))?;
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
            .key_condition_expression("patron_id = :patron_id")
            .expression_attribute_values(":patron_id", AttributeValue::S(patron_id.to_string()));
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            if k == "patron_id" {
                continue;
            }
            let ks = add_filter_expr(k.as_str(), &mut filter_expr);
            let val = if ks == "is_read" {
                AttributeValue::Bool(v == "true")
            } else {
                AttributeValue::S(v.to_string())
            };
            request = request.expression_attribute_values(format!(":{}", ks), val);
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        request
            .send()
            .await.map_err(LibraryError::from).map(|res| {
            let records = res.items().unwrap_or_default().iter().map(NotificationEntity::from).collect();
            from_ddb(page, page_size, res.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl NotificationRepository for DDBNotificationRepository {
    async fn find_unread(&self, patron_id: &str) -> LibraryResult<Vec<NotificationEntity>> {
        let predicate = HashMap::from([
            ("patron_id".to_string(), patron_id.to_string()),
            ("is_read".to_string(), "false".to_string()),
        ]);
        let mut unread = vec![];
        let mut next_page: Option<String> = None;
        loop {
            let res = self.query(&predicate, next_page.as_deref(), 200).await?;
            unread.extend(res.records);
            next_page = res.next_page;
            if next_page.is_none() {
                break;
            }
        }
        Ok(unread)
    }
}

impl From<&HashMap<String, AttributeValue>> for NotificationEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        NotificationEntity {
            notification_id: parse_string_attribute("notification_id", map).unwrap_or_default(),
            version: parse_number_attribute("version", map),
            hold_id: parse_string_attribute("hold_id", map),
            patron_id: parse_string_attribute("patron_id", map).unwrap_or_default(),
            message: parse_string_attribute("message", map).unwrap_or_default(),
            category: NotificationCategory::from(parse_string_attribute("category", map).unwrap_or_default()),
            is_read: parse_bool_attribute("is_read", map),
            sent_at: parse_date_attribute("sent_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}
