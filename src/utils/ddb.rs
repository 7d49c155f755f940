use std::collections::HashMap;
use std::time::Duration;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeDefinition, AttributeValue, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection, ProjectionType, ProvisionedThroughput, ScalarAttributeType, TableStatus};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::RepositoryStore;
use crate::utils::date::DATE_FMT;

const LOCAL_ENDPOINT_ENV: &str = "LMS_DYNAMODB_ENDPOINT";
const LOCAL_ENDPOINT: &str = "http://localhost:8000";

// upper bound for a single scan or query page
pub(crate) const MAX_PAGE_SIZE: usize = 500;

fn key(name: &str, key_type: KeyType) -> KeySchemaElement {
    KeySchemaElement::builder().attribute_name(name).key_type(key_type).build()
}

fn string_attribute(name: &str) -> AttributeDefinition {
    AttributeDefinition::builder().attribute_name(name).attribute_type(ScalarAttributeType::S).build()
}

fn throughput() -> ProvisionedThroughput {
    ProvisionedThroughput::builder().read_capacity_units(10).write_capacity_units(10).build()
}

// Creates a table keyed by `pk` with a single `<table>_ndx` index on (gsi_pk, gsi_sk)
// and blocks until the table leaves the Creating state.
pub(crate) async fn create_table(client: &Client,
                                 table_name: &str, pk: &str,
                                 gsi_pk: &str, gsi_sk: &str) -> LibraryResult<()> {
    let gsi = GlobalSecondaryIndex::builder()
        .index_name(format!("{}_ndx", table_name))
        .key_schema(key(gsi_pk, KeyType::Hash))
        .key_schema(key(gsi_sk, KeyType::Range))
        .projection(Projection::builder().projection_type(ProjectionType::All).build())
        .provisioned_throughput(throughput())
        .build();

    let mut req = client
        .create_table()
        .table_name(table_name)
        .global_secondary_indexes(gsi)
        .key_schema(key(pk, KeyType::Hash))
        .provisioned_throughput(throughput());
    let mut seen: Vec<&str> = vec![];
    for attr in [pk, gsi_pk, gsi_sk] {
        if !seen.contains(&attr) {
            seen.push(attr);
            req = req.attribute_definitions(string_attribute(attr));
        }
    }
    req.send().await.map_err(|err| LibraryError::database_or_unavailable(
        format!("failed to create {} table due to {}", table_name, err).as_str(), None, false))?;
    wait_until_table_status_is_not(client, table_name, TableStatus::Creating).await;
    Ok(())
}

pub(crate) async fn delete_table(client: &Client, table_name: &str) -> LibraryResult<()> {
    client.delete_table().table_name(table_name).send().await
        .map_err(|err| LibraryError::database_or_unavailable(
            format!("failed to delete {} table due to {}", table_name, err).as_str(), None, false))?;
    wait_until_table_status_is_not(client, table_name, TableStatus::Deleting).await;
    Ok(())
}

// polls for up to 30 seconds
async fn wait_until_table_status_is_not(client: &Client, table_name: &str, other_status: TableStatus) {
    for _ in 0..30 {
        match describe_table(client, table_name).await {
            Ok(status) if status != other_status => return,
            // a deleted table can no longer be described
            Err(LibraryError::NotFound { .. }) if other_status == TableStatus::Deleting => return,
            _ => tokio::time::sleep(Duration::from_secs(1)).await,
        }
    }
}

async fn describe_table(client: &Client, table_name: &str) -> LibraryResult<TableStatus> {
    let out = client.describe_table().table_name(table_name).send().await
        .map_err(|err| {
            if matches!(&err, SdkError::ServiceError(ctx) if ctx.err().is_resource_not_found_exception()) {
                LibraryError::not_found(format!("table {} not found", table_name).as_str())
            } else {
                LibraryError::database_or_unavailable(
                    format!("failed to describe {} table due to {}", table_name, err).as_str(), None, false)
            }
        })?;
    out.table()
        .and_then(|table| table.table_status())
        .cloned()
        .ok_or_else(|| LibraryError::runtime(format!("failed to describe {} table", table_name).as_str(), None))
}

pub(crate) fn parse_item(value: Value) -> Result<HashMap<String, AttributeValue>, String> {
    match value_to_item(value) {
        AttributeValue::M(map) => Ok(map),
        other => Err(format!("failed to parse{:?}", other)),
    }
}

pub(crate) fn parse_string_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<String> {
    if let Some(AttributeValue::S(str)) = map.get(name) {
        return Some(str.clone());
    }
    None
}

pub(crate) fn parse_bool_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> bool {
    if let Some(AttributeValue::Bool(b)) = map.get(name) {
        return *b;
    }
    false
}

pub(crate) fn parse_date_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<NaiveDateTime> {
    if let Some(AttributeValue::S(str)) = map.get(name) {
        // e.g. 2022-09-24T04:40:35.726029
        if let Ok(date) = NaiveDateTime::parse_from_str(str, DATE_FMT) {
            return Some(date);
        }
    }
    None
}

pub(crate) fn opt_string_date(opt_date: Option<NaiveDateTime>) -> AttributeValue {
    if let Some(date) = opt_date {
        return string_date(date);
    }
    AttributeValue::S("".to_string())
}

pub(crate) fn string_date(date: NaiveDateTime) -> AttributeValue {
    AttributeValue::S(format!("{}", date.format(DATE_FMT)))
}

pub(crate) fn parse_number_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> i64 {
    parse_opt_number_attribute(name, map).unwrap_or(0)
}

pub(crate) fn parse_opt_number_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<i64> {
    if let Some(AttributeValue::N(str)) = map.get(name) {
        if let Ok(n) = str.parse::<i64>() {
            return Some(n);
        }
    }
    None
}

pub(crate) fn opt_number(opt_num: Option<i64>) -> AttributeValue {
    match opt_num {
        Some(n) => AttributeValue::N(n.to_string()),
        None => AttributeValue::Null(true),
    }
}

pub(crate) fn opt_string(opt_str: &Option<String>) -> AttributeValue {
    match opt_str {
        Some(s) => AttributeValue::S(s.to_string()),
        None => AttributeValue::Null(true),
    }
}

pub(crate) fn add_filter_expr(k: &str, filter_expr: &mut String) -> String {
    let mut op = "=";
    let mut ks = k;
    let parts = k.split(':').collect::<Vec<&str>>();
    if parts.len() > 1 {
        ks = parts[0];
        op = parts[1];
    }
    if filter_expr.is_empty() {
        filter_expr.push_str(format!("{} {} :{}", ks, op, ks).as_str());
    } else {
        filter_expr.push_str(format!(" AND {} {} :{}", ks, op, ks).as_str());
    }
    ks.to_string()
}

// Writes a new item; an existing item with the same key is reported as a conflict
// rather than overwritten.
pub(crate) async fn put_new<T: Serialize>(client: &Client, table_name: &str,
                                          key_name: &str, entity: &T) -> LibraryResult<usize> {
    let item = parse_item(serde_json::to_value(entity)?)?;
    client
        .put_item()
        .table_name(table_name)
        .condition_expression(format!("attribute_not_exists({})", key_name))
        .set_item(Some(item))
        .send()
        .await.map(|_| 1).map_err(LibraryError::from)
}

pub(crate) async fn get_by_key(client: &Client, table_name: &str,
                               key_name: &str, id: &str) -> LibraryResult<HashMap<String, AttributeValue>> {
    let res = client
        .query()
        .table_name(table_name)
        .limit(2)
        .consistent_read(true)
        .key_condition_expression(format!("{} = :id", key_name))
        .expression_attribute_values(":id", AttributeValue::S(id.to_string()))
        .send()
        .await.map_err(LibraryError::from)?;
    let mut items = res.items.unwrap_or_default();
    match items.len() {
        0 => Err(LibraryError::not_found(format!("{} not found for {}", table_name, id).as_str())),
        1 => Ok(items.remove(0)),
        n => Err(LibraryError::database(format!("{} items in {} for {}", n, table_name, id).as_str(), None, false)),
    }
}

pub(crate) async fn delete_by_key(client: &Client, table_name: &str,
                                  key_name: &str, id: &str) -> LibraryResult<usize> {
    client.delete_item()
        .table_name(table_name)
        .key(key_name, AttributeValue::S(id.to_string()))
        .send()
        .await.map(|_| 1).map_err(LibraryError::from)
}

// the page token is the last evaluated key, which already names every table and
// index key attribute
pub(crate) fn to_ddb_page(page: Option<&str>) -> Option<HashMap<String, AttributeValue>> {
    if let Some(page) = page {
        if let Ok(str_map) = serde_json::from_str::<HashMap<String, String>>(page) {
            let mut attr_map = HashMap::new();
            for (k, v) in str_map {
                attr_map.insert(k, AttributeValue::S(v));
            }
            return Some(attr_map);
        }
    }
    None
}

pub(crate) fn from_ddb<T>(page: Option<&str>, page_size: usize,
                          last_evaluated_key: Option<&HashMap<String, AttributeValue>>,
                          records: Vec<T>) -> PaginatedResult<T> {
    let mut next_page: Option<String> = None;
    if let Some(attr_map) = last_evaluated_key {
        let mut str_map = HashMap::new();
        for (k, v) in attr_map {
            if let AttributeValue::S(val) = v {
                str_map.insert(k.clone(), val.to_string());
            }
        }
        if let Ok(j) = serde_json::to_string(&str_map) {
            next_page = Some(j);
        }
    }
    PaginatedResult::new(page, page_size, next_page, records)
}


fn value_to_item(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(a) => AttributeValue::L(a.into_iter().map(value_to_item).collect()),
        Value::Object(o) => {
            AttributeValue::M(o.into_iter().map(|(k, v)| (k, value_to_item(v))).collect())
        }
    }
}

// helper method to build db-client with tracing enabled
pub(crate) async fn build_db_client(store: RepositoryStore) -> Client {
    match store {
        RepositoryStore::LocalDynamoDB => {
            // See https://docs.aws.amazon.com/sdk-for-rust/latest/dg/dynamodb-local.html
            let endpoint = std::env::var(LOCAL_ENDPOINT_ENV).unwrap_or_else(|_| LOCAL_ENDPOINT.to_string());
            let dynamodb_local_config = aws_sdk_dynamodb::Config::builder()
                .region(Region::new("local"))
                .credentials_provider(
                    Credentials::new("AKIDLOCALSTACK", "localstacksecret", None, None, "faked"))
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(dynamodb_local_config)
        }
        _ => {
            //Get config from environment.
            let config = aws_config::load_from_env().await;
            //Create the DynamoDB client.
            Client::new(&config)
        }
    }
}

// helper method to build sns-client with tracing enabled
pub async fn build_sns_client() -> aws_sdk_sns::Client {
    //Get config from environment.
    let config = aws_config::load_from_env().await;
    aws_sdk_sns::Client::new(&config)
}

impl From<SdkError<UpdateItemError>> for LibraryError {
    fn from(err: SdkError<UpdateItemError>) -> Self {
        if let SdkError::ServiceError(ctx) = &err {
            if ctx.err().is_conditional_check_failed_exception() {
                return LibraryError::conflict(format!("stale version {:?}", err).as_str(),
                                              Some("ConditionalCheckFailed".to_string()));
            }
        }
        sdk_error(&err)
    }
}

impl From<SdkError<PutItemError>> for LibraryError {
    fn from(err: SdkError<PutItemError>) -> Self {
        if let SdkError::ServiceError(ctx) = &err {
            if ctx.err().is_conditional_check_failed_exception() {
                return LibraryError::duplicate_key(format!("record already exists {:?}", err).as_str());
            }
        }
        sdk_error(&err)
    }
}

// operations without a conditional write map every failure by its retryability
macro_rules! plain_sdk_error {
    ($($op:ty),+) => {
        $(impl From<SdkError<$op>> for LibraryError {
            fn from(err: SdkError<$op>) -> Self {
                sdk_error(&err)
            }
        })+
    };
}

plain_sdk_error!(DeleteItemError, QueryError, ScanError);

impl From<SdkError<TransactWriteItemsError>> for LibraryError {
    fn from(err: SdkError<TransactWriteItemsError>) -> Self {
        if let SdkError::ServiceError(ctx) = &err {
            if ctx.err().is_transaction_canceled_exception() {
                return LibraryError::conflict(format!("transaction cancelled {:?}", err).as_str(),
                                              Some("TransactionCanceled".to_string()));
            }
        }
        sdk_error(&err)
    }
}

fn sdk_error<T: std::fmt::Debug>(err: &SdkError<T>) -> LibraryError {
    let (retryable, reason) = retryable_sdk_error(err);
    LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
}

fn retryable_sdk_error<T>(err: &SdkError<T>) -> (bool, Option<String>) {
    match err {
        SdkError::ConstructionFailure(_) => (false, Some("ConstructionFailure".to_string())),
        SdkError::TimeoutError(_) => (true, Some("TimeoutError".to_string())),
        SdkError::DispatchFailure(_) => (true, Some("DispatchFailure".to_string())),
        SdkError::ResponseError { .. } => (true, Some("ResponseError".to_string())),
        SdkError::ServiceError(ctx) => {
            let http = ctx.raw().http();
            (http.status().is_server_error() || has_exceeded_limit(http.body().bytes()), Some(http.status().to_string()))
        }
        _ => (true, Some("Unknown".to_string())),
    }
}

// throttling responses read "...ThroughputExceeded..." or "...LimitExceeded..."
fn has_exceeded_limit(body: Option<&[u8]>) -> bool {
    body.map(|b| b.windows(6).any(|w| w == b"ceeded")).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use aws_sdk_dynamodb::types::AttributeValue;
    use chrono::NaiveDateTime;
    use crate::utils::date::DATE_FMT;
    use crate::utils::ddb::{add_filter_expr, from_ddb, has_exceeded_limit, opt_number, opt_string_date, parse_date_attribute, parse_item, parse_opt_number_attribute, string_date, to_ddb_page};

    #[tokio::test]
    async fn test_should_build_filter_expr() {
        let mut filter = String::new();
        assert_eq!("book_id", add_filter_expr("book_id", &mut filter).as_str());
        assert_eq!("expires_at", add_filter_expr("expires_at:<", &mut filter).as_str());
        assert_eq!("book_id = :book_id AND expires_at < :expires_at", filter.as_str());
    }

    #[tokio::test]
    async fn test_should_parse_item_and_attributes() {
        let item = parse_item(serde_json::json!({"hold_id": "h1", "queue_rank": 2, "expires_at": null})).unwrap();
        assert_eq!(Some(2), parse_opt_number_attribute("queue_rank", &item));
        assert_eq!(None, parse_opt_number_attribute("expires_at", &item));
        assert!(parse_item(serde_json::json!("scalar")).is_err());
    }

    #[tokio::test]
    async fn test_should_format_dates() {
        let date = NaiveDateTime::parse_from_str("2023-04-11T11:11:11", DATE_FMT).unwrap();
        let map = HashMap::from([("at".to_string(), string_date(date)), ("none".to_string(), opt_string_date(None))]);
        assert_eq!(Some(date), parse_date_attribute("at", &map));
        assert_eq!(None, parse_date_attribute("none", &map));
        assert_eq!(AttributeValue::Null(true), opt_number(None));
    }

    #[tokio::test]
    async fn test_should_round_trip_pages() {
        let key = HashMap::from([("hold_id".to_string(), AttributeValue::S("h1".to_string()))]);
        let res = from_ddb::<u8>(None, 10, Some(&key), vec![]);
        let page = res.next_page.expect("next page");
        let start = to_ddb_page(Some(page.as_str())).unwrap();
        assert_eq!(Some(&AttributeValue::S("h1".to_string())), start.get("hold_id"));
        assert_eq!(None, to_ddb_page(None));
    }

    #[tokio::test]
    async fn test_should_detect_exceeded_limit() {
        assert!(has_exceeded_limit(Some(b"ProvisionedThroughputExceededException")));
        assert!(!has_exceeded_limit(Some(b"oops")));
        assert!(!has_exceeded_limit(None));
    }
}
