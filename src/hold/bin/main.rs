use lambda_http::{run, Error};
use tracing::info;
use reservations::core::controller::{AppState, build_router};
use reservations::core::domain::Configuration;
use reservations::core::repository::RepositoryStore;
use reservations::utils::logs::setup_tracing;

const STORE_ENV: &str = "LMS_STORE";
const BRANCH_ENV: &str = "LMS_BRANCH";
const DEV_MODE_ENV: &str = "LMS_DEV_MODE";

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let dev_mode = std::env::var(DEV_MODE_ENV).map(|v| v == "true").unwrap_or(false);
    if dev_mode {
        // runs the lambda adapter against a local runtime emulator
        std::env::set_var("AWS_LAMBDA_FUNCTION_NAME", "_");
        std::env::set_var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE", "4096");
        std::env::set_var("AWS_LAMBDA_FUNCTION_VERSION", "1");
        std::env::set_var("AWS_LAMBDA_RUNTIME_API", "http://[::]:9000/.rt");
    }
    let default_store = if dev_mode { "LocalDynamoDB" } else { "DynamoDB" };
    let store = RepositoryStore::from(std::env::var(STORE_ENV).unwrap_or_else(|_| default_store.to_string()));
    let branch = std::env::var(BRANCH_ENV).unwrap_or_else(|_| "main".to_string());
    let config = Configuration::from_env(branch.as_str());
    info!("starting reservations for branch {} on {:?}", config.branch_id, store);

    let state = AppState::build(config, store).await;
    run(build_router(state)).await
}
