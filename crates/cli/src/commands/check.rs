use anyhow::Result;
use std::sync::Arc;
use survey_guard_service::ReportService;
use survey_guard_storage::{PgStorage, Storage};

use crate::get_database_url;

pub(crate) async fn run() -> Result<()> {
    let storage: Arc<dyn Storage> = Arc::new(PgStorage::new(&get_database_url()?).await?);
    let overview = ReportService::new(storage).overview().await?;
    println!("{}", serde_json::to_string_pretty(&overview)?);
    Ok(())
}
