use anyhow::Result;
use tracing::{error, info};

use super::{init_database, serve};
use crate::config::AppConfig;

pub async fn migrate_and_serve(config: &AppConfig) -> Result<()> {
    info!("Applying database migrations and starting server");

    if let Err(e) = init_database(config.database_url()).await {
        error!("Migrations failed, not starting server: {}", e);
        return Err(e);
    }

    serve(config).await
}
