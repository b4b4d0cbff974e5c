//! Image upload command handler.

use std::path::PathBuf;

use chrono::Utc;
use toybazaar_core::{AppConfig, Lookup};
use toybazaar_db::ToyStore;
use toybazaar_storage::{content_type_for, object_name_for, StorageClient};
use uuid::Uuid;

/// Upload each file to object storage and append its public URL to the
/// product's `images`.
///
/// Files are processed in order. A failure stops the run; images uploaded
/// before it stay attached.
///
/// # Errors
///
/// Returns an error if storage is not configured, the product does not
/// exist, a file cannot be read, or an upload or update fails.
pub(crate) async fn run_upload(
    config: &AppConfig,
    toy: Uuid,
    files: &[PathBuf],
) -> anyhow::Result<()> {
    let storage = config.storage.as_ref().ok_or_else(|| {
        anyhow::anyhow!("object storage is not configured (set TOYBAZAAR_STORAGE_REST_URL)")
    })?;
    let client = StorageClient::new(storage)?;

    let pool = toybazaar_db::connect_pool_from_config(config).await?;
    let store = ToyStore::from(pool);
    if store.find(&Lookup::PrimaryKey(toy)).await?.is_none() {
        anyhow::bail!("toy {toy} not found");
    }

    for file in files {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let object_name = object_name_for(toy, file_name, Utc::now().timestamp_millis());
        let content_type = content_type_for(&object_name);

        let url = client.upload(&object_name, content_type, bytes).await?;
        store
            .append_image(toy, &url)
            .await?
            .ok_or_else(|| anyhow::anyhow!("toy {toy} disappeared during upload"))?;

        tracing::info!(toy_id = %toy, object = %object_name, "image attached");
        println!("{url}");
    }

    Ok(())
}
