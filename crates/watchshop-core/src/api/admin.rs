//! Catalog administration: edit and delete watches.

use tracing::info;

use crate::models::{Watch, WatchForm};

use super::{ApiClient, ApiError, ApiRequest};

impl ApiClient {
    /// Validate and upload the edit form as multipart.
    pub async fn update_watch(&self, form: &WatchForm) -> Result<Watch, ApiError> {
        self.require_auth()?;
        form.validate()?;
        let request = ApiRequest::put(format!("/api/watches/{}/", form.id)).multipart(form.to_multipart());
        let watch: Watch = self.fetch_json(request).await?;
        info!(watch_id = watch.id, "Watch updated");
        Ok(watch)
    }

    pub async fn delete_watch(&self, id: i64) -> Result<(), ApiError> {
        self.require_auth()?;
        self.send(ApiRequest::delete(format!("/api/watches/{}/", id))).await?;
        info!(watch_id = id, "Watch deleted");
        Ok(())
    }
}
