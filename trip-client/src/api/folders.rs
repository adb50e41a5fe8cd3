//! Folder endpoints.

use crate::domain::{FolderId, PlanFolder, validate_folder_name};

use super::client::ApiClient;
use super::convert::convert_folder;
use super::error::ApiError;
use super::types::{CreateFolderRequest, FolderDto};

impl ApiClient {
    pub async fn list_folders(&self) -> Result<Vec<PlanFolder>, ApiError> {
        let folders: Vec<FolderDto> = self.get("/api/folders", &[]).await?;
        Ok(folders.into_iter().map(convert_folder).collect())
    }

    /// Create a folder, optionally inside `parent`.
    ///
    /// Blank names are rejected without contacting the backend.
    pub async fn create_folder(
        &self,
        name: &str,
        parent: Option<&FolderId>,
    ) -> Result<PlanFolder, ApiError> {
        let name = validate_folder_name(name)?;
        let body = CreateFolderRequest {
            name,
            parent_id: parent.map(FolderId::as_str),
        };
        let folder: FolderDto = self.post("/api/folders", &body).await?;
        Ok(convert_folder(folder))
    }
}
