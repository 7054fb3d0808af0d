//! GitHub-backed attachment store.
//!
//! Attachments are binary files under a fixed repository directory. The
//! stored filename is the original name prefixed with the upload time in
//! epoch milliseconds, which both avoids collisions and lets a later
//! listing recover the creation time from the name alone.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use carnet_core::defaults::ATTACHMENTS_DIR;
use carnet_core::names;
use carnet_core::{Attachment, AttachmentRepository, CreateAttachmentRequest, Error, Result};
use carnet_github::{ContentEntry, ContentFile, GitHubClient};

/// Parse the epoch-milliseconds prefix out of a stored filename.
///
/// This must agree with the format written by `create` or timestamps
/// silently disagree between a fresh attachment and a re-listed one.
fn parse_filename_timestamp(filename: &str) -> Option<DateTime<Utc>> {
    let prefix = filename.split('_').next()?;
    let millis: i64 = prefix.parse().ok()?;
    if millis <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(millis).single()
}

/// GitHub implementation of [`AttachmentRepository`].
pub struct GitHubAttachmentRepository {
    client: Arc<GitHubClient>,
}

impl GitHubAttachmentRepository {
    /// Create a new repository over the given client.
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }

    fn file_to_attachment(&self, file: &ContentFile) -> Attachment {
        Attachment {
            name: names::attachment_name(&file.name),
            filename: file.name.clone(),
            external_link: file
                .download_url
                .clone()
                .unwrap_or_else(|| self.client.raw_content_url(&file.path)),
            // MIME type is not available from the listing.
            mime_type: String::new(),
            size: file.size,
            sha: file.sha.clone(),
            memo: None,
            create_time: parse_filename_timestamp(&file.name),
        }
    }

    /// Raw-content URL for an attachment name.
    pub fn attachment_url(&self, name: &str) -> Result<String> {
        let filename = names::parse_attachment_name(name)?;
        Ok(self
            .client
            .raw_content_url(&format!("{ATTACHMENTS_DIR}/{filename}")))
    }
}

#[async_trait]
impl AttachmentRepository for GitHubAttachmentRepository {
    async fn list(&self) -> Result<Vec<Attachment>> {
        match self.client.get_content(ATTACHMENTS_DIR).await {
            // The directory does not exist until the first upload.
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
            Ok(ContentEntry::File(_)) => Ok(Vec::new()),
            Ok(ContentEntry::Listing(files)) => {
                Ok(files.iter().map(|f| self.file_to_attachment(f)).collect())
            }
        }
    }

    async fn create(&self, req: CreateAttachmentRequest) -> Result<Attachment> {
        if req.filename.is_empty() {
            return Err(Error::InvalidInput("attachment filename is empty".to_string()));
        }

        let now = Utc::now();
        let filename = format!("{}_{}", now.timestamp_millis(), req.filename);
        let path = format!("{ATTACHMENTS_DIR}/{filename}");

        let mime_type = req.mime_type.clone().unwrap_or_else(|| {
            infer::get(&req.content)
                .map(|kind| kind.mime_type().to_string())
                .unwrap_or_default()
        });

        debug!(
            "Uploading attachment: path={}, size={}, type={}",
            path,
            req.content.len(),
            mime_type
        );

        let encoded = BASE64_STANDARD.encode(&req.content);
        let commit = self
            .client
            .put_file(
                &path,
                &format!("Upload attachment: {}", req.filename),
                &encoded,
                None,
            )
            .await?;

        Ok(Attachment {
            name: names::attachment_name(&filename),
            filename,
            external_link: self.client.raw_content_url(&path),
            mime_type,
            size: req.content.len() as i64,
            sha: commit.content.map(|c| c.sha).unwrap_or_default(),
            memo: None,
            create_time: Some(now),
        })
    }

    async fn delete(&self, name: &str, sha: Option<&str>) -> Result<()> {
        let filename = names::parse_attachment_name(name)?;
        let path = format!("{ATTACHMENTS_DIR}/{filename}");

        // Deletion needs the blob SHA; fetch it when the caller has none.
        let sha = match sha.filter(|s| !s.is_empty()) {
            Some(sha) => sha.to_string(),
            None => match self.client.get_content(&path).await? {
                ContentEntry::File(file) => file.sha,
                ContentEntry::Listing(_) => {
                    return Err(Error::InvalidInput(format!("not a file: {path}")))
                }
            },
        };

        self.client
            .delete_file(&path, &format!("Delete attachment: {filename}"), &sha)
            .await
    }
}
