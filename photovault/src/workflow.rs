//! Orchestration of user-triggered backup actions.
//!
//! [`Workflow`] owns the session and wires the backend client to its local
//! collaborators: the picker, the reference resolver, the storage permission
//! gate, and the notifier that carries feedback to the user. Each public
//! method is one user action. Failures are terminal for the triggering
//! action and are reported through the [`Notifier`]; nothing is retried.

use crate::api::{BackupApi, UploadRequest};
use crate::error::{Error, Result};
use crate::media::{ContentRef, ContentResolver, MediaPicker, StorageAccess};
use crate::session::Session;
use bon::Builder;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sink for user-facing feedback.
pub trait Notifier: Send + Sync {
    /// Show a short one-line notice.
    fn notify(&self, message: &str);

    /// Render the names of the user's backed-up files.
    fn show_files(&self, files: &[String]);
}

/// Drives the backup client: one method per user action.
///
/// [`Workflow::login`] is the only method that mutates the session; every
/// other action borrows it immutably.
#[derive(Builder)]
pub struct Workflow {
    api: Arc<dyn BackupApi>,
    resolver: Arc<dyn ContentResolver>,
    access: Arc<dyn StorageAccess>,
    picker: Arc<dyn MediaPicker>,
    notifier: Arc<dyn Notifier>,
    /// Where fetched files are written.
    download_dir: PathBuf,
    #[builder(default)]
    session: Session,
}

impl Workflow {
    /// Current session, for callers that want to inspect login state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Create an account with the given credentials.
    #[tracing::instrument(skip_all)]
    pub async fn register(&self, username: &str, password: &str) {
        match self.api.register(username, password).await {
            Ok(confirmation) => {
                tracing::debug!(confirmation = %confirmation, "Account registered");
                self.notifier.notify("Registration successful, please log in");
            }
            Err(e) => self.surface(&e, "Registration failed"),
        }
    }

    /// Log in and remember the account id for later uploads and listings.
    #[tracing::instrument(skip_all)]
    pub async fn login(&mut self, username: &str, password: &str) {
        match self.api.login(username, password).await {
            Ok(response) => {
                self.session.set_user_id(response.user_id);
                tracing::info!(user_id = response.user_id, "Logged in");
                self.notifier.notify("Login successful");
            }
            Err(e) => self.surface(&e, "Login failed"),
        }
    }

    /// Start a pick: make sure the photo library is accessible, ask the
    /// picker, and feed any selection through [`Workflow::pick_completed`].
    #[tracing::instrument(skip_all)]
    pub async fn pick_requested(&self) {
        if !self.access.granted() {
            tracing::info!("Storage access not granted, requesting it");
            if !self.access.request() {
                self.notifier.notify("Permission denied, cannot access photo library");
                return;
            }
        }
        match self.picker.pick().await {
            Some(content) => self.pick_completed(&content).await,
            None => tracing::debug!("Pick dismissed without a selection"),
        }
    }

    /// Handle a completed pick: resolve the reference and upload the file.
    /// A reference that no longer resolves is dropped without comment.
    #[tracing::instrument(skip_all, fields(content = %content))]
    pub async fn pick_completed(&self, content: &ContentRef) {
        let Some(path) = self.resolver.resolve(content) else {
            tracing::debug!("Reference did not resolve, skipping upload");
            return;
        };
        match self.upload(&path).await {
            Ok(confirmation) => {
                tracing::debug!(confirmation = %confirmation, "Upload accepted");
                self.notifier.notify("File uploaded successfully");
            }
            Err(e) => self.surface(&e, "File upload failed"),
        }
    }

    /// Show the names of everything backed up for the logged-in account.
    #[tracing::instrument(skip_all)]
    pub async fn list_requested(&self) {
        match self.fetch_listing().await {
            Ok(files) => self.notifier.show_files(&files),
            Err(e) => self.surface(&e, "Failed to fetch file list"),
        }
    }

    /// Fetch one backed-up file and write it into the download directory.
    #[tracing::instrument(skip_all, fields(filename = %filename))]
    pub async fn download_requested(&self, filename: &str) {
        match self.fetch_file(filename).await {
            Ok(path) => self.notifier.notify(&format!("Saved to {}", path.display())),
            Err(e) => self.surface(&e, "Download failed"),
        }
    }

    async fn upload(&self, path: &Path) -> Result<String> {
        // Check the session before touching the file; a logged-out pick
        // must not read or send anything
        let user_id = self.session.user_id().ok_or(Error::NotLoggedIn)?;

        let bytes = tokio::fs::read(path).await.map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => path.display().to_string(),
        };

        let request = UploadRequest {
            user_id,
            file_name,
            bytes,
        };
        self.api.upload(&request).await
    }

    async fn fetch_listing(&self) -> Result<Vec<String>> {
        let user_id = self.session.user_id().ok_or(Error::NotLoggedIn)?;
        self.api.list_files(user_id).await
    }

    async fn fetch_file(&self, filename: &str) -> Result<PathBuf> {
        let user_id = self.session.user_id().ok_or(Error::NotLoggedIn)?;
        let bytes = self.api.download(user_id, filename).await?;

        let target = self.download_dir.join(filename);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::FileWrite {
                    path: target.clone(),
                    source,
                })?;
        }
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|source| Error::FileWrite {
                path: target.clone(),
                source,
            })?;
        Ok(target)
    }

    /// Report a failed action. Transport problems get a generic notice with
    /// the detail kept in the log; everything else is shown to the user
    /// with the backend's text untouched.
    fn surface(&self, error: &Error, context: &str) {
        match error {
            Error::NotLoggedIn => self.notifier.notify(&error.to_string()),
            Error::Transport(source) => {
                tracing::error!(error = %source, "{context}");
                self.notifier.notify("Network error, please try again");
            }
            _ => {
                tracing::warn!(error = %error, "{context}");
                self.notifier.notify(&format!("{context}: {error}"));
            }
        }
    }
}
