//! Terminal client for the photovault photo backup service.
//!
//! All persistence lives behind an HTTP backend; this crate is the
//! client-side workflow around it:
//! - Registers accounts and logs in over form-encoded requests
//! - Uploads picked photos as `multipart/form-data`
//! - Lists and fetches the files backed up for the logged-in account
//! - Keeps the one piece of cross-operation state, the session, in memory
//!
//! # Example
//! ```ignore
//! use photovault::cli::StdoutNotifier;
//! use photovault::{DirAccess, MediaIndex, ReqwestBackupApi, Workflow};
//!
//! let index = Arc::new(MediaIndex::scan("./photos")?);
//! let mut workflow = Workflow::builder()
//!     .api(ReqwestBackupApi::shared())
//!     .resolver(index.clone())
//!     .access(Arc::new(DirAccess::new("./photos")))
//!     .picker(picker)
//!     .notifier(Arc::new(StdoutNotifier))
//!     .download_dir("./downloads".into())
//!     .build();
//!
//! workflow.login("alice", "hunter2").await;
//! workflow.list_requested().await;
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod session;
pub mod telemetry;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use api::{BackupApi, LoginResponse, ReqwestBackupApi, UploadRequest};
pub use config::{Args, Config};
pub use error::{Error, Result};
pub use media::{ContentRef, ContentResolver, DirAccess, MediaIndex, MediaPicker, StorageAccess};
pub use session::Session;
pub use types::UserId;
pub use workflow::{Notifier, Workflow};
