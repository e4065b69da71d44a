//! Media upload coordination for rentdesk forms.
//!
//! A [`MediaUploadCoordinator`] keeps an ordered list of media items (stored
//! URLs plus newly selected files), uploads each new file once through a
//! [`MediaUploader`], and reports the ordered list of uploaded URLs to its
//! owner whenever that list changes.

pub mod coordinator;
pub mod error;
pub mod item;
pub mod progress;
pub mod uploader;

pub use coordinator::{
    CoordinatorConfig, CoordinatorHandle, MediaUploadCoordinator, Snapshot, ValueListener,
};
pub use error::UploadError;
pub use item::{DisplayUrl, ItemId, MediaFile, MediaItem, UploadState};
pub use progress::ProgressMap;
pub use uploader::MediaUploader;
