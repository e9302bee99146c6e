//! The software-catalog data model of a software center: a de-duplicated,
//! observable collection of app records plus the thread-safe list container
//! that aggregates them.
//!
//! Plugins construct [`App`] records and push them into [`AppList`]
//! instances; the list de-duplicates and, when asked to, watches its
//! members' state and progress to keep its own derived properties current.
//! Change notifications are queued and delivered by [`process_pending`],
//! which the embedding application calls from its main loop.

mod app;
mod app_list;
mod cancel;
mod event;
mod id;
mod license;
mod plugin;
mod size;
mod version;

pub use app::{
    App, AppKind, AppProvide, AppQuirk, AppState, MetadataValue, Progress, Quality, SpecialKind,
};
pub use app_list::{AppList, FilterFlags, ListFlags};
pub use cancel::Cancellable;
pub use event::{process_pending, AppChange, ConnectionId, ListChange};
pub use id::{unique_id_match, BundleKind, Scope};
pub use plugin::{compare_priority, ManagementPlugin};
pub use size::Size;
