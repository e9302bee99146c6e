//! The app record: one piece of software, installed or installable.
//!
//! An [`App`] is a cheaply clonable handle to shared, mutex-protected state.
//! Plugins on worker threads mutate the same record concurrently; every
//! accessor takes the lock for the duration of one logical operation and
//! change notifications are delivered later through [`crate::event`], never
//! while the lock is held.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use crate::app_list::AppList;
use crate::cancel::Cancellable;
use crate::event::{self, AppChange, ConnectionId, Event, Registry};
use crate::id::{self, BundleKind, Scope};
use crate::license::license_is_free;
use crate::plugin::ManagementPlugin;
use crate::size::Size;
use crate::version::populate_ui_versions;

/// Installation state of an app.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AppState {
    #[default]
    Unknown,
    Available,
    AvailableLocal,
    Purchasable,
    Purchasing,
    QueuedForInstall,
    Installing,
    Removing,
    Downloading,
    Installed,
    Updatable,
    UpdatableLive,
    Unavailable,
    PendingInstall,
    PendingRemove,
}

impl AppState {
    pub fn as_str(self) -> &'static str {
        match self {
            AppState::Unknown => "unknown",
            AppState::Available => "available",
            AppState::AvailableLocal => "local",
            AppState::Purchasable => "purchasable",
            AppState::Purchasing => "purchasing",
            AppState::QueuedForInstall => "queued",
            AppState::Installing => "installing",
            AppState::Removing => "removing",
            AppState::Downloading => "downloading",
            AppState::Installed => "installed",
            AppState::Updatable => "updatable",
            AppState::UpdatableLive => "updatable-live",
            AppState::Unavailable => "unavailable",
            AppState::PendingInstall => "pending-install",
            AppState::PendingRemove => "pending-remove",
        }
    }

    /// Transient states never get recorded as the recovery state.
    fn is_transient(self) -> bool {
        matches!(
            self,
            AppState::Downloading
                | AppState::Installing
                | AppState::Removing
                | AppState::QueuedForInstall
        )
    }
}

/// What kind of software component the record describes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AppKind {
    #[default]
    Unknown,
    Generic,
    DesktopApp,
    ConsoleApp,
    WebApp,
    Addon,
    Runtime,
    Repository,
    Firmware,
    OperatingSystem,
}

impl AppKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AppKind::Unknown => "unknown",
            AppKind::Generic => "generic",
            AppKind::DesktopApp => "desktop-app",
            AppKind::ConsoleApp => "console-app",
            AppKind::WebApp => "web-app",
            AppKind::Addon => "addon",
            AppKind::Runtime => "runtime",
            AppKind::Repository => "repository",
            AppKind::Firmware => "firmware",
            AppKind::OperatingSystem => "operating-system",
        }
    }
}

/// Marks pseudo-apps that stand in for something other than real software,
/// like the aggregated OS update.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpecialKind {
    OsUpdate,
}

/// Confidence tag on user-facing text fields. Lower-confidence sources must
/// not clobber higher-confidence data.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub enum Quality {
    #[default]
    Unknown,
    Lowest,
    Normal,
    Highest,
}

/// Install or download progress; `Unknown` until a plugin reports a value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Progress {
    #[default]
    Unknown,
    Percent(u8),
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Unknown => write!(f, "unknown"),
            Progress::Percent(p) => write!(f, "{}%", p),
        }
    }
}

bitflags::bitflags! {
    /// Per-app behavior flags.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct AppQuirk: u32 {
        /// A partial record matching any app with the same unique-id.
        const IS_WILDCARD = 1 << 0;
        /// Core system component that must not be removed.
        const COMPULSORY = 1 << 1;
        const NOT_REVIEWABLE = 1 << 2;
        const HIDE_FROM_SEARCH = 1 << 3;
        const NEEDS_REBOOT = 1 << 4;
    }
}

/// Typed value in the free-form per-plugin metadata store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetadataValue {
    Str(String),
    Bool(bool),
    U32(u32),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Str(s) => write!(f, "{}", s),
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::U32(u) => write!(f, "{}", u),
        }
    }
}

/// One AppStream "provides" item.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppProvide {
    Id(String),
    MediaType(String),
}

type AppObserver = dyn Fn(&App, AppChange) + Send + Sync;

struct AppInner {
    id: Option<String>,
    // cache, rebuilt on demand from the five identity fields
    unique_id: Option<String>,
    kind: AppKind,
    special_kind: Option<SpecialKind>,
    state: AppState,
    state_recover: AppState,
    progress: Progress,
    allow_cancel: bool,
    quirk: AppQuirk,
    scope: Scope,
    bundle_kind: BundleKind,
    branch: Option<String>,
    origin: Option<String>,
    origin_appstream: Option<String>,
    origin_hostname: Option<String>,
    origin_ui: Option<String>,
    name: Option<String>,
    name_quality: Quality,
    summary: Option<String>,
    summary_quality: Quality,
    description: Option<String>,
    description_quality: Quality,
    license: Option<String>,
    license_quality: Quality,
    license_is_free: bool,
    version: Option<String>,
    update_version: Option<String>,
    version_ui: Option<String>,
    update_version_ui: Option<String>,
    versions_valid: bool,
    developer_name: Option<String>,
    project_group: Option<String>,
    install_date: u64,
    size_installed: Size,
    size_download: Size,
    size_user_data: Size,
    size_cache_data: Size,
    sources: Vec<String>,
    source_ids: Vec<String>,
    categories: Vec<String>,
    provides: Vec<AppProvide>,
    metadata: BTreeMap<String, MetadataValue>,
    addons: Option<AppList>,
    related: AppList,
    history: AppList,
    runtime: Option<App>,
    management_plugin: Option<Weak<dyn ManagementPlugin>>,
    management_plugin_name: Option<String>,
    priority: u32,
    match_value: u32,
    to_be_installed: bool,
    cancellable: Option<Cancellable>,
}

impl Default for AppInner {
    fn default() -> Self {
        Self {
            id: None,
            unique_id: None,
            kind: AppKind::Unknown,
            special_kind: None,
            state: AppState::Unknown,
            state_recover: AppState::Unknown,
            progress: Progress::Unknown,
            allow_cancel: true,
            quirk: AppQuirk::empty(),
            scope: Scope::Unknown,
            bundle_kind: BundleKind::Unknown,
            branch: None,
            origin: None,
            origin_appstream: None,
            origin_hostname: None,
            origin_ui: None,
            name: None,
            name_quality: Quality::Unknown,
            summary: None,
            summary_quality: Quality::Unknown,
            description: None,
            description_quality: Quality::Unknown,
            license: None,
            license_quality: Quality::Unknown,
            license_is_free: false,
            version: None,
            update_version: None,
            version_ui: None,
            update_version_ui: None,
            versions_valid: false,
            developer_name: None,
            project_group: None,
            install_date: 0,
            size_installed: Size::Unknown,
            size_download: Size::Unknown,
            size_user_data: Size::Unknown,
            size_cache_data: Size::Unknown,
            sources: Vec::new(),
            source_ids: Vec::new(),
            categories: Vec::new(),
            provides: Vec::new(),
            metadata: BTreeMap::new(),
            addons: None,
            related: AppList::new(),
            history: AppList::new(),
            runtime: None,
            management_plugin: None,
            management_plugin_name: None,
            priority: 0,
            match_value: 0,
            to_be_installed: false,
            cancellable: None,
        }
    }
}

impl AppInner {
    fn rebuild_unique_id(&mut self) -> String {
        let unique_id = id::build_unique_id(
            self.scope,
            self.bundle_kind,
            self.origin.as_deref(),
            self.id.as_deref(),
            self.branch.as_deref(),
        );
        self.unique_id = Some(unique_id.clone());
        unique_id
    }
}

struct AppShared {
    inner: Mutex<AppInner>,
    observers: Mutex<Registry<AppObserver>>,
}

/// Shared handle to one software record.
#[derive(Clone)]
pub struct App {
    shared: Arc<AppShared>,
}

impl PartialEq for App {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for App {}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("unique_id", &self.unique_id())
            .finish()
    }
}

impl App {
    pub fn new(id: Option<&str>) -> Self {
        let mut inner = AppInner::default();
        inner.id = id.map(str::to_string);
        Self {
            shared: Arc::new(AppShared {
                inner: Mutex::new(inner),
                observers: Mutex::new(Registry::default()),
            }),
        }
    }

    /// Build an app from a `scope/bundle_kind/origin/id/branch` string. A
    /// malformed string leaves the app unpopulated.
    pub fn new_from_unique_id(unique_id: &str) -> Self {
        let app = Self::new(None);
        match id::parse_unique_id(unique_id) {
            Some(parsed) => {
                let mut inner = app.shared.inner.lock().unwrap();
                inner.scope = parsed.scope;
                inner.bundle_kind = parsed.bundle_kind;
                inner.origin = parsed.origin;
                inner.id = parsed.id;
                inner.branch = parsed.branch;
            }
            None => {
                log::warn!("ignoring malformed unique-id {:?}", unique_id);
            }
        }
        app
    }

    pub(crate) fn ptr_key(&self) -> usize {
        Arc::as_ptr(&self.shared) as *const () as usize
    }

    // ---- change notification ----

    pub fn connect<F>(&self, callback: F) -> ConnectionId
    where
        F: Fn(&App, AppChange) + Send + Sync + 'static,
    {
        let callback: Arc<AppObserver> = Arc::new(callback);
        self.shared.observers.lock().unwrap().connect(callback)
    }

    pub fn disconnect(&self, id: ConnectionId) {
        self.shared.observers.lock().unwrap().disconnect(id);
    }

    fn notify(&self, change: AppChange) {
        event::queue_event(Event::App(self.clone(), change));
    }

    /// Invoke every observer. Called from the event queue with no entity
    /// lock held.
    pub(crate) fn emit(&self, change: AppChange) {
        let callbacks = self.shared.observers.lock().unwrap().snapshot();
        for callback in callbacks {
            callback(self, change);
        }
    }

    // ---- identity ----

    pub fn id(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().id.clone()
    }

    pub fn set_id(&self, id: &str) {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.id.as_deref() != Some(id) {
            inner.id = Some(id.to_string());
            inner.unique_id = None;
        }
    }

    pub fn unique_id(&self) -> String {
        let mut inner = self.shared.inner.lock().unwrap();
        match &inner.unique_id {
            Some(unique_id) => unique_id.clone(),
            None => inner.rebuild_unique_id(),
        }
    }

    pub fn scope(&self) -> Scope {
        self.shared.inner.lock().unwrap().scope
    }

    pub fn set_scope(&self, scope: Scope) {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.scope != scope {
            inner.scope = scope;
            inner.unique_id = None;
        }
    }

    pub fn bundle_kind(&self) -> BundleKind {
        self.shared.inner.lock().unwrap().bundle_kind
    }

    pub fn set_bundle_kind(&self, bundle_kind: BundleKind) {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.bundle_kind != bundle_kind {
            inner.bundle_kind = bundle_kind;
            inner.unique_id = None;
        }
    }

    pub fn branch(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().branch.clone()
    }

    pub fn set_branch(&self, branch: &str) {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.branch.as_deref() != Some(branch) {
            inner.branch = Some(branch.to_string());
            inner.unique_id = None;
        }
    }

    pub fn origin(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().origin.clone()
    }

    /// First write wins; re-setting a different origin is ignored.
    pub fn set_origin(&self, origin: &str) {
        let mut inner = self.shared.inner.lock().unwrap();
        match &inner.origin {
            Some(existing) if existing == origin => {}
            Some(existing) => {
                log::warn!(
                    "not overwriting origin {:?} with {:?}",
                    existing,
                    origin
                );
            }
            None => {
                inner.origin = Some(origin.to_string());
                inner.unique_id = None;
            }
        }
    }

    pub fn origin_appstream(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().origin_appstream.clone()
    }

    pub fn set_origin_appstream(&self, origin: &str) {
        self.shared.inner.lock().unwrap().origin_appstream = Some(origin.to_string());
    }

    /// The origin name suitable for display, falling back to the raw origin.
    pub fn origin_ui(&self) -> Option<String> {
        let inner = self.shared.inner.lock().unwrap();
        inner.origin_ui.clone().or_else(|| inner.origin.clone())
    }

    pub fn set_origin_ui(&self, origin_ui: &str) {
        self.shared.inner.lock().unwrap().origin_ui = Some(origin_ui.to_string());
    }

    pub fn origin_hostname(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().origin_hostname.clone()
    }

    /// Reduce a download URL (or bare hostname) to a representative
    /// hostname, dropping common mirror prefixes. A URL with no host
    /// (e.g. `file://`) reads as `localhost`.
    pub fn set_origin_hostname(&self, url_str: &str) {
        let host = match url::Url::parse(url_str) {
            Ok(url) => url.host_str().unwrap_or("").to_string(),
            // not a URL, assume it is already a hostname
            Err(_) => url_str.to_string(),
        };
        let host = host
            .strip_prefix("download.")
            .or_else(|| host.strip_prefix("mirrors."))
            .map(str::to_string)
            .unwrap_or(host);
        let hostname = if host.is_empty() {
            "localhost".to_string()
        } else {
            host
        };
        self.shared.inner.lock().unwrap().origin_hostname = Some(hostname);
    }

    // ---- kind ----

    pub fn kind(&self) -> AppKind {
        self.shared.inner.lock().unwrap().kind
    }

    /// Kind transitions are restricted: anything goes from `Unknown` or
    /// `Generic`, a desktop app can only be reset to `Unknown`, every other
    /// kind is terminal. An invalid transition is logged and dropped.
    pub fn set_kind(&self, kind: AppKind) {
        let changed = {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.kind == kind {
                return;
            }
            let allowed = match inner.kind {
                AppKind::Unknown | AppKind::Generic => true,
                AppKind::DesktopApp => kind == AppKind::Unknown,
                _ => false,
            };
            if !allowed {
                log::warn!(
                    "not changing kind from {} to {}",
                    inner.kind.as_str(),
                    kind.as_str()
                );
                return;
            }
            inner.kind = kind;
            true
        };
        if changed {
            self.notify(AppChange::Kind);
        }
    }

    pub fn special_kind(&self) -> Option<SpecialKind> {
        self.shared.inner.lock().unwrap().special_kind
    }

    pub fn set_special_kind(&self, special_kind: SpecialKind) {
        self.shared.inner.lock().unwrap().special_kind = Some(special_kind);
    }

    // ---- state machine ----

    pub fn state(&self) -> AppState {
        self.shared.inner.lock().unwrap().state
    }

    pub fn state_recover(&self) -> AppState {
        self.shared.inner.lock().unwrap().state_recover
    }

    pub fn set_state(&self, state: AppState) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.state == state {
                return;
            }
            inner.state = state;
            // no longer installed, so any recorded date is stale
            if matches!(
                state,
                AppState::Unknown | AppState::Available | AppState::AvailableLocal
            ) {
                inner.install_date = 0;
            }
            if !state.is_transient() {
                inner.state_recover = state;
            }
        }
        self.notify(AppChange::State);
    }

    /// Roll back to the last non-transient state after a failed operation,
    /// resetting progress so the UI stops showing a stale bar. A no-op when
    /// no stable state was ever recorded.
    pub fn set_state_recover(&self) {
        let (state_changed, progress_changed) = {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.state_recover == AppState::Unknown {
                return;
            }
            if inner.state_recover == inner.state {
                return;
            }
            let progress_changed = inner.progress != Progress::Unknown;
            inner.progress = Progress::Unknown;
            inner.state = inner.state_recover;
            (true, progress_changed)
        };
        if progress_changed {
            self.notify(AppChange::Progress);
        }
        if state_changed {
            self.notify(AppChange::State);
        }
    }

    pub fn progress(&self) -> Progress {
        self.shared.inner.lock().unwrap().progress
    }

    pub fn set_progress(&self, progress: Progress) {
        let progress = match progress {
            Progress::Percent(p) if p > 100 => {
                log::debug!("clamping out-of-range progress {} to 100", p);
                Progress::Percent(100)
            }
            other => other,
        };
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.progress == progress {
                return;
            }
            inner.progress = progress;
        }
        self.notify(AppChange::Progress);
    }

    pub fn is_installed(&self) -> bool {
        matches!(
            self.state(),
            AppState::Installed
                | AppState::Updatable
                | AppState::UpdatableLive
                | AppState::Removing
                | AppState::PendingRemove
        )
    }

    pub fn is_updatable(&self) -> bool {
        let inner = self.shared.inner.lock().unwrap();
        matches!(inner.state, AppState::Updatable | AppState::UpdatableLive)
            || inner.special_kind == Some(SpecialKind::OsUpdate)
    }

    pub fn allow_cancel(&self) -> bool {
        self.shared.inner.lock().unwrap().allow_cancel
    }

    pub fn set_allow_cancel(&self, allow_cancel: bool) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.allow_cancel == allow_cancel {
                return;
            }
            inner.allow_cancel = allow_cancel;
        }
        self.notify(AppChange::AllowCancel);
    }

    // ---- quirks ----

    pub fn has_quirk(&self, quirk: AppQuirk) -> bool {
        self.shared.inner.lock().unwrap().quirk.contains(quirk)
    }

    pub fn add_quirk(&self, quirk: AppQuirk) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.quirk.contains(quirk) {
                return;
            }
            inner.quirk.insert(quirk);
        }
        self.notify(AppChange::Quirk);
    }

    pub fn remove_quirk(&self, quirk: AppQuirk) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if !inner.quirk.intersects(quirk) {
                return;
            }
            inner.quirk.remove(quirk);
        }
        self.notify(AppChange::Quirk);
    }

    // ---- quality-gated text fields ----

    pub fn name(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().name.clone()
    }

    pub fn set_name(&self, quality: Quality, name: &str) {
        let mut inner = self.shared.inner.lock().unwrap();
        if quality < inner.name_quality {
            return;
        }
        inner.name_quality = quality;
        inner.name = Some(name.to_string());
    }

    pub fn summary(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().summary.clone()
    }

    pub fn set_summary(&self, quality: Quality, summary: &str) {
        let mut inner = self.shared.inner.lock().unwrap();
        if quality < inner.summary_quality {
            return;
        }
        inner.summary_quality = quality;
        inner.summary = Some(summary.to_string());
    }

    pub fn description(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().description.clone()
    }

    pub fn set_description(&self, quality: Quality, description: &str) {
        let mut inner = self.shared.inner.lock().unwrap();
        if quality < inner.description_quality {
            return;
        }
        inner.description_quality = quality;
        inner.description = Some(description.to_string());
    }

    pub fn license(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().license.clone()
    }

    /// Unlike the other text fields the license requires a strictly higher
    /// quality to overwrite, so an equal-confidence source cannot flip the
    /// free/nonfree classification back and forth.
    pub fn set_license(&self, quality: Quality, license: &str) {
        let mut inner = self.shared.inner.lock().unwrap();
        if quality <= inner.license_quality {
            return;
        }
        inner.license_quality = quality;
        inner.license_is_free = license_is_free(license);
        inner.license = Some(license.to_string());
    }

    pub fn license_is_free(&self) -> bool {
        self.shared.inner.lock().unwrap().license_is_free
    }

    // ---- versions ----

    pub fn version(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().version.clone()
    }

    pub fn set_version(&self, version: &str) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.version.as_deref() == Some(version) {
                return;
            }
            inner.version = Some(version.to_string());
            inner.versions_valid = false;
        }
        self.notify(AppChange::Version);
    }

    pub fn update_version(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().update_version.clone()
    }

    pub fn set_update_version(&self, update_version: &str) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.update_version.as_deref() == Some(update_version) {
                return;
            }
            inner.update_version = Some(update_version.to_string());
            inner.versions_valid = false;
        }
        self.notify(AppChange::Version);
    }

    pub fn version_ui(&self) -> Option<String> {
        let mut inner = self.shared.inner.lock().unwrap();
        Self::ensure_ui_versions(&mut inner);
        inner.version_ui.clone()
    }

    pub fn update_version_ui(&self) -> Option<String> {
        let mut inner = self.shared.inner.lock().unwrap();
        Self::ensure_ui_versions(&mut inner);
        inner.update_version_ui.clone()
    }

    fn ensure_ui_versions(inner: &mut AppInner) {
        if inner.versions_valid {
            return;
        }
        let (version_ui, update_version_ui) = populate_ui_versions(
            inner.version.as_deref(),
            inner.update_version.as_deref(),
        );
        inner.version_ui = version_ui;
        inner.update_version_ui = update_version_ui;
        inner.versions_valid = true;
    }

    // ---- misc text fields ----

    pub fn developer_name(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().developer_name.clone()
    }

    pub fn set_developer_name(&self, developer_name: &str) {
        self.shared.inner.lock().unwrap().developer_name = Some(developer_name.to_string());
    }

    pub fn project_group(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().project_group.clone()
    }

    pub fn set_project_group(&self, project_group: &str) {
        self.shared.inner.lock().unwrap().project_group = Some(project_group.to_string());
    }

    pub fn install_date(&self) -> u64 {
        self.shared.inner.lock().unwrap().install_date
    }

    pub fn set_install_date(&self, install_date: u64) {
        self.shared.inner.lock().unwrap().install_date = install_date;
    }

    // ---- sizes ----

    pub fn size_installed(&self) -> Size {
        self.shared.inner.lock().unwrap().size_installed
    }

    pub fn set_size_installed(&self, size: Size) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.size_installed == size {
                return;
            }
            inner.size_installed = size;
        }
        self.notify(AppChange::SizeInstalled);
    }

    pub fn size_download(&self) -> Size {
        self.shared.inner.lock().unwrap().size_download
    }

    pub fn set_size_download(&self, size: Size) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.size_download == size {
                return;
            }
            inner.size_download = size;
        }
        self.notify(AppChange::SizeDownload);
    }

    pub fn size_user_data(&self) -> Size {
        self.shared.inner.lock().unwrap().size_user_data
    }

    pub fn set_size_user_data(&self, size: Size) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.size_user_data == size {
                return;
            }
            inner.size_user_data = size;
        }
        self.notify(AppChange::SizeUserData);
    }

    pub fn size_cache_data(&self) -> Size {
        self.shared.inner.lock().unwrap().size_cache_data
    }

    pub fn set_size_cache_data(&self, size: Size) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.size_cache_data == size {
                return;
            }
            inner.size_cache_data = size;
        }
        self.notify(AppChange::SizeCacheData);
    }

    /// Total installed size of everything this app pulls in: the runtime
    /// (only while it still needs installing) and every related app,
    /// recursively. Each app is counted once even across cyclic relations.
    pub fn size_installed_dependencies(&self) -> Size {
        let mut visited = HashSet::new();
        visited.insert(self.unique_id());
        let mut total = Size::Valid(0);
        self.walk_size_dependencies(true, &mut visited, &mut total);
        total
    }

    /// Total download size of everything this app pulls in; see
    /// [`App::size_installed_dependencies`].
    pub fn size_download_dependencies(&self) -> Size {
        let mut visited = HashSet::new();
        visited.insert(self.unique_id());
        let mut total = Size::Valid(0);
        self.walk_size_dependencies(false, &mut visited, &mut total);
        total
    }

    fn walk_size_dependencies(
        &self,
        installed: bool,
        visited: &mut HashSet<String>,
        total: &mut Size,
    ) {
        let (runtime, related) = {
            let inner = self.shared.inner.lock().unwrap();
            (inner.runtime.clone(), inner.related.clone())
        };
        if let Some(runtime) = runtime {
            if visited.insert(runtime.unique_id()) && !runtime.is_installed() {
                let size = if installed {
                    runtime.size_installed()
                } else {
                    runtime.size_download()
                };
                *total = total.add(size);
                runtime.walk_size_dependencies(installed, visited, total);
            }
        }
        for related_app in related.to_vec() {
            if visited.insert(related_app.unique_id()) {
                let size = if installed {
                    related_app.size_installed()
                } else {
                    related_app.size_download()
                };
                *total = total.add(size);
                related_app.walk_size_dependencies(installed, visited, total);
            }
        }
    }

    // ---- sources, categories, provides ----

    pub fn sources(&self) -> Vec<String> {
        self.shared.inner.lock().unwrap().sources.clone()
    }

    pub fn default_source(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().sources.first().cloned()
    }

    pub fn add_source(&self, source: &str) {
        let mut inner = self.shared.inner.lock().unwrap();
        if !inner.sources.iter().any(|s| s == source) {
            inner.sources.push(source.to_string());
        }
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.shared.inner.lock().unwrap().source_ids.clone()
    }

    pub fn default_source_id(&self) -> Option<String> {
        self.shared
            .inner
            .lock()
            .unwrap()
            .source_ids
            .first()
            .cloned()
    }

    pub fn add_source_id(&self, source_id: &str) {
        let mut inner = self.shared.inner.lock().unwrap();
        if !inner.source_ids.iter().any(|s| s == source_id) {
            inner.source_ids.push(source_id.to_string());
        }
    }

    pub fn categories(&self) -> Vec<String> {
        self.shared.inner.lock().unwrap().categories.clone()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.shared
            .inner
            .lock()
            .unwrap()
            .categories
            .iter()
            .any(|c| c == category)
    }

    pub fn add_category(&self, category: &str) {
        let mut inner = self.shared.inner.lock().unwrap();
        if !inner.categories.iter().any(|c| c == category) {
            inner.categories.push(category.to_string());
        }
    }

    pub fn provides(&self) -> Vec<AppProvide> {
        self.shared.inner.lock().unwrap().provides.clone()
    }

    pub fn add_provide(&self, provide: AppProvide) {
        let mut inner = self.shared.inner.lock().unwrap();
        if !inner.provides.contains(&provide) {
            inner.provides.push(provide);
        }
    }

    // ---- metadata ----

    pub fn metadata(&self, key: &str) -> Option<MetadataValue> {
        self.shared.inner.lock().unwrap().metadata.get(key).cloned()
    }

    /// `None` removes the key; setting an already-present key is a logged
    /// no-op, so a plugin cannot clobber another plugin's value by accident.
    pub fn set_metadata(&self, key: &str, value: Option<MetadataValue>) {
        let mut inner = self.shared.inner.lock().unwrap();
        match value {
            None => {
                inner.metadata.remove(key);
            }
            Some(value) => {
                if inner.metadata.contains_key(key) {
                    log::warn!("not overwriting metadata key {:?}", key);
                    return;
                }
                inner.metadata.insert(key.to_string(), value);
            }
        }
    }

    // ---- relations ----

    /// The addons list, created on first use.
    pub fn addons(&self) -> AppList {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.addons.get_or_insert_with(AppList::new).clone()
    }

    pub fn add_addon(&self, addon: &App) {
        self.addons().add(addon.clone());
    }

    pub fn add_addons(&self, addons: &AppList) {
        self.addons().add_list(addons);
    }

    pub fn related(&self) -> AppList {
        self.shared.inner.lock().unwrap().related.clone()
    }

    pub fn add_related(&self, related: &App) {
        let list = self.related();
        list.add(related.clone());
        // a live update cannot be offered if any dependency needs an
        // offline update
        if self.state() == AppState::UpdatableLive && related.state() == AppState::Updatable {
            log::debug!(
                "downgrading {} from updatable-live to updatable",
                self.unique_id()
            );
            {
                let mut inner = self.shared.inner.lock().unwrap();
                inner.state = AppState::Updatable;
                inner.state_recover = AppState::Updatable;
            }
            self.notify(AppChange::State);
        }
    }

    pub fn history(&self) -> AppList {
        self.shared.inner.lock().unwrap().history.clone()
    }

    pub fn add_history(&self, entry: &App) {
        self.history().add(entry.clone());
    }

    pub fn runtime(&self) -> Option<App> {
        self.shared.inner.lock().unwrap().runtime.clone()
    }

    pub fn set_runtime(&self, runtime: &App) {
        if self == runtime {
            log::warn!("not setting {} as its own runtime", self.unique_id());
            return;
        }
        self.shared.inner.lock().unwrap().runtime = Some(runtime.clone());
    }

    // ---- management plugin, priority ----

    pub fn management_plugin_name(&self) -> Option<String> {
        self.shared
            .inner
            .lock()
            .unwrap()
            .management_plugin_name
            .clone()
    }

    /// Write-once: re-setting a different plugin is rejected, and wildcard
    /// apps never get one at all because they stand for many concrete apps.
    pub fn set_management_plugin(&self, plugin: &Arc<dyn ManagementPlugin>) {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.quirk.contains(AppQuirk::IS_WILDCARD) {
            log::warn!("not setting management plugin on a wildcard app");
            return;
        }
        if let Some(existing) = &inner.management_plugin {
            if let Some(existing) = existing.upgrade() {
                if !Arc::ptr_eq(&existing, plugin) {
                    log::warn!(
                        "not overwriting management plugin {:?} with {:?}",
                        existing.name(),
                        plugin.name()
                    );
                }
                return;
            }
        }
        inner.management_plugin = Some(Arc::downgrade(plugin));
        inner.management_plugin_name = Some(plugin.name().to_string());
    }

    /// The explicit priority, or the management plugin's priority when none
    /// was set. A dropped plugin reads as priority zero.
    pub fn priority(&self) -> u32 {
        let inner = self.shared.inner.lock().unwrap();
        if inner.priority != 0 {
            return inner.priority;
        }
        inner
            .management_plugin
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|plugin| plugin.priority())
            .unwrap_or(0)
    }

    pub fn set_priority(&self, priority: u32) {
        self.shared.inner.lock().unwrap().priority = priority;
    }

    pub fn match_value(&self) -> u32 {
        self.shared.inner.lock().unwrap().match_value
    }

    pub fn set_match_value(&self, match_value: u32) {
        self.shared.inner.lock().unwrap().match_value = match_value;
    }

    pub fn to_be_installed(&self) -> bool {
        self.shared.inner.lock().unwrap().to_be_installed
    }

    pub fn set_to_be_installed(&self, to_be_installed: bool) {
        self.shared.inner.lock().unwrap().to_be_installed = to_be_installed;
    }

    // ---- cancellation ----

    /// The live cancellation token for the current operation. A fresh token
    /// is handed out once the previous one has been triggered.
    pub fn cancellable(&self) -> Cancellable {
        let mut inner = self.shared.inner.lock().unwrap();
        match &inner.cancellable {
            Some(token) if !token.is_cancelled() => token.clone(),
            _ => {
                let token = Cancellable::new();
                inner.cancellable = Some(token.clone());
                token
            }
        }
    }
}

fn dump_line(f: &mut fmt::Formatter<'_>, key: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(f, "  {:<24} {}", format!("{}:", key), value)
}

/// Multi-line `key: value` dump of every populated field, for logs only.
impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (addons, related, history, runtime) = {
            let mut inner = self.shared.inner.lock().unwrap();
            let unique_id = match &inner.unique_id {
                Some(unique_id) => unique_id.clone(),
                None => inner.rebuild_unique_id(),
            };
            dump_line(f, "unique-id", unique_id)?;
            dump_line(f, "kind", inner.kind.as_str())?;
            if let Some(SpecialKind::OsUpdate) = inner.special_kind {
                dump_line(f, "special-kind", "os-update")?;
            }
            dump_line(f, "state", inner.state.as_str())?;
            if inner.state_recover != AppState::Unknown {
                dump_line(f, "state-recover", inner.state_recover.as_str())?;
            }
            if inner.progress != Progress::Unknown {
                dump_line(f, "progress", inner.progress)?;
            }
            if !inner.quirk.is_empty() {
                dump_line(f, "quirk", format!("{:?}", inner.quirk))?;
            }
            if !inner.allow_cancel {
                dump_line(f, "allow-cancel", "false")?;
            }
            if let Some(id) = &inner.id {
                dump_line(f, "id", id)?;
            }
            if let Some(branch) = &inner.branch {
                dump_line(f, "branch", branch)?;
            }
            if let Some(origin) = &inner.origin {
                dump_line(f, "origin", origin)?;
            }
            if let Some(origin_appstream) = &inner.origin_appstream {
                dump_line(f, "origin-appstream", origin_appstream)?;
            }
            if let Some(origin_hostname) = &inner.origin_hostname {
                dump_line(f, "origin-hostname", origin_hostname)?;
            }
            if let Some(origin_ui) = &inner.origin_ui {
                dump_line(f, "origin-ui", origin_ui)?;
            }
            if let Some(name) = &inner.name {
                dump_line(f, "name", name)?;
            }
            if let Some(summary) = &inner.summary {
                dump_line(f, "summary", summary)?;
            }
            if let Some(description) = &inner.description {
                dump_line(f, "description", description)?;
            }
            if let Some(license) = &inner.license {
                dump_line(f, "license", license)?;
                dump_line(f, "license-is-free", inner.license_is_free)?;
            }
            if let Some(version) = &inner.version {
                dump_line(f, "version", version)?;
            }
            if let Some(update_version) = &inner.update_version {
                dump_line(f, "update-version", update_version)?;
            }
            if let Some(developer_name) = &inner.developer_name {
                dump_line(f, "developer-name", developer_name)?;
            }
            if let Some(project_group) = &inner.project_group {
                dump_line(f, "project-group", project_group)?;
            }
            if inner.install_date != 0 {
                dump_line(f, "install-date", inner.install_date)?;
            }
            dump_line(f, "size-installed", inner.size_installed)?;
            dump_line(f, "size-download", inner.size_download)?;
            if inner.size_user_data != Size::Unknown {
                dump_line(f, "size-user-data", inner.size_user_data)?;
            }
            if inner.size_cache_data != Size::Unknown {
                dump_line(f, "size-cache-data", inner.size_cache_data)?;
            }
            for source in &inner.sources {
                dump_line(f, "source", source)?;
            }
            for source_id in &inner.source_ids {
                dump_line(f, "source-id", source_id)?;
            }
            if !inner.categories.is_empty() {
                dump_line(f, "categories", inner.categories.join(", "))?;
            }
            for provide in &inner.provides {
                match provide {
                    AppProvide::Id(id) => dump_line(f, "provides-id", id)?,
                    AppProvide::MediaType(mt) => dump_line(f, "provides-media-type", mt)?,
                }
            }
            for (key, value) in &inner.metadata {
                dump_line(f, &format!("{{{}}}", key), value)?;
            }
            if let Some(name) = &inner.management_plugin_name {
                dump_line(f, "management-plugin", name)?;
            }
            if inner.priority != 0 {
                dump_line(f, "priority", inner.priority)?;
            }
            if inner.match_value != 0 {
                dump_line(f, "match-value", inner.match_value)?;
            }
            if inner.to_be_installed {
                dump_line(f, "to-be-installed", "true")?;
            }
            (
                inner.addons.clone(),
                inner.related.clone(),
                inner.history.clone(),
                inner.runtime.clone(),
            )
        };
        // the list locks must be taken after this app's own lock is released
        if let Some(addons) = addons {
            if addons.length() > 0 {
                dump_line(f, "addons", addons.length())?;
            }
        }
        if related.length() > 0 {
            dump_line(f, "related", related.length())?;
        }
        if history.length() > 0 {
            dump_line(f, "history", history.length())?;
        }
        if let Some(runtime) = runtime {
            writeln!(f, "  runtime:")?;
            for line in runtime.to_string().lines() {
                writeln!(f, "  {}", line)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_id_round_trip() {
        let app = App::new(Some("org.gnome.Calculator"));
        app.set_scope(Scope::System);
        app.set_bundle_kind(BundleKind::Flatpak);
        app.set_origin("flathub");
        app.set_branch("stable");
        let copy = App::new_from_unique_id(&app.unique_id());
        assert_eq!(copy.unique_id(), app.unique_id());
        assert_eq!(copy.id().as_deref(), Some("org.gnome.Calculator"));
        assert_eq!(copy.origin().as_deref(), Some("flathub"));
    }

    #[test]
    fn malformed_unique_id_leaves_app_unpopulated() {
        let app = App::new_from_unique_id("not/enough/segments");
        assert_eq!(app.id(), None);
        assert_eq!(app.unique_id(), "*/*/*/*/*");
    }

    #[test]
    fn unique_id_cache_invalidation() {
        let app = App::new(Some("gimp.desktop"));
        assert_eq!(app.unique_id(), "*/*/*/gimp.desktop/*");
        app.set_origin("fedora");
        assert_eq!(app.unique_id(), "*/*/fedora/gimp.desktop/*");
    }

    #[test]
    fn name_quality_is_monotonic() {
        let app = App::new(None);
        app.set_name(Quality::Normal, "A");
        app.set_name(Quality::Lowest, "B");
        assert_eq!(app.name().as_deref(), Some("A"));
        app.set_name(Quality::Normal, "C");
        assert_eq!(app.name().as_deref(), Some("C"));
        app.set_name(Quality::Highest, "D");
        assert_eq!(app.name().as_deref(), Some("D"));
    }

    #[test]
    fn license_requires_strictly_higher_quality() {
        let app = App::new(None);
        app.set_license(Quality::Normal, "GPL-3.0-or-later");
        app.set_license(Quality::Normal, "LicenseRef-proprietary");
        assert_eq!(app.license().as_deref(), Some("GPL-3.0-or-later"));
        assert!(app.license_is_free());
        app.set_license(Quality::Highest, "LicenseRef-proprietary");
        assert!(!app.license_is_free());
    }

    #[test]
    fn kind_transition_rules() {
        let app = App::new(None);
        app.set_kind(AppKind::Generic);
        app.set_kind(AppKind::DesktopApp);
        assert_eq!(app.kind(), AppKind::DesktopApp);
        // a desktop app cannot become a repository
        app.set_kind(AppKind::Repository);
        assert_eq!(app.kind(), AppKind::DesktopApp);
        // but can be reset
        app.set_kind(AppKind::Unknown);
        assert_eq!(app.kind(), AppKind::Unknown);
        app.set_kind(AppKind::Repository);
        assert_eq!(app.kind(), AppKind::Repository);
        // repositories are terminal
        app.set_kind(AppKind::DesktopApp);
        assert_eq!(app.kind(), AppKind::Repository);
    }

    #[test]
    fn state_recover_skips_transient_states() {
        let app = App::new(None);
        app.set_state(AppState::Available);
        app.set_state(AppState::Installing);
        assert_eq!(app.state(), AppState::Installing);
        assert_eq!(app.state_recover(), AppState::Available);
        app.set_progress(Progress::Percent(50));
        app.set_state_recover();
        assert_eq!(app.state(), AppState::Available);
        assert_eq!(app.progress(), Progress::Unknown);
    }

    #[test]
    fn state_recover_is_a_no_op_without_a_stable_state() {
        let app = App::new(None);
        // straight into a transient state, nothing stable recorded yet
        app.set_state(AppState::Downloading);
        app.set_state_recover();
        assert_eq!(app.state(), AppState::Downloading);
    }

    #[test]
    fn set_state_clears_install_date() {
        let app = App::new(None);
        app.set_state(AppState::Installed);
        app.set_install_date(1_700_000_000);
        app.set_state(AppState::Available);
        assert_eq!(app.install_date(), 0);
    }

    #[test]
    fn progress_clamps_out_of_range() {
        let app = App::new(None);
        app.set_progress(Progress::Percent(142));
        assert_eq!(app.progress(), Progress::Percent(100));
    }

    #[test]
    fn origin_is_first_write_wins() {
        let app = App::new(None);
        app.set_origin("flathub");
        app.set_origin("fedora");
        assert_eq!(app.origin().as_deref(), Some("flathub"));
    }

    #[test]
    fn origin_hostname_strips_mirror_prefixes() {
        let app = App::new(None);
        app.set_origin_hostname("https://download.example.org/pub/repo");
        assert_eq!(app.origin_hostname().as_deref(), Some("example.org"));
        app.set_origin_hostname("file:///var/cache/repo");
        assert_eq!(app.origin_hostname().as_deref(), Some("localhost"));
    }

    #[test]
    fn origin_ui_falls_back_to_origin() {
        let app = App::new(None);
        app.set_origin("flathub");
        assert_eq!(app.origin_ui().as_deref(), Some("flathub"));
        app.set_origin_ui("Flathub");
        assert_eq!(app.origin_ui().as_deref(), Some("Flathub"));
    }

    #[test]
    fn metadata_never_overwrites() {
        let app = App::new(None);
        app.set_metadata("plugin::key", Some(MetadataValue::U32(1)));
        app.set_metadata("plugin::key", Some(MetadataValue::U32(2)));
        assert_eq!(app.metadata("plugin::key"), Some(MetadataValue::U32(1)));
        app.set_metadata("plugin::key", None);
        assert_eq!(app.metadata("plugin::key"), None);
        app.set_metadata("plugin::key", Some(MetadataValue::Bool(true)));
        assert_eq!(app.metadata("plugin::key"), Some(MetadataValue::Bool(true)));
    }

    #[test]
    fn size_dependencies_count_cycles_once() {
        let a = App::new(Some("a.desktop"));
        let b = App::new(Some("b.desktop"));
        a.set_size_installed(Size::Valid(100));
        b.set_size_installed(Size::Valid(50));
        a.add_related(&b);
        b.add_related(&a);
        assert_eq!(a.size_installed_dependencies(), Size::Valid(50));
        assert_eq!(b.size_installed_dependencies(), Size::Valid(100));
    }

    #[test]
    fn size_dependencies_skip_installed_runtime() {
        let app = App::new(Some("app.desktop"));
        let runtime = App::new(Some("runtime"));
        runtime.set_size_download(Size::Valid(4096));
        app.set_runtime(&runtime);
        assert_eq!(app.size_download_dependencies(), Size::Valid(4096));
        runtime.set_state(AppState::Installed);
        assert_eq!(app.size_download_dependencies(), Size::Valid(0));
    }

    #[test]
    fn size_dependencies_degrade_to_unknown() {
        let app = App::new(Some("app.desktop"));
        let dep = App::new(Some("dep.desktop"));
        app.add_related(&dep);
        assert_eq!(app.size_installed_dependencies(), Size::Unknown);
        dep.set_size_installed(Size::Valid(10));
        assert_eq!(app.size_installed_dependencies(), Size::Valid(10));
    }

    #[test]
    fn add_related_downgrades_live_update() {
        let app = App::new(Some("app.desktop"));
        app.set_state(AppState::UpdatableLive);
        let dep = App::new(Some("dep.desktop"));
        dep.set_state(AppState::Updatable);
        app.add_related(&dep);
        assert_eq!(app.state(), AppState::Updatable);
    }

    #[test]
    fn version_ui_lazily_derived() {
        let app = App::new(None);
        app.set_version("2:1.6.2-7.fc17");
        app.set_update_version("1.6.2-8.fc17");
        assert_eq!(app.version_ui().as_deref(), Some("1.6.2-7"));
        assert_eq!(app.update_version_ui().as_deref(), Some("1.6.2-8"));
        app.set_update_version("1.6.3-1.fc17");
        assert_eq!(app.update_version_ui().as_deref(), Some("1.6.3"));
    }

    #[derive(Debug)]
    struct TestPlugin {
        name: &'static str,
        priority: u32,
    }

    impl ManagementPlugin for TestPlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> u32 {
            self.priority
        }
    }

    #[test]
    fn management_plugin_is_write_once() {
        let first: Arc<dyn ManagementPlugin> = Arc::new(TestPlugin {
            name: "flatpak",
            priority: 10,
        });
        let second: Arc<dyn ManagementPlugin> = Arc::new(TestPlugin {
            name: "packagekit",
            priority: 20,
        });
        let app = App::new(None);
        app.set_management_plugin(&first);
        app.set_management_plugin(&second);
        assert_eq!(app.management_plugin_name().as_deref(), Some("flatpak"));
        assert_eq!(app.priority(), 10);
        app.set_priority(99);
        assert_eq!(app.priority(), 99);
    }

    #[test]
    fn wildcard_apps_reject_management_plugin() {
        let plugin: Arc<dyn ManagementPlugin> = Arc::new(TestPlugin {
            name: "flatpak",
            priority: 10,
        });
        let app = App::new(None);
        app.add_quirk(AppQuirk::IS_WILDCARD);
        app.set_management_plugin(&plugin);
        assert_eq!(app.management_plugin_name(), None);
    }

    #[test]
    fn dropped_plugin_reads_as_no_priority() {
        let app = App::new(None);
        {
            let plugin: Arc<dyn ManagementPlugin> = Arc::new(TestPlugin {
                name: "flatpak",
                priority: 10,
            });
            app.set_management_plugin(&plugin);
        }
        assert_eq!(app.priority(), 0);
    }

    #[test]
    fn cancellable_renews_after_cancel() {
        let app = App::new(None);
        let token = app.cancellable();
        assert!(!app.cancellable().is_cancelled());
        token.cancel();
        let fresh = app.cancellable();
        assert!(!fresh.is_cancelled());
        fresh.cancel();
        assert!(!app.cancellable().is_cancelled());
    }

    #[test]
    fn sources_dedup_and_keep_order() {
        let app = App::new(None);
        app.add_source("gimp");
        app.add_source("gimp-libs");
        app.add_source("gimp");
        assert_eq!(app.sources(), vec!["gimp", "gimp-libs"]);
        assert_eq!(app.default_source().as_deref(), Some("gimp"));
    }

    #[test]
    fn debug_dump_contains_populated_fields() {
        let app = App::new(Some("gimp.desktop"));
        app.set_name(Quality::Normal, "GIMP");
        app.set_state(AppState::Installed);
        let dump = app.to_string();
        assert!(dump.contains("id:"));
        assert!(dump.contains("GIMP"));
        assert!(dump.contains("installed"));
    }
}
