//! The ordered, de-duplicated collection of app handles.
//!
//! An [`AppList`] optionally watches its members' state and progress
//! notifications to keep its own derived `state` and `progress` properties
//! current. Locking is one-directional: the list lock may be held while a
//! member's lock is taken, never the other way round, which is why the
//! watch callbacks run from the event queue with no lock held.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::Datelike;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::app::{App, AppProvide, AppQuirk, AppState, Progress};
use crate::event::{self, AppChange, ConnectionId, Event, ListChange, Registry};
use crate::id::unique_id_match;
use crate::plugin::compare_priority;

bitflags::bitflags! {
    /// Behavior flags for a list.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ListFlags: u32 {
        /// Track members' state/progress to derive the list's own.
        const WATCH_APPS = 1 << 0;
        /// Also track each member's addons.
        const WATCH_APPS_ADDONS = 1 << 1;
        /// Also track each member's related apps.
        const WATCH_APPS_RELATED = 1 << 2;
        /// Set once `truncate` has discarded members.
        const IS_TRUNCATED = 1 << 3;
        /// Set once `randomize` has shuffled the order.
        const IS_RANDOMIZED = 1 << 4;
    }
}

bitflags::bitflags! {
    /// Key selection for [`AppList::filter_duplicates`]. With no key flag
    /// set the wildcard-aware unique-id is the key.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct FilterFlags: u32 {
        const KEY_ID = 1 << 0;
        const KEY_DEFAULT_SOURCE = 1 << 1;
        const KEY_VERSION = 1 << 2;
        /// Use the plain id plus every AppStream provides-id as keys.
        const KEY_ID_PROVIDES = 1 << 3;
        /// An installed app always beats a non-installed one.
        const PREFER_INSTALLED = 1 << 4;
    }
}

const WATCH_FLAGS: ListFlags = ListFlags::WATCH_APPS
    .union(ListFlags::WATCH_APPS_ADDONS)
    .union(ListFlags::WATCH_APPS_RELATED);

type ListObserver = dyn Fn(&AppList, &ListChange) + Send + Sync;

struct WatchEntry {
    target: App,
    conn: ConnectionId,
    // ptr key of the member this watch belongs to, so removing the member
    // also unhooks its addons/related targets
    owner: usize,
}

struct ListInner {
    array: Vec<App>,
    flags: ListFlags,
    size_peak: usize,
    state: AppState,
    progress: Progress,
    progress_override: Progress,
    watched: Vec<WatchEntry>,
}

struct ListShared {
    inner: Mutex<ListInner>,
    observers: Mutex<Registry<ListObserver>>,
}

/// Shared handle to one app collection.
#[derive(Clone)]
pub struct AppList {
    shared: Arc<ListShared>,
}

impl PartialEq for AppList {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for AppList {}

impl fmt::Debug for AppList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppList")
            .field("length", &self.length())
            .finish()
    }
}

impl Default for AppList {
    fn default() -> Self {
        Self::new()
    }
}

impl AppList {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(ListShared {
                inner: Mutex::new(ListInner {
                    array: Vec::new(),
                    flags: ListFlags::empty(),
                    size_peak: 0,
                    state: AppState::Unknown,
                    progress: Progress::Unknown,
                    progress_override: Progress::Unknown,
                    watched: Vec::new(),
                }),
                observers: Mutex::new(Registry::default()),
            }),
        }
    }

    // ---- change notification ----

    pub fn connect<F>(&self, callback: F) -> ConnectionId
    where
        F: Fn(&AppList, &ListChange) + Send + Sync + 'static,
    {
        let callback: Arc<ListObserver> = Arc::new(callback);
        self.shared.observers.lock().unwrap().connect(callback)
    }

    pub fn disconnect(&self, id: ConnectionId) {
        self.shared.observers.lock().unwrap().disconnect(id);
    }

    fn notify(&self, change: ListChange) {
        event::queue_event(Event::List(self.clone(), change));
    }

    pub(crate) fn emit(&self, change: ListChange) {
        let callbacks = self.shared.observers.lock().unwrap().snapshot();
        for callback in callbacks {
            callback(self, &change);
        }
    }

    // ---- flags ----

    pub fn has_flag(&self, flag: ListFlags) -> bool {
        self.shared.inner.lock().unwrap().flags.contains(flag)
    }

    /// Adding a watch flag retroactively hooks up the existing members.
    pub fn add_flag(&self, flags: ListFlags) {
        let (new_watch, members) = {
            let mut inner = self.shared.inner.lock().unwrap();
            let new = flags - inner.flags;
            inner.flags.insert(flags);
            (new & WATCH_FLAGS, inner.array.clone())
        };
        if !new_watch.is_empty() {
            for member in &members {
                self.watch_targets(member, new_watch);
            }
            self.invalidate_state();
            self.invalidate_progress();
        }
    }

    // ---- membership ----

    pub fn length(&self) -> usize {
        self.shared.inner.lock().unwrap().array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.inner.lock().unwrap().array.is_empty()
    }

    /// Positional access; panics when out of range.
    pub fn index(&self, index: usize) -> App {
        self.shared.inner.lock().unwrap().array[index].clone()
    }

    /// Snapshot of the membership in current order.
    pub fn to_vec(&self) -> Vec<App> {
        self.shared.inner.lock().unwrap().array.clone()
    }

    /// First member whose unique-id matches under wildcard rules.
    pub fn lookup(&self, unique_id: &str) -> Option<App> {
        let inner = self.shared.inner.lock().unwrap();
        inner
            .array
            .iter()
            .find(|app| unique_id_match(&app.unique_id(), unique_id))
            .cloned()
    }

    /// Add with a duplicate check; a rejected duplicate is a silent no-op.
    pub fn add(&self, app: App) {
        if !self.add_internal(&app, true) {
            return;
        }
        self.watch_member(&app);
        self.invalidate_state();
        self.invalidate_progress();
    }

    /// Merge every member of `donor` through the duplicate-checked path.
    pub fn add_list(&self, donor: &AppList) {
        assert!(self != donor, "cannot merge a list into itself");
        let mut added = Vec::new();
        for app in donor.to_vec() {
            if self.add_internal(&app, true) {
                added.push(app);
            }
        }
        for app in &added {
            self.watch_member(app);
        }
        self.invalidate_state();
        self.invalidate_progress();
    }

    fn add_internal(&self, app: &App, check_dup: bool) -> bool {
        let mut inner = self.shared.inner.lock().unwrap();
        if check_dup && Self::is_duplicate(&inner, app) {
            log::debug!("not adding duplicate {}", app.unique_id());
            return false;
        }
        inner.array.push(app.clone());
        if inner.array.len() > inner.size_peak {
            inner.size_peak = inner.array.len();
        }
        true
    }

    fn is_duplicate(inner: &ListInner, app: &App) -> bool {
        if app.has_quirk(AppQuirk::IS_WILDCARD) {
            // wildcards only collide with identical wildcards; overlapping
            // partial ids are still distinct entries
            let unique_id = app.unique_id();
            return inner.array.iter().any(|member| {
                member.has_quirk(AppQuirk::IS_WILDCARD) && member.unique_id() == unique_id
            });
        }
        if inner.array.iter().any(|member| member == app) {
            return true;
        }
        // apps without a resolved id rely on a later filter_duplicates pass
        if app.id().is_none() {
            return false;
        }
        let unique_id = app.unique_id();
        for member in &inner.array {
            if unique_id_match(&member.unique_id(), &unique_id)
                && !member.has_quirk(AppQuirk::IS_WILDCARD)
            {
                return true;
            }
        }
        false
    }

    /// Remove the first matching handle; returns whether anything changed.
    pub fn remove(&self, app: &App) -> bool {
        let (removed, stale) = {
            let mut inner = self.shared.inner.lock().unwrap();
            match inner.array.iter().position(|member| member == app) {
                Some(pos) => {
                    inner.array.remove(pos);
                    let owner = app.ptr_key();
                    let stale = Self::take_watches(&mut inner, |entry| entry.owner == owner);
                    (true, stale)
                }
                None => (false, Vec::new()),
            }
        };
        for entry in stale {
            entry.target.disconnect(entry.conn);
        }
        if removed {
            self.invalidate_state();
            self.invalidate_progress();
        }
        removed
    }

    pub fn remove_all(&self) {
        let stale = {
            let mut inner = self.shared.inner.lock().unwrap();
            inner.array.clear();
            std::mem::take(&mut inner.watched)
        };
        for entry in stale {
            entry.target.disconnect(entry.conn);
        }
        self.invalidate_state();
        self.invalidate_progress();
    }

    // ---- watch wiring ----

    fn watch_member(&self, member: &App) {
        let aspects = {
            let inner = self.shared.inner.lock().unwrap();
            inner.flags & WATCH_FLAGS
        };
        if !aspects.is_empty() {
            self.watch_targets(member, aspects);
        }
    }

    fn watch_targets(&self, member: &App, aspects: ListFlags) {
        let owner = member.ptr_key();
        if aspects.contains(ListFlags::WATCH_APPS) {
            self.watch_target(owner, member);
        }
        if aspects.contains(ListFlags::WATCH_APPS_ADDONS) {
            for addon in member.addons().to_vec() {
                self.watch_target(owner, &addon);
            }
        }
        if aspects.contains(ListFlags::WATCH_APPS_RELATED) {
            for related in member.related().to_vec() {
                self.watch_target(owner, &related);
            }
        }
    }

    fn watch_target(&self, owner: usize, target: &App) {
        let weak = Arc::downgrade(&self.shared);
        let conn = target.connect(move |app, change| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let list = AppList { shared };
            match change {
                AppChange::State => {
                    list.invalidate_state();
                    list.notify(ListChange::AppStateChanged(app.clone()));
                }
                AppChange::Progress => list.invalidate_progress(),
                _ => {}
            }
        });
        self.shared.inner.lock().unwrap().watched.push(WatchEntry {
            target: target.clone(),
            conn,
            owner,
        });
    }

    fn take_watches<F>(inner: &mut ListInner, which: F) -> Vec<WatchEntry>
    where
        F: Fn(&WatchEntry) -> bool,
    {
        let mut stale = Vec::new();
        let mut keep = Vec::new();
        for entry in inner.watched.drain(..) {
            if which(&entry) {
                stale.push(entry);
            } else {
                keep.push(entry);
            }
        }
        inner.watched = keep;
        stale
    }

    // ---- derived state and progress ----

    pub fn state(&self) -> AppState {
        self.shared.inner.lock().unwrap().state
    }

    pub fn progress(&self) -> Progress {
        let inner = self.shared.inner.lock().unwrap();
        if inner.progress_override != Progress::Unknown {
            inner.progress_override
        } else {
            inner.progress
        }
    }

    /// When not `Unknown` the override takes precedence over the computed
    /// member mean.
    pub fn override_progress(&self, progress: Progress) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.progress_override == progress {
                return;
            }
            inner.progress_override = progress;
        }
        self.notify(ListChange::Progress);
    }

    /// Every app the flags select for watching: the members themselves plus
    /// their addons and related apps.
    fn watched_targets(inner: &ListInner) -> Vec<App> {
        let mut apps = Vec::new();
        for member in &inner.array {
            if inner.flags.contains(ListFlags::WATCH_APPS) {
                apps.push(member.clone());
            }
            if inner.flags.contains(ListFlags::WATCH_APPS_ADDONS) {
                apps.extend(member.addons().to_vec());
            }
            if inner.flags.contains(ListFlags::WATCH_APPS_RELATED) {
                apps.extend(member.related().to_vec());
            }
        }
        apps
    }

    fn is_active(state: AppState) -> bool {
        matches!(
            state,
            AppState::Downloading | AppState::Installing | AppState::Removing
        )
    }

    fn invalidate_state(&self) {
        let changed = {
            let mut inner = self.shared.inner.lock().unwrap();
            let state = Self::watched_targets(&inner)
                .iter()
                .map(App::state)
                .find(|state| Self::is_active(*state))
                .unwrap_or(AppState::Unknown);
            if inner.state == state {
                false
            } else {
                inner.state = state;
                true
            }
        };
        if changed {
            self.notify(ListChange::State);
        }
    }

    /// Mean progress over the watched apps that are actually mid-operation;
    /// `Unknown` when none are, or when any of them has no progress yet.
    fn invalidate_progress(&self) {
        let changed = {
            let mut inner = self.shared.inner.lock().unwrap();
            let mut sum = 0u32;
            let mut count = 0u32;
            let mut known = true;
            for app in Self::watched_targets(&inner) {
                if !Self::is_active(app.state()) {
                    continue;
                }
                count += 1;
                match app.progress() {
                    Progress::Percent(p) => sum += u32::from(p),
                    Progress::Unknown => known = false,
                }
            }
            let progress = if count == 0 || !known {
                Progress::Unknown
            } else {
                Progress::Percent((sum / count) as u8)
            };
            if inner.progress == progress {
                false
            } else {
                inner.progress = progress;
                inner.progress_override == Progress::Unknown
            }
        };
        if changed {
            self.notify(ListChange::Progress);
        }
    }

    // ---- peak bookkeeping ----

    /// The largest the list has ever been, for "did it grow" checks across
    /// refreshes. Monotonic until explicitly reset.
    pub fn size_peak(&self) -> usize {
        self.shared.inner.lock().unwrap().size_peak
    }

    pub fn set_size_peak(&self, size_peak: usize) {
        self.shared.inner.lock().unwrap().size_peak = size_peak;
    }

    // ---- reordering and filtering ----

    /// Keep only members the predicate accepts, preserving relative order.
    /// The predicate runs with no list lock held.
    pub fn filter<F>(&self, predicate: F)
    where
        F: Fn(&App) -> bool,
    {
        let (snapshot, stale) = {
            let mut inner = self.shared.inner.lock().unwrap();
            (
                std::mem::take(&mut inner.array),
                std::mem::take(&mut inner.watched),
            )
        };
        for entry in stale {
            entry.target.disconnect(entry.conn);
        }
        for app in snapshot {
            if predicate(&app) && self.add_internal(&app, true) {
                self.watch_member(&app);
            }
        }
        self.invalidate_state();
        self.invalidate_progress();
    }

    pub fn sort<F>(&self, compare: F)
    where
        F: Fn(&App, &App) -> Ordering,
    {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.array.sort_by(|a, b| compare(a, b));
    }

    /// Daily-deterministic shuffle: the order is stable for a whole UTC day
    /// and changes the next.
    pub fn randomize(&self) {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.flags.insert(ListFlags::IS_RANDOMIZED);
        let seed = u64::from(chrono::Utc::now().ordinal());
        let mut rng = StdRng::seed_from_u64(seed);
        inner.array.shuffle(&mut rng);
    }

    /// Discard everything beyond position `n`. Panics when `n` exceeds the
    /// current length; `truncate(0)` clears the list.
    pub fn truncate(&self, n: usize) {
        let stale = {
            let mut inner = self.shared.inner.lock().unwrap();
            assert!(
                n <= inner.array.len(),
                "cannot truncate {} members to {}",
                inner.array.len(),
                n
            );
            inner.flags.insert(ListFlags::IS_TRUNCATED);
            if n == 0 {
                drop(inner);
                self.remove_all();
                return;
            }
            let discarded: HashSet<usize> =
                inner.array.split_off(n).iter().map(App::ptr_key).collect();
            Self::take_watches(&mut inner, |entry| discarded.contains(&entry.owner))
        };
        for entry in stale {
            entry.target.disconnect(entry.conn);
        }
        self.invalidate_state();
        self.invalidate_progress();
    }

    /// Shallow copy: same app handles, fresh flags, lock and derived state.
    pub fn copy(&self) -> AppList {
        let new = AppList::new();
        for app in self.to_vec() {
            new.add_internal(&app, false);
        }
        new.invalidate_state();
        new.invalidate_progress();
        new
    }

    // ---- de-duplication ----

    /// The policy-driven de-duplication pass: group members by the key the
    /// flags select, keep one winner per key, rebuild preserving the order
    /// of the kept apps. Members with no computable key are always kept.
    pub fn filter_duplicates(&self, flags: FilterFlags) {
        let snapshot = self.to_vec();
        let kept = if flags.intersects(
            FilterFlags::KEY_ID
                | FilterFlags::KEY_DEFAULT_SOURCE
                | FilterFlags::KEY_VERSION
                | FilterFlags::KEY_ID_PROVIDES,
        ) {
            Self::winners_by_key(&snapshot, flags)
        } else {
            Self::winners_by_unique_id(&snapshot, flags)
        };
        let stale = {
            let mut inner = self.shared.inner.lock().unwrap();
            inner.array.clear();
            std::mem::take(&mut inner.watched)
        };
        for entry in stale {
            entry.target.disconnect(entry.conn);
        }
        for app in snapshot {
            if kept.contains(&app.ptr_key()) {
                self.add_internal(&app, false);
                self.watch_member(&app);
            }
        }
        self.invalidate_state();
        self.invalidate_progress();
    }

    /// No key flags: the unique-id is the key, compared with the usual
    /// wildcard rules so a wildcard and its concrete resolution collapse.
    /// Apps with no resolved id are kept as-is; their all-wildcard
    /// unique-id would otherwise swallow every other member.
    fn winners_by_unique_id(snapshot: &[App], flags: FilterFlags) -> HashSet<usize> {
        let mut winners: Vec<App> = Vec::new();
        let mut kept: HashSet<usize> = HashSet::new();
        for app in snapshot {
            if app.id().is_none() {
                kept.insert(app.ptr_key());
                continue;
            }
            let unique_id = app.unique_id();
            match winners
                .iter()
                .position(|winner| unique_id_match(&winner.unique_id(), &unique_id))
            {
                None => winners.push(app.clone()),
                Some(pos) => {
                    if Self::is_better(app, &winners[pos], flags) {
                        winners[pos] = app.clone();
                    } else {
                        log::debug!("ignoring duplicate {}", unique_id);
                    }
                }
            }
        }
        kept.extend(winners.iter().map(App::ptr_key));
        kept
    }

    fn winners_by_key(snapshot: &[App], flags: FilterFlags) -> HashSet<usize> {
        let mut winners: HashMap<String, App> = HashMap::new();
        let mut kept: HashSet<usize> = HashSet::new();
        for app in snapshot {
            let keys = Self::dedup_keys(app, flags);
            if keys.is_empty() {
                kept.insert(app.ptr_key());
                continue;
            }
            let existing = keys.iter().find_map(|key| winners.get(key)).cloned();
            match existing {
                None => {
                    for key in keys {
                        winners.insert(key, app.clone());
                    }
                    kept.insert(app.ptr_key());
                }
                Some(old) => {
                    if Self::is_better(app, &old, flags) {
                        kept.remove(&old.ptr_key());
                        for key in keys {
                            winners.insert(key, app.clone());
                        }
                        kept.insert(app.ptr_key());
                    } else {
                        log::debug!("ignoring duplicate {}", app.unique_id());
                    }
                }
            }
        }
        kept
    }

    fn dedup_keys(app: &App, flags: FilterFlags) -> Vec<String> {
        if flags.contains(FilterFlags::KEY_ID_PROVIDES) {
            // a collision on any of these means the same logical app
            let mut keys = Vec::new();
            if let Some(id) = app.id() {
                keys.push(id);
            }
            for provide in app.provides() {
                if let AppProvide::Id(id) = provide {
                    keys.push(id);
                }
            }
            keys
        } else {
            let mut parts = Vec::new();
            if flags.contains(FilterFlags::KEY_ID) {
                if let Some(id) = app.id() {
                    parts.push(id);
                }
            }
            if flags.contains(FilterFlags::KEY_DEFAULT_SOURCE) {
                if let Some(source) = app.default_source() {
                    parts.push(source);
                }
            }
            if flags.contains(FilterFlags::KEY_VERSION) {
                if let Some(version) = app.version() {
                    parts.push(version);
                }
            }
            if parts.is_empty() {
                Vec::new()
            } else {
                vec![parts.join(":")]
            }
        }
    }

    fn is_better(new: &App, old: &App, flags: FilterFlags) -> bool {
        if flags.contains(FilterFlags::PREFER_INSTALLED) && new.is_installed() != old.is_installed()
        {
            return new.is_installed();
        }
        compare_priority(new, old) == Ordering::Less
    }
}

impl IntoIterator for &AppList {
    type Item = App;
    type IntoIter = std::vec::IntoIter<App>;

    fn into_iter(self) -> Self::IntoIter {
        self.to_vec().into_iter()
    }
}
