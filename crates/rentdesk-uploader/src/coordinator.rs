//! Media upload coordinator.
//!
//! A single control task owns the ordered item list and the progress map.
//! Owners talk to it through a [`CoordinatorHandle`]; uploads run as separate
//! tasks bounded by a semaphore and report back over an event channel. Every
//! state transition happens on the control task, one at a time.
//!
//! Each reset starts a new session: the generation counter is bumped and the
//! previous session's cancellation token is cancelled, so uploads started for
//! a discarded list can never touch the current one.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio_util::sync::CancellationToken;

use rentdesk_api_client::{ProgressCallback, MAX_STREAMING_PROGRESS};
use rentdesk_core::{ApiError, ClientConfig};

use crate::error::UploadError;
use crate::item::{DisplayUrl, ItemId, MediaFile, MediaItem, UploadState};
use crate::progress::ProgressMap;
use crate::uploader::MediaUploader;

/// Receives the ordered list of uploaded URLs whenever it changes.
pub type ValueListener = Arc<dyn Fn(Vec<String>) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Maximum uploads in flight at once.
    pub upload_concurrency: usize,
    pub command_buffer: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            upload_concurrency: 4,
            command_buffer: 64,
        }
    }
}

impl From<&ClientConfig> for CoordinatorConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            upload_concurrency: config.upload_concurrency,
            ..Self::default()
        }
    }
}

/// Point-in-time copy of the coordinator state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub generation: u64,
    pub items: Vec<MediaItem>,
    pub progress: ProgressMap,
    /// URLs of uploaded items, in list order.
    pub value: Vec<String>,
}

impl Snapshot {
    pub fn count(&self, state: UploadState) -> usize {
        self.items.iter().filter(|i| i.state == state).count()
    }
}

enum Command {
    SyncValue(Vec<String>, oneshot::Sender<bool>),
    Reset(Vec<String>, oneshot::Sender<()>),
    Select(Vec<MediaFile>, oneshot::Sender<Vec<ItemId>>),
    Remove(usize, oneshot::Sender<Result<MediaItem, UploadError>>),
    Snapshot(oneshot::Sender<Snapshot>),
    Settled(oneshot::Sender<Vec<String>>),
    Shutdown,
}

struct UploadEvent {
    generation: u64,
    id: ItemId,
    kind: EventKind,
}

enum EventKind {
    Progress(u8),
    Succeeded(String),
    Failed(ApiError),
}

/// Owner-side handle. Cloning shares the same coordinator; when the last
/// handle is dropped the coordinator stops and cancels in-flight uploads.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::Sender<Command>,
    root: CancellationToken,
}

impl fmt::Debug for CoordinatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinatorHandle")
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}

impl CoordinatorHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, UploadError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| UploadError::Closed)?;
        rx.await.map_err(|_| UploadError::Closed)
    }

    /// Offer the owner's current value. Values equal to the last reported
    /// one or to the last external input are ignored; anything else resets
    /// the list. Returns whether a reset happened.
    pub async fn sync_value(&self, urls: Vec<String>) -> Result<bool, UploadError> {
        self.request(|tx| Command::SyncValue(urls, tx)).await
    }

    /// Unconditionally start a new session from `urls`.
    pub async fn reset(&self, urls: Vec<String>) -> Result<(), UploadError> {
        self.request(|tx| Command::Reset(urls, tx)).await
    }

    /// Append one pending item per file, in order, and start their uploads.
    pub async fn select_files(&self, files: Vec<MediaFile>) -> Result<Vec<ItemId>, UploadError> {
        self.request(|tx| Command::Select(files, tx)).await
    }

    /// Remove the item at `index` whatever its state.
    pub async fn remove(&self, index: usize) -> Result<MediaItem, UploadError> {
        self.request(|tx| Command::Remove(index, tx)).await?
    }

    pub async fn snapshot(&self) -> Result<Snapshot, UploadError> {
        self.request(Command::Snapshot).await
    }

    pub async fn value(&self) -> Result<Vec<String>, UploadError> {
        Ok(self.snapshot().await?.value)
    }

    /// Resolves with the value once no item is pending.
    pub async fn settled(&self) -> Result<Vec<String>, UploadError> {
        self.request(Command::Settled).await
    }

    pub async fn shutdown(&self) {
        self.root.cancel();
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

/// Control-task state.
pub struct MediaUploadCoordinator {
    items: Vec<MediaItem>,
    progress: ProgressMap,
    generation: u64,
    root: CancellationToken,
    session: CancellationToken,
    uploads: HashMap<ItemId, CancellationToken>,
    last_external: Vec<String>,
    last_reported: Vec<String>,
    uploader: Arc<dyn MediaUploader>,
    listener: ValueListener,
    semaphore: Arc<Semaphore>,
    events: mpsc::UnboundedSender<UploadEvent>,
    waiters: Vec<oneshot::Sender<Vec<String>>>,
}

impl MediaUploadCoordinator {
    /// Start a coordinator seeded with `initial` URLs.
    pub fn spawn(
        initial: Vec<String>,
        uploader: Arc<dyn MediaUploader>,
        listener: ValueListener,
        config: CoordinatorConfig,
    ) -> CoordinatorHandle {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let root = CancellationToken::new();

        let mut coordinator = Self {
            items: Vec::new(),
            progress: ProgressMap::new(),
            generation: 0,
            session: root.child_token(),
            root: root.clone(),
            uploads: HashMap::new(),
            last_external: Vec::new(),
            last_reported: Vec::new(),
            uploader,
            listener,
            semaphore: Arc::new(Semaphore::new(config.upload_concurrency.max(1))),
            events: event_tx,
            waiters: Vec::new(),
        };
        coordinator.reset(initial);

        tracing::debug!(
            upload_concurrency = config.upload_concurrency,
            items = coordinator.items.len(),
            "Upload coordinator started"
        );
        tokio::spawn(coordinator.run(command_rx, event_rx));

        CoordinatorHandle {
            commands: command_tx,
            root,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: mpsc::UnboundedReceiver<UploadEvent>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = events.recv() => self.handle_event(event),
            }
        }
        self.root.cancel();
        tracing::debug!(generation = self.generation, "Upload coordinator stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SyncValue(urls, reply) => {
                let changed = urls != self.last_reported && urls != self.last_external;
                if changed {
                    self.reset(urls);
                }
                let _ = reply.send(changed);
            }
            Command::Reset(urls, reply) => {
                self.reset(urls);
                let _ = reply.send(());
            }
            Command::Select(files, reply) => {
                let ids = self.select(files);
                let _ = reply.send(ids);
            }
            Command::Remove(index, reply) => {
                let _ = reply.send(self.remove(index));
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Settled(reply) => {
                self.waiters.push(reply);
                self.flush_waiters();
            }
            Command::Shutdown => {}
        }
    }

    fn reset(&mut self, urls: Vec<String>) {
        self.session.cancel();
        self.generation += 1;
        self.session = self.root.child_token();
        self.uploads.clear();
        self.progress.clear();

        self.items = Vec::with_capacity(urls.len());
        for url in &urls {
            let mut item = MediaItem::existing(url.clone());
            item.id = self.fresh_id(ItemId::existing);
            self.items.push(item);
        }
        self.last_external = urls.clone();
        self.last_reported = urls;

        tracing::debug!(
            generation = self.generation,
            items = self.items.len(),
            "Upload session reset"
        );
        self.publish();
        self.flush_waiters();
    }

    fn select(&mut self, files: Vec<MediaFile>) -> Vec<ItemId> {
        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            let id = self.fresh_id(ItemId::new_file);
            self.progress.set(&id, 0);
            self.items.push(MediaItem::pending(id.clone(), file.clone()));
            self.schedule(id.clone(), file);
            ids.push(id);
        }
        if !ids.is_empty() {
            tracing::info!(
                generation = self.generation,
                count = ids.len(),
                "Files selected for upload"
            );
        }
        self.publish();
        ids
    }

    fn remove(&mut self, index: usize) -> Result<MediaItem, UploadError> {
        if index >= self.items.len() {
            return Err(UploadError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let item = self.items.remove(index);
        self.progress.remove(&item.id);
        if let Some(token) = self.uploads.remove(&item.id) {
            token.cancel();
            tracing::debug!(item_id = %item.id, "Cancelled upload of removed item");
        }
        self.publish();
        self.flush_waiters();
        Ok(item)
    }

    fn handle_event(&mut self, event: UploadEvent) {
        if event.generation != self.generation {
            tracing::debug!(
                item_id = %event.id,
                generation = event.generation,
                current = self.generation,
                "Dropping upload event from a previous session"
            );
            return;
        }
        let Some(index) = self.items.iter().position(|i| i.id == event.id) else {
            tracing::debug!(item_id = %event.id, "Dropping upload event for a removed item");
            return;
        };
        let item = &mut self.items[index];
        if !item.is_pending() {
            return;
        }

        match event.kind {
            EventKind::Progress(percent) => {
                self.progress
                    .set(&event.id, percent.min(MAX_STREAMING_PROGRESS));
                return;
            }
            EventKind::Succeeded(url) => {
                tracing::info!(item_id = %event.id, url = %url, "Upload succeeded");
                item.display = DisplayUrl::Remote(url);
                item.state = UploadState::Uploaded;
                item.file = None;
                self.progress.set(&event.id, 100);
            }
            EventKind::Failed(error) => {
                tracing::warn!(item_id = %event.id, error = %error, "Upload failed");
                item.state = UploadState::Failed;
            }
        }
        self.uploads.remove(&event.id);
        self.publish();
        self.flush_waiters();
    }

    fn value(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|i| i.uploaded_url().map(str::to_string))
            .collect()
    }

    /// Report the value if it differs from what the owner last received.
    fn publish(&mut self) {
        let value = self.value();
        if value != self.last_reported {
            self.last_reported = value.clone();
            (self.listener)(value);
        }
    }

    fn flush_waiters(&mut self) {
        if self.waiters.is_empty() || self.items.iter().any(MediaItem::is_pending) {
            return;
        }
        let value = self.value();
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(value.clone());
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            items: self.items.clone(),
            progress: self.progress.clone(),
            value: self.value(),
        }
    }

    fn fresh_id(&self, make: fn() -> ItemId) -> ItemId {
        loop {
            let id = make();
            if !self.items.iter().any(|i| i.id == id) {
                return id;
            }
        }
    }

    fn schedule(&mut self, id: ItemId, file: MediaFile) {
        let token = self.session.child_token();
        self.uploads.insert(id.clone(), token.clone());

        let generation = self.generation;
        let semaphore = Arc::clone(&self.semaphore);
        let uploader = Arc::clone(&self.uploader);
        let events = self.events.clone();

        tokio::spawn(async move {
            let _permit = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                permit = semaphore.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };

            let progress_events = events.clone();
            let progress_id = id.clone();
            let on_progress: ProgressCallback = Arc::new(move |percent| {
                let _ = progress_events.send(UploadEvent {
                    generation,
                    id: progress_id.clone(),
                    kind: EventKind::Progress(percent),
                });
            });

            tracing::debug!(item_id = %id, generation, size = file.size(), "Upload started");
            let kind = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(item_id = %id, generation, "Upload cancelled");
                    return;
                }
                result = uploader.upload(&file, on_progress) => match result {
                    Ok(url) => EventKind::Succeeded(url),
                    Err(error) => EventKind::Failed(error),
                },
            };
            let _ = events.send(UploadEvent {
                generation,
                id,
                kind,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    type Outcome = Result<String, ApiError>;

    /// Uploads block until the test releases them by file name.
    #[derive(Default)]
    struct GatedUploader {
        gates: Mutex<HashMap<String, oneshot::Receiver<Outcome>>>,
        started: Mutex<Vec<String>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl GatedUploader {
        fn with_files(names: &[&str]) -> (Arc<Self>, HashMap<String, oneshot::Sender<Outcome>>) {
            let uploader = Self::default();
            let mut senders = HashMap::new();
            for name in names {
                let (tx, rx) = oneshot::channel();
                uploader.gates.lock().unwrap().insert(name.to_string(), rx);
                senders.insert(name.to_string(), tx);
            }
            (Arc::new(uploader), senders)
        }

        fn started(&self) -> usize {
            self.started.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MediaUploader for GatedUploader {
        async fn upload(&self, file: &MediaFile, on_progress: ProgressCallback) -> Outcome {
            let gate = self.gates.lock().unwrap().remove(&file.name);
            self.started.lock().unwrap().push(file.name.clone());
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);

            on_progress(50);
            let outcome = match gate {
                Some(rx) => rx.await.unwrap_or_else(|_| Err(ApiError::cancelled())),
                None => Err(ApiError::validation("no gate for file")),
            };
            self.active.fetch_sub(1, Ordering::SeqCst);
            if outcome.is_ok() {
                on_progress(100);
            }
            outcome
        }
    }

    fn recorder() -> (ValueListener, Arc<Mutex<Vec<Vec<String>>>>) {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let listener: ValueListener = Arc::new(move |value| sink.lock().unwrap().push(value));
        (listener, reports)
    }

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn file(name: &str) -> MediaFile {
        MediaFile::new(name, name.as_bytes().to_vec())
    }

    fn failure() -> Outcome {
        Err(ApiError::from_response(500, r#"{"message":"upload failed"}"#))
    }

    async fn wait_until(mut check: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !check() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_successful_upload_appends_url() {
        let (uploader, mut gates) = GatedUploader::with_files(&["new.jpg"]);
        let (listener, reports) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            urls(&["url1", "url2"]),
            uploader,
            listener,
            CoordinatorConfig::default(),
        );

        let ids = handle.select_files(vec![file("new.jpg")]).await.unwrap();
        assert_eq!(ids.len(), 1);

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.items.len(), 3);
        assert_eq!(snapshot.items[2].state, UploadState::Pending);
        assert_eq!(snapshot.value, urls(&["url1", "url2"]));
        assert!(reports.lock().unwrap().is_empty());

        gates.remove("new.jpg").unwrap().send(Ok("url3".to_string())).unwrap();
        let value = handle.settled().await.unwrap();
        assert_eq!(value, urls(&["url1", "url2", "url3"]));
        assert_eq!(*reports.lock().unwrap(), vec![urls(&["url1", "url2", "url3"])]);

        let snapshot = handle.snapshot().await.unwrap();
        let item = &snapshot.items[2];
        assert_eq!(item.state, UploadState::Uploaded);
        assert_eq!(item.display, DisplayUrl::Remote("url3".to_string()));
        assert!(item.file.is_none());
        assert_eq!(snapshot.progress.get(&ids[0]), Some(100));
    }

    #[tokio::test]
    async fn test_failed_upload_stays_visible_but_unreported() {
        let (uploader, mut gates) = GatedUploader::with_files(&["new.jpg"]);
        let (listener, reports) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            urls(&["url1", "url2"]),
            uploader,
            listener,
            CoordinatorConfig::default(),
        );

        handle.select_files(vec![file("new.jpg")]).await.unwrap();
        gates.remove("new.jpg").unwrap().send(failure()).unwrap();

        assert_eq!(handle.settled().await.unwrap(), urls(&["url1", "url2"]));
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.items.len(), 3);
        assert_eq!(snapshot.count(UploadState::Uploaded), 2);
        let failed = &snapshot.items[2];
        assert_eq!(failed.state, UploadState::Failed);
        assert!(failed.file.is_some());
        assert_eq!(failed.display, DisplayUrl::Preview("new.jpg".to_string()));
        assert!(reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_isolated_whatever_order_uploads_resolve() {
        for b_first in [true, false] {
            let (uploader, mut gates) = GatedUploader::with_files(&["a.jpg", "b.jpg"]);
            let (listener, _) = recorder();
            let handle = MediaUploadCoordinator::spawn(
                vec![],
                uploader,
                listener,
                CoordinatorConfig::default(),
            );
            handle
                .select_files(vec![file("a.jpg"), file("b.jpg")])
                .await
                .unwrap();

            let a = gates.remove("a.jpg").unwrap();
            let b = gates.remove("b.jpg").unwrap();
            if b_first {
                b.send(Ok("url-b".to_string())).unwrap();
                tokio::task::yield_now().await;
                a.send(failure()).unwrap();
            } else {
                a.send(failure()).unwrap();
                tokio::task::yield_now().await;
                b.send(Ok("url-b".to_string())).unwrap();
            }

            assert_eq!(handle.settled().await.unwrap(), urls(&["url-b"]));
        }
    }

    #[tokio::test]
    async fn test_value_follows_selection_order_not_completion_order() {
        let (uploader, mut gates) = GatedUploader::with_files(&["a", "b", "c"]);
        let (listener, reports) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            urls(&["url0"]),
            uploader,
            listener,
            CoordinatorConfig::default(),
        );
        handle
            .select_files(vec![file("a"), file("b"), file("c")])
            .await
            .unwrap();

        for name in ["c", "a", "b"] {
            gates
                .remove(name)
                .unwrap()
                .send(Ok(format!("url-{}", name)))
                .unwrap();
        }

        let value = handle.settled().await.unwrap();
        assert_eq!(value, urls(&["url0", "url-a", "url-b", "url-c"]));
        assert_eq!(reports.lock().unwrap().last(), Some(&value));
    }

    #[tokio::test]
    async fn test_echoed_or_repeated_value_does_not_reset() {
        let (uploader, mut gates) = GatedUploader::with_files(&["new.jpg"]);
        let (listener, reports) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            urls(&["url1"]),
            uploader,
            listener,
            CoordinatorConfig::default(),
        );
        let before = handle.snapshot().await.unwrap();

        assert!(!handle.sync_value(urls(&["url1"])).await.unwrap());
        assert_eq!(handle.snapshot().await.unwrap(), before);

        handle.select_files(vec![file("new.jpg")]).await.unwrap();
        gates.remove("new.jpg").unwrap().send(Ok("url2".to_string())).unwrap();
        handle.settled().await.unwrap();

        // the owner feeds back what it was just told
        assert!(!handle.sync_value(urls(&["url1", "url2"])).await.unwrap());
        assert!(!handle.sync_value(urls(&["url1", "url2"])).await.unwrap());
        let after = handle.snapshot().await.unwrap();
        assert_eq!(after.generation, before.generation);
        assert_eq!(after.items.len(), 2);
        assert_eq!(reports.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_new_external_value_resets_session() {
        let (uploader, mut gates) = GatedUploader::with_files(&["late.jpg"]);
        let (listener, reports) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            urls(&["url1"]),
            uploader.clone(),
            listener,
            CoordinatorConfig::default(),
        );
        handle.select_files(vec![file("late.jpg")]).await.unwrap();
        wait_until(|| uploader.started() == 1).await;

        assert!(handle.sync_value(urls(&["other1", "other2"])).await.unwrap());
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.items.len(), 2);
        assert!(snapshot.items.iter().all(|i| i.state == UploadState::Uploaded));
        assert!(snapshot.progress.is_empty());

        // the old session's upload was cancelled; its result goes nowhere
        let _ = gates.remove("late.jpg").unwrap().send(Ok("url-late".to_string()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(handle.value().await.unwrap(), urls(&["other1", "other2"]));
        assert!(reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_preserves_order_of_remaining_items() {
        let (uploader, mut gates) = GatedUploader::with_files(&["pending.jpg", "failed.jpg"]);
        let (listener, reports) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            urls(&["url1", "url2"]),
            uploader,
            listener,
            CoordinatorConfig::default(),
        );
        handle
            .select_files(vec![file("pending.jpg"), file("failed.jpg")])
            .await
            .unwrap();
        gates.remove("failed.jpg").unwrap().send(failure()).unwrap();

        let removed = handle.remove(0).await.unwrap();
        assert_eq!(removed.uploaded_url(), Some("url1"));
        assert_eq!(*reports.lock().unwrap(), vec![urls(&["url2"])]);

        let names: Vec<String> = handle
            .snapshot()
            .await
            .unwrap()
            .items
            .iter()
            .map(|i| i.display.as_str().to_string())
            .collect();
        assert_eq!(names, urls(&["url2", "pending.jpg", "failed.jpg"]));

        let err = handle.remove(3).await.unwrap_err();
        assert_eq!(err, UploadError::IndexOutOfRange { index: 3, len: 3 });
    }

    #[tokio::test]
    async fn test_reset_regenerates_item_ids() {
        let (uploader, _) = GatedUploader::with_files(&[]);
        let (listener, _) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            urls(&["url1", "url2"]),
            uploader,
            listener,
            CoordinatorConfig::default(),
        );
        let ids = |snapshot: &Snapshot| -> HashSet<ItemId> {
            snapshot.items.iter().map(|i| i.id.clone()).collect()
        };

        let first = handle.snapshot().await.unwrap();
        handle.reset(urls(&["url1", "url2"])).await.unwrap();
        let second = handle.snapshot().await.unwrap();
        assert_eq!(second.value, first.value);
        assert_eq!(second.generation, first.generation + 1);
        assert!(ids(&first).is_disjoint(&ids(&second)));

        assert!(handle.sync_value(urls(&["url3"])).await.unwrap());
        let third = handle.snapshot().await.unwrap();
        assert_eq!(third.items.len(), 1);
        assert!(ids(&third).is_disjoint(&ids(&second)));
        assert!(third.items[0].id.as_str().starts_with("existing-"));
    }

    #[tokio::test]
    async fn test_removing_failed_item_keeps_the_rest_in_order() {
        let (uploader, mut gates) = GatedUploader::with_files(&["a.jpg", "bad.jpg", "c.jpg"]);
        let (listener, reports) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            urls(&["url0"]),
            uploader,
            listener,
            CoordinatorConfig::default(),
        );
        handle
            .select_files(vec![file("a.jpg"), file("bad.jpg"), file("c.jpg")])
            .await
            .unwrap();
        gates.remove("bad.jpg").unwrap().send(failure()).unwrap();
        gates.remove("a.jpg").unwrap().send(Ok("url-a".to_string())).unwrap();
        gates.remove("c.jpg").unwrap().send(Ok("url-c".to_string())).unwrap();

        let value = handle.settled().await.unwrap();
        assert_eq!(value, urls(&["url0", "url-a", "url-c"]));
        let before = handle.snapshot().await.unwrap();
        assert_eq!(before.items[2].state, UploadState::Failed);
        let reported = reports.lock().unwrap().len();

        let removed = handle.remove(2).await.unwrap();
        assert_eq!(removed.state, UploadState::Failed);
        assert_eq!(removed.id, before.items[2].id);

        let after = handle.snapshot().await.unwrap();
        let expected: Vec<ItemId> = before
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 2)
            .map(|(_, item)| item.id.clone())
            .collect();
        let remaining: Vec<ItemId> = after.items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(remaining, expected);
        assert_eq!(after.count(UploadState::Failed), 0);
        assert_eq!(after.value, value);
        // the value did not change, so the owner hears nothing new
        assert_eq!(reports.lock().unwrap().len(), reported);
    }

    #[tokio::test]
    async fn test_removing_pending_item_cancels_its_upload() {
        let (uploader, mut gates) = GatedUploader::with_files(&["a.jpg", "b.jpg"]);
        let (listener, _) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            vec![],
            uploader.clone(),
            listener,
            CoordinatorConfig::default(),
        );
        handle
            .select_files(vec![file("a.jpg"), file("b.jpg")])
            .await
            .unwrap();
        wait_until(|| uploader.started() == 2).await;

        let removed = handle.remove(0).await.unwrap();
        assert_eq!(removed.state, UploadState::Pending);
        assert!(removed.file.is_some());

        let _ = gates.remove("a.jpg").unwrap().send(Ok("url-a".to_string()));
        gates.remove("b.jpg").unwrap().send(Ok("url-b".to_string())).unwrap();

        assert_eq!(handle.settled().await.unwrap(), urls(&["url-b"]));
        assert_eq!(handle.snapshot().await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_uploads_are_bounded_by_concurrency_limit() {
        let names = ["1", "2", "3", "4", "5"];
        let (uploader, mut gates) = GatedUploader::with_files(&names);
        let (listener, _) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            vec![],
            uploader.clone(),
            listener,
            CoordinatorConfig {
                upload_concurrency: 2,
                ..CoordinatorConfig::default()
            },
        );
        handle
            .select_files(names.iter().map(|n| file(n)).collect())
            .await
            .unwrap();

        wait_until(|| uploader.started() == 2).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(uploader.started(), 2);

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.count(UploadState::Pending), 5);

        for name in names {
            gates
                .remove(name)
                .unwrap()
                .send(Ok(format!("url-{}", name)))
                .unwrap();
        }
        let value = handle.settled().await.unwrap();
        assert_eq!(value.len(), 5);
        assert_eq!(value[0], "url-1");
        assert!(uploader.max_active.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_progress_is_tracked_below_completion() {
        let (uploader, mut gates) = GatedUploader::with_files(&["a.jpg"]);
        let (listener, _) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            vec![],
            uploader,
            listener,
            CoordinatorConfig::default(),
        );
        let ids = handle.select_files(vec![file("a.jpg")]).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let snapshot = handle.snapshot().await.unwrap();
                if snapshot.progress.get(&ids[0]) == Some(50) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        gates.remove("a.jpg").unwrap().send(Ok("url-a".to_string())).unwrap();
        handle.settled().await.unwrap();
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.progress.get(&ids[0]), Some(100));
    }

    #[tokio::test]
    async fn test_settled_without_pending_items_resolves_immediately() {
        let (uploader, _) = GatedUploader::with_files(&[]);
        let (listener, _) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            urls(&["url1"]),
            uploader,
            listener,
            CoordinatorConfig::default(),
        );
        assert_eq!(handle.settled().await.unwrap(), urls(&["url1"]));
        assert!(handle.select_files(vec![]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commands_fail_after_shutdown() {
        let (uploader, _) = GatedUploader::with_files(&["a.jpg"]);
        let (listener, _) = recorder();
        let handle = MediaUploadCoordinator::spawn(
            vec![],
            uploader,
            listener,
            CoordinatorConfig::default(),
        );
        handle.select_files(vec![file("a.jpg")]).await.unwrap();
        handle.shutdown().await;

        wait_until(|| handle.commands.is_closed()).await;
        assert_eq!(handle.snapshot().await.unwrap_err(), UploadError::Closed);
        assert_eq!(handle.settled().await.unwrap_err(), UploadError::Closed);
    }
}
