//! Bounded worker queue for lazy preview-image resolution.
//!
//! Search results arrive without images for providers that resolve previews
//! lazily; each visible card then requests its image here. The queue keeps a
//! fixed worker pool pulling jobs FIFO, deduplicates concurrent requests for
//! the same model, caches resolved images, and drops deliveries for jobs made
//! stale by a grid re-render (generation counter).

use crate::cache::{IMAGE_TTL, ProviderCache};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

const WORKER_COUNT: usize = 4;
const CACHE_CAPACITY: u64 = 100;

/// Where the queue gets its images from. Implemented by
/// [`SearchService`](crate::service::SearchService).
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn resolve_image(&self, provider_id: &str, model_id: &str) -> Result<String>;
}

struct Job {
    key: String,
    provider_id: String,
    model_id: String,
    generation: u64,
}

struct QueueInner {
    source: Arc<dyn ImageSource>,
    cache: ProviderCache<String>,
    pending: Mutex<HashMap<String, Vec<oneshot::Sender<String>>>>,
    generation: AtomicU64,
}

/// FIFO preview-image queue with [`WORKER_COUNT`] concurrent workers.
///
/// Construction spawns the workers on the ambient tokio runtime; dropping the
/// queue closes the channel and the workers exit on their own.
pub struct ImagePreviewQueue {
    inner: Arc<QueueInner>,
    sender: mpsc::UnboundedSender<Job>,
}

impl ImagePreviewQueue {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let inner = Arc::new(QueueInner {
            source,
            cache: ProviderCache::with_capacity(IMAGE_TTL, CACHE_CAPACITY),
            pending: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        });

        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        for worker in 0..WORKER_COUNT {
            let receiver = receiver.clone();
            let inner = inner.clone();
            tokio::spawn(async move {
                loop {
                    let job = {
                        let mut receiver = receiver.lock().await;
                        receiver.recv().await
                    };
                    let Some(job) = job else { break };
                    process(&inner, job).await;
                }
                tracing::debug!(worker, "image worker stopped");
            });
        }

        Self { inner, sender }
    }

    /// Resolve the preview image for one model, waiting for a worker slot.
    ///
    /// Returns the image URL or data URL, or an empty string when nothing was
    /// found, resolution failed, or the job went stale before delivery.
    pub async fn request(&self, provider_id: &str, model_id: &str) -> String {
        let model_id = model_id.trim();
        if model_id.is_empty() {
            return String::new();
        }
        let key = format!("{provider_id}:{model_id}");
        if let Some(image) = self.inner.cache.get(&key) {
            return image;
        }

        let (tx, rx) = oneshot::channel();
        let first_waiter = {
            let mut pending = self.inner.pending.lock().unwrap();
            let waiters = pending.entry(key.clone()).or_default();
            waiters.push(tx);
            waiters.len() == 1
        };
        if first_waiter {
            let job = Job {
                key: key.clone(),
                provider_id: provider_id.to_string(),
                model_id: model_id.to_string(),
                generation: self.inner.generation.load(Ordering::Acquire),
            };
            if self.sender.send(job).is_err() {
                self.inner.pending.lock().unwrap().remove(&key);
                return String::new();
            }
        }
        rx.await.unwrap_or_default()
    }

    /// Mark every queued-but-unprocessed job stale. Call when the result grid
    /// re-renders and the cards the jobs were meant for no longer exist.
    pub fn invalidate(&self) {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
    }
}

async fn process(inner: &QueueInner, job: Job) {
    if job.generation != inner.generation.load(Ordering::Acquire) {
        tracing::debug!(key = %job.key, "dropping stale image job");
        deliver(inner, &job.key, String::new());
        return;
    }
    if let Some(image) = inner.cache.get(&job.key) {
        deliver(inner, &job.key, image);
        return;
    }

    let image = match inner.source.resolve_image(&job.provider_id, &job.model_id).await {
        Ok(image) => image,
        Err(err) => {
            tracing::debug!(key = %job.key, error = %err, "image resolution failed");
            String::new()
        }
    };
    // Failures cache as empty too, so a broken model is not re-fetched on
    // every scroll within the TTL.
    inner.cache.insert(job.key.clone(), image.clone());

    if job.generation != inner.generation.load(Ordering::Acquire) {
        deliver(inner, &job.key, String::new());
        return;
    }
    deliver(inner, &job.key, image);
}

fn deliver(inner: &QueueInner, key: &str, image: String) {
    let waiters = inner.pending.lock().unwrap().remove(key);
    if let Some(waiters) = waiters {
        for waiter in waiters {
            // Receivers dropped mid-wait are fine to ignore.
            let _ = waiter.send(image.clone());
        }
    }
}
