use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Delay used when a fragment is added without an explicit window.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);

/// Callback invoked once a key goes quiet, with the joined text and the
/// number of fragments it was joined from. The count comes from the buffer
/// itself, so fragments carrying their own newlines are not miscounted.
///
/// `FnOnce` because a buffer flushes at most once in its lifetime.
pub type FlushCallback = Box<dyn FnOnce(String, usize) + Send + 'static>;

struct PendingBuffer {
    /// Raw fragments in arrival order, append-only until flush.
    fragments: Vec<String>,
    on_flush: FlushCallback,
    timer: JoinHandle<()>,
    /// Matches the timer currently allowed to flush this buffer. A timer
    /// that finished sleeping after being superseded fails this check and
    /// backs off instead of flushing early.
    generation: u64,
}

struct Shared<K> {
    buffers: HashMap<K, PendingBuffer>,
    default_delay: Duration,
    generations: u64,
}

/// Coalesces rapid-fire message fragments per key into a single message,
/// delivered once input for that key pauses for the configured delay.
///
/// Each new fragment for a pending key restarts the window, so the flush
/// fires after the *last* fragment, not the first. A key that never goes
/// quiet never flushes on its own; [`force_flush`](Self::force_flush) and
/// [`clear_all`](Self::clear_all) are the termination paths for that case.
///
/// Handles are cheap to clone and all clones share one buffer map. A host
/// should own one debouncer per logical scope and pass it explicitly
/// rather than reaching for shared global state.
pub struct MessageDebouncer<K = String> {
    shared: Arc<Mutex<Shared<K>>>,
}

impl<K> Clone for MessageDebouncer<K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K> Default for MessageDebouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> MessageDebouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    /// Create a debouncer with the standard 3 second window.
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_DELAY)
    }

    /// Create a debouncer with a custom default window.
    ///
    /// A zero delay is accepted: the flush still goes through the timer,
    /// so it lands on the next scheduling tick rather than inline.
    pub fn with_delay(default_delay: Duration) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                buffers: HashMap::new(),
                default_delay,
                generations: 0,
            })),
        }
    }

    /// Buffer a fragment under `key` using the current default delay.
    ///
    /// See [`add_fragment_with_delay`](Self::add_fragment_with_delay).
    pub fn add_fragment(&self, key: K, fragment: impl Into<String>, on_flush: FlushCallback) {
        let delay = self.shared.lock().unwrap().default_delay;
        self.add_fragment_with_delay(key, fragment, on_flush, delay);
    }

    /// Buffer a fragment under `key` and (re)start its flush timer.
    ///
    /// First fragment for a key creates the buffer and stores `on_flush`.
    /// Subsequent fragments for a still-pending key append to the buffer,
    /// cancel the previous timer, and schedule a new one, but keep the
    /// originally stored callback. The callback supplied on those later
    /// calls is dropped ("first callback wins"); hosts that rotate
    /// callbacks per fragment will find only the first one honored.
    pub fn add_fragment_with_delay(
        &self,
        key: K,
        fragment: impl Into<String>,
        on_flush: FlushCallback,
        delay: Duration,
    ) {
        let mut shared = self.shared.lock().unwrap();
        shared.generations += 1;
        let generation = shared.generations;
        let timer = self.spawn_timer(key.clone(), delay, generation);

        match shared.buffers.get_mut(&key) {
            Some(buffer) => {
                buffer.timer.abort();
                buffer.fragments.push(fragment.into());
                buffer.generation = generation;
                buffer.timer = timer;
            }
            None => {
                shared.buffers.insert(
                    key,
                    PendingBuffer {
                        fragments: vec![fragment.into()],
                        on_flush,
                        timer,
                        generation,
                    },
                );
            }
        }
    }

    /// Flush `key` immediately, without waiting for its window to elapse.
    ///
    /// Joins the buffered fragments, invokes the stored callback
    /// synchronously on the calling thread, and removes the buffer. Returns
    /// `false` (no-op) if nothing is pending for `key`.
    pub fn force_flush(&self, key: &K) -> bool {
        let removed = self.shared.lock().unwrap().buffers.remove(key);
        match removed {
            Some(buffer) => {
                buffer.timer.abort();
                Self::deliver(buffer);
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer and discard every buffer without
    /// invoking any callback. Teardown path; data is dropped silently.
    pub fn clear_all(&self) {
        let drained: Vec<PendingBuffer> = {
            let mut shared = self.shared.lock().unwrap();
            shared.buffers.drain().map(|(_, buffer)| buffer).collect()
        };
        for buffer in &drained {
            buffer.timer.abort();
        }
        if !drained.is_empty() {
            tracing::debug!(buffers = drained.len(), "discarded pending buffers");
        }
    }

    /// Whether a buffer currently exists for `key`.
    pub fn has_pending(&self, key: &K) -> bool {
        self.shared.lock().unwrap().buffers.contains_key(key)
    }

    /// Number of fragments currently buffered for `key`, 0 if none.
    pub fn pending_fragment_count(&self, key: &K) -> usize {
        self.shared
            .lock()
            .unwrap()
            .buffers
            .get(key)
            .map(|buffer| buffer.fragments.len())
            .unwrap_or(0)
    }

    /// Change the default delay for future [`add_fragment`](Self::add_fragment)
    /// calls. In-flight timers keep the delay they were scheduled with.
    pub fn set_default_delay(&self, delay: Duration) {
        self.shared.lock().unwrap().default_delay = delay;
    }

    /// The delay currently applied when none is given explicitly.
    pub fn default_delay(&self) -> Duration {
        self.shared.lock().unwrap().default_delay
    }

    fn spawn_timer(&self, key: K, delay: Duration, generation: u64) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Self::flush_if_current(&shared, &key, generation);
        })
    }

    /// Timer-expiry path. Only the generation that last touched the buffer
    /// may flush it; anything else is a stale timer that lost the race to
    /// an abort, a force flush, or a newer fragment.
    fn flush_if_current(shared: &Mutex<Shared<K>>, key: &K, generation: u64) {
        let removed = {
            let mut shared = shared.lock().unwrap();
            match shared.buffers.get(key) {
                Some(buffer) if buffer.generation == generation => shared.buffers.remove(key),
                _ => None,
            }
        };
        if let Some(buffer) = removed {
            Self::deliver(buffer);
        }
    }

    /// Join and hand off. The buffer is already out of the map, so a
    /// panicking callback cannot resurrect it, and the callback may
    /// re-enter the debouncer freely (no lock is held here).
    fn deliver(buffer: PendingBuffer) {
        let fragment_count = buffer.fragments.len();
        let joined = buffer.fragments.join("\n");
        tracing::debug!(fragments = fragment_count, "flushing debounced message");
        (buffer.on_flush)(joined, fragment_count);
    }
}
