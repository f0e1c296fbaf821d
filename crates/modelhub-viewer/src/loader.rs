use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

use crate::error::LibraryLoadError;

/// Something that can fetch and register the viewer library.
pub trait LibraryFetcher: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<(), LibraryLoadError>> + Send;
}

/// When the first background load is scheduled. Has no effect once a load
/// is already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStrategy {
    /// Start after the tasks already queued on the runtime have run
    Idle,
    /// Start after `LoaderConfig::fallback_delay`
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Whether the host can schedule idle work. Without it, `Idle` behaves
    /// like `Timeout`.
    pub idle_supported: bool,
    /// Delay used by the `Timeout` strategy
    #[serde(with = "millis")]
    pub fallback_delay: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            idle_supported: true,
            fallback_delay: Duration::from_secs(2),
        }
    }
}

impl LoaderConfig {
    fn effective(&self, strategy: LoadStrategy) -> LoadStrategy {
        match strategy {
            LoadStrategy::Idle if !self.idle_supported => LoadStrategy::Timeout,
            other => other,
        }
    }
}

/// Lifecycle of the viewer library for one loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryState {
    Unrequested,
    Loading,
    Ready,
    /// The last attempt failed. Only `load_now` or `reset` leave this state.
    Failed(LibraryLoadError),
}

/// Observes the loader state; flips to ready once per loader lifetime.
#[derive(Debug, Clone)]
pub struct ReadySignal {
    state: watch::Receiver<LibraryState>,
}

impl ReadySignal {
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), LibraryState::Ready)
    }

    /// Wait for the current attempt to settle.
    pub async fn wait(mut self) -> Result<(), LibraryLoadError> {
        let settled = self
            .state
            .wait_for(|s| matches!(s, LibraryState::Ready | LibraryState::Failed(_)))
            .await
            .map_err(|_| LibraryLoadError::Abandoned)?;

        let outcome = match &*settled {
            LibraryState::Failed(e) => Err(e.clone()),
            _ => Ok(()),
        };
        outcome
    }
}

struct Inner<F> {
    fetcher: F,
    config: LoaderConfig,
    state: watch::Sender<LibraryState>,
    /// Wakes a deferred attempt early when someone asks for it on demand
    expedite: Mutex<Option<Arc<Notify>>>,
}

/// Guarantees the viewer library is fetched at most once, however many
/// viewers ask for it and whenever they ask.
///
/// Clones share state. Every caller attaches to the same in-flight attempt;
/// a failed attempt is kept until an explicit `load_now` or `reset`.
pub struct ViewerLibraryLoader<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for ViewerLibraryLoader<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: LibraryFetcher> ViewerLibraryLoader<F> {
    pub fn new(fetcher: F, config: LoaderConfig) -> Self {
        let (state, _) = watch::channel(LibraryState::Unrequested);
        Self {
            inner: Arc::new(Inner {
                fetcher,
                config,
                state,
                expedite: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> LibraryState {
        self.inner.state.borrow().clone()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.inner.state.borrow(), LibraryState::Ready)
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.inner.state.borrow(), LibraryState::Loading)
    }

    /// A signal tracking the current state without requesting a load.
    pub fn signal(&self) -> ReadySignal {
        ReadySignal {
            state: self.inner.state.subscribe(),
        }
    }

    /// Request the library in the background.
    ///
    /// The first request starts the load, scheduled per `strategy`; later
    /// requests attach to it. A failed load is not restarted from here.
    pub fn ensure_loaded(&self, strategy: LoadStrategy) -> ReadySignal {
        let started = self.inner.state.send_if_modified(|s| {
            if matches!(s, LibraryState::Unrequested) {
                *s = LibraryState::Loading;
                true
            } else {
                false
            }
        });

        if started {
            self.spawn_attempt(Some(strategy));
        }

        self.signal()
    }

    /// Load the library right away, e.g. when the user opens a viewer.
    ///
    /// Attaches to an in-flight load (waking it if it is still deferred) and
    /// starts a fresh attempt after a failure.
    pub async fn load_now(&self) -> Result<(), LibraryLoadError> {
        let started = self.inner.state.send_if_modified(|s| {
            if matches!(s, LibraryState::Unrequested | LibraryState::Failed(_)) {
                *s = LibraryState::Loading;
                true
            } else {
                false
            }
        });

        if started {
            self.spawn_attempt(None);
        } else if let Some(expedite) = self.inner.expedite.lock().as_ref() {
            expedite.notify_one();
        }

        self.signal().wait().await
    }

    /// Forget a failed attempt so the next request of any kind starts over.
    /// Returns `false` when there was no failure to clear.
    pub fn reset(&self) -> bool {
        self.inner.state.send_if_modified(|s| {
            if matches!(s, LibraryState::Failed(_)) {
                *s = LibraryState::Unrequested;
                true
            } else {
                false
            }
        })
    }

    fn spawn_attempt(&self, strategy: Option<LoadStrategy>) {
        let inner = Arc::clone(&self.inner);
        let expedite = Arc::new(Notify::new());
        *inner.expedite.lock() = Some(Arc::clone(&expedite));

        tokio::spawn(async move {
            if let Some(strategy) = strategy {
                match inner.config.effective(strategy) {
                    LoadStrategy::Idle => {
                        debug!("Viewer library load deferred until idle");
                        tokio::select! {
                            _ = tokio::task::yield_now() => {}
                            _ = expedite.notified() => {}
                        }
                    }
                    LoadStrategy::Timeout => {
                        debug!("Viewer library load deferred by {:?}", inner.config.fallback_delay);
                        tokio::select! {
                            _ = tokio::time::sleep(inner.config.fallback_delay) => {}
                            _ = expedite.notified() => {}
                        }
                    }
                }
            }
            *inner.expedite.lock() = None;

            info!("Loading viewer library");
            let next = match inner.fetcher.fetch().await {
                Ok(()) => {
                    info!("Viewer library ready");
                    LibraryState::Ready
                }
                Err(e) => {
                    warn!("Viewer library failed to load: {}", e);
                    LibraryState::Failed(e)
                }
            };
            inner.state.send_replace(next);
        });
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
