use std::{collections::HashMap, future::Future, ops::ControlFlow, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;

use super::state::TickSource;
use crate::log_debug;

const ENABLE_LOGS: bool = true;

struct TickHandle {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl TickHandle {
    fn stop(self) {
        self.token.cancel();
        self.handle.abort();
    }

    fn is_live(&self) -> bool {
        !self.token.is_cancelled() && !self.handle.is_finished()
    }
}

/// One periodic task per [`TickSource`]. Every task hangs off a shared root
/// token, so [`Tickers::stop_all`] silences all of them at once and no
/// callback runs after it returns.
pub struct Tickers {
    period: Duration,
    root: CancellationToken,
    handles: HashMap<TickSource, TickHandle>,
}

impl Tickers {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            root: CancellationToken::new(),
            handles: HashMap::new(),
        }
    }

    pub fn is_running(&self, source: TickSource) -> bool {
        self.handles
            .get(&source)
            .map(TickHandle::is_live)
            .unwrap_or(false)
    }

    /// (Re)starts `source`. The first tick lands one full period from now.
    /// The task ends when `on_tick` breaks or the source is stopped.
    pub fn start<F, Fut>(&mut self, source: TickSource, mut on_tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        self.stop(source);
        if self.root.is_cancelled() {
            return;
        }

        let token = self.root.child_token();
        let task_token = token.clone();
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {
                        if on_tick().await.is_break() {
                            break;
                        }
                    }
                }
            }
            log_debug!("{} ticker stopped", source.as_str());
        });

        log_debug!("{} ticker started", source.as_str());
        self.handles.insert(source, TickHandle { token, handle });
    }

    pub fn stop(&mut self, source: TickSource) {
        if let Some(handle) = self.handles.remove(&source) {
            handle.stop();
        }
    }

    /// Final teardown. Later calls to [`Tickers::start`] are ignored.
    pub fn stop_all(&mut self) {
        self.root.cancel();
        for (_, handle) in self.handles.drain() {
            handle.stop();
        }
    }
}

impl Drop for Tickers {
    fn drop(&mut self) {
        self.stop_all();
    }
}
