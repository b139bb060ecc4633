//! Capture and splice script-written markup back into an HTML fragment.
//!
//! Scripts embedded in a fragment that write into the document stream
//! (`document.write` in a browser) normally lose that output
//! when the fragment is processed off-screen. [`Swrite::transform`] rewrites
//! the fragment so everything those scripts would have written appears
//! inline, at the exact spot the writing scripts occupied:
//!
//! 1. Adjacent sibling scripts are grouped into ordered "positions".
//! 2. Each position's scripts run sequentially with their writes captured
//!    into a per-position buffer.
//! 3. The captured markup is fed back through the whole pipeline — written
//!    output may contain further scripts, to unbounded depth — and the
//!    fully resolved result replaces the position's script nodes.
//! 4. Concurrent top-level calls are serialized: one capture session at a
//!    time, later requests queued FIFO.
//!
//! Script execution itself is a capability supplied by the caller (the
//! [`script::Engine`] trait); executed code emits markup through
//! [`script::sink::write`].
//!
//! Known limitations, inherited by design: scripts that are not contiguous
//! siblings never group; writes issued outside the synchronous (or
//! single-remote-fetch) execution window of a harvested script are dropped;
//! a hung remote fetch stalls the session — there are no timeouts.

mod harvest;
mod position;
mod queue;

use std::panic;
use std::sync::Arc;
use std::thread;

use html::Node;
use script::{Engine, HttpLoader, Loader};

use crate::queue::{Call, CallQueue};

pub struct Swrite {
    inner: Arc<Inner>,
}

struct Inner {
    engine: Arc<dyn Engine>,
    loader: Arc<dyn Loader>,
    queue: CallQueue,
}

impl Swrite {
    /// Pipeline with the default HTTP loader for remote scripts.
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self::with_loader(engine, Arc::new(HttpLoader))
    }

    pub fn with_loader(engine: Arc<dyn Engine>, loader: Arc<dyn Loader>) -> Self {
        Swrite {
            inner: Arc::new(Inner {
                engine,
                loader,
                queue: CallQueue::new(),
            }),
        }
    }

    /// Rewrite `html`, delivering the result through `callback`.
    ///
    /// The callback fires exactly once, from a worker thread, eventually —
    /// unless a remote script hangs, which stalls the session indefinitely.
    /// There is no error channel: a failing script contributes whatever it
    /// wrote before failing, and the callback still receives markup. If the
    /// engine panics, the call degrades to its input unchanged and the
    /// queue keeps serving later calls.
    ///
    /// At most one capture session runs per `Swrite` instance; calls made
    /// while one is active are queued and served in arrival order.
    pub fn transform(
        &self,
        html: impl Into<String>,
        callback: impl FnOnce(String) + Send + 'static,
    ) {
        let call = Call {
            html: html.into(),
            callback: Box::new(callback),
        };
        if !self.inner.queue.submit(call) {
            // A session is already draining the queue.
            return;
        }

        let inner = Arc::clone(&self.inner);
        thread::spawn(move || {
            // The queue only clears its session flag when this loop drains
            // it to empty, so an unwind escaping here would leave the flag
            // set and starve every later call. Catch panics from the
            // engine and from caller callbacks and keep draining.
            while let Some(Call { html, callback }) = inner.queue.next() {
                log::debug!(target: "swrite", "session start ({} bytes)", html.len());
                let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                    transform_now(inner.engine.as_ref(), inner.loader.as_ref(), &html)
                }))
                .unwrap_or_else(|_| {
                    log::warn!(target: "swrite", "session panicked; returning input unchanged");
                    html.clone()
                });
                log::debug!(target: "swrite", "session done ({} bytes)", result.len());
                if panic::catch_unwind(panic::AssertUnwindSafe(move || callback(result))).is_err() {
                    log::warn!(target: "swrite", "transform callback panicked");
                }
            }
        });
    }
}

/// One full pipeline pass: parse, assign positions, harvest them all,
/// serialize. Also the recursion target for resolving captured output.
pub(crate) fn transform_now(engine: &dyn Engine, loader: &dyn Loader, html: &str) -> String {
    let mut root: Node = html::parse(html);
    position::assign_positions(&mut root);
    harvest::harvest_all_positions(engine, loader, &mut root);
    html::serialize(&root)
}
