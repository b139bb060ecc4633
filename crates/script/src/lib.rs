//! Script execution seam for the write-capture pipeline.
//!
//! The pipeline never evaluates code itself; the host supplies an
//! [`Engine`] ("run this code unit with the effects of top-level
//! execution"). Remote code arrives through a [`Loader`], which defaults to
//! an HTTP fetch. Whatever the engine runs can emit markup through
//! [`sink::write`]; the surrounding harvest decides where those writes go.

pub mod sink;

mod run;

use std::fmt;
use std::sync::Arc;

pub use crate::run::run_script;

/// Raised by an [`Engine`] when a code unit fails. The pipeline logs and
/// discards these; a broken script must not abort the harvest.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError(pub String);

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for EvalError {}

/// Executes one code unit in the ambient global scope.
///
/// Implementations are expected to route the code's document writes to
/// [`sink::write`] and must be callable from the session worker thread.
pub trait Engine: Send + Sync {
    fn eval(&self, code: &str) -> Result<(), EvalError>;
}

/// Fetches remote script code asynchronously.
///
/// `done` must be invoked exactly once, on success or failure, from any
/// thread.
pub trait Loader: Send + Sync {
    fn fetch(&self, url: &str, done: Arc<dyn Fn(Result<String, String>) + Send + Sync>);
}

/// The default [`Loader`]: HTTP(S) GET via the `net` crate.
pub struct HttpLoader;

impl Loader for HttpLoader {
    fn fetch(&self, url: &str, done: Arc<dyn Fn(Result<String, String>) + Send + Sync>) {
        net::fetch_text(
            url.to_string(),
            Arc::new(move |result: net::FetchResult| match result.error {
                None => done(Ok(result.body)),
                Some(error) => done(Err(error)),
            }),
        );
    }
}
