use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use html::scripts::ScriptSource;

use crate::{Engine, Loader};

/// Execute one script to completion.
///
/// Inline code runs immediately. Remote code is fetched through the loader
/// and evaluated on *this* thread once it arrives, so writes land in
/// whatever sink the caller has active. All failure paths (eval error,
/// fetch error, loader dropping its callback) are logged and swallowed:
/// the harvest proceeds as if the script had nothing further to do.
pub fn run_script(engine: &dyn Engine, loader: &dyn Loader, script: &ScriptSource) {
    match script {
        ScriptSource::Inline(code) => eval_swallowing(engine, code, "inline script"),
        ScriptSource::Remote(url) => {
            let (tx, rx) = mpsc::channel();
            let tx = Mutex::new(tx);
            loader.fetch(
                url,
                Arc::new(move |result| {
                    if let Ok(tx) = tx.lock() {
                        let _ = tx.send(result);
                    }
                }),
            );
            match rx.recv() {
                Ok(Ok(code)) => eval_swallowing(engine, &code, url),
                Ok(Err(error)) => {
                    log::warn!(target: "script", "remote script {url} failed to load: {error}");
                }
                Err(_) => {
                    log::warn!(target: "script", "loader for {url} never completed");
                }
            }
        }
    }
}

fn eval_swallowing(engine: &dyn Engine, code: &str, what: &str) {
    if let Err(error) = engine.eval(code) {
        log::warn!(target: "script", "{what} failed: {error}");
    }
}
