use std::sync::Arc;
use std::thread;

pub struct FetchResult {
    pub url: String,           // final URL after redirects
    pub requested_url: String, // what we asked for
    pub status: Option<u16>,
    pub body: String,
    pub duration_ms: u128,
    pub error: Option<String>,
}

/// Fetch `url` as text on a background thread and deliver the result
/// through `cb`. The callback always fires exactly once, on both the
/// success and error paths.
pub fn fetch_text(url: String, cb: Arc<dyn Fn(FetchResult) + Send + Sync>) {
    thread::spawn(move || {
        let start = std::time::Instant::now();
        let requested_url = url.clone();

        let client = match reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("swrite/0.1 (+https://crates.io/crates/swrite)")
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                cb(FetchResult {
                    requested_url: requested_url.clone(),
                    url,
                    status: None,
                    body: String::new(),
                    duration_ms: 0,
                    error: Some(format!("client build error: {e}")),
                });
                return;
            }
        };

        let result = (|| -> Result<FetchResult, String> {
            let resp = client.get(&requested_url).send().map_err(|e| e.to_string())?;
            let status = resp.status().as_u16();
            let final_url = resp.url().to_string();
            let body = resp.text().map_err(|e| e.to_string())?;

            let error = if (200..300).contains(&status) {
                None
            } else {
                Some(format!("http status {status}"))
            };

            Ok(FetchResult {
                requested_url: requested_url.clone(),
                url: final_url,
                status: Some(status),
                body,
                duration_ms: start.elapsed().as_millis(),
                error,
            })
        })();

        match result {
            Ok(ok) => {
                log::debug!(
                    target: "net",
                    "fetched {} ({} bytes, {}ms)",
                    ok.url,
                    ok.body.len(),
                    ok.duration_ms
                );
                cb(ok);
            }
            Err(err) => cb(FetchResult {
                requested_url: requested_url.clone(),
                url: requested_url.clone(),
                status: None,
                body: String::new(),
                duration_ms: start.elapsed().as_millis(),
                error: Some(err),
            }),
        }
    });
}
