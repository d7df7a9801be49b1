//! Chrome/Chromium sessions driven through `headless_chrome`.
//!
//! `headless_chrome` is synchronous; callers run these sessions on a blocking
//! thread (see `run::analyze_url`).

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use log::debug;
use serde::Deserialize;

use super::{BrowserLauncher, NetworkEvent, NetworkHandler, PageSession};
use crate::config::{BROWSER_ARGS, BROWSER_IDLE_TIMEOUT};
use crate::error_handling::OperationTimeout;
use crate::models::MetaRefresh;

const RESPONSE_HANDLER_NAME: &str = "safe_link_scanner_responses";

/// Lifecycle event marking a parsed document. Later events (`load`,
/// `networkAlmostIdle`) depend on subresources and long-lived connections.
const DOM_READY_EVENT: &str = "DOMContentLoaded";

const META_REFRESH_JS: &str = r#"
    JSON.stringify((() => {
        const el = document.querySelector('meta[http-equiv="refresh"]');
        return el ? { content: el.getAttribute('content') } : null;
    })())
"#;

const PASSWORD_FIELD_JS: &str =
    r#"JSON.stringify(document.querySelector('input[type="password"]') !== null)"#;

const BODY_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

#[derive(Deserialize)]
struct MetaRefreshJs {
    content: Option<String>,
}

/// Launches one headless Chromium per analysis.
#[derive(Debug, Clone)]
pub struct HeadlessLauncher {
    chrome_path: Option<PathBuf>,
    idle_timeout: Duration,
}

impl HeadlessLauncher {
    /// Creates a launcher; `chrome_path` of `None` lets `headless_chrome` locate a browser.
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self {
            chrome_path,
            idle_timeout: BROWSER_IDLE_TIMEOUT,
        }
    }
}

impl BrowserLauncher for HeadlessLauncher {
    type Session = HeadlessSession;

    fn launch(&self) -> Result<HeadlessSession> {
        let args: Vec<&OsStr> = BROWSER_ARGS.iter().map(OsStr::new).collect();
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .path(self.chrome_path.clone())
            .idle_browser_timeout(self.idle_timeout)
            .args(args)
            .build()
            .map_err(|e| anyhow!("Browser launch options error: {}", e))?;

        let browser = Browser::new(options).context("Failed to launch Chrome/Chromium")?;
        let tab = browser.new_tab().context("Failed to create new tab")?;
        debug!("[Headless] Browser launched");

        Ok(HeadlessSession {
            tab,
            _browser: browser,
        })
    }
}

/// A single tab in a dedicated browser process.
///
/// Dropping the session drops the `Browser`, which kills the Chromium process.
pub struct HeadlessSession {
    tab: Arc<Tab>,
    // Declared last so the tab is released before the process is killed.
    _browser: Browser,
}

impl HeadlessSession {
    fn evaluate_json(&self, expression: &str) -> Result<serde_json::Value> {
        let remote = self
            .tab
            .evaluate(expression, false)
            .context("Script evaluation failed")?;
        match remote.value {
            Some(serde_json::Value::String(json)) => {
                serde_json::from_str(&json).context("Script returned malformed JSON")
            }
            other => Err(anyhow!("Unexpected script result: {:?}", other)),
        }
    }
}

fn evaluate_string(tab: &Tab, expression: &str) -> Result<String> {
    let remote = tab
        .evaluate(expression, false)
        .context("Script evaluation failed")?;
    match remote.value {
        Some(serde_json::Value::String(text)) => Ok(text),
        other => Err(anyhow!("Unexpected script result: {:?}", other)),
    }
}

/// Blocks until the main frame reports a parsed document or `deadline` passes.
///
/// Expiry yields an [`OperationTimeout`] carrying the full navigation timeout.
fn wait_for_dom_ready(ready: &Receiver<()>, deadline: Instant, timeout: Duration) -> Result<()> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    match ready.recv_timeout(remaining) {
        Ok(()) => Ok(()),
        Err(RecvTimeoutError::Timeout) => Err(OperationTimeout(timeout).into()),
        Err(RecvTimeoutError::Disconnected) => {
            Err(anyhow!("Page events stopped before the document was parsed"))
        }
    }
}

impl PageSession for HeadlessSession {
    fn subscribe(&mut self, handler: NetworkHandler) -> Result<()> {
        // Registering a response handler also enables the Network domain.
        let on_response = Arc::clone(&handler);
        self.tab
            .register_response_handling(
                RESPONSE_HANDLER_NAME,
                Box::new(move |event_params, _fetch_body| {
                    let response = &event_params.response;
                    on_response(NetworkEvent::Response {
                        url: response.url.clone(),
                        status: response.status as u16,
                    });
                }),
            )
            .map_err(|e| anyhow!("Failed to register response handler: {}", e))?;

        // Redirect hops never produce responseReceived; CDP reports them on
        // the follow-up requestWillBeSent instead.
        let on_request = handler;
        self.tab
            .add_event_listener(Arc::new(move |event: &Event| {
                if let Event::NetworkRequestWillBeSent(sent) = event {
                    if let Some(redirect) = &sent.params.redirect_response {
                        on_request(NetworkEvent::Response {
                            url: redirect.url.clone(),
                            status: redirect.status as u16,
                        });
                    }
                    on_request(NetworkEvent::Request {
                        url: sent.params.request.url.clone(),
                    });
                }
            }))
            .map_err(|e| anyhow!("Failed to attach network listener: {}", e))?;

        Ok(())
    }

    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let started = Instant::now();
        let deadline = started + timeout;

        // Attached before navigating so an early DOMContentLoaded is not missed
        let (ready_tx, ready_rx) = mpsc::channel();
        let main_frame = self.tab.get_target_id().clone();
        let listener = self
            .tab
            .add_event_listener(Arc::new(move |event: &Event| {
                if let Event::PageLifecycleEvent(lifecycle) = event {
                    if lifecycle.params.name == DOM_READY_EVENT
                        && lifecycle.params.frame_id == main_frame
                    {
                        let _ = ready_tx.send(());
                    }
                }
            }))
            .map_err(|e| anyhow!("Failed to attach lifecycle listener: {}", e))?;

        let outcome = self
            .tab
            .navigate_to(url)
            .and_then(|_| wait_for_dom_ready(&ready_rx, deadline, timeout));

        if let Err(e) = self.tab.remove_event_listener(&listener) {
            debug!("[Headless] Failed to detach lifecycle listener: {}", e);
        }

        match outcome {
            Ok(()) => {
                debug!("[Headless] DOM ready for {} in {:?}", url, started.elapsed());
                Ok(())
            }
            Err(e) if e.is::<OperationTimeout>() => Err(e),
            Err(e) if started.elapsed() >= timeout => {
                Err(anyhow::Error::new(OperationTimeout(timeout)).context(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn title(&self) -> Result<String> {
        self.tab.get_title()
    }

    fn content(&self) -> Result<String> {
        self.tab.get_content()
    }

    fn meta_refresh(&self) -> Result<Option<MetaRefresh>> {
        let value = self.evaluate_json(META_REFRESH_JS)?;
        let element: Option<MetaRefreshJs> =
            serde_json::from_value(value).context("Unexpected meta refresh shape")?;
        Ok(element.map(|el| MetaRefresh {
            content: el.content,
        }))
    }

    fn has_password_field(&self) -> Result<bool> {
        let value = self.evaluate_json(PASSWORD_FIELD_JS)?;
        value
            .as_bool()
            .ok_or_else(|| anyhow!("Unexpected password field result: {}", value))
    }

    fn child_frame_urls(&self) -> Result<Vec<Result<String>>> {
        let tree = self
            .tab
            .call_method(Page::GetFrameTree(None))
            .context("Failed to read frame tree")?
            .frame_tree;

        // Depth-first, primary frame excluded
        let mut urls = Vec::new();
        let mut pending: Vec<Page::FrameTree> =
            tree.child_frames.unwrap_or_default().into_iter().rev().collect();
        while let Some(node) = pending.pop() {
            urls.push(Ok(node.frame.url));
            if let Some(children) = node.child_frames {
                pending.extend(children.into_iter().rev());
            }
        }
        Ok(urls)
    }

    fn body_text(&self, timeout: Duration) -> Result<String> {
        // The CDP call itself has no per-call deadline, so wait on a worker
        // thread. A worker that outlives the timeout ends when the browser closes.
        let tab = Arc::clone(&self.tab);
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(evaluate_string(&tab, BODY_TEXT_JS));
        });

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(OperationTimeout(timeout).into()),
            Err(RecvTimeoutError::Disconnected) => {
                Err(anyhow!("Body text worker exited without a result"))
            }
        }
    }
}

impl Drop for HeadlessSession {
    fn drop(&mut self) {
        debug!("[Headless] Closing browser");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_ready_signal_ends_wait() {
        let (tx, rx) = mpsc::channel();
        tx.send(()).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        assert!(wait_for_dom_ready(&rx, deadline, Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_dom_ready_from_other_thread() {
        let (tx, rx) = mpsc::channel();
        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            tx.send(()).unwrap();
            // Keep the channel open like a live listener would
            std::thread::sleep(Duration::from_millis(200));
        });
        let deadline = Instant::now() + Duration::from_secs(5);
        assert!(wait_for_dom_ready(&rx, deadline, Duration::from_secs(5)).is_ok());
        sender.join().unwrap();
    }

    #[test]
    fn test_missing_dom_ready_is_operation_timeout() {
        // Sender kept alive: a page that never finishes parsing, regardless of
        // network activity
        let (_tx, rx) = mpsc::channel::<()>();
        let timeout = Duration::from_millis(50);
        let started = Instant::now();
        let error = wait_for_dom_ready(&rx, started + timeout, timeout).unwrap_err();
        assert!(started.elapsed() >= timeout);
        assert_eq!(
            error.downcast_ref::<OperationTimeout>(),
            Some(&OperationTimeout(timeout))
        );
    }

    #[test]
    fn test_expired_deadline_does_not_block() {
        let (_tx, rx) = mpsc::channel::<()>();
        let timeout = Duration::from_secs(30);
        let deadline = Instant::now();
        let started = Instant::now();
        assert!(wait_for_dom_ready(&rx, deadline, timeout).is_err());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_closed_event_stream_is_not_a_timeout() {
        let (tx, rx) = mpsc::channel::<()>();
        drop(tx);
        let deadline = Instant::now() + Duration::from_secs(5);
        let error = wait_for_dom_ready(&rx, deadline, Duration::from_secs(5)).unwrap_err();
        assert!(!error.chain().any(|c| c.is::<OperationTimeout>()));
    }
}
