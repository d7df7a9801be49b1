// Shared test helpers: a scripted stand-in for the headless browser.
//
// A `PageScript` describes what the fake page does; `ScriptedLauncher` hands
// out sessions that replay it and counts launches and closed sessions.

#![allow(dead_code)] // Each test file uses a different subset

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};

use safe_link_scanner::browser::{BrowserLauncher, NetworkEvent, NetworkHandler, PageSession};
use safe_link_scanner::error_handling::OperationTimeout;
use safe_link_scanner::models::MetaRefresh;

/// Scripted outcome of an operation that can also time out.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Ok(T),
    Fail(String),
    Timeout,
}

impl<T: Clone> Outcome<T> {
    fn replay(&self, timeout: Duration) -> Result<T> {
        match self {
            Outcome::Ok(value) => Ok(value.clone()),
            Outcome::Fail(message) => Err(anyhow!(message.clone())),
            Outcome::Timeout => Err(anyhow::Error::new(OperationTimeout(timeout))
                .context("operation did not finish in time")),
        }
    }
}

/// Behaviour of one fake page.
#[derive(Debug, Clone)]
pub struct PageScript {
    pub launch_error: Option<String>,
    pub subscribe_error: Option<String>,
    /// Delivered while navigating, before the navigation outcome
    pub navigation_events: Vec<NetworkEvent>,
    /// Delivered while the body text query runs (late sub-resources)
    pub late_events: Vec<NetworkEvent>,
    pub navigate: Outcome<()>,
    pub title: Result<String, String>,
    pub content: Result<String, String>,
    pub meta_refresh: Result<Option<MetaRefresh>, String>,
    pub password_field: Result<bool, String>,
    pub frames: Result<Vec<Result<String, String>>, String>,
    pub body_text: Outcome<String>,
}

impl PageScript {
    /// A page that loads cleanly with the given title and nothing else.
    pub fn clean(url: &str) -> Self {
        Self {
            launch_error: None,
            subscribe_error: None,
            navigation_events: vec![
                NetworkEvent::Request { url: url.into() },
                NetworkEvent::Response {
                    url: url.into(),
                    status: 200,
                },
            ],
            late_events: Vec::new(),
            navigate: Outcome::Ok(()),
            title: Ok("Example Domain".into()),
            content: Ok("<html><head><title>Example Domain</title></head><body></body></html>".into()),
            meta_refresh: Ok(None),
            password_field: Ok(false),
            frames: Ok(Vec::new()),
            body_text: Outcome::Ok("Example Domain. This domain is for use in examples.".into()),
        }
    }

    /// A credential-harvesting page: password form, phishing vocabulary,
    /// a foreign iframe and a redirect chain.
    pub fn phishing(url: &str) -> Self {
        let mut script = Self::clean(url);
        script.navigation_events = Vec::new();
        for hop in 0..6 {
            let hop_url = format!("https://hop{hop}.redirect.example/");
            script.navigation_events.push(NetworkEvent::Request {
                url: hop_url.clone(),
            });
            script.navigation_events.push(NetworkEvent::Response {
                url: hop_url,
                status: 302,
            });
        }
        script.navigation_events.push(NetworkEvent::Request { url: url.into() });
        script.title = Ok("Sign in".into());
        script.password_field = Ok(true);
        script.frames = Ok(vec![Ok("https://tracker.evil.tld/x".into())]);
        script.body_text = Outcome::Ok("Your account is suspended. Login to verify.".into());
        script
    }
}

/// Counters shared by a launcher and every session it produced.
#[derive(Debug, Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub closed: AtomicUsize,
}

/// Launcher replaying one script for every URL.
pub struct ScriptedLauncher {
    script: PageScript,
    pub counters: Arc<Counters>,
}

impl ScriptedLauncher {
    pub fn new(script: PageScript) -> Self {
        Self {
            script,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn launches(&self) -> usize {
        self.counters.launches.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }
}

impl BrowserLauncher for ScriptedLauncher {
    type Session = ScriptedSession;

    fn launch(&self) -> Result<ScriptedSession> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.script.launch_error {
            return Err(anyhow!(message.clone()));
        }
        Ok(ScriptedSession::new(
            self.script.clone(),
            Arc::clone(&self.counters),
        ))
    }
}

/// One fake page.
pub struct ScriptedSession {
    script: PageScript,
    handler: Option<NetworkHandler>,
    counters: Arc<Counters>,
}

impl ScriptedSession {
    pub fn new(script: PageScript, counters: Arc<Counters>) -> Self {
        Self {
            script,
            handler: None,
            counters,
        }
    }

    fn emit(&self, events: &[NetworkEvent]) {
        if let Some(handler) = &self.handler {
            for event in events {
                handler(event.clone());
            }
        }
    }
}

fn replay<T: Clone>(result: &Result<T, String>) -> Result<T> {
    result.clone().map_err(|message| anyhow!(message))
}

impl PageSession for ScriptedSession {
    fn subscribe(&mut self, handler: NetworkHandler) -> Result<()> {
        if let Some(message) = &self.script.subscribe_error {
            return Err(anyhow!(message.clone()));
        }
        self.handler = Some(handler);
        Ok(())
    }

    fn navigate(&mut self, _url: &str, timeout: Duration) -> Result<()> {
        self.emit(&self.script.navigation_events);
        self.script.navigate.replay(timeout)
    }

    fn title(&self) -> Result<String> {
        replay(&self.script.title)
    }

    fn content(&self) -> Result<String> {
        replay(&self.script.content)
    }

    fn meta_refresh(&self) -> Result<Option<MetaRefresh>> {
        replay(&self.script.meta_refresh)
    }

    fn has_password_field(&self) -> Result<bool> {
        replay(&self.script.password_field)
    }

    fn child_frame_urls(&self) -> Result<Vec<Result<String>>> {
        let frames = replay(&self.script.frames)?;
        Ok(frames.iter().map(replay).collect())
    }

    fn body_text(&self, timeout: Duration) -> Result<String> {
        self.emit(&self.script.late_events);
        self.script.body_text.replay(timeout)
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}
