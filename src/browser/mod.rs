//! Browser automation seam.
//!
//! The collector only talks to a browser through [`BrowserLauncher`] and
//! [`PageSession`]. The production implementation drives Chrome/Chromium via
//! `headless_chrome`; tests substitute scripted sessions.
//!
//! Every method is fallible on its own so that one failed DOM query never
//! prevents the others from running. Implementations report an expired
//! timeout by returning an error whose chain contains
//! [`OperationTimeout`](crate::error_handling::OperationTimeout).

mod headless;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::models::MetaRefresh;

pub use headless::{HeadlessLauncher, HeadlessSession};

/// A network event delivered while the page loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    /// An outbound request is about to be sent
    Request {
        /// Request URL
        url: String,
    },
    /// A response (including redirect hops) was received
    Response {
        /// Response URL
        url: String,
        /// HTTP status code
        status: u16,
    },
}

/// Callback invoked for every network event, in delivery order.
pub type NetworkHandler = Arc<dyn Fn(NetworkEvent) + Send + Sync>;

/// Starts isolated browser instances.
pub trait BrowserLauncher {
    /// Session type produced by this launcher.
    type Session: PageSession;

    /// Starts a fresh browser and opens one page.
    ///
    /// The browser is shut down when the returned session is dropped.
    fn launch(&self) -> Result<Self::Session>;
}

/// One page in one browser, owned by a single analysis.
pub trait PageSession {
    /// Attaches a handler for request and response events.
    ///
    /// Must be called before [`navigate`](Self::navigate) to see the initial
    /// document request.
    fn subscribe(&mut self, handler: NetworkHandler) -> Result<()>;

    /// Loads `url` and waits until the document has been parsed.
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Title of the loaded document.
    fn title(&self) -> Result<String>;

    /// Serialized document markup.
    fn content(&self) -> Result<String>;

    /// First `meta[http-equiv="refresh"]` element, if any.
    fn meta_refresh(&self) -> Result<Option<MetaRefresh>>;

    /// Whether an `input[type="password"]` element exists.
    fn has_password_field(&self) -> Result<bool>;

    /// URLs of every frame except the primary one.
    ///
    /// The outer result fails when frames cannot be enumerated at all; an
    /// inner error marks one frame whose URL could not be read.
    fn child_frame_urls(&self) -> Result<Vec<Result<String>>>;

    /// Plain text of the document body.
    fn body_text(&self, timeout: Duration) -> Result<String>;
}
