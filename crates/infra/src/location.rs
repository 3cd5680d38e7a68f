//! In-process `Location`
//!
//! Stands in for the browser's address bar when the client runs outside a
//! browser: the embedder feeds it the URL the user arrived on and reads back
//! where the flow wants to go next.

use parking_lot::RwLock;
use passage_core::Location;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug)]
struct Inner {
    current: Url,
    last_redirect: Option<Url>,
}

/// `Location` backed by a URL held in memory
#[derive(Debug)]
pub struct MemoryLocation {
    inner: RwLock<Inner>,
}

impl MemoryLocation {
    /// Start on `current`
    pub fn new(current: Url) -> Self {
        Self { inner: RwLock::new(Inner { current, last_redirect: None }) }
    }

    /// Simulate the browser arriving on `url` (e.g. the OAuth redirect)
    pub fn arrive(&self, url: Url) {
        self.inner.write().current = url;
    }

    /// Last full-page redirect requested, if any
    pub fn last_redirect(&self) -> Option<Url> {
        self.inner.read().last_redirect.clone()
    }
}

impl Location for MemoryLocation {
    fn current_url(&self) -> Url {
        self.inner.read().current.clone()
    }

    fn clear_query(&self) {
        self.inner.write().current.set_query(None);
    }

    fn redirect(&self, url: &Url) {
        debug!(origin = %url.origin().ascii_serialization(), "redirecting");
        self.inner.write().last_redirect = Some(url.clone());
    }

    fn navigate(&self, route: &str) {
        let mut inner = self.inner.write();
        match inner.current.join(route) {
            Ok(next) => {
                debug!(route, "navigating");
                inner.current = next;
            }
            Err(err) => warn!(route, error = %err, "ignoring unroutable navigation"),
        }
    }
}
