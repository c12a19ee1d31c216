//! Cross-origin policy for the event channel.
//!
//! A WebSocket upgrade is only accepted when the request's `Origin` header
//! matches the configured allow-list. A single `"*"` entry allows any
//! origin. Requests without an `Origin` header (non-browser clients) are
//! accepted; the policy exists to restrict which web pages may open the
//! channel, not to authenticate clients.

use std::collections::HashSet;

/// Compiled origin allow-list.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allow_any: bool,
    origins: HashSet<String>,
}

impl OriginPolicy {
    /// Compile a policy from configured origin entries.
    ///
    /// Entries are compared case-insensitively and without trailing slashes.
    #[must_use]
    pub fn new(entries: &[String]) -> Self {
        let allow_any = entries.iter().any(|e| e == "*");
        let origins = entries
            .iter()
            .filter(|e| e.as_str() != "*")
            .map(|e| normalize(e))
            .collect();
        Self { allow_any, origins }
    }

    /// Check whether a request origin is allowed.
    ///
    /// `None` means the request carried no `Origin` header.
    #[must_use]
    pub fn allows(&self, origin: Option<&str>) -> bool {
        if self.allow_any {
            return true;
        }
        match origin {
            None => true,
            Some(o) => self.origins.contains(&normalize(o)),
        }
    }
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}
