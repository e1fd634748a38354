//! Authentication-exempt path prefixes

use std::sync::Arc;

/// Path prefixes that skip authentication
///
/// A prefix matches the path itself and anything below it on a `/` boundary,
/// so `/health` covers `/health` and `/health/live` but not `/healthz`.
#[derive(Debug, Clone)]
pub struct ExemptPaths {
    prefixes: Arc<[String]>,
}

impl ExemptPaths {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .filter_map(|p| normalize(p.as_ref()))
            .collect::<Vec<_>>();

        Self {
            prefixes: prefixes.into(),
        }
    }

    /// Parse a comma separated list such as `/identity/login,/health`
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| matches_prefix(path, prefix))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for ExemptPaths {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

/// `true` if `path` equals `prefix` or continues it with a `/`
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .map(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(false)
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        // "/" would exempt every path
        if !raw.trim().is_empty() {
            tracing::warn!(prefix = raw, "Ignoring root exempt prefix");
        }
        return None;
    }
    if !trimmed.starts_with('/') {
        tracing::warn!(prefix = raw, "Ignoring exempt prefix without leading slash");
        return None;
    }
    Some(trimmed.to_string())
}
