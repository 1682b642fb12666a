//! Engine configuration.

/// Tunables fixed when a [`Registry`](crate::Registry) is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Nodes over the same domain object share one set of member nodes.
    pub share_members: bool,
    /// Preview text longer than this many characters is cut and ends in `…`.
    pub preview_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            share_members: true,
            preview_limit: None,
        }
    }
}

impl EngineConfig {
    /// Apply the preview limit.
    pub fn clip_preview(&self, text: String) -> String {
        match self.preview_limit {
            Some(limit) if text.chars().count() > limit => {
                let mut clipped: String = text.chars().take(limit).collect();
                clipped.push('…');
                clipped
            }
            _ => text,
        }
    }
}

#[cfg(test)]
mod tests;
