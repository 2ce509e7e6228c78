//! Redraw versioning between the update side and the draw side.
//!
//! The container owns an [`UpdateVersion`] and bumps it whenever something
//! that affects the outline's pixels changes. Every draw node remembers the
//! version it last rendered in a [`DrawVersion`]; when the two match, the
//! cached framebuffers are reused and no jump-flood pass runs.

/// Monotonic counter owned by the update side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateVersion(u64);

impl UpdateVersion {
    pub fn new() -> Self {
        Self(0)
    }

    /// Mark everything drawn so far as stale.
    pub fn invalidate(&mut self) {
        self.0 += 1;
    }

    pub fn current(&self) -> u64 {
        self.0
    }
}

/// The version a draw node last rendered, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawVersion {
    last_drawn: Option<u64>,
}

impl DrawVersion {
    pub fn new() -> Self {
        Self { last_drawn: None }
    }

    pub fn needs_redraw(&self, version: u64) -> bool {
        self.last_drawn != Some(version)
    }

    pub fn mark_drawn(&mut self, version: u64) {
        self.last_drawn = Some(version);
    }

    /// Forget the drawn version, e.g. after the framebuffers were released.
    pub fn reset(&mut self) {
        self.last_drawn = None;
    }

    pub fn last_drawn(&self) -> Option<u64> {
        self.last_drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_node_always_redraws() {
        let version = UpdateVersion::new();
        assert!(DrawVersion::new().needs_redraw(version.current()));
    }

    #[test]
    fn test_redraw_only_after_invalidate() {
        let mut version = UpdateVersion::new();
        let mut drawn = DrawVersion::new();

        drawn.mark_drawn(version.current());
        assert!(!drawn.needs_redraw(version.current()));

        version.invalidate();
        assert_eq!(version.current(), 1);
        assert!(drawn.needs_redraw(version.current()));
    }

    #[test]
    fn test_reset_forces_redraw() {
        let mut drawn = DrawVersion::new();
        drawn.mark_drawn(3);
        drawn.reset();
        assert!(drawn.needs_redraw(3));
        assert_eq!(drawn.last_drawn(), None);
    }
}
