use bitflags::bitflags;

bitflags! {
    /// Categories of change the host scene graph reports to an element.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Invalidation: u16 {
        /// The draw matrix, colour or blending changed
        const DRAW_INFO = 1 << 0;
        /// Size or position changed without touching the draw matrix
        const MISC_GEOMETRY = 1 << 1;
        /// Size as seen by the parent's auto-sizing changed
        const REQUIRED_PARENT_SIZE_TO_FIT = 1 << 2;
        /// Anything that requires a fresh draw node
        const DRAW_NODE = 1 << 3;
        /// Visibility changed
        const PRESENCE = 1 << 4;
        /// Colour changed
        const COLOUR = 1 << 5;

        const DRAW_SIZE = Self::REQUIRED_PARENT_SIZE_TO_FIT.bits() | Self::MISC_GEOMETRY.bits();
    }
}

/// A cached value's validity, tied to a set of invalidation categories.
///
/// Starts out invalid so the first update always computes the value.
#[derive(Debug, Clone, Copy)]
pub struct LayoutValue {
    triggers: Invalidation,
    valid: bool,
}

impl LayoutValue {
    pub fn new(triggers: Invalidation) -> Self {
        Self {
            triggers,
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn validate(&mut self) {
        self.valid = true;
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Invalidate if `invalidation` overlaps our triggers. Returns whether it did.
    pub fn on_invalidate(&mut self, invalidation: Invalidation) -> bool {
        if !self.triggers.intersects(invalidation) {
            return false;
        }

        let was_valid = self.valid;
        self.valid = false;
        was_valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_invalid() {
        assert!(!LayoutValue::new(Invalidation::DRAW_INFO).is_valid());
    }

    #[test]
    fn test_only_matching_flags_invalidate() {
        let mut value = LayoutValue::new(Invalidation::DRAW_INFO | Invalidation::PRESENCE);
        value.validate();

        assert!(!value.on_invalidate(Invalidation::COLOUR));
        assert!(value.is_valid());

        assert!(value.on_invalidate(Invalidation::DRAW_INFO | Invalidation::COLOUR));
        assert!(!value.is_valid());

        // Already invalid, nothing new happened
        assert!(!value.on_invalidate(Invalidation::PRESENCE));
    }
}
