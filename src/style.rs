//! Shared overlay chrome stylesheet, tracked as an explicit acquire/release
//! resource.
//!
//! The stylesheet is document-wide presentation state: it must be active
//! while at least one overlay is mounted and gone once the last unmounts.
//! Tracking is by count, not by presence checks, so overlapping mounts
//! cannot tear the style down from under each other.

use std::sync::{Arc, Mutex};

/// Positions the overlay surface exactly over the video and keeps it
/// transparent to pointer input; the info affordance opts back in.
pub const OVERLAY_CHROME_CSS: &str = "\
.framemark-overlay{position:absolute;pointer-events:none;z-index:10;}\
.framemark-overlay canvas{pointer-events:none !important;}\
.framemark-overlay-info{position:absolute;pointer-events:auto;z-index:11;}";

/// Reference-counted owner of the overlay chrome stylesheet.
#[derive(Clone, Debug, Default)]
pub struct StyleRegistry {
    count: Arc<Mutex<usize>>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the stylesheet. It stays active until the last handle drops.
    pub fn acquire(&self) -> StyleHandle {
        let mut count = self.lock();
        *count += 1;
        if *count == 1 {
            tracing::debug!("injecting overlay chrome style");
        }
        StyleHandle {
            count: Arc::clone(&self.count),
        }
    }

    pub fn active(&self) -> bool {
        *self.lock() > 0
    }

    pub fn handle_count(&self) -> usize {
        *self.lock()
    }

    /// The stylesheet text the host should have applied, if any.
    pub fn css(&self) -> Option<&'static str> {
        self.active().then_some(OVERLAY_CHROME_CSS)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Keeps the overlay chrome stylesheet alive. Dropping releases one count;
/// the style is removed when the count reaches zero.
#[derive(Debug)]
pub struct StyleHandle {
    count: Arc<Mutex<usize>>,
}

impl Drop for StyleHandle {
    fn drop(&mut self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count = count.saturating_sub(1);
        if *count == 0 {
            tracing::debug!("removing overlay chrome style");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_is_active_while_any_handle_lives() {
        let registry = StyleRegistry::new();
        assert!(!registry.active());
        assert_eq!(registry.css(), None);

        let first = registry.acquire();
        let second = registry.acquire();
        assert!(registry.active());
        assert_eq!(registry.handle_count(), 2);
        assert_eq!(registry.css(), Some(OVERLAY_CHROME_CSS));

        drop(first);
        assert!(registry.active(), "one overlay still mounted");

        drop(second);
        assert!(!registry.active());
        assert_eq!(registry.css(), None);
    }

    #[test]
    fn reacquire_after_release_works() {
        let registry = StyleRegistry::new();
        drop(registry.acquire());
        assert!(!registry.active());
        let _handle = registry.acquire();
        assert!(registry.active());
    }
}
