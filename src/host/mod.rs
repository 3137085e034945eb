//! Interfaces consumed from the view layer.
//!
//! The engine never measures or observes anything by itself. A [`DiagramHost`] supplies element
//! boxes, resize notifications, and the step timer; [`headless::HeadlessHost`] is a deterministic
//! in-process implementation.

use std::{rc::Rc, time::Duration};

use crate::foundation::core::Rect;

pub(crate) mod headless;
pub(crate) mod listeners;

/// Notification callback. Hosts and observers are single-threaded.
pub type Callback = Rc<dyn Fn()>;

/// Handle to a live element whose absolute box can be read on demand.
///
/// Identity, not structural equality, decides whether a registration changed.
pub trait ElementRef: Clone + 'static {
    /// Current absolute bounding box in viewport coordinates.
    fn bounding_box(&self) -> Rect;

    /// Return `true` when both handles refer to the same element.
    fn same_element(&self, other: &Self) -> bool;
}

/// Anything that can report its absolute box.
pub trait BoxSource {
    /// Current absolute bounding box in viewport coordinates.
    fn bounding_box(&self) -> Rect;
}

impl<T> ElementRef for Rc<T>
where
    T: BoxSource + ?Sized + 'static,
{
    fn bounding_box(&self) -> Rect {
        BoxSource::bounding_box(&**self)
    }

    fn same_element(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

/// Services the diagram needs from its surrounding view layer.
pub trait DiagramHost {
    /// Element handle type.
    type Element: ElementRef;

    /// Observe box-size changes of `element`, independent of window resizes.
    ///
    /// Returns `None` when the host cannot observe element boxes; the diagram then falls back to
    /// window-resize-only triggering.
    fn observe_box(&self, element: &Self::Element, on_resize: Callback) -> Option<Subscription>;

    /// Observe window resizes.
    fn observe_window_resize(&self, on_resize: Callback) -> Subscription;

    /// Call `on_tick` every `period` until the returned subscription is released.
    fn start_interval(&self, period: Duration, on_tick: Callback) -> Subscription;
}

/// Releases an observer, listener, or timer when dropped.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a release action.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Release now. Equivalent to dropping.
    pub fn release(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.release.is_some())
            .finish()
    }
}
