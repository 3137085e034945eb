use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::host::{Callback, Subscription};

/// Ordered set of callbacks with subscription-scoped membership.
///
/// `notify` snapshots the set first, so callbacks may subscribe or unsubscribe while being
/// notified.
#[derive(Clone, Default)]
pub(crate) struct ListenerSet {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Callback)>>,
}

impl ListenerSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self, callback: Callback) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.entries.borrow_mut().push((id, callback));

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.entries.borrow_mut().retain(|(eid, _)| *eid != id);
            }
        })
    }

    pub(crate) fn notify(&self) {
        let snapshot: Vec<Callback> = self
            .inner
            .entries
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for cb in snapshot {
            cb();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }
}
