//! Scoped table lock.
//!
//! `HashTab::locked` returns a guard that holds one level of the table's
//! lock counter and derefs to the table. While any lock is held the table
//! never rebuilds, so `SlotRef`s taken before the lock stay valid across
//! removals. Dropping the guard unlocks and runs the deferred growth check;
//! call [`LockGuard::unlock`] instead to observe that check's result.

use crate::error::HashTabError;
use crate::hash_tab::HashTab;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

/// RAII guard returned by [`HashTab::locked`].
pub struct LockGuard<'t, 'k> {
    table: &'t mut HashTab<'k>,
}

impl<'t, 'k> LockGuard<'t, 'k> {
    pub(crate) fn new(table: &'t mut HashTab<'k>) -> Self {
        table.lock();
        Self { table }
    }

    /// Release this lock level now and return the result of the growth
    /// check it triggers.
    pub fn unlock(self) -> Result<(), HashTabError> {
        let mut this = ManuallyDrop::new(self);
        this.table.unlock()
    }
}

impl<'t, 'k> Deref for LockGuard<'t, 'k> {
    type Target = HashTab<'k>;

    fn deref(&self) -> &Self::Target {
        &*self.table
    }
}

impl<'t, 'k> DerefMut for LockGuard<'t, 'k> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.table
    }
}

impl<'t, 'k> Drop for LockGuard<'t, 'k> {
    fn drop(&mut self) {
        // A failed rebuild is already recorded in the table's sticky state.
        let _ = self.table.unlock();
    }
}
