//! Read-Write Coordinator
//!
//! Admits any number of concurrent readers OR exactly one writer, never both.
//!
//! State:
//! - **exclusion**: FIFO-fair binary semaphore; held while any operation is active
//! - **read count**: number of active read acquisitions, behind its own guard
//! - **first-reader gate**: serializes readers that must take the semaphore
//!
//! ```text
//! exclusion released                    -> no operation active
//! exclusion held && read count == 0     -> write operation active
//! exclusion held && read count  > 0     -> one or more read operations active
//! ```
//!
//! Readers take the exclusion semaphore only on the 0 -> 1 transition of the
//! read count and give it back on 1 -> 0. Writers take and give it back per
//! operation. The semaphore is not owner-bound: the last reader out releases
//! it even if another thread acquired it.
//!
//! Nothing here is reentrant. A thread holding the write side that asks for
//! either side again blocks forever; `FileCache` guards against that itself.

use parking_lot::{Condvar, Mutex};

/// Ticket-based binary semaphore. Waiters are admitted strictly in arrival order.
#[derive(Debug, Default)]
struct FairSemaphore {
    tickets: Mutex<Tickets>,
    turn: Condvar,
}

#[derive(Debug, Default)]
struct Tickets {
    /// Next ticket to hand out
    next: u64,
    /// Ticket currently allowed to hold the permit
    serving: u64,
}

impl Tickets {
    fn is_free(&self) -> bool {
        self.next == self.serving
    }
}

impl FairSemaphore {
    fn acquire(&self) {
        let mut tickets = self.tickets.lock();
        let ticket = tickets.next;
        tickets.next = tickets.next.wrapping_add(1);
        while tickets.serving != ticket {
            self.turn.wait(&mut tickets);
        }
    }

    /// Non-blocking acquire. Fails if the permit is held or anyone is queued.
    fn try_acquire(&self) -> bool {
        let mut tickets = self.tickets.lock();
        if tickets.is_free() {
            tickets.next = tickets.next.wrapping_add(1);
            true
        } else {
            false
        }
    }

    fn release(&self) {
        let mut tickets = self.tickets.lock();
        if tickets.is_free() {
            tracing::warn!("release called on a coordinator that is not held; ignoring");
            return;
        }
        tickets.serving = tickets.serving.wrapping_add(1);
        drop(tickets);
        self.turn.notify_all();
    }
}

/// Many-readers / one-writer coordinator with FIFO fairness between
/// waiting writers and first readers.
#[derive(Debug, Default)]
pub struct ReadWriteCoordinator {
    exclusion: FairSemaphore,
    read_count: Mutex<usize>,
    /// Held by the reader waiting on `exclusion`; the count guard never is
    first_reader: Mutex<()>,
}

impl ReadWriteCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until read access is granted
    pub fn acquire_read(&self) {
        if self.join_active_readers() {
            return;
        }

        // Later first readers queue here behind the one waiting on the semaphore
        let _gate = self.first_reader.lock();
        if self.join_active_readers() {
            return;
        }
        self.exclusion.acquire();
        *self.read_count.lock() += 1;
    }

    pub fn release_read(&self) {
        let mut count = self.read_count.lock();
        if *count == 0 {
            return;
        }
        *count -= 1;
        if *count == 0 {
            self.exclusion.release();
        }
    }

    /// Non-blocking read acquisition.
    ///
    /// Succeeds immediately while other reads are active; otherwise only if
    /// the exclusion semaphore is free and nobody is queued for it.
    pub fn try_acquire_read(&self) -> bool {
        let mut count = self.read_count.lock();
        if *count > 0 || self.exclusion.try_acquire() {
            *count += 1;
            return true;
        }
        false
    }

    fn join_active_readers(&self) -> bool {
        let mut count = self.read_count.lock();
        if *count > 0 {
            *count += 1;
            return true;
        }
        false
    }

    /// Block until exclusive access is granted
    pub fn acquire_write(&self) {
        self.exclusion.acquire();
    }

    pub fn release_write(&self) {
        self.exclusion.release();
    }

    pub fn try_acquire_write(&self) -> bool {
        self.exclusion.try_acquire()
    }

    /// Number of currently active read acquisitions
    pub fn active_readers(&self) -> usize {
        *self.read_count.lock()
    }

    pub fn read(&self) -> ReadGuard<'_> {
        self.acquire_read();
        ReadGuard { coordinator: self }
    }

    pub fn try_read(&self) -> Option<ReadGuard<'_>> {
        self.try_acquire_read()
            .then_some(ReadGuard { coordinator: self })
    }

    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard { coordinator: self }
    }

    pub fn try_write(&self) -> Option<WriteGuard<'_>> {
        self.try_acquire_write()
            .then_some(WriteGuard { coordinator: self })
    }

    /// Run `action` with read access; released on every exit path, including panics
    pub fn with_read<R>(&self, action: impl FnOnce() -> R) -> R {
        let _guard = self.read();
        action()
    }

    /// Run `action` with exclusive access; released on every exit path, including panics
    pub fn with_write<R>(&self, action: impl FnOnce() -> R) -> R {
        let _guard = self.write();
        action()
    }
}

/// Read access, released on drop
#[must_use = "read access is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ReadGuard<'a> {
    coordinator: &'a ReadWriteCoordinator,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.release_read();
    }
}

/// Exclusive access, released on drop
#[must_use = "write access is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct WriteGuard<'a> {
    coordinator: &'a ReadWriteCoordinator,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.release_write();
    }
}
