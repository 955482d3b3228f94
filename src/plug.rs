//! Plug/socket slot table
//!
//! A container (notebook or paned dialog) and its plug children are separate
//! processes that find each other through a small table in SysV shared
//! memory. Each entry is `{pid, native window handle}`. Entry 0 is a header
//! written by the container: its pid and the number of expected children.
//! Child `N` (1-based) writes entry `N` once its window is realized and then
//! detaches. The container polls until every expected entry has a non-zero
//! handle. There is no lock: each field is a word-sized atomic written once.

use std::io;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::WaitPolicy;
use crate::emission::ProcessControl;
use crate::error::{DialogError, Result};

/// Sleep between two polls of the table
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Time children get to print their result before being told to quit
pub const TEARDOWN_GRACE: Duration = Duration::from_millis(200);

/// One table entry, laid out identically in every process
#[repr(C)]
#[derive(Debug, Default)]
pub struct SlotEntry {
    pub pid: AtomicI32,
    pub handle: AtomicU64,
}

/// Storage backing a slot table
pub trait SlotStore {
    /// Number of entries, header included
    fn capacity(&self) -> usize;

    fn entry(&self, index: usize) -> &SlotEntry;

    /// Called by the container when the table is no longer needed
    fn release(&self) {}

    fn read(&self, index: usize) -> (i32, u64) {
        let entry = self.entry(index);
        (entry.pid.load(Ordering::Acquire), entry.handle.load(Ordering::Acquire))
    }

    /// The handle is stored last so a non-zero handle implies a valid pid
    fn write(&self, index: usize, pid: i32, handle: u64) {
        let entry = self.entry(index);
        entry.pid.store(pid, Ordering::Release);
        entry.handle.store(handle, Ordering::Release);
    }
}

/// Heap backed table, shared between threads
#[derive(Debug)]
pub struct MemoryStore {
    entries: Vec<SlotEntry>,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: (0..capacity).map(|_| SlotEntry::default()).collect(),
        }
    }
}

impl SlotStore for MemoryStore {
    fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn entry(&self, index: usize) -> &SlotEntry {
        &self.entries[index]
    }
}

impl<S: SlotStore + ?Sized> SlotStore for std::sync::Arc<S> {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn entry(&self, index: usize) -> &SlotEntry {
        (**self).entry(index)
    }

    fn release(&self) {
        (**self).release()
    }
}

/// SysV shared memory segment holding the table
#[derive(Debug)]
pub struct SharedSegment {
    id: i32,
    base: *mut SlotEntry,
    capacity: usize,
}

impl SharedSegment {
    /// Create (or reuse) the segment for `key` with `capacity` entries
    pub fn create(key: i32, capacity: usize) -> Result<Self> {
        let size = capacity * std::mem::size_of::<SlotEntry>();
        // SAFETY: shmget only takes plain integers
        let id = unsafe { libc::shmget(key, size, libc::IPC_CREAT | 0o600) };
        if id < 0 {
            return Err(slot_error("create", key));
        }
        Self::attach(id, key, capacity)
    }

    /// Open an existing segment, `None` while the container has not created it
    pub fn open(key: i32) -> Result<Option<Self>> {
        // SAFETY: shmget only takes plain integers
        let id = unsafe { libc::shmget(key, 0, 0) };
        if id < 0 {
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                Some(libc::ENOENT) => Ok(None),
                _ => Err(DialogError::SlotTable(format!("open key {key}: {err}"))),
            };
        }
        let stat = segment_stat(id).ok_or_else(|| slot_error("stat", key))?;
        let capacity = stat.shm_segsz / std::mem::size_of::<SlotEntry>();
        Self::attach(id, key, capacity).map(Some)
    }

    fn attach(id: i32, key: i32, capacity: usize) -> Result<Self> {
        // SAFETY: a null address lets the kernel choose the mapping
        let base = unsafe { libc::shmat(id, std::ptr::null(), 0) };
        if base as isize == -1 {
            return Err(slot_error("attach", key));
        }
        debug!("Attached slot table key {} ({} entries)", key, capacity);
        Ok(Self {
            id,
            base: base.cast(),
            capacity,
        })
    }

    fn attachments(&self) -> usize {
        segment_stat(self.id).map(|s| s.shm_nattch as usize).unwrap_or(0)
    }
}

impl SlotStore for SharedSegment {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn entry(&self, index: usize) -> &SlotEntry {
        assert!(index < self.capacity, "slot {index} out of range");
        // SAFETY: the mapping holds `capacity` entries, zero-filled by the
        // kernel on creation, and stays mapped until drop
        unsafe { &*self.base.add(index) }
    }

    fn release(&self) {
        if self.attachments() <= 1 {
            debug!("Removing slot table segment {}", self.id);
            // SAFETY: IPC_RMID ignores the buffer argument
            unsafe {
                libc::shmctl(self.id, libc::IPC_RMID, std::ptr::null_mut());
            }
        }
    }
}

impl Drop for SharedSegment {
    fn drop(&mut self) {
        // SAFETY: base came from shmat and is detached exactly once
        unsafe {
            libc::shmdt(self.base as *const libc::c_void);
        }
    }
}

fn segment_stat(id: i32) -> Option<libc::shmid_ds> {
    // SAFETY: shmid_ds is plain data; IPC_STAT fills it in
    unsafe {
        let mut stat: libc::shmid_ds = std::mem::zeroed();
        (libc::shmctl(id, libc::IPC_STAT, &mut stat) == 0).then_some(stat)
    }
}

fn slot_error(action: &str, key: i32) -> DialogError {
    DialogError::SlotTable(format!("{action} key {key}: {}", io::Error::last_os_error()))
}

/// Poll `probe` until it yields a value or the policy runs out
pub fn poll_until<T>(what: &str, policy: WaitPolicy, mut probe: impl FnMut() -> Result<Option<T>>) -> Result<T> {
    let started = Instant::now();
    let mut logged = false;
    loop {
        if let Some(value) = probe()? {
            debug!("{} ready after {:?}", what, started.elapsed());
            return Ok(value);
        }
        if !logged {
            debug!("Waiting for {}", what);
            logged = true;
        }
        if let WaitPolicy::Bounded(limit) = policy {
            if started.elapsed() >= limit {
                return Err(DialogError::HandshakeTimeout {
                    what: what.to_string(),
                    waited_ms: limit.as_millis() as u64,
                });
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Child side: one reserved entry in a container's table
pub struct PlugSlot<S: SlotStore> {
    store: S,
    tabnum: usize,
}

impl PlugSlot<SharedSegment> {
    /// Wait for the container's table to appear, then for its header
    pub fn attach(key: i32, tabnum: usize, policy: WaitPolicy) -> Result<Self> {
        let store = poll_until(&format!("slot table {key}"), policy, || SharedSegment::open(key))?;
        Self::new(store, tabnum, policy)
    }
}

impl<S: SlotStore> PlugSlot<S> {
    pub fn new(store: S, tabnum: usize, policy: WaitPolicy) -> Result<Self> {
        if tabnum == 0 || tabnum >= store.capacity() {
            return Err(DialogError::SlotTable(format!(
                "tab number {tabnum} outside 1..{}",
                store.capacity()
            )));
        }
        poll_until("container header", policy, || Ok((store.read(0).1 != 0).then_some(())))?;
        Ok(Self { store, tabnum })
    }

    pub fn tabnum(&self) -> usize {
        self.tabnum
    }

    /// Pid of the container process
    pub fn container_pid(&self) -> i32 {
        self.store.read(0).0
    }

    /// Write our entry and let go of the table
    pub fn publish(self, pid: i32, handle: u64) {
        debug!("Publishing plug {} as pid {} handle 0x{:X}", self.tabnum, pid, handle);
        self.store.write(self.tabnum, pid, handle);
    }
}

/// A child that has reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSlot {
    pub tabnum: usize,
    pub pid: i32,
    pub handle: u64,
}

/// Container side of the table
pub struct SlotTable<S: SlotStore> {
    store: S,
    tabs: usize,
}

impl SlotTable<SharedSegment> {
    pub fn create(key: i32, max_tab: usize, tabs: usize, own_pid: i32) -> Result<Self> {
        let store = SharedSegment::create(key, max_tab + 1)?;
        Self::new(store, tabs, own_pid)
    }
}

impl<S: SlotStore> SlotTable<S> {
    /// Clear stale entries and write the header
    pub fn new(store: S, tabs: usize, own_pid: i32) -> Result<Self> {
        if tabs >= store.capacity() {
            return Err(DialogError::SlotTable(format!(
                "{tabs} tabs do not fit a table of {} entries",
                store.capacity()
            )));
        }
        for index in 1..store.capacity() {
            store.write(index, 0, 0);
        }
        store.write(0, own_pid, tabs as u64);
        Ok(Self { store, tabs })
    }

    pub fn tabs(&self) -> usize {
        self.tabs
    }

    /// Block until every expected child has published its handle
    pub fn wait_children(&self, policy: WaitPolicy) -> Result<Vec<ChildSlot>> {
        poll_until("plug children", policy, || {
            let ready = (1..=self.tabs).filter(|&i| self.store.read(i).1 != 0).count();
            Ok((ready == self.tabs).then_some(()))
        })?;

        Ok((1..=self.tabs)
            .map(|tabnum| {
                let (pid, handle) = self.store.read(tabnum);
                ChildSlot { tabnum, pid, handle }
            })
            .collect())
    }

    /// Ask children to print, then to quit, then drop the table
    pub fn teardown(&self, children: &[ChildSlot], procs: &dyn ProcessControl) {
        for child in children {
            if let Err(e) = procs.send_signal(child.pid, libc::SIGUSR1) {
                warn!("Failed to signal plug {} (pid {}): {}", child.tabnum, child.pid, e);
            }
        }
        if !children.is_empty() {
            thread::sleep(TEARDOWN_GRACE);
        }
        for child in children {
            let _ = procs.send_signal(child.pid, libc::SIGUSR2);
        }
        self.store.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission::tests::RecordingProcesses;
    use std::sync::Arc;

    #[test]
    fn test_children_any_order() {
        let store = Arc::new(MemoryStore::new(5));
        let table = SlotTable::new(Arc::clone(&store), 3, 10).unwrap();

        let handles: Vec<_> = [3usize, 1, 2]
            .into_iter()
            .enumerate()
            .map(|(n, tabnum)| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(5 * n as u64 + 1));
                    let slot = PlugSlot::new(store, tabnum, WaitPolicy::Unbounded).unwrap();
                    assert_eq!(slot.container_pid(), 10);
                    slot.publish(100 + tabnum as i32, 0x1000 + tabnum as u64);
                })
            })
            .collect();

        let children = table.wait_children(WaitPolicy::Unbounded).unwrap();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(children.len(), 3);
        for (i, child) in children.iter().enumerate() {
            assert_eq!(child.tabnum, i + 1);
            assert_eq!(child.pid, 101 + i as i32);
            assert_eq!(child.handle, 0x1001 + i as u64);
        }
    }

    #[test]
    fn test_parent_waits_for_every_slot() {
        let store = Arc::new(MemoryStore::new(4));
        let table = SlotTable::new(Arc::clone(&store), 2, 10).unwrap();
        store.write(1, 101, 0x1);

        let err = table
            .wait_children(WaitPolicy::Bounded(Duration::from_millis(20)))
            .unwrap_err();
        assert!(matches!(err, DialogError::HandshakeTimeout { .. }));

        store.write(2, 102, 0x2);
        assert_eq!(table.wait_children(WaitPolicy::Unbounded).unwrap().len(), 2);
    }

    #[test]
    fn test_child_waits_for_header() {
        let store = Arc::new(MemoryStore::new(3));
        let result = PlugSlot::new(Arc::clone(&store), 1, WaitPolicy::Bounded(Duration::from_millis(10)));
        assert!(matches!(result, Err(DialogError::HandshakeTimeout { .. })));
    }

    #[test]
    fn test_tab_numbers_are_checked() {
        let store = Arc::new(MemoryStore::new(3));
        store.write(0, 1, 1);
        assert!(PlugSlot::new(Arc::clone(&store), 0, WaitPolicy::Unbounded).is_err());
        assert!(PlugSlot::new(Arc::clone(&store), 3, WaitPolicy::Unbounded).is_err());
        assert!(SlotTable::new(Arc::clone(&store), 3, 1).is_err());
    }

    #[test]
    fn test_stale_entries_are_cleared() {
        let store = Arc::new(MemoryStore::new(3));
        store.write(1, 99, 0xdead);
        let _table = SlotTable::new(Arc::clone(&store), 1, 10).unwrap();
        assert_eq!(store.read(1), (0, 0));
        assert_eq!(store.read(0), (10, 1));
    }

    #[test]
    fn test_teardown_signals_children() {
        let store = Arc::new(MemoryStore::new(3));
        let table = SlotTable::new(store, 2, 10).unwrap();
        let children = [
            ChildSlot { tabnum: 1, pid: 201, handle: 1 },
            ChildSlot { tabnum: 2, pid: 202, handle: 2 },
        ];
        let procs = RecordingProcesses::default();
        table.teardown(&children, &procs);
        assert_eq!(
            *procs.sent.borrow(),
            vec![
                (201, libc::SIGUSR1),
                (202, libc::SIGUSR1),
                (201, libc::SIGUSR2),
                (202, libc::SIGUSR2),
            ]
        );
    }
}
