//! Host-testable mocks of every external collaborator, backing the
//! `#[cfg(test)]` unit tests throughout this crate the way a real
//! kernel's boot sequence backs a full integration test.
//!
//! This module only exists under `cfg(test)` — it is not part of the
//! `no_std` build.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, Once};

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::external::scheduler::{ChanId, ThreadId};
use crate::external::vfs::FileStat;
use crate::external::{AddrSpace, Scheduler, Vfs, Vnode};
use crate::file::OpenFlags;
use crate::{Error, Result};

thread_local! {
    static THREAD_ID: u64 = next_thread_id();
}

fn next_thread_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Forces this thread's id to be assigned, so it shows up distinct from
/// the thread that spawned it. Calling `current_thread` would do this
/// lazily anyway; tests call this up front for clarity.
pub fn register_thread() {
    THREAD_ID.with(|_| {});
}

struct Channel {
    generation: Mutex<u64>,
    cv: Condvar,
}

/// A [`Scheduler`] backed by real OS threads and condvars, standing in
/// for the bare-metal scheduler this subsystem never implements itself.
pub struct HostScheduler {
    channels: Mutex<HashMap<ChanId, Arc<Channel>>>,
}

impl HostScheduler {
    const fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn channel(&self, chan: ChanId) -> Arc<Channel> {
        let mut channels = self.channels.lock().unwrap();
        Arc::clone(channels.entry(chan).or_insert_with(|| {
            Arc::new(Channel {
                generation: Mutex::new(0),
                cv: Condvar::new(),
            })
        }))
    }
}

impl Scheduler for HostScheduler {
    fn current_thread(&self) -> ThreadId {
        ThreadId(THREAD_ID.with(|id| *id))
    }

    fn park(&self, chan: ChanId, release_outer: &mut dyn FnMut()) {
        let channel = self.channel(chan);
        let mut generation = channel.generation.lock().unwrap();
        let start = *generation;
        release_outer();
        while *generation == start {
            generation = channel.cv.wait(generation).unwrap();
        }
    }

    fn wake_one(&self, chan: ChanId) {
        let channel = self.channel(chan);
        let mut generation = channel.generation.lock().unwrap();
        *generation += 1;
        channel.cv.notify_one();
    }

    fn wake_all(&self, chan: ChanId) {
        let channel = self.channel(chan);
        let mut generation = channel.generation.lock().unwrap();
        *generation += 1;
        channel.cv.notify_all();
    }
}

static HOST_SCHEDULER: HostScheduler = HostScheduler::new();

/// Installs [`HostScheduler`] as the global scheduler, if one has not
/// already been installed by an earlier test in this process. Idempotent
/// and safe to call at the top of every test.
pub fn install() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let _ = crate::external::SCHEDULER.try_init(&HOST_SCHEDULER);
    });
}

/// An in-memory file, shared by every open handle to it.
struct MemFile {
    data: Mutex<Vec<u8>>,
    is_directory: bool,
}

/// A [`Vnode`] over an [`MemFile`].
pub struct MemVnode {
    file: Arc<MemFile>,
}

impl Vnode for MemVnode {
    fn read(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let data = self.file.data.lock().unwrap();
        let offset = offset as usize;
        if offset >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(data.len() - offset);
        buf[..n].copy_from_slice(&data[offset..offset + n]);
        Ok(n)
    }

    fn write(&self, offset: u64, buf: &[u8]) -> Result<usize> {
        let mut data = self.file.data.lock().unwrap();
        let offset = offset as usize;
        if data.len() < offset + buf.len() {
            data.resize(offset + buf.len(), 0);
        }
        data[offset..offset + buf.len()].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn stat(&self) -> Result<FileStat> {
        Ok(FileStat {
            size: self.file.data.lock().unwrap().len() as u64,
            is_directory: self.file.is_directory,
        })
    }

    fn is_seekable(&self) -> bool {
        !self.file.is_directory
    }
}

/// A trivially flat in-memory filesystem: every path is a top-level name
/// in a single directory, good enough to exercise `open`/`chdir`'s
/// contracts without modeling real path resolution.
pub struct MemVfs {
    root: Arc<dyn Vnode>,
    files: Mutex<HashMap<String, Arc<MemFile>>>,
}

impl MemVfs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            root: Arc::new(MemVnode {
                file: Arc::new(MemFile {
                    data: Mutex::new(Vec::new()),
                    is_directory: true,
                }),
            }),
            files: Mutex::new(HashMap::new()),
        })
    }
}

impl Default for MemVfs {
    fn default() -> Self {
        unreachable!("use MemVfs::new, which returns an Arc")
    }
}

impl Vfs for MemVfs {
    fn open(&self, _cwd: &Arc<dyn Vnode>, path: &str, flags: OpenFlags) -> Result<Arc<dyn Vnode>> {
        let mut files = self.files.lock().unwrap();
        if let Some(file) = files.get(path) {
            if flags.contains(OpenFlags::EXCL) && flags.contains(OpenFlags::CREATE) {
                return Err(Error::AlreadyExists);
            }
            if flags.contains(OpenFlags::TRUNC) {
                file.data.lock().unwrap().clear();
            }
            return Ok(Arc::new(MemVnode {
                file: Arc::clone(file),
            }));
        }
        if !flags.contains(OpenFlags::CREATE) {
            return Err(Error::FsEntryNotFound);
        }
        let file = Arc::new(MemFile {
            data: Mutex::new(Vec::new()),
            is_directory: false,
        });
        files.insert(path.into(), Arc::clone(&file));
        Ok(Arc::new(MemVnode { file }))
    }

    fn chdir(&self, _cwd: &Arc<dyn Vnode>, path: &str) -> Result<Arc<dyn Vnode>> {
        if path == "/" {
            return Ok(Arc::clone(&self.root));
        }
        Err(Error::NotADirectory)
    }

    fn getcwd(&self, _cwd: &Arc<dyn Vnode>) -> Result<String> {
        Ok("/".into())
    }

    fn root(&self) -> Arc<dyn Vnode> {
        Arc::clone(&self.root)
    }
}

/// A no-op [`AddrSpace`], sufficient for exercising `fork`/`execv`'s
/// bookkeeping without a real MMU. `write_bytes` records into a sparse
/// byte map keyed by address rather than a flat buffer, since the
/// range `execv` writes into is never pre-allocated.
///
/// The map lives behind an `Arc<Mutex<_>>` so a test can keep a handle
/// (via [`MockAddrSpace::memory_handle`]) to inspect what was written
/// even after the `Box<dyn AddrSpace>` itself has been moved into
/// `execv`.
pub struct MockAddrSpace {
    pub stack_top: usize,
    memory: Arc<Mutex<HashMap<usize, u8>>>,
}

impl MockAddrSpace {
    pub fn new() -> Self {
        Self {
            stack_top: 0,
            memory: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// A handle onto this address space's backing memory, independent
    /// of whatever owns the `MockAddrSpace` itself.
    pub fn memory_handle(&self) -> Arc<Mutex<HashMap<usize, u8>>> {
        Arc::clone(&self.memory)
    }
}

impl Default for MockAddrSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl AddrSpace for MockAddrSpace {
    fn try_clone_boxed(&self) -> Result<alloc::boxed::Box<dyn AddrSpace>> {
        let copy = self.memory.lock().unwrap().clone();
        Ok(alloc::boxed::Box::new(MockAddrSpace {
            stack_top: self.stack_top,
            memory: Arc::new(Mutex::new(copy)),
        }))
    }

    fn activate(&self) {}

    fn define_stack(&mut self, npages: usize) -> Result<usize> {
        self.stack_top = npages * 4096;
        Ok(self.stack_top)
    }

    fn write_bytes(&mut self, addr: usize, bytes: &[u8]) -> Result<()> {
        let mut memory = self.memory.lock().unwrap();
        for (i, byte) in bytes.iter().enumerate() {
            memory.insert(addr + i, *byte);
        }
        Ok(())
    }
}

/// Reads back `len` bytes written at `addr` in a [`MockAddrSpace`]'s
/// memory, for tests that want to check what `execv` actually placed
/// on the stack.
pub fn read_addrspace_bytes(memory: &Mutex<HashMap<usize, u8>>, addr: usize, len: usize) -> Vec<u8> {
    let memory = memory.lock().unwrap();
    (addr..addr + len)
        .map(|a| *memory.get(&a).unwrap_or(&0))
        .collect()
}

/// An [`ElfLoader`] that accepts any vnode whose contents start with the
/// four bytes `b"\x7fELF"` and reports a fixed entry point, standing in
/// for a real ELF parser.
pub struct MockElfLoader {
    pub entry: usize,
}

impl crate::external::ElfLoader for MockElfLoader {
    fn load(
        &self,
        vnode: &Arc<dyn Vnode>,
        _addrspace: &mut dyn AddrSpace,
    ) -> Result<usize> {
        let mut header = [0u8; 4];
        let n = vnode.read(0, &mut header)?;
        if n < 4 || &header != b"\x7fELF" {
            return Err(Error::InvalidExecutable);
        }
        Ok(self.entry)
    }
}

/// A [`crate::external::TrapFrame`] recording what was set on it, so
/// tests can assert `execv` rewrote the right registers.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockTrapFrame {
    pub pc: usize,
    pub sp: usize,
    pub arg0: usize,
    pub arg1: usize,
    pub return_value: usize,
    pub error_flag: bool,
}

/// Width, in bytes, `enter_forked_child` advances a saved `pc` by —
/// standing in for the size of the trap instruction that got the
/// kernel into `fork` in the first place.
const TRAP_INSTRUCTION_WIDTH: usize = 4;

impl crate::external::TrapFrame for MockTrapFrame {
    fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    fn set_sp(&mut self, sp: usize) {
        self.sp = sp;
    }

    fn set_arg0(&mut self, value: usize) {
        self.arg0 = value;
    }

    fn set_arg1(&mut self, value: usize) {
        self.arg1 = value;
    }

    fn try_clone_boxed(&self) -> alloc::boxed::Box<dyn crate::external::TrapFrame> {
        alloc::boxed::Box::new(*self)
    }

    fn enter_forked_child(&mut self) {
        self.return_value = 0;
        self.error_flag = false;
        self.pc += TRAP_INSTRUCTION_WIDTH;
    }
}

/// A [`crate::external::Thread`] wrapping a single [`MockTrapFrame`].
pub struct MockThread {
    pub trapframe: MockTrapFrame,
}

impl crate::external::Thread for MockThread {
    fn trapframe_mut(&mut self) -> &mut dyn crate::external::TrapFrame {
        &mut self.trapframe
    }
}

/// A [`UserSpace`] backed by a flat in-process byte buffer standing in
/// for real user virtual memory: address `n` is byte `n` of the buffer.
pub struct MockUserSpace {
    memory: Mutex<Vec<u8>>,
}

impl MockUserSpace {
    pub fn new(size: usize) -> Self {
        Self {
            memory: Mutex::new(alloc::vec![0u8; size]),
        }
    }
}

impl crate::external::UserSpace for MockUserSpace {
    fn copyin(&self, src: usize, buf: &mut [u8]) -> Result<()> {
        let memory = self.memory.lock().unwrap();
        let end = src.checked_add(buf.len()).ok_or(Error::BadAddress)?;
        if end > memory.len() {
            return Err(Error::BadAddress);
        }
        buf.copy_from_slice(&memory[src..end]);
        Ok(())
    }

    fn copyout(&self, dst: usize, buf: &[u8]) -> Result<()> {
        let mut memory = self.memory.lock().unwrap();
        let end = dst.checked_add(buf.len()).ok_or(Error::BadAddress)?;
        if end > memory.len() {
            return Err(Error::BadAddress);
        }
        memory[dst..end].copy_from_slice(buf);
        Ok(())
    }
}

/// A minimal process record for syscall-level tests: cwd at the root,
/// stdio installed with three independent vnodes, no parent. Tests that
/// need more than one live process (e.g. to exercise `waitpid`'s
/// parent-check) must pass distinct `pid`s themselves — this helper
/// never touches a [`crate::process::ProcessTable`], so it cannot
/// allocate one for you.
pub fn new_test_process(vfs: &Arc<MemVfs>, pid: i32) -> crate::process::ProcessRecord {
    let root = vfs.root();
    let mut fd_table = crate::fd_table::FdTable::new();
    let stdin = vfs.open(&root, "stdin", OpenFlags::CREATE).unwrap();
    let stdout = vfs.open(&root, "stdout", OpenFlags::CREATE).unwrap();
    let stderr = vfs.open(&root, "stderr", OpenFlags::CREATE).unwrap();
    fd_table.install_stdio(stdin, stdout, stderr);
    crate::process::ProcessRecord::new(
        pid,
        crate::param::NO_PARENT,
        fd_table,
        root,
        alloc::boxed::Box::new(MockAddrSpace::new()),
    )
}
