//! `getpid`/`fork`/`execv`/`waitpid`/`_exit`.

use alloc::boxed::Box;
use alloc::vec::Vec;

use arrayvec::ArrayVec;

use crate::external::{AddrSpace, ElfLoader, Thread, UserSpace, Vfs, copyin, copyinstr, copyout};
use crate::file::OpenFlags;
use crate::param::{MAX_ARG, PATH_MAX};
use crate::process::{ProcessRecord, ProcessTable};
use crate::{Error, Result};

pub fn getpid(proc: &ProcessRecord) -> i32 {
    proc.pid()
}

/// Forks `proc`: the child gets its own descriptors sharing the parent's
/// open-file objects, the same working directory, and a deep copy of the
/// address space and the calling thread's trapframe. Returns the
/// child's pid to the parent; the child's own "fork returned 0" is
/// delivered later, when the scheduler first dispatches it, via
/// [`enter_forked_process`] against the trapframe saved here.
pub fn fork(proc: &ProcessRecord, table: &ProcessTable, thread: &mut dyn Thread) -> Result<i32> {
    let child_fd_table = proc.fd_table().fork_clone();
    let child_cwd = proc.cwd();
    let child_addrspace = match proc.addrspace().try_clone_boxed() {
        Ok(addrspace) => addrspace,
        Err(err) => {
            klog!("fork of pid {} failed to clone address space: {err}", proc.pid());
            return Err(err);
        }
    };
    let child_trapframe = thread.trapframe_mut().try_clone_boxed();
    let child = table.add(proc.pid(), child_fd_table, child_cwd, child_addrspace)?;
    child.install_saved_trapframe(child_trapframe);
    klog!("pid {} forked child pid {}", proc.pid(), child.pid());
    Ok(child.pid())
}

/// A forked child's first return from `fork`, run once by the
/// scheduler when it first dispatches the child's thread: zeroes the
/// return-value and error-flag registers on `child_trapframe` (so the
/// child observes `fork() == 0`), advances its saved program counter
/// past the `fork` trap instruction, and activates `child_addrspace` on
/// the calling hart.
pub fn enter_forked_process(child_thread: &mut dyn Thread, child_addrspace: &dyn AddrSpace) {
    child_thread.trapframe_mut().enter_forked_child();
    child_addrspace.activate();
}

/// Terminates `proc`: records its exit code for a future `waitpid`, and
/// reparents any live children to [`crate::param::NO_PARENT`] so they
/// are never left pointing at a pid that can be reused.
///
/// Does not remove `proc`'s own record — `waitpid` does that once the
/// parent has collected the exit code, so the code survives until
/// someone actually asks for it.
pub fn exit(proc: &ProcessRecord, table: &ProcessTable, exit_code: i32) {
    table.reparent_children(proc.pid());
    proc.mark_exited(mkwait_exit(exit_code));
    klog!("pid {} exited with code {exit_code}", proc.pid());
}

/// Blocks until child `pid` exits, then reaps its record and returns its
/// pid. Validates, in order: `pid` names an occupied slot (`ESRCH`
/// here `ProcessNotFound`); `status_addr` is non-null and 4-byte
/// aligned (`EFAULT`/`BadAddress`); `options == 0` — no job-control
/// extensions are supported (`EINVAL`/`InvalidArgument`); the caller is
/// `pid`'s parent (`ECHILD`/`NoChildProcess`).
///
/// Writes the exit code through `status_addr` via [`copyout`] rather
/// than just overwriting a local pointer variable.
pub fn waitpid(
    proc: &ProcessRecord,
    table: &ProcessTable,
    pid: i32,
    options: i32,
    status_addr: usize,
    user: &dyn UserSpace,
) -> Result<i32> {
    let child = table.get(pid).ok_or(Error::ProcessNotFound)?;
    if status_addr == 0 || status_addr % 4 != 0 {
        return Err(Error::BadAddress);
    }
    if options != 0 {
        return Err(Error::InvalidArgument);
    }
    if child.parent_pid() != proc.pid() {
        return Err(Error::NoChildProcess);
    }
    let exit_code = child.wait_for_exit();
    table.remove(pid);
    copyout(user, status_addr, &exit_code.to_ne_bytes())?;
    klog!("pid {} reaped child pid {pid}", proc.pid());
    Ok(pid)
}

/// Encodes a normal exit status the way `_MKWAIT_EXIT` does: the low
/// byte reserved for a signal number (always 0 here — this subsystem
/// has no signal delivery), the next byte the caller's exit code.
fn mkwait_exit(code: i32) -> i32 {
    (code & 0xff) << 8
}

const PTR_SIZE: usize = core::mem::size_of::<usize>();

/// Packs `argv` into a single buffer laid out the way the target's C
/// ABI expects on the stack: `argv.len() + 1` pointer-sized slots (the
/// last one left zero, the null terminator) followed by each argument's
/// bytes, each individually padded out to a `PTR_SIZE` boundary so the
/// arguments stay aligned. Returns the packed bytes; the pointer slots
/// still hold offsets relative to the start of the buffer; the caller
/// relocates them once it knows where the buffer lands.
fn pack_argv(argv: &[Vec<u8>]) -> Vec<u8> {
    let table_len = (argv.len() + 1) * PTR_SIZE;
    let mut padded_lens = Vec::with_capacity(argv.len());
    let mut total = table_len;
    for arg in argv {
        let rem = arg.len() % PTR_SIZE;
        let pad = if rem == 0 { 0 } else { PTR_SIZE - rem };
        padded_lens.push(arg.len() + pad);
        total += arg.len() + pad;
    }

    let mut buf = alloc::vec![0u8; total];
    let mut offset = table_len;
    for (i, (arg, padded_len)) in argv.iter().zip(&padded_lens).enumerate() {
        buf[i * PTR_SIZE..(i + 1) * PTR_SIZE].copy_from_slice(&offset.to_ne_bytes());
        buf[offset..offset + arg.len()].copy_from_slice(arg);
        offset += padded_len;
    }
    // The null terminator slot at `argv.len() * PTR_SIZE` stays zero from
    // the initial fill.
    buf
}

/// Adds `base` to each of the first `argc` pointer-sized slots in
/// `buf`, turning the buffer-relative offsets [`pack_argv`] wrote into
/// real addresses once `base` (the stack address the buffer will be
/// copied to) is known.
fn relocate_argv_pointers(buf: &mut [u8], argc: usize, base: usize) {
    for i in 0..argc {
        let slot = &mut buf[i * PTR_SIZE..(i + 1) * PTR_SIZE];
        let mut raw = [0u8; PTR_SIZE];
        raw.copy_from_slice(slot);
        let relocated = usize::from_ne_bytes(raw) + base;
        slot.copy_from_slice(&relocated.to_ne_bytes());
    }
}

/// Replaces `proc`'s program image: loads `path` into `new_addrspace`,
/// packs `argv` onto its stack, and only once both succeed does it
/// switch `proc` over and redirect `thread`'s trapframe to the new entry
/// point. A failure at any point before the switch leaves `proc`
/// running its old image untouched.
pub fn execv(
    proc: &ProcessRecord,
    vfs: &dyn Vfs,
    elf: &dyn ElfLoader,
    thread: &mut dyn Thread,
    mut new_addrspace: Box<dyn AddrSpace>,
    path: &str,
    argv: &[Vec<u8>],
    stack_pages: usize,
) -> Result<()> {
    if path.is_empty() {
        return Err(Error::InvalidArgument);
    }
    if argv.len() > MAX_ARG {
        return Err(Error::ArgumentListTooLong);
    }
    let cwd = proc.cwd();
    let vnode = vfs.open(&cwd, path, OpenFlags::empty())?;
    let entry = elf.load(&vnode, &mut *new_addrspace).inspect_err(|err| {
        klog!("exec of {path} by pid {} failed to load: {err}", proc.pid());
    })?;
    let stack_top = new_addrspace.define_stack(stack_pages)?;

    let mut packed = pack_argv(argv);
    let sp = stack_top
        .checked_sub(packed.len())
        .ok_or(Error::ArgumentListTooLong)?;
    relocate_argv_pointers(&mut packed, argv.len(), sp);
    new_addrspace.write_bytes(sp, &packed)?;
    let argv_ptr = sp;

    new_addrspace.activate();
    let trapframe = thread.trapframe_mut();
    trapframe.set_pc(entry);
    trapframe.set_sp(sp);
    trapframe.set_arg0(argv.len());
    trapframe.set_arg1(argv_ptr);
    *proc.addrspace() = new_addrspace;
    Ok(())
}

/// Copies `path` and the `argv` array in from user space before calling
/// [`execv`]: `argv_addr` points at a NUL-terminated array of pointers,
/// each pointing at a NUL-terminated string, walked element-by-element.
/// Stops at the first null pointer; a non-null pointer at index
/// `MAX_ARG` is `ArgumentListTooLong` rather than silently truncated.
pub fn execv_syscall(
    proc: &ProcessRecord,
    vfs: &dyn Vfs,
    elf: &dyn ElfLoader,
    thread: &mut dyn Thread,
    new_addrspace: Box<dyn AddrSpace>,
    user: &dyn UserSpace,
    path_addr: usize,
    argv_addr: usize,
    stack_pages: usize,
) -> Result<()> {
    let mut path_buf = [0u8; PATH_MAX];
    let len = copyinstr(user, path_addr, &mut path_buf)?;
    let path = core::str::from_utf8(&path_buf[..len]).map_err(|_| Error::InvalidArgument)?;

    const PTR_SIZE: usize = core::mem::size_of::<usize>();
    let mut argv: ArrayVec<Vec<u8>, MAX_ARG> = ArrayVec::new();
    for i in 0..=MAX_ARG {
        let mut ptr_buf = [0u8; PTR_SIZE];
        copyin(user, argv_addr + i * PTR_SIZE, &mut ptr_buf)?;
        let ptr = usize::from_ne_bytes(ptr_buf);
        if ptr == 0 {
            break;
        }
        if i == MAX_ARG {
            return Err(Error::ArgumentListTooLong);
        }
        let mut arg_buf = [0u8; PATH_MAX];
        let arg_len = copyinstr(user, ptr, &mut arg_buf)?;
        let mut owned = Vec::with_capacity(arg_len + 1);
        owned.extend_from_slice(&arg_buf[..arg_len]);
        owned.push(0);
        argv.push(owned);
    }

    execv(proc, vfs, elf, thread, new_addrspace, path, &argv, stack_pages)
}
