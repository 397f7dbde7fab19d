//! The ELF loader collaborator, invoked by `execv` after the new address
//! space has been created and before the old one is torn down.

use crate::Result;
use crate::external::{AddrSpace, Vnode};
use alloc::sync::Arc;

/// Loads an executable's segments into a fresh address space and reports
/// the entry point.
pub trait ElfLoader {
    fn load(&self, vnode: &Arc<dyn Vnode>, addrspace: &mut dyn AddrSpace) -> Result<usize>;
}
