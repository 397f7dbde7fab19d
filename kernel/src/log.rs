//! One-line-per-event logging.
//!
//! There is no console device in this crate (that belongs to the virtual
//! filesystem living outside it); `klog!` is a thin facade so call sites
//! read like an ordinary `println!` call, and the test harness can
//! actually see the output. Outside `cfg(test)` it is a no-op.

#[cfg(test)]
#[macro_export]
macro_rules! klog {
    ($($arg:tt)*) => {
        ::std::eprintln!($($arg)*)
    };
}

#[cfg(not(test))]
#[macro_export]
macro_rules! klog {
    ($($arg:tt)*) => {
        let _ = ($($arg)*,);
    };
}
