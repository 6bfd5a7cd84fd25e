#[cfg(feature = "tracing")]
macro_rules! vtrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "fibgrid", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! vtrace {
    ($($tt:tt)*) => {
        ()
    };
}

#[cfg(feature = "tracing")]
macro_rules! vdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "fibgrid", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! vdebug {
    ($($tt:tt)*) => {
        ()
    };
}

#[cfg(feature = "tracing")]
macro_rules! vwarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "fibgrid", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! vwarn {
    ($($tt:tt)*) => {
        ()
    };
}

/// An integration bug: logs, fails loudly in debug builds, and falls through in release so
/// the caller can degrade (zero rect, skipped index, empty result).
macro_rules! contract_violation {
    ($msg:literal $(, $key:ident = $val:expr)* $(,)?) => {{
        vwarn!($($key = $val,)* $msg);
        debug_assert!(
            false,
            concat!("fibgrid: ", $msg $(, " ", stringify!($key), "={:?}")*)
            $(, $val)*
        );
    }};
}
