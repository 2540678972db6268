/// Feature-flag controlled additional harness debug information
#[cfg(feature = "debug")]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => ({
        ::std::eprint!("[{:>w$}] \t", module_path!(), w = 28);
        ::std::eprintln!($($arg)*);
    })
}

/// Feature-flag controlled additional harness debug information
#[cfg(not(feature = "debug"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
