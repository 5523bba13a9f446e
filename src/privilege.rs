//! Whether the current process already holds administrator rights.

/// True for root on unix and for an elevated token on Windows.
#[tracing::instrument]
pub fn is_privileged() -> bool {
    #[cfg(unix)]
    return nix::unistd::geteuid().as_raw() == 0;

    #[cfg(windows)]
    return is_elevated::is_elevated();

    #[cfg(not(any(unix, windows)))]
    false
}
