//! Unix process-table scanning for `stopProcessName` tracking (§4.2).
//!
//! No crate in the dependency stack enumerates processes by image name, so
//! this walks `/proc` directly, the same cfg-gated-to-unix shape other
//! process-control code in the wild uses for signal delivery.

use std::path::Path;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use crate::ProcessError;

/// Pids of processes whose image name matches `name` exactly, read from
/// argv[0] of `/proc/<pid>/cmdline` rather than `comm` (which Linux
/// truncates to 15 bytes and would never match a longer executable name
/// like `RimWorldWin64.exe`).
pub fn find_pids_by_name(name: &str) -> std::io::Result<Vec<i32>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir("/proc")? {
        let entry = entry?;
        let pid: i32 = match entry.file_name().to_str().and_then(|s| s.parse().ok()) {
            Some(pid) => pid,
            None => continue,
        };

        if comm_matches(&entry.path(), name) {
            found.push(pid);
        }
    }
    Ok(found)
}

fn comm_matches(proc_dir: &Path, name: &str) -> bool {
    match argv0(proc_dir) {
        Some(argv0) => argv0 == name,
        None => false,
    }
}

/// argv[0] of `/proc/<pid>/cmdline`, which is NUL-separated, taking just
/// the basename so a full path in argv[0] still matches a bare image name.
fn argv0(proc_dir: &Path) -> Option<String> {
    let cmdline = std::fs::read(proc_dir.join("cmdline")).ok()?;
    parse_argv0(&cmdline)
}

fn parse_argv0(cmdline: &[u8]) -> Option<String> {
    let raw = cmdline.split(|&b| b == 0).next()?;
    let raw = std::str::from_utf8(raw).ok()?;
    Path::new(raw).file_name()?.to_str().map(str::to_string)
}

pub fn is_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

pub fn send_signal(pid: i32, signal: Signal) -> Result<(), ProcessError> {
    kill(Pid::from_raw(pid), Some(signal))
        .map_err(|errno| ProcessError::Io(std::io::Error::from_raw_os_error(errno as i32)))
}
