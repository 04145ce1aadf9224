// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A stable identifier for "this machine, since its last reboot", used by
//! the lock manager to tell a crashed-and-rebooted owner apart from a
//! process that is merely still alive (§4.4).

/// Combines the hostname with the kernel boot time so the identifier
/// changes across a reboot but stays stable for every process started
/// within the same boot, including across container restarts that share
/// the host's boot time.
pub fn boot_id() -> String {
    let hostname = sysinfo::System::host_name().unwrap_or_else(|| "unknown-host".to_string());
    let boot_time = sysinfo::System::boot_time();
    format!("{hostname}:{boot_time}")
}

#[cfg(test)]
#[path = "boot_id_tests.rs"]
mod tests;
