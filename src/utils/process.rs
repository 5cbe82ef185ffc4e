//! Process metadata for the health endpoint.

/// Resident set size of the current process in bytes.
///
/// Read from `/proc/self/status` on Linux; `None` elsewhere or when the file
/// cannot be read.
pub fn resident_memory_bytes() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_rss(&status)
}

/// Extracts the `VmRSS` line (reported in kB) from a `/proc/<pid>/status` dump.
fn parse_vm_rss(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb * 1024)
}
