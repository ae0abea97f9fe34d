//! XDG-compliant log directory management
//!
//! Logs are stored in `$XDG_STATE_HOME/objecttext/logs/` (typically
//! `~/.local/state/objecttext/logs/`). Each run writes a PID-named file so
//! concurrent checks do not clobber each other; files left by dead processes
//! are removed once they are a day old.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

/// Minimum age for log files to be cleaned up (24 hours)
const CLEANUP_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Cached log directory path
static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get the base log directory, creating it if necessary.
///
/// Falls back to the system temp directory if the XDG directory is unusable.
pub fn log_dir() -> &'static PathBuf {
    LOG_DIR.get_or_init(|| {
        let dir =
            get_xdg_log_dir().unwrap_or_else(|| std::env::temp_dir().join("objecttext-logs"));

        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("Failed to create log directory {:?}: {}", dir, e);
            return std::env::temp_dir().join("objecttext-logs");
        }

        dir
    })
}

/// Get the XDG state home log directory
fn get_xdg_log_dir() -> Option<PathBuf> {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(state_home);
        if path.is_absolute() {
            return Some(path.join("objecttext").join("logs"));
        }
    }

    dirs::home_dir().map(|home| {
        home.join(".local")
            .join("state")
            .join("objecttext")
            .join("logs")
    })
}

/// Path for this process's log file: `{log_dir}/objecttext-{PID}.log`
pub fn main_log_path() -> PathBuf {
    log_dir().join(format!("objecttext-{}.log", std::process::id()))
}

/// Remove log files left behind by processes that are no longer running
pub fn cleanup_stale_logs() {
    cleanup_stale_logs_in_dir(log_dir(), std::process::id(), CLEANUP_AGE);
}

fn cleanup_stale_logs_in_dir(dir: &Path, current_pid: u32, age: Duration) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        if !name.starts_with("objecttext-") {
            continue;
        }
        let Some(pid) = extract_pid_from_filename(&name) else {
            continue;
        };
        if pid == current_pid {
            continue;
        }

        if !is_process_running(pid)
            && is_file_older_than(&entry.path(), age)
            && entry.file_type().map(|t| t.is_file()).unwrap_or(false)
        {
            if let Err(e) = fs::remove_file(entry.path()) {
                tracing::debug!("Failed to clean up stale log {:?}: {}", entry.path(), e);
            } else {
                tracing::debug!("Cleaned up stale log file: {:?}", entry.path());
            }
        }
    }
}

fn is_file_older_than(path: &Path, age: Duration) -> bool {
    let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) else {
        return false;
    };

    SystemTime::now()
        .duration_since(modified)
        .map(|elapsed| elapsed > age)
        .unwrap_or(false)
}

/// Extract the PID from a name like `objecttext-12345.log`
fn extract_pid_from_filename(name: &str) -> Option<u32> {
    let without_ext = name.strip_suffix(".log")?;
    let last_hyphen = without_ext.rfind('-')?;
    without_ext[last_hyphen + 1..].parse().ok()
}

fn is_process_running(pid: u32) -> bool {
    #[cfg(unix)]
    {
        // Signal 0 only checks whether the process exists
        unsafe {
            libc::kill(pid as libc::pid_t, 0) == 0
                || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
        }
    }

    #[cfg(windows)]
    {
        use windows_sys::Win32::Foundation::CloseHandle;
        use windows_sys::Win32::System::Threading::{
            OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
        };

        unsafe {
            let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
            if !handle.is_null() {
                CloseHandle(handle);
                true
            } else {
                false
            }
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = pid;
        true
    }
}

/// Print all directories used by the checker to stdout
pub fn print_all_paths() {
    use std::io::Write;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let config_dir = dirs::config_dir()
        .map(|d| d.join("objecttext"))
        .unwrap_or_else(|| PathBuf::from("<unavailable>"));

    writeln!(handle, "Object Text directories:").ok();
    writeln!(handle).ok();

    writeln!(handle, "Config:     {}", config_dir.display()).ok();
    writeln!(
        handle,
        "  config.json:  {}",
        config_dir.join("config.json").display()
    )
    .ok();
    writeln!(
        handle,
        "  grammars/:    {}",
        config_dir.join("grammars").display()
    )
    .ok();
    writeln!(handle).ok();

    writeln!(handle, "Logs:       {}", log_dir().display()).ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_is_absolute() {
        let dir = log_dir();
        assert!(dir.is_absolute(), "Log directory should be absolute");
    }

    #[test]
    fn test_main_log_path_contains_pid() {
        let path = main_log_path();
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("objecttext-"), "Should start with objecttext-");
        assert!(name.ends_with(".log"), "Should end with .log");
        assert!(
            name.contains(&std::process::id().to_string()),
            "Should contain PID"
        );
    }

    #[test]
    fn test_extract_pid_from_filename() {
        assert_eq!(extract_pid_from_filename("objecttext-12345.log"), Some(12345));
        assert_eq!(extract_pid_from_filename("objecttext-abc.log"), None);
        assert_eq!(extract_pid_from_filename("objecttext-12345.txt"), None);
    }

    fn age_file(path: &Path, by: Duration) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    #[test]
    fn test_cleanup_removes_only_stale_dead_logs() {
        let dir = tempfile::tempdir().unwrap();
        let current = std::process::id();
        // Larger than any real pid_max, so never a live process
        let dead = i32::MAX as u32;

        let stale = dir.path().join(format!("objecttext-{dead}.log"));
        let fresh = dir.path().join(format!("objecttext-{}.log", dead - 1));
        let own = dir.path().join(format!("objecttext-{current}.log"));
        let other = dir.path().join(format!("notes-{dead}.log"));
        for path in [&stale, &fresh, &own, &other] {
            fs::write(path, b"log").unwrap();
        }
        let two_days = Duration::from_secs(2 * 24 * 60 * 60);
        age_file(&stale, two_days);
        age_file(&own, two_days);
        age_file(&other, two_days);

        cleanup_stale_logs_in_dir(dir.path(), current, CLEANUP_AGE);

        assert!(!stale.exists(), "stale log of a dead process should be removed");
        assert!(fresh.exists(), "recent logs are kept");
        assert!(own.exists(), "the current process's log is kept");
        assert!(other.exists(), "unrelated files are kept");
    }
}
