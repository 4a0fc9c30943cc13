//! System browser launching.
//!
//! The launcher is a capability chosen once at startup, not a runtime probe
//! of an ambient global. Opening is best-effort with a fallback chain; the
//! outcome names which path actually ran so the host can surface a degraded
//! sign-in experience instead of silently losing it.

use tracing::{debug, error, warn};

/// Which launch path actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The platform's default browser took the URL.
    DefaultBrowser,
    /// The default path failed; a raw platform command opened it.
    PlatformCommand,
    /// Every path failed. The URL was never shown to the user.
    Failed,
}

/// Platform capability for showing and dismissing the sign-in page.
pub trait SystemBrowser: Send + Sync {
    fn open(&self, url: &str) -> LaunchOutcome;

    /// Best-effort; absence of an open browser is not an error.
    fn close(&self);
}

/// Desktop implementation.
pub struct DesktopBrowser;

impl SystemBrowser for DesktopBrowser {
    fn open(&self, url: &str) -> LaunchOutcome {
        if webbrowser::open(url).is_ok() {
            return LaunchOutcome::DefaultBrowser;
        }

        warn!("Default browser launch failed, falling back to platform command");
        if open_with_platform_command(url) {
            return LaunchOutcome::PlatformCommand;
        }

        error!("Could not open browser for {url}");
        LaunchOutcome::Failed
    }

    fn close(&self) {
        // Desktop browsers are external processes the shell cannot dismiss;
        // the OS hands focus back to the app when the deep link fires.
        debug!("Browser close requested (no-op on desktop)");
    }
}

/// Raw per-OS open command, used when the `webbrowser` path fails.
fn open_with_platform_command(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    {
        return std::process::Command::new("open")
            .arg(url)
            .status()
            .is_ok_and(|status| status.success());
    }
    #[cfg(target_os = "windows")]
    {
        return std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .status()
            .is_ok_and(|status| status.success());
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        return std::process::Command::new("xdg-open")
            .arg(url)
            .status()
            .is_ok_and(|status| status.success());
    }
    #[allow(unreachable_code)]
    false
}
