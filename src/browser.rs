use std::io;
use std::process::{Child, Command, ExitStatus};

use tokio::task::JoinHandle;
use tracing::debug;

/// Opens `url` in the system's default browser. The launcher process is
/// waited on in the background so it does not linger once it exits.
pub fn open(url: &str) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let child = command(url).spawn()?;
    Ok(reap(child))
}

/// Waits for `child` on the blocking pool. Must be called inside a runtime.
pub fn reap(mut child: Child) -> JoinHandle<io::Result<ExitStatus>> {
    tokio::task::spawn_blocking(move || {
        let status = child.wait()?;
        if !status.success() {
            debug!("Browser launcher exited with {}", status);
        }
        Ok(status)
    })
}

fn command(url: &str) -> Command {
    #[cfg(target_os = "windows")]
    {
        // Empty title so "start" does not treat the url as the window title
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    }

    #[cfg(target_os = "macos")]
    {
        let mut command = Command::new("open");
        command.arg(url);
        command
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    }
}
