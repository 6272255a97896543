// Clipboard copy with feedback. The OS helper path reports success/failure
// through a toast; without any helper binary we fall back to the egui
// clipboard command, which cannot report either way.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use eframe::egui;

use super::notify::notify;
use super::rt;
use crate::types::ToastLevel;

#[cfg(target_os = "windows")]
const HELPERS: &[&[&str]] = &[&["clip"]];
#[cfg(target_os = "macos")]
const HELPERS: &[&[&str]] = &[&["pbcopy"]];
#[cfg(all(unix, not(target_os = "macos")))]
const HELPERS: &[&[&str]] = &[
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
];

static HELPER: OnceLock<Option<&'static [&'static str]>> = OnceLock::new();

fn helper() -> Option<&'static [&'static str]> {
    *HELPER.get_or_init(|| HELPERS.iter().copied().find(|cmd| find_in_path(cmd[0])))
}

fn find_in_path(bin: &str) -> bool {
    #[cfg(target_os = "windows")]
    let bin = format!("{bin}.exe");
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(&bin).is_file())
}

/// Put `text` on the system clipboard and toast the outcome.
pub fn copy_to_clipboard(ctx: &egui::Context, text: impl Into<String>) {
    let text = text.into();
    match helper() {
        Some(cmd) => {
            let ctx2 = ctx.clone();
            rt().spawn(async move {
                let res = match tokio::task::spawn_blocking(move || run_helper(cmd, &text)).await {
                    Ok(inner) => inner,
                    Err(e) => Err(e.to_string()),
                };
                match res {
                    Ok(()) => notify("Copied to clipboard!", ToastLevel::Success, "✔"),
                    Err(e) => {
                        log::error!("Clipboard helper failed: {e}");
                        notify(
                            format!("Failed to copy to clipboard: {e}"),
                            ToastLevel::Danger,
                            "⚠",
                        );
                    }
                }
                ctx2.request_repaint();
            });
        }
        None => {
            ctx.output_mut(|o| o.copied_text = text);
        }
    }
}

fn run_helper(cmd: &[&str], text: &str) -> Result<(), String> {
    let mut child = Command::new(cmd[0])
        .args(&cmd[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("{}: {e}", cmd[0]))?;
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            // Reap the dead helper before bailing or it lingers as a zombie.
            let _ = child.kill();
            let _ = child.wait();
            return Err(format!("{}: {e}", cmd[0]));
        }
    }
    // wl-copy/xclip/xsel fork off to serve the selection, so wait() returns
    // as soon as stdin is consumed.
    let status = child.wait().map_err(|e| format!("{}: {e}", cmd[0]))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{} exited with {status}", cmd[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn helper_exit_status_is_reported() {
        assert!(run_helper(&["cat"], "payload").is_ok());
        let err = run_helper(&["false"], "").unwrap_err();
        assert!(err.contains("exited"), "{err}");
    }

    #[cfg(target_os = "linux")]
    fn zombie_children() -> usize {
        let me = std::process::id().to_string();
        let Ok(entries) = std::fs::read_dir("/proc") else {
            return 0;
        };
        entries
            .flatten()
            .filter_map(|e| std::fs::read_to_string(e.path().join("stat")).ok())
            .filter(|stat| {
                // "<pid> (<comm>) <state> <ppid> ..."; comm may hold spaces
                let Some((_, rest)) = stat.rsplit_once(") ") else {
                    return false;
                };
                let mut fields = rest.split_whitespace();
                fields.next() == Some("Z") && fields.next() == Some(me.as_str())
            })
            .count()
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn failed_stdin_write_reaps_the_helper() {
        // `false` exits without reading; a payload past the pipe buffer turns
        // into a write error rather than an exit status.
        let big = "x".repeat(1 << 22);
        let err = run_helper(&["false"], &big).unwrap_err();
        assert!(err.contains("false"), "{err}");

        // A leaked helper stays zombie until process exit; one retry skips
        // reaping races from tests running in parallel.
        let mut zombies = zombie_children();
        if zombies > 0 {
            std::thread::sleep(std::time::Duration::from_millis(100));
            zombies = zombie_children();
        }
        assert_eq!(zombies, 0);
    }
}
