//! Shared harness for the CLI specs
//!
//! `Sandbox` gives each spec its own state and socket directory, so a
//! daemon started by one test never bleeds into another. Commands are
//! built through `docket()`, which wires the isolation env vars in.

use assert_cmd::Command;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub const SPEC_WAIT_MAX_MS: u64 = 10_000;

/// Poll `check` every 50ms until it returns true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// An isolated docket installation backed by a temp directory.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("state")).unwrap();
        std::fs::create_dir_all(dir.path().join("sock")).unwrap();
        Self { dir }
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.dir.path().join("sock").join("docketd.sock")
    }

    /// A `docket` invocation scoped to this sandbox.
    pub fn docket(&self) -> Cli {
        let mut cmd = Command::cargo_bin("docket").unwrap();
        cmd.env("DOCKET_STATE_DIR", self.state_path());
        cmd.env("DOCKET_SOCKET_DIR", self.dir.path().join("sock"));
        Cli { cmd }
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        // Stop any daemon this sandbox started; ignore the result.
        if let Ok(mut cmd) = Command::cargo_bin("docket") {
            cmd.env("DOCKET_STATE_DIR", self.state_path());
            cmd.env("DOCKET_SOCKET_DIR", self.dir.path().join("sock"));
            let _ = cmd.args(["daemon", "stop"]).output();
        }
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> Checked {
        Checked {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn fails(mut self) -> Checked {
        Checked {
            assert: self.cmd.assert().failure(),
        }
    }
}

pub struct Checked {
    assert: assert_cmd::assert::Assert,
}

impl Checked {
    pub fn stdout_has(self, needle: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicates::str::contains(needle)),
        }
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        Self {
            assert: self.assert.stderr(predicates::str::contains(needle)),
        }
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).into_owned()
    }
}
