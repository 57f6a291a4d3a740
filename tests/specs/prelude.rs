//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for driving the `orc` CLI as a black box.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Aggressive timeouts for fast tests.
//
// IMPORTANT:
//   Do NOT change these.
//   File a performance bug instead.
const ORC_TIMEOUT_CONNECT_MS: &str = "2000";
const ORC_TIMEOUT_IPC_MS: &str = "2000";
const ORC_CONNECT_POLL_MS: &str = "5";

pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Returns the path to a binary, checking the llvm-cov target directory
/// first. Falls back to resolving relative to the test binary itself when
/// `CARGO_MANIFEST_DIR` is stale (e.g. compiled by a removed worktree into
/// a shared target directory).
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn orc_binary() -> PathBuf {
    binary_path("orc")
}

/// Returns the path to the `orcd` daemon binary.
pub fn orcd_binary() -> PathBuf {
    binary_path("orcd")
}

/// Returns a `Command` configured to run the `orc` binary.
pub fn orc_cmd() -> Command {
    Command::new(orc_binary())
}

/// Create a CLI builder for `orc` commands.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions.
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                ("ORC_DAEMON_BINARY".into(), orcd_binary().to_string_lossy().into()),
                ("ORC_TIMEOUT_CONNECT_MS".into(), ORC_TIMEOUT_CONNECT_MS.into()),
                ("ORC_TIMEOUT_IPC_MS".into(), ORC_TIMEOUT_IPC_MS.into()),
                ("ORC_CONNECT_POLL_MS".into(), ORC_CONNECT_POLL_MS.into()),
                // Keep the engine loop's tick from firing mid-test: most
                // specs only care about the queue/store state a request
                // produces, not what the next promotion pass would do to it.
                ("ORC_TICK_MS".into(), "60000".into()),
            ],
        }
    }

    /// Add CLI arguments.
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set working directory.
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Set environment variable.
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string_lossy().to_string()));
        self
    }

    /// Build the command without running it.
    pub fn command(self) -> Command {
        let mut cmd = orc_cmd();
        cmd.args(&self.args);

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }

        // Prevent a parent ORC_STATE_DIR from leaking into tests; it would
        // scope every operation against a shared daemon instead of the
        // project's own isolated one.
        cmd.env_remove("ORC_STATE_DIR");

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    /// Run and expect success (exit code 0).
    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code).
    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run without asserting on the exit code, for tests that branch on it.
    pub fn run(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions.
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    /// Get stdout as a string.
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    /// Get stderr as a string.
    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Get the process exit code, if any.
    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn code_eq(self, expected: i32) -> Self {
        assert_eq!(self.code(), Some(expected), "stdout: {}\nstderr: {}", self.stdout(), self.stderr());
        self
    }

    /// Assert stdout contains substring.
    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{}'\nstdout: {}", expected, stdout);
        self
    }

    /// Assert stdout does not contain substring.
    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(!stdout.contains(unexpected), "stdout should not contain '{}'\nstdout: {}", unexpected, stdout);
        self
    }

    /// Assert stderr contains substring.
    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain '{}'\nstderr: {}", expected, stderr);
        self
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or the timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

// =============================================================================
// Project
// =============================================================================

/// Temporary project directory plus an isolated daemon state directory, so
/// every test gets its own `orcd` singleton instead of fighting over one.
pub struct Project {
    dir: tempfile::TempDir,
    state_dir: tempfile::TempDir,
}

impl Project {
    /// Create an empty project.
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().unwrap(), state_dir: tempfile::tempdir().unwrap() }
    }

    /// Get the project path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the isolated state directory path.
    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    /// Initialize a git repository with one commit, so the Worktree Manager
    /// has a starting branch to fork role worktrees from.
    pub fn git_init(&self) {
        let run = |args: &[&str]| {
            Command::new("git")
                .args(args)
                .current_dir(self.path())
                .env("GIT_AUTHOR_NAME", "orc-specs")
                .env("GIT_AUTHOR_EMAIL", "orc-specs@example.com")
                .env("GIT_COMMITTER_NAME", "orc-specs")
                .env("GIT_COMMITTER_EMAIL", "orc-specs@example.com")
                .stdout(std::process::Stdio::null())
                .stderr(std::process::Stdio::null())
                .status()
                .expect("git should run")
        };
        run(&["init", "--quiet"]);
        self.file("README.md", "test project\n");
        run(&["add", "."]);
        run(&["commit", "--quiet", "-m", "initial commit"]);
    }

    /// Installs an `agent_cli.toml` pointing at `/bin/true` so the daemon's
    /// precondition check and launch command never depend on a real coding
    /// agent binary being installed.
    pub fn stub_agent_cli(&self) {
        std::fs::create_dir_all(self.state_path()).unwrap();
        std::fs::write(
            self.state_path().join("agent_cli.toml"),
            r#"binary = "true"
version_flag = "--version"
default_command = "true"
"#,
        )
        .unwrap();
    }

    /// Write a file at the given path (parent directories created automatically).
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }

    /// Write a minimal specification file and return its absolute path.
    pub fn spec_file(&self, name: &str, content: &str) -> PathBuf {
        self.file(name, content);
        self.dir.path().join(name)
    }

    /// Run `orc` in this project's context, scoped to its own state dir.
    pub fn orc(&self) -> CliBuilder {
        cli().pwd(self.path()).env("ORC_STATE_DIR", self.state_path())
    }

    /// Read the daemon log file contents (for debugging test failures).
    pub fn daemon_log(&self) -> String {
        let log_path = self.state_path().join("daemon.log");
        std::fs::read_to_string(&log_path).unwrap_or_else(|_| "(no daemon log)".to_string())
    }

    /// True if a socket is listening at this project's daemon state dir.
    pub fn daemon_is_up(&self) -> bool {
        let socket_path = self.state_path().join("daemon.sock");
        std::os::unix::net::UnixStream::connect(&socket_path).is_ok()
    }

    /// Kill the daemon process with SIGKILL, simulating a crash.
    pub fn daemon_kill(&self) -> bool {
        let pid_file = self.state_path().join("daemon.pid");
        let Ok(content) = std::fs::read_to_string(&pid_file) else { return false };
        let Ok(pid) = content.trim().parse::<u32>() else { return false };
        Command::new("kill")
            .args(["-9", &pid.to_string()])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        // No `orc` subcommand asks the daemon to shut down gracefully; a
        // kill is sufficient since sessions live outside the daemon's
        // process and this TempDir is about to disappear anyway.
        self.daemon_kill();
    }
}

/// Minimal specification text good enough for the lifecycle engine to
/// provision against: a `## Team` section keeps role selection
/// deterministic across plan tiers.
pub const MINIMAL_SPEC: &str = r#"# Demo Project

A tiny project used only to exercise orchestration plumbing.

## Team

- implementer

## Non-goals

- Anything beyond compiling.
"#;
