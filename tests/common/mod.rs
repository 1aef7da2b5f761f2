//! Common test utilities for notes-learner integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's `~/.local/share/notes-learner/` or `~/.config/notes-learner/`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A two-card topic.
pub const JS_DOC: &str = r##"---
name: JavaScript Basics
color: "#F7DF1E"
---

T: What is a closure?
D: A function that captures variables from its enclosing scope.

T: What does `typeof null` return?
D: "object"
"##;

/// A one-card topic with an explicit id.
pub const RUST_DOC: &str = r##"---
id: rust
name: Rust
---

T: What does the borrow checker enforce?
D: Aliasing XOR mutability.
"##;

/// A test environment with isolated data and config directories.
///
/// - `data_dir`: stored buckets (via `NL_DATA_DIR`)
/// - `config_dir`: system config.kdl (via `NL_CONFIG_DIR`)
/// - `work_dir`: scratch space for documents and exports
///
/// The `nl()` method sets both variables per-invocation, making tests
/// parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
    pub config_dir: TempDir,
    pub work_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
            work_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the nl binary with isolated directories.
    pub fn nl(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_nl"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("NL_DATA_DIR", self.data_dir.path());
        cmd.env("NL_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("NL_LOG");
        cmd
    }

    /// Write a document into the work directory and return its path.
    pub fn write_doc(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Import `content` as a document, asserting success.
    pub fn import(&self, name: &str, content: &str) {
        let path = self.write_doc(name, content);
        self.nl().arg("import").arg(&path).assert().success();
    }

    /// Import both sample topics.
    pub fn with_samples() -> Self {
        let env = Self::new();
        env.import("js.md", JS_DOC);
        env.import("rust.md", RUST_DOC);
        env
    }

    /// Write the data-dir config.kdl.
    pub fn write_data_config(&self, kdl: &str) {
        std::fs::write(self.data_dir.path().join("config.kdl"), kdl).unwrap();
    }

    /// Write the system config.kdl.
    pub fn write_system_config(&self, kdl: &str) {
        std::fs::write(self.config_dir.path().join("config.kdl"), kdl).unwrap();
    }

    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    pub fn work_path(&self) -> &Path {
        self.work_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
