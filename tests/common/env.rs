//! Test environment for isolated Casilla CLI runs.
//!
//! Provides `TestEnv` - a temp working directory plus helpers to write
//! inputs and run the `casilla` binary against them.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

use super::fixtures::template_pdf;

/// Result of running a Casilla CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// stdout lines parsed as JSON
    pub fn json_lines(&self) -> Vec<Value> {
        self.stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).unwrap_or_else(|e| panic!("{e}: {line}")))
            .collect()
    }
}

/// Isolated working directory for one test
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    /// Get path relative to the working directory
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn write_json(&self, relative: &str, value: &Value) -> PathBuf {
        self.write(relative, serde_json::to_vec_pretty(value).unwrap())
    }

    pub fn write_template(&self, relative: &str, pages: usize) -> PathBuf {
        self.write(relative, template_pdf(pages))
    }

    /// Run casilla from the working directory
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run casilla with extra environment variables
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_casilla"));
        cmd.current_dir(self.root.path())
            .args(args)
            .env_remove("CASILLA_LOG")
            .env("XDG_CONFIG_HOME", self.root.path().join(".config"))
            .env("HOME", self.root.path());
        for key in [
            "CASILLA_DATE_PATTERN",
            "CASILLA_FRACTION_DIGITS",
            "CASILLA_TOTALS_TOLERANCE",
            "CASILLA_OUTPUT_DIR",
            "CASILLA_MAX_WORKERS",
            "CASILLA_COMPRESS",
        ] {
            cmd.env_remove(key);
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute casilla");
        output_to_result(output)
    }

    /// Files directly inside `relative`, sorted
    pub fn list(&self, relative: &str) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.path(relative))
            .map(|entries| entries.flatten().map(|e| e.path()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

pub fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}
