//! Hermetic working directory for CLI tests.
//!
//! Everything lives under an `assert_fs::TempDir` and is cleaned up on drop.
//! Commands run in a cleared environment with colour and backtraces off so
//! their output is stable enough to snapshot.
//!
//! ## Quick example
//! ```no_run
//! use breadnet_test_utils::fixtures::DIVIDER_JSON;
//! use breadnet_test_utils::sandbox::Sandbox;
//!
//! let output = Sandbox::new()
//!     .write("divider.json", DIVIDER_JSON)
//!     .snapshot_run("breadnet", ["netlist", "divider.json"]);
//! breadnet_test_utils::assert_snapshot!("divider", output);
//! ```

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;
use assert_fs::TempDir;

pub struct Sandbox {
    root: TempDir,
    default_cwd: PathBuf,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// Create a new sandbox; all state is under an auto-cleaned TempDir.
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        let default_cwd = root.path().to_path_buf();
        Self { root, default_cwd }
    }

    /// Absolute path to the sandbox root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Get the current default working directory for commands.
    pub fn default_cwd(&self) -> &Path {
        &self.default_cwd
    }

    /// Set the working directory for commands. Path is relative to sandbox root if not absolute.
    /// Creates the directory if it doesn't exist.
    pub fn cwd<P: AsRef<Path>>(&mut self, cwd: P) -> &mut Self {
        let cwd = cwd.as_ref();
        self.default_cwd = if cwd.is_absolute() {
            cwd.to_path_buf()
        } else {
            self.root_path().join(cwd)
        };
        fs::create_dir_all(&self.default_cwd).expect("create default cwd directory");
        self
    }

    /// Write/overwrite a file relative to the current working directory.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.resolve(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    /// Read a file relative to the current working directory.
    pub fn read<P: AsRef<Path>>(&self, rel: P) -> String {
        let p = self.resolve(rel);
        fs::read_to_string(&p).unwrap_or_else(|e| panic!("read {}: {e}", p.display()))
    }

    /// A command for a workspace binary, rooted in the sandbox.
    pub fn command<I>(&self, program: &str, args: I) -> Command
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let mut cmd = Command::cargo_bin(program)
            .unwrap_or_else(|e| panic!("locate binary {program}: {e}"));
        cmd.args(args).current_dir(&self.default_cwd);
        self.inject_env(&mut cmd);
        cmd
    }

    /// Replace the inherited environment with a fixed one so output does not
    /// depend on the caller's shell.
    pub fn inject_env<'c>(&self, cmd: &'c mut Command) -> &'c mut Command {
        let mut env_map: HashMap<&str, String> = HashMap::new();
        if let Ok(path) = std::env::var("PATH") {
            env_map.insert("PATH", path);
        }
        env_map.insert("HOME", self.root_path().to_string_lossy().into_owned());
        env_map.insert("NO_COLOR", "1".into());
        env_map.insert("RUST_LOG", "off".into());
        env_map.insert("RUST_BACKTRACE", "0".into());
        env_map.insert("RUST_LIB_BACKTRACE", "0".into());

        cmd.env_clear().envs(env_map)
    }

    /// Run a workspace binary and return a sanitized manifest of its exit
    /// code, stdout and stderr.
    pub fn snapshot_run<I>(&mut self, program: &str, args: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        self.snapshot_run_with_stdin(program, args, "")
    }

    /// Like [`Sandbox::snapshot_run`], feeding `stdin` to the process.
    pub fn snapshot_run_with_stdin<I>(&mut self, program: &str, args: I, stdin: &str) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string_lossy().to_string())
            .collect();

        // Capture both stdout and stderr to prevent terminal output during tests
        let output: Output = self
            .command(program, &args)
            .write_stdin(stdin)
            .output()
            .expect("run command");

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let manifest = format!(
            "Command: {} {}\nExit Code: {}\n\n--- STDOUT ---\n{}\n--- STDERR ---\n{}",
            program,
            args.join(" "),
            exit_code,
            stdout.trim_end(),
            stderr.trim_end()
        );
        self.sanitize_output(&manifest)
    }

    /// Replace sandbox paths with a placeholder.
    pub fn sanitize_output(&self, content: &str) -> String {
        content.replace(&self.root_path().display().to_string(), "<TEMP_DIR>")
    }

    fn resolve<P: AsRef<Path>>(&self, rel: P) -> PathBuf {
        let rel_path = rel.as_ref();
        if rel_path.is_absolute() {
            rel_path.to_path_buf()
        } else {
            self.default_cwd.join(rel_path)
        }
    }
}
