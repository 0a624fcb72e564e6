//! Capability-based filesystem sandbox backing the `io` library namespace.
//! Trimmed from a general-purpose fs/net sandbox down to what `io.read` /
//! `io.write` / `io.exists` need.

use crate::config::FsConfig;
use cap_std::fs::Dir;

#[derive(Debug, Clone)]
pub enum SandboxError {
    PathNotAllowed(String),
    FileNotFound(String),
    FileTooLarge(String),
    IoError(String),
}

impl std::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxError::PathNotAllowed(path) => {
                write!(f, "access denied: {path} is not in an allowed directory")
            }
            SandboxError::FileNotFound(path) => write!(f, "file not found: {path}"),
            SandboxError::FileTooLarge(msg) => write!(f, "file too large: {msg}"),
            SandboxError::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for SandboxError {}

/// Sandbox for safe file access, scoped to the source file's directory (or
/// any directories explicitly configured). Backed by `cap-std`, which
/// rejects absolute paths and `..` traversal by construction.
pub struct Sandbox {
    roots: Vec<Dir>,
    config: FsConfig,
}

impl Sandbox {
    pub fn new(config: FsConfig) -> Result<Self, SandboxError> {
        let mut roots = Vec::new();
        for path in &config.allowed_paths {
            std::fs::create_dir_all(path)
                .map_err(|e| SandboxError::IoError(format!("cannot create {}: {e}", path.display())))?;
            let dir = Dir::open_ambient_dir(path, cap_std::ambient_authority())
                .map_err(|e| SandboxError::IoError(format!("cannot open {}: {e}", path.display())))?;
            roots.push(dir);
        }
        Ok(Self { roots, config })
    }

    fn validate(path: &str) -> Result<(), SandboxError> {
        if path.starts_with('/') || path.starts_with('\\') || path.contains("..") {
            return Err(SandboxError::PathNotAllowed(path.to_string()));
        }
        Ok(())
    }

    fn find_root(&self, path: &str, write_mode: bool) -> Result<&Dir, SandboxError> {
        if self.roots.is_empty() {
            return Err(SandboxError::PathNotAllowed(path.to_string()));
        }
        if write_mode {
            return Ok(&self.roots[0]);
        }
        for root in &self.roots {
            if root.metadata(path).is_ok() {
                return Ok(root);
            }
        }
        Ok(&self.roots[0])
    }

    pub fn read_file(&self, path: &str) -> Result<String, SandboxError> {
        Self::validate(path)?;
        let root = self.find_root(path, false)?;
        root.read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SandboxError::FileNotFound(path.to_string())
            } else {
                SandboxError::IoError(format!("cannot read {path}: {e}"))
            }
        })
    }

    pub fn write_file(&self, path: &str, contents: &str) -> Result<(), SandboxError> {
        Self::validate(path)?;
        if contents.len() > self.config.max_file_size {
            return Err(SandboxError::FileTooLarge(format!(
                "{} bytes exceeds limit of {} bytes",
                contents.len(),
                self.config.max_file_size
            )));
        }
        let root = self.find_root(path, true)?;
        root.write(path, contents)
            .map_err(|e| SandboxError::IoError(format!("cannot write {path}: {e}")))
    }

    pub fn file_exists(&self, path: &str) -> Result<bool, SandboxError> {
        Self::validate(path)?;
        let root = self.find_root(path, false)?;
        match root.metadata(path) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SandboxError::IoError(format!("cannot check {path}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sandbox_in(dir: &std::path::Path) -> Sandbox {
        Sandbox::new(FsConfig {
            allowed_paths: vec![dir.to_path_buf()],
            max_file_size: 1024,
        })
        .unwrap()
    }

    #[test]
    fn write_then_read_round_trips() {
        let tmp = std::env::temp_dir().join(format!("myco-sandbox-test-{}", std::process::id()));
        let sandbox = sandbox_in(&tmp);
        sandbox.write_file("hello.txt", "hi").unwrap();
        assert_eq!(sandbox.read_file("hello.txt").unwrap(), "hi");
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_path_traversal() {
        let tmp: PathBuf = std::env::temp_dir().join(format!("myco-sandbox-test2-{}", std::process::id()));
        let sandbox = sandbox_in(&tmp);
        assert!(matches!(
            sandbox.read_file("../etc/passwd"),
            Err(SandboxError::PathNotAllowed(_))
        ));
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
