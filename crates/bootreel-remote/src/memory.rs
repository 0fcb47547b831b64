//! In-memory device used by deployment tests.
//!
//! Every operation is logged the way it would reach a real device: shell
//! work as `exec <command>` using the same command builders as
//! [`SshSession`](crate::SshSession), SFTP work as `sftp mkdir <path>` or
//! `sftp put <path>`. Which of the two directory and file transfers use
//! depends on the device's [`TransportMode`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{RemoteError, Result};
use crate::shell;
use crate::transport::{RemoteFs, TransportMode};

pub(crate) struct MemoryDevice {
    mode: TransportMode,
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    ops: Vec<String>,
    puts_left: Option<usize>,
}

impl MemoryDevice {
    pub fn new(mode: TransportMode) -> Self {
        Self {
            mode,
            files: BTreeMap::new(),
            dirs: BTreeSet::new(),
            ops: Vec::new(),
            puts_left: None,
        }
    }

    /// Let `n` transfers succeed, then fail every later one.
    pub fn fail_put_after(&mut self, n: usize) {
        self.puts_left = Some(n);
    }

    pub fn seed_dir(&mut self, path: &str) {
        self.insert_dirs(path);
    }

    pub fn seed_file(&mut self, path: &str, contents: &[u8]) {
        if let Some((parent, _)) = path.rsplit_once('/') {
            self.insert_dirs(parent);
        }
        self.files.insert(path.to_string(), contents.to_vec());
    }

    pub fn ops(&self) -> &[String] {
        &self.ops
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }

    pub fn dir_present(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }

    pub fn files_under(&self, root: &str) -> Vec<String> {
        let prefix = format!("{}/", root.trim_end_matches('/'));
        self.files
            .keys()
            .filter(|p| p.starts_with(&prefix))
            .cloned()
            .collect()
    }

    fn exec(&mut self, command: String) {
        self.ops.push(format!("exec {command}"));
    }

    fn transfer_op(&mut self, sftp_op: &str, command: String, path: &str) {
        match self.mode {
            TransportMode::Sftp => self.ops.push(format!("sftp {sftp_op} {path}")),
            TransportMode::ExecFallback => self.exec(command),
        }
    }

    fn insert_dirs(&mut self, path: &str) {
        let mut current = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current.push('/');
            current.push_str(part);
            self.dirs.insert(current.clone());
        }
    }
}

fn moved(path: &str, from: &str, to: &str) -> Option<String> {
    if path == from {
        Some(to.to_string())
    } else {
        path.strip_prefix(from)
            .filter(|rest| rest.starts_with('/'))
            .map(|rest| format!("{to}{rest}"))
    }
}

impl RemoteFs for MemoryDevice {
    fn mode(&self) -> TransportMode {
        self.mode
    }

    fn dir_exists(&mut self, path: &str) -> Result<bool> {
        self.exec(shell::test_dir_cmd(path));
        Ok(self.dirs.contains(path))
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.exec(shell::mv_cmd(from, to));
        if !self.dirs.contains(from) {
            return Err(RemoteError::Command {
                command: shell::mv_cmd(from, to),
                status: 1,
                stderr: "No such file or directory".to_string(),
            });
        }

        self.dirs = std::mem::take(&mut self.dirs)
            .into_iter()
            .map(|d| moved(&d, from, to).unwrap_or(d))
            .collect();
        self.files = std::mem::take(&mut self.files)
            .into_iter()
            .map(|(p, data)| (moved(&p, from, to).unwrap_or(p), data))
            .collect();
        Ok(())
    }

    fn create_dir_all(&mut self, path: &str) -> Result<()> {
        self.exec(shell::mkdir_cmd(path));
        self.insert_dirs(path);
        Ok(())
    }

    fn create_dir(&mut self, path: &str) -> Result<()> {
        self.transfer_op("mkdir", shell::mkdir_cmd(path), path);
        self.dirs.insert(path.to_string());
        Ok(())
    }

    fn put_file(&mut self, local: &Path, remote: &str) -> Result<u64> {
        self.transfer_op("put", shell::cat_to_cmd(remote), remote);
        if let Some(left) = self.puts_left.as_mut() {
            if *left == 0 {
                return Err(RemoteError::transfer(remote, "No space left on device"));
            }
            *left -= 1;
        }

        let data = std::fs::read(local)?;
        let len = data.len() as u64;
        self.files.insert(remote.to_string(), data);
        Ok(len)
    }
}
