//! SSH transport session.
//!
//! `SshSession::connect` walks `Disconnected → Connecting → Connected{mode}`:
//! TCP connect with a timeout, handshake, trust-on-first-use host key,
//! password auth, then a single SFTP attempt that fixes the transport mode
//! for the rest of the session.

use std::fs::File;
use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use ssh2::{HashType, Session, Sftp};
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::error::{RemoteError, Result};
use crate::shell;
use crate::transport::{negotiate, Negotiated, RemoteFs, TransportMode};

/// Default limit for establishing the TCP connection and SSH handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Knobs for establishing a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub connect_timeout: Duration,
    /// Skip the SFTP attempt and stream files through exec channels.
    pub force_exec_fallback: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            force_exec_fallback: false,
        }
    }
}

/// Exit status and output of a remote command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// An authenticated SSH session bound to one device.
pub struct SshSession {
    session: Session,
    sftp: Option<Sftp>,
    mode: TransportMode,
    address: String,
    open: bool,
}

impl SshSession {
    /// Connect, authenticate and negotiate the transport mode.
    pub fn connect(conn: &Connection, options: &SessionOptions) -> Result<Self> {
        let session = establish(conn, options.connect_timeout)?;

        let (sftp, mode) = match negotiate(options.force_exec_fallback, || session.sftp()) {
            Negotiated::Primary(sftp) => {
                info!("Using SFTP for transfers to {}", conn.address());
                (Some(sftp), TransportMode::Sftp)
            }
            Negotiated::Fallback { reason } => {
                warn!(
                    "SFTP unavailable on {} ({}), streaming files over exec channels",
                    conn.address(),
                    reason
                );
                (None, TransportMode::ExecFallback)
            }
        };

        Ok(Self {
            session,
            sftp,
            mode,
            address: conn.address(),
            open: true,
        })
    }

    /// Address this session is connected to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Run a shell command on the device.
    pub fn exec(&self, command: &str) -> Result<CommandOutput> {
        self.run(command, None)
    }

    /// Run a command and fail unless it exits with status 0.
    fn exec_checked(&self, command: &str) -> Result<CommandOutput> {
        let output = self.exec(command)?;
        if !output.success() {
            return Err(RemoteError::Command {
                command: command.to_string(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    fn run(&self, command: &str, input: Option<&mut dyn Read>) -> Result<CommandOutput> {
        debug!("exec on {}: {}", self.address, command);

        let mut channel = self.session.channel_session()?;
        channel.exec(command)?;

        if let Some(input) = input {
            io::copy(input, &mut channel)?;
        }
        channel.send_eof()?;

        let mut stderr = Vec::new();
        channel.stderr().read_to_end(&mut stderr)?;
        let mut stdout = Vec::new();
        channel.read_to_end(&mut stdout)?;

        channel.wait_close()?;
        let status = channel.exit_status()?;

        Ok(CommandOutput {
            status,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }

    /// Release the SFTP channel and disconnect.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        drop(self.sftp.take());
        self.session
            .disconnect(None, "deployment finished", None)
            .map_err(RemoteError::from)?;
        debug!("Disconnected from {}", self.address);
        Ok(())
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Failed to disconnect from {}: {}", self.address, e);
        }
    }
}

impl RemoteFs for SshSession {
    fn mode(&self) -> TransportMode {
        self.mode
    }

    fn dir_exists(&mut self, path: &str) -> Result<bool> {
        let command = shell::test_dir_cmd(path);
        let output = self.exec(&command)?;
        match output.status {
            0 => Ok(true),
            1 => Ok(false),
            status => Err(RemoteError::Command {
                command,
                status,
                stderr: output.stderr.trim().to_string(),
            }),
        }
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.exec_checked(&shell::mv_cmd(from, to))?;
        Ok(())
    }

    fn create_dir_all(&mut self, path: &str) -> Result<()> {
        self.exec_checked(&shell::mkdir_cmd(path))?;
        Ok(())
    }

    fn create_dir(&mut self, path: &str) -> Result<()> {
        match &self.sftp {
            Some(sftp) => match sftp.mkdir(Path::new(path), 0o755) {
                Ok(()) => Ok(()),
                Err(e) => match sftp.stat(Path::new(path)) {
                    Ok(stat) if stat.is_dir() => Ok(()),
                    _ => Err(RemoteError::transfer(path, e)),
                },
            },
            None => self
                .exec_checked(&shell::mkdir_cmd(path))
                .map(|_| ())
                .map_err(|e| RemoteError::transfer(path, e)),
        }
    }

    fn put_file(&mut self, local: &Path, remote: &str) -> Result<u64> {
        let mut file = File::open(local)?;

        match &self.sftp {
            Some(sftp) => {
                let mut target = sftp
                    .create(Path::new(remote))
                    .map_err(|e| RemoteError::transfer(remote, e))?;
                io::copy(&mut file, &mut target).map_err(|e| RemoteError::transfer(remote, e))
            }
            None => {
                let size = file.metadata()?.len();
                let command = shell::cat_to_cmd(remote);
                let output = self
                    .run(&command, Some(&mut file as &mut dyn Read))
                    .map_err(|e| RemoteError::transfer(remote, e))?;
                if !output.success() {
                    return Err(RemoteError::transfer(
                        remote,
                        format!("exit status {}: {}", output.status, output.stderr.trim()),
                    ));
                }
                Ok(size)
            }
        }
    }
}

fn establish(conn: &Connection, timeout: Duration) -> Result<Session> {
    let address = conn.address();
    let connect_err = |source: io::Error| RemoteError::Connect {
        address: address.clone(),
        source,
    };

    let addrs: Vec<SocketAddr> = (conn.host.as_str(), conn.port)
        .to_socket_addrs()
        .map_err(connect_err)?
        .collect();
    let tcp = connect_any(&addrs, timeout).map_err(connect_err)?;

    let mut session = Session::new()?;
    session.set_tcp_stream(tcp);
    // Bounded handshake and auth; transfers afterwards run without a limit.
    session.set_timeout(timeout.as_millis().min(u128::from(u32::MAX)) as u32);

    session
        .handshake()
        .map_err(|source| RemoteError::Handshake {
            address: address.clone(),
            source,
        })?;

    // Trust on first use: accept whatever key the device presents.
    if let Some(hash) = session.host_key_hash(HashType::Sha256) {
        info!("Accepting host key of {} (SHA256 {})", address, hex::encode(hash));
    }

    if let Err(e) = session.userauth_password(&conn.user, &conn.password) {
        debug!("Password authentication rejected: {}", e);
    }
    if !session.authenticated() {
        return Err(RemoteError::Auth {
            user: conn.user.clone(),
            address,
        });
    }

    session.set_timeout(0);
    info!("Connected to {}", conn);
    Ok(session)
}

fn connect_any(addrs: &[SocketAddr], timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no addresses")
    }))
}
