//! FTP backend
//!
//! One control connection is opened when the backend is created and kept
//! for the lifetime of the manager. Transfers use binary mode; downloads are
//! staged in a scratch file before the bytes are handed back.

use std::fs::File;
use std::io::{self, Cursor};
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Status};

use crate::config::settings::{with_slashes, FtpSettings, FtpTarget};
use crate::error::{DumpError, DumpResult};

use super::scratch::ScratchDir;
use super::{BackendKind, Location, StorageBackend};

const DOWNLOAD_FILE: &str = "download";

/// Stores artifacts in a directory on an FTP server
pub struct FtpBackend {
    stream: Option<FtpStream>,
    server: String,
    path: String,
}

impl FtpBackend {
    /// Connect, log in, enter the backup directory and switch to binary mode
    ///
    /// Fails with [`DumpError::Connection`] if any step is rejected.
    pub fn connect(settings: &FtpSettings) -> DumpResult<Self> {
        let target = settings
            .target()
            .ok_or_else(|| DumpError::Config("FTP settings are incomplete".to_string()))?;

        let addr = resolve(target.server, target.port)?;
        let connect_timeout = Duration::from_secs(settings.connect_timeout_secs.max(1));
        let io_timeout = Some(Duration::from_secs(settings.transfer_timeout_secs.max(1)));

        let mut stream = FtpStream::connect_timeout(addr, connect_timeout)
            .map_err(|e| connection_error("connect", e))?;

        stream
            .get_ref()
            .set_read_timeout(io_timeout)
            .and_then(|_| stream.get_ref().set_write_timeout(io_timeout))
            .map_err(|e| DumpError::Connection(format!("Failed to set timeouts: {}", e)))?;

        if let Err(e) = open_session(&mut stream, &target) {
            let _ = stream.quit();
            return Err(e);
        }

        tracing::debug!(server = target.server, path = target.path, "ftp session open");

        Ok(Self {
            stream: Some(stream),
            server: target.server.to_string(),
            path: with_slashes(target.path),
        })
    }

    /// `ftp://server/path/name` of an artifact
    pub fn remote_url(&self, name: &str) -> String {
        remote_url(&self.server, &self.path, name)
    }

    /// Whether the control connection is still open
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn session(&mut self) -> DumpResult<&mut FtpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| DumpError::Connection("FTP session is closed".to_string()))
    }
}

fn open_session(stream: &mut FtpStream, target: &FtpTarget<'_>) -> DumpResult<()> {
    stream
        .login(target.user, target.password)
        .map_err(|e| connection_error("login", e))?;
    stream
        .cwd(target.path)
        .map_err(|e| connection_error("change directory", e))?;
    stream
        .transfer_type(FileType::Binary)
        .map_err(|e| connection_error("binary mode", e))?;
    Ok(())
}

fn resolve(server: &str, port: u16) -> DumpResult<SocketAddr> {
    (server, port)
        .to_socket_addrs()
        .map_err(|e| DumpError::Connection(format!("Cannot resolve {}: {}", server, e)))?
        .next()
        .ok_or_else(|| DumpError::Connection(format!("No address found for {}", server)))
}

fn remote_url(server: &str, path: &str, name: &str) -> String {
    format!("ftp://{}{}{}", server, path, name)
}

fn connection_error(step: &str, err: FtpError) -> DumpError {
    DumpError::Connection(format!("FTP {} failed: {}", step, err))
}

fn is_file_unavailable(err: &FtpError) -> bool {
    matches!(err, FtpError::UnexpectedResponse(resp) if resp.status == Status::FileUnavailable)
}

/// Map an FTP failure on a named artifact, turning 550 into NotFound
fn artifact_error(action: &str, name: &str, err: FtpError) -> DumpError {
    if is_file_unavailable(&err) {
        DumpError::artifact_not_found(name)
    } else {
        DumpError::Storage(format!("FTP {} of {} failed: {}", action, name, err))
    }
}

impl StorageBackend for FtpBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Ftp
    }

    fn location(&self) -> String {
        format!("ftp://{}{}", self.server, self.path)
    }

    fn list(&mut self) -> DumpResult<Vec<String>> {
        match self.session()?.nlst(None) {
            Ok(entries) => Ok(entries
                .into_iter()
                .map(|entry| entry.rsplit('/').next().unwrap_or_default().to_string())
                .filter(|name| !name.is_empty())
                .collect()),
            // some servers answer an empty directory with 550
            Err(e) if is_file_unavailable(&e) => Ok(Vec::new()),
            Err(e) => Err(DumpError::Storage(format!("FTP listing failed: {}", e))),
        }
    }

    fn store(&mut self, name: &str, bytes: &[u8]) -> DumpResult<Location> {
        let mut reader = Cursor::new(bytes);
        self.session()?
            .put_file(name, &mut reader)
            .map_err(|e| artifact_error("upload", name, e))?;

        tracing::debug!(name, bytes = bytes.len(), "uploaded backup file");
        Ok(Location::Url(self.remote_url(name)))
    }

    fn retrieve(&mut self, name: &str) -> DumpResult<Vec<u8>> {
        let scratch = ScratchDir::new()?;
        let path = scratch.file(DOWNLOAD_FILE);
        let mut file = File::create(&path)
            .map_err(|e| DumpError::Io(format!("Failed to create download file: {}", e)))?;

        self.session()?
            .retr(name, |reader| {
                io::copy(reader, &mut file).map_err(FtpError::ConnectionError)
            })
            .map_err(|e| artifact_error("download", name, e))?;

        file.sync_all()
            .map_err(|e| DumpError::Io(format!("Failed to flush download file: {}", e)))?;
        drop(file);

        scratch.read(DOWNLOAD_FILE)
    }

    fn delete(&mut self, name: &str) -> DumpResult<()> {
        self.session()?
            .rm(name)
            .map_err(|e| artifact_error("delete", name, e))?;

        tracing::debug!(name, "deleted remote backup file");
        Ok(())
    }

    fn close(&mut self) -> DumpResult<()> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .quit()
                .map_err(|e| DumpError::Connection(format!("FTP quit failed: {}", e)))?;
            tracing::debug!(server = %self.server, "ftp session closed");
        }
        Ok(())
    }
}

impl Drop for FtpBackend {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.quit();
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_server::{TestFtpServer, PASSWORD};
    use super::*;

    const NAME: &str = "db-bkp-20240101120000-users.gz";

    #[test]
    fn test_remote_url() {
        assert_eq!(
            remote_url("ftp.example.com", "/dumps/", "db-bkp-20240101120000-users.gz"),
            "ftp://ftp.example.com/dumps/db-bkp-20240101120000-users.gz"
        );
    }

    #[test]
    fn test_incomplete_settings_rejected() {
        let settings = FtpSettings {
            server: Some("127.0.0.1".into()),
            ..Default::default()
        };
        assert!(matches!(
            FtpBackend::connect(&settings),
            Err(DumpError::Config(_))
        ));
    }

    #[test]
    fn test_refused_connection_is_connection_error() {
        let mut settings = FtpSettings::new("127.0.0.1", "backup", "s3cret", "/dumps");
        settings.port = 1;
        settings.connect_timeout_secs = 2;

        match FtpBackend::connect(&settings) {
            Err(DumpError::Connection(msg)) => assert!(!msg.contains("s3cret")),
            Err(other) => panic!("unexpected error {}", other),
            Ok(_) => panic!("connected to a closed port"),
        }
    }

    #[test]
    fn test_unresolvable_host() {
        let mut settings =
            FtpSettings::new("no-such-host.invalid", "backup", "s3cret", "/dumps");
        settings.connect_timeout_secs = 2;
        assert!(matches!(
            FtpBackend::connect(&settings),
            Err(DumpError::Connection(_))
        ));
    }

    #[test]
    fn test_round_trip_against_server() {
        let server = TestFtpServer::start();
        let mut backend = FtpBackend::connect(&server.settings()).unwrap();
        assert_eq!(backend.kind(), BackendKind::Ftp);
        assert_eq!(backend.location(), "ftp://127.0.0.1/dumps/");
        assert!(backend.list().unwrap().is_empty());

        let location = backend.store(NAME, b"\x1f\x8b payload").unwrap();
        assert_eq!(
            location,
            Location::Url(format!("ftp://127.0.0.1/dumps/{}", NAME))
        );
        assert_eq!(server.state().files[NAME], b"\x1f\x8b payload");

        assert_eq!(backend.list().unwrap(), vec![NAME.to_string()]);
        assert_eq!(backend.retrieve(NAME).unwrap(), b"\x1f\x8b payload");

        backend.delete(NAME).unwrap();
        assert!(backend.list().unwrap().is_empty());

        backend.close().unwrap();
        let state = server.finish();
        assert!(state.files.is_empty());
        for cmd in ["USER", "PASS", "CWD", "TYPE", "STOR", "RETR", "NLST", "DELE"] {
            assert!(state.commands.iter().any(|c| c == cmd), "{} not sent", cmd);
        }
    }

    #[test]
    fn test_missing_remote_file_is_not_found() {
        let server = TestFtpServer::start();
        let mut backend = FtpBackend::connect(&server.settings()).unwrap();

        assert!(backend.retrieve(NAME).unwrap_err().is_not_found());
        assert!(backend.delete(NAME).unwrap_err().is_not_found());
        backend.close().unwrap();
    }

    #[test]
    fn test_empty_directory_answered_with_550() {
        let server = TestFtpServer::empty_listing_550();
        let mut backend = FtpBackend::connect(&server.settings()).unwrap();

        assert!(backend.list().unwrap().is_empty());
        backend.close().unwrap();
    }

    #[test]
    fn test_close_sends_quit_once() {
        let server = TestFtpServer::start();
        let mut backend = FtpBackend::connect(&server.settings()).unwrap();

        backend.close().unwrap();
        backend.close().unwrap();
        assert!(!backend.is_connected());
        assert!(matches!(backend.list(), Err(DumpError::Connection(_))));
        drop(backend);

        let state = server.finish();
        assert_eq!(state.quits, 1);
        assert_eq!(state.commands.iter().filter(|c| *c == "QUIT").count(), 1);
    }

    #[test]
    fn test_rejected_login_is_connection_error() {
        let server = TestFtpServer::rejecting_login();
        let mut settings = server.settings();
        settings.password = Some("wrong-password".into());

        match FtpBackend::connect(&settings) {
            Err(DumpError::Connection(msg)) => {
                assert!(msg.contains("login"));
                assert!(!msg.contains("wrong-password"));
                assert!(!msg.contains(PASSWORD));
            }
            Err(other) => panic!("unexpected error {}", other),
            Ok(_) => panic!("login accepted"),
        }
        assert_eq!(server.finish().quits, 1);
    }
}
