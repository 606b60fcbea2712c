//! Listener implementation for the daemon socket.

use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use socket2::{Domain, SockAddr, Socket, Type};
use tracing::{debug, info, warn};

use cortexd_config::SocketSettings;

use super::{ConnectionHandler, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Listener bound to the daemon's Unix socket.
#[derive(Debug)]
pub struct SocketListener {
    path: Utf8PathBuf,
    listener: UnixListener,
}

impl SocketListener {
    /// Binds the socket described by `settings`.
    ///
    /// A stale socket file left by a previous run is removed first. A socket
    /// that still accepts connections, or a path that is not a socket, is
    /// refused.
    pub fn bind(settings: &SocketSettings) -> Result<Self, ListenerError> {
        let path = settings.path.clone();
        remove_stale_socket(&path)?;
        let listener = bind_unix(&path, settings.backlog)?;
        Ok(Self { path, listener })
    }

    /// Filesystem path of the bound socket.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Starts the accept loop on a background thread.
    pub fn start(self, handler: Arc<dyn ConnectionHandler>) -> Result<ListenerHandle, ListenerError> {
        if let Err(source) = self.listener.set_nonblocking(true) {
            cleanup_socket(&self.path);
            return Err(ListenerError::NonBlocking { source });
        }
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let handle = thread::spawn(move || run_accept_loop(&self, &shutdown_flag, &handler));
        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background listener thread.
#[derive(Debug)]
pub struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop after its current iteration.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept loop to exit and the socket file to be removed.
    pub fn join(mut self) -> Result<(), ListenerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| ListenerError::ThreadPanic),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop(
    listener: &SocketListener,
    shutdown: &AtomicBool,
    handler: &Arc<dyn ConnectionHandler>,
) {
    info!(
        target: LISTENER_TARGET,
        path = %listener.path,
        "socket listener active"
    );
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        match accept_connection(&listener.listener) {
            Ok(Some(stream)) => {
                last_error = None;
                let handler = Arc::clone(handler);
                thread::spawn(move || handler.handle(stream));
            }
            Ok(None) => thread::sleep(ACCEPT_BACKOFF),
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }

    cleanup_socket(&listener.path);
    info!(target: LISTENER_TARGET, path = %listener.path, "socket listener stopped");
}

fn accept_connection(listener: &UnixListener) -> io::Result<Option<UnixStream>> {
    match listener.accept() {
        Ok((stream, _)) => {
            stream.set_nonblocking(false)?;
            Ok(Some(stream))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

fn remove_stale_socket(path: &Utf8Path) -> Result<(), ListenerError> {
    if !path.exists() {
        return Ok(());
    }
    let metadata = fs::symlink_metadata(path).map_err(|source| ListenerError::Metadata {
        path: path.to_string(),
        source,
    })?;
    if !metadata.file_type().is_socket() {
        return Err(ListenerError::NotSocket {
            path: path.to_string(),
        });
    }
    match UnixStream::connect(path) {
        Ok(_stream) => Err(ListenerError::InUse {
            path: path.to_string(),
        }),
        Err(error)
            if error.kind() == io::ErrorKind::ConnectionRefused
                || error.kind() == io::ErrorKind::NotFound =>
        {
            debug!(target: LISTENER_TARGET, path = %path, "removing stale socket");
            fs::remove_file(path).map_err(|source| ListenerError::Cleanup {
                path: path.to_string(),
                source,
            })
        }
        Err(source) => Err(ListenerError::Connect {
            path: path.to_string(),
            source,
        }),
    }
}

fn bind_unix(path: &Utf8Path, backlog: u32) -> Result<UnixListener, ListenerError> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None).map_err(|source| {
        ListenerError::Create {
            path: path.to_string(),
            source,
        }
    })?;
    let address = SockAddr::unix(path).map_err(|source| ListenerError::Bind {
        path: path.to_string(),
        source,
    })?;
    socket.bind(&address).map_err(|source| ListenerError::Bind {
        path: path.to_string(),
        source,
    })?;
    let queue = i32::try_from(backlog).unwrap_or(i32::MAX);
    if let Err(source) = socket.listen(queue) {
        cleanup_socket(path);
        return Err(ListenerError::Listen {
            path: path.to_string(),
            backlog,
            source,
        });
    }
    Ok(socket.into())
}

fn cleanup_socket(path: &Utf8Path) {
    if let Err(error) = fs::remove_file(path)
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            path = %path,
            "failed to remove unix socket file"
        );
    }
}
