//! Connection handler that dispatches JSONL requests.
//!
//! Each accepted connection carries exactly one request line and receives
//! exactly one response line. Socket timeouts and the admission limit are read
//! from the live configuration snapshot per connection, so a reload takes
//! effect for the next client without restarting the listener.

use std::io::{self, Read};
use std::os::unix::net::UnixStream;
use std::sync::Arc;

use tracing::{debug, warn};

use cortexd_types::Response;

use crate::config_store::ConfigStore;
use crate::transport::{ConnectionHandler, RateLimiter};

use super::dispatcher::{DISPATCH_TARGET, Dispatcher};
use super::errors::DispatchError;
use super::request::parse_request;
use super::response::ResponseWriter;

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Connection handler that parses, admits and dispatches one request.
#[derive(Debug)]
pub struct DispatchConnectionHandler {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ConfigStore>,
    limiter: RateLimiter,
}

impl DispatchConnectionHandler {
    /// Creates a handler routing through `dispatcher` and reading transport
    /// settings from `store`.
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<ConfigStore>) -> Self {
        Self {
            dispatcher,
            store,
            limiter: RateLimiter::new(),
        }
    }

    fn dispatch(&self, mut stream: UnixStream) {
        let config = self.store.snapshot();
        let timeout = Some(config.socket_timeout());
        if let Err(error) = stream
            .set_read_timeout(timeout)
            .and_then(|()| stream.set_write_timeout(timeout))
        {
            warn!(target: DISPATCH_TARGET, %error, "failed to apply socket timeouts");
        }

        let response = match read_request_line(&mut stream) {
            Ok(Some(line)) => self.respond(&line, config.rate_limit.max_requests_per_sec),
            Ok(None) => {
                debug!(target: DISPATCH_TARGET, "client disconnected without request");
                return;
            }
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "failed to read request");
                error.to_response()
            }
        };

        if let Err(error) = ResponseWriter::new(&mut stream).write(&response) {
            warn!(target: DISPATCH_TARGET, %error, "failed to write response");
        }
    }

    fn respond(&self, line: &[u8], limit: u32) -> Response {
        if !self.limiter.try_acquire(limit) {
            let error = DispatchError::RateLimited { limit };
            warn!(target: DISPATCH_TARGET, %error, "request refused");
            return error.to_response();
        }
        match parse_request(line) {
            Ok(request) => self.dispatcher.handle(&request),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "malformed request");
                error.to_response()
            }
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: UnixStream) {
        self.dispatch(stream);
    }
}

/// Reads a bounded JSONL request line from the stream.
///
/// Returns `Ok(None)` if the client disconnects without sending data, and the
/// partial line if it disconnects before the newline.
fn read_request_line(stream: &mut impl Read) -> Result<Option<Vec<u8>>, DispatchError> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        let bytes_read = read_with_retry(stream, &mut chunk)?;

        if bytes_read == 0 {
            return Ok(if buffer.is_empty() {
                None
            } else {
                Some(buffer)
            });
        }

        if let Some(newline_pos) = chunk[..bytes_read].iter().position(|b| *b == b'\n') {
            buffer.extend_from_slice(&chunk[..=newline_pos]);
            enforce_limit(buffer.len())?;
            return Ok(Some(buffer));
        }

        buffer.extend_from_slice(&chunk[..bytes_read]);
        enforce_limit(buffer.len())?;
    }
}

/// Reads from the stream, retrying on interrupts.
fn read_with_retry(stream: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

fn enforce_limit(size: usize) -> Result<(), DispatchError> {
    if size > MAX_REQUEST_BYTES {
        return Err(DispatchError::request_too_large(size, MAX_REQUEST_BYTES));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Cursor, Write};
    use std::net::Shutdown;
    use std::thread;

    use rstest::{fixture, rstest};
    use serde_json::json;

    use cortexd_config::Config;
    use cortexd_types::ErrorKind;

    use crate::collaborators::Collaborators;
    use crate::dispatch::HandlerRegistry;
    use crate::tests::support::MemorySource;

    use super::*;

    const CONFIG_PATH: &str = "/etc/cortex/daemon.yaml";

    fn handler_with(config: Config) -> Arc<DispatchConnectionHandler> {
        let source = Arc::new(MemorySource::new());
        source.insert(CONFIG_PATH, config);
        let store = Arc::new(ConfigStore::with_source(source));
        store.load(CONFIG_PATH).expect("load test configuration");
        let registry = HandlerRegistry::standard(Arc::clone(&store), Collaborators::default())
            .expect("standard registry");
        Arc::new(DispatchConnectionHandler::new(
            Arc::new(Dispatcher::new(registry)),
            store,
        ))
    }

    #[fixture]
    fn handler() -> Arc<DispatchConnectionHandler> {
        handler_with(Config::default())
    }

    /// Sends `request` over a socket pair and collects every response line.
    fn exchange(handler: &Arc<DispatchConnectionHandler>, request: &[u8]) -> Vec<Response> {
        let (mut client, server) = UnixStream::pair().expect("socket pair");
        let worker = Arc::clone(handler);
        let server_thread = thread::spawn(move || worker.handle(server));

        client.write_all(request).expect("write request");
        client.shutdown(Shutdown::Write).expect("half-close");

        let mut responses = Vec::new();
        let mut reader = BufReader::new(client);
        let mut line = String::new();
        while reader.read_line(&mut line).expect("read response") > 0 {
            responses.push(serde_json::from_str(&line).expect("response line"));
            line.clear();
        }
        server_thread.join().expect("server thread");
        responses
    }

    #[rstest]
    fn dispatches_one_request(handler: Arc<DispatchConnectionHandler>) {
        let responses = exchange(&handler, b"{\"method\":\"ping\"}\n");
        assert_eq!(responses, vec![Response::success(json!({"pong": true}))]);
    }

    #[rstest]
    fn unterminated_line_is_still_dispatched(handler: Arc<DispatchConnectionHandler>) {
        let responses = exchange(&handler, b"{\"method\":\"version\"}");
        assert_eq!(responses.len(), 1);
        assert!(responses[0].is_success());
    }

    #[rstest]
    fn malformed_request_gets_one_error(handler: Arc<DispatchConnectionHandler>) {
        let responses = exchange(&handler, b"{\"method\":\n");
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].error_kind(), Some(ErrorKind::InvalidArgument));
    }

    #[rstest]
    fn unknown_method_gets_not_found(handler: Arc<DispatchConnectionHandler>) {
        let responses = exchange(&handler, b"{\"method\":\"reboot\"}\n");
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].error_kind(), Some(ErrorKind::NotFound));
    }

    #[rstest]
    fn silent_client_gets_no_response(handler: Arc<DispatchConnectionHandler>) {
        assert!(exchange(&handler, b"").is_empty());
    }

    #[test]
    fn requests_over_the_limit_are_refused() {
        let mut config = Config::default();
        config.rate_limit.max_requests_per_sec = 1;
        let handler = handler_with(config);

        let first = exchange(&handler, b"{\"method\":\"ping\"}\n");
        let second = exchange(&handler, b"{\"method\":\"ping\"}\n");

        assert!(first[0].is_success());
        assert_eq!(second[0].error_kind(), Some(ErrorKind::Unavailable));
        assert!(
            second[0]
                .message()
                .is_some_and(|message| message.contains("rate limit"))
        );
    }

    #[test]
    fn oversized_request_is_rejected() {
        let mut payload = vec![b'x'; MAX_REQUEST_BYTES + 10];
        payload.push(b'\n');
        let error = read_request_line(&mut Cursor::new(payload)).expect_err("too large");
        assert!(matches!(error, DispatchError::RequestTooLarge { .. }));
    }

    #[test]
    fn reads_stop_at_the_first_newline() {
        let mut input = Cursor::new(b"first\nsecond\n".to_vec());
        let line = read_request_line(&mut input).expect("read").expect("line");
        assert_eq!(line, b"first\n");
    }
}
