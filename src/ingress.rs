//! Getting text from the network into the tick context.
//!
//! The listener runs on its own thread and only ever touches the producer half of a ring
//! buffer; the scheduler loop drains the consumer half once per frame.

use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const MAX_REQUEST_BYTES: usize = 64 * 1024;
const ACCEPT_POLL: Duration = Duration::from_millis(10);
const READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum IngressError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("listener setup failed: {0}")]
    Setup(#[from] std::io::Error),
}

/// Cloneable producer handle; safe to use from any thread.
#[derive(Clone)]
pub struct TriggerSender {
    prod: Arc<Mutex<HeapProd<String>>>,
}

/// Consumer half, owned by the tick context.
pub struct TriggerReceiver {
    cons: HeapCons<String>,
}

pub fn trigger_queue(capacity: usize) -> (TriggerSender, TriggerReceiver) {
    let rb = HeapRb::<String>::new(capacity.max(1));
    let (prod, cons) = rb.split();
    (
        TriggerSender {
            prod: Arc::new(Mutex::new(prod)),
        },
        TriggerReceiver { cons },
    )
}

impl TriggerSender {
    /// Queue `text`; returns `false` if the queue is full or poisoned.
    pub fn send(&self, text: String) -> bool {
        let Ok(mut prod) = self.prod.lock() else {
            return false;
        };
        match prod.try_push(text) {
            Ok(()) => true,
            Err(_) => {
                warn!("trigger queue full; dropping payload");
                false
            }
        }
    }
}

impl TriggerReceiver {
    pub fn try_recv(&mut self) -> Option<String> {
        self.cons.try_pop()
    }

    /// Everything queued right now, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(text) = self.cons.try_pop() {
            out.push(text);
        }
        out
    }
}

/// Minimal HTTP endpoint: `POST /effect` with the text as body.
pub struct HttpIngress {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl HttpIngress {
    pub fn start(bind: &str, port: u16, sender: TriggerSender) -> Result<Self, IngressError> {
        let addr = format!("{bind}:{port}");
        let listener = TcpListener::bind(&addr).map_err(|source| IngressError::Bind {
            addr: addr.clone(),
            source,
        })?;
        listener.set_nonblocking(true)?;
        let local = listener.local_addr()?;
        info!(addr = %local, "code_splash listening");

        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);
        let handle = thread::spawn(move || accept_loop(listener, sender, &stop_for_thread));

        Ok(Self {
            addr: local,
            stop,
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for HttpIngress {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// One thread per connection: a silent client holds only its own handler, for at most
/// `READ_TIMEOUT`.
fn accept_loop(listener: TcpListener, sender: TriggerSender, stop: &AtomicBool) {
    while !stop.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                let sender = sender.clone();
                let spawned = thread::Builder::new()
                    .name("code_splash-conn".to_string())
                    .spawn(move || {
                        if let Err(err) = handle_connection(stream, &sender) {
                            debug!(%peer, error = %err, "connection dropped");
                        }
                    });
                if let Err(err) = spawned {
                    warn!(%peer, error = %err, "could not spawn connection handler");
                }
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(err) => {
                warn!(error = %err, "accept failed");
                thread::sleep(ACCEPT_POLL);
            }
        }
    }
}

fn handle_connection(mut stream: TcpStream, sender: &TriggerSender) -> std::io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let raw = read_request(&mut stream)?;
    let request = String::from_utf8_lossy(&raw);

    let response: &[u8] = match parse_request(&request) {
        Some(body) => {
            if sender.send(body) {
                b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK"
            } else {
                b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\n\r\nBusy"
            }
        }
        None => {
            warn!("rejected request that is not POST /effect with a body");
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\n\r\nNot Found"
        }
    };
    stream.write_all(response)?;
    stream.flush()
}

/// Read until the declared body is complete, the peer closes, or the size cap is hit.
fn read_request(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(n) => n,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
            Err(err) => return Err(err),
        };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() >= MAX_REQUEST_BYTES {
            buf.truncate(MAX_REQUEST_BYTES);
            break;
        }
        if request_complete(&buf) {
            break;
        }
    }
    Ok(buf)
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&buf[..header_end]);
    let declared = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok());
    match declared {
        Some(len) => buf.len() >= header_end + 4 + len,
        None => true,
    }
}

/// Body of a `POST /effect` request with CRLF line breaks normalised to `\n`.
pub fn parse_request(request: &str) -> Option<String> {
    let lines: Vec<&str> = request.split("\r\n").collect();
    let request_line = lines.first()?;
    if !request_line.starts_with("POST /effect") {
        return None;
    }
    let blank = lines.iter().position(|line| line.is_empty())?;
    if blank + 1 >= lines.len() {
        return None;
    }
    Some(lines[blank + 1..].join("\n"))
}
