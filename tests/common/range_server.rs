//! In-process HTTP/1.1 fixture serving one fixed body, with optional
//! byte-range support, for transfer engine tests.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// When false, Range headers are ignored, `Accept-Ranges` is never
    /// advertised, and GET always replies 200 with the full body.
    pub resume: bool,
    /// When false, HEAD gets a 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
    /// Serve only this many body bytes on the first GET, then close the
    /// connection early while still declaring the full Content-Length.
    /// Later GETs serve normally so a resume can complete.
    pub truncate_first_get_after: Option<usize>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            resume: true,
            head_allowed: true,
            truncate_first_get_after: None,
        }
    }
}

pub fn start(body: Vec<u8>) -> String {
    start_with_options(body, ServerOptions::default())
}

pub fn start_with_resume(body: Vec<u8>, resume: bool) -> String {
    start_with_options(
        body,
        ServerOptions {
            resume,
            ..ServerOptions::default()
        },
    )
}

pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fixture server");
    let addr = listener.local_addr().unwrap();
    let body = Arc::new(body);
    let truncated = Arc::new(AtomicBool::new(false));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let truncated = Arc::clone(&truncated);
            thread::spawn(move || serve(stream, &body, opts, &truncated));
        }
    });
    format!("http://{}/file.bin", addr)
}

fn serve(mut stream: TcpStream, body: &[u8], opts: ServerOptions, truncated: &AtomicBool) {
    let mut buf = [0u8; 4096];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]).to_string();
    let method = request.split_whitespace().next().unwrap_or("").to_string();
    let range_start = if opts.resume { range_start(&request) } else { None };
    let total = body.len() as u64;

    if method.eq_ignore_ascii_case("HEAD") {
        if !opts.head_allowed {
            let _ = stream
                .write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
            return;
        }
        let accept = if opts.resume { "Accept-Ranges: bytes\r\n" } else { "" };
        let _ = write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            total, accept
        );
        return;
    }
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    let (status, range_headers, slice): (&str, String, &[u8]) = match range_start {
        Some(start) if start >= total => {
            let _ = write!(
                stream,
                "HTTP/1.1 416 Range Not Satisfiable\r\nContent-Range: bytes */{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                total
            );
            return;
        }
        Some(start) => (
            "206 Partial Content",
            format!(
                "Content-Range: bytes {}-{}/{}\r\nAccept-Ranges: bytes\r\n",
                start,
                total - 1,
                total
            ),
            &body[start as usize..],
        ),
        None => ("200 OK", String::new(), body),
    };

    let mut send = slice;
    if let Some(limit) = opts.truncate_first_get_after {
        if !truncated.swap(true, Ordering::SeqCst) {
            send = &slice[..limit.min(slice.len())];
        }
    }

    let _ = write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        status,
        slice.len(),
        range_headers
    );
    let _ = stream.write_all(send);
}

/// Start offset of a `Range: bytes=X-` request header, if present.
fn range_start(request: &str) -> Option<u64> {
    for line in request.lines() {
        let (name, value) = match line.split_once(':') {
            Some(parts) => parts,
            None => continue,
        };
        if name.trim().eq_ignore_ascii_case("range") {
            let byte_range = value.trim().strip_prefix("bytes=")?;
            let (start, _end) = byte_range.split_once('-')?;
            return start.trim().parse().ok();
        }
    }
    None
}
