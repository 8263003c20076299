//! In-process HTTP stub for client tests

use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

/// Canned reply for one request
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl StubResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// What the stub received
#[derive(Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
}

/// Serves the given responses in order, one per request, then stops
pub struct StubServer {
    pub base_url: String,
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl StubServer {
    pub fn start(responses: Vec<StubResponse>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("bind stub server");
        let addr = server.server_addr().to_ip().expect("tcp address");

        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for stub in responses {
                let Ok(mut request) = server.recv() else { break };

                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                recorded.push(RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body,
                });

                if let Some(delay) = stub.delay {
                    thread::sleep(delay);
                }

                let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .expect("static header");
                let response = Response::from_string(stub.body)
                    .with_status_code(stub.status)
                    .with_header(header);
                let _ = request.respond(response);
            }
            recorded
        });

        Self {
            base_url: format!("http://{}", addr),
            handle,
        }
    }

    /// Wait for all canned responses to be served
    pub fn finish(self) -> Vec<RecordedRequest> {
        self.handle.join().expect("stub server thread")
    }
}

/// Base URL of a port nothing listens on
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let addr = listener.local_addr().expect("free port address");
    drop(listener);
    format!("http://{}", addr)
}
