#![allow(dead_code)]
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::runtime::Runtime;
use tokio::sync::oneshot;

pub const MOCK_ADDRESS: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
pub const MOCK_TTL: u32 = 60;

#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// One A record, 93.184.216.34 with TTL 60, for whatever was asked.
    Answer,
    /// Header-only replies with the given rcode.
    Rcode(u8),
    Silent,
}

/// UDP nameserver running on its own runtime, so SQL can be driven from
/// plain synchronous tests.
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    runtime: Option<Runtime>,
}

impl MockDnsServer {
    pub fn start(behavior: MockBehavior) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();

        // Bound outside the runtime so the server can also start from async tests.
        let std_socket = std::net::UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        std_socket.set_nonblocking(true).unwrap();
        let addr = std_socket.local_addr().unwrap();

        let queries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&queries);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        runtime.spawn(async move {
            let socket = UdpSocket::from_std(std_socket).unwrap();
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if let Some(response) = Self::build_response(behavior, &buf[..len]) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
            runtime: Some(runtime),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn build_response(behavior: MockBehavior, query: &[u8]) -> Option<Vec<u8>> {
        if query.len() < 12 {
            return None;
        }

        let (rcode, answers) = match behavior {
            MockBehavior::Silent => return None,
            MockBehavior::Answer => (0u8, 1u8),
            MockBehavior::Rcode(rcode) => (rcode, 0),
        };

        let mut response = Vec::with_capacity(512);
        response.extend_from_slice(&query[0..2]);
        response.push(0x81);
        response.push(0x80 | (rcode & 0x0F));
        response.extend_from_slice(&query[4..6]);
        response.extend_from_slice(&[0x00, answers]);
        response.extend_from_slice(&[0x00, 0x00]);
        response.extend_from_slice(&[0x00, 0x00]);
        response.extend_from_slice(&query[12..]);

        if answers > 0 {
            response.extend_from_slice(&[0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01]);
            response.extend_from_slice(&MOCK_TTL.to_be_bytes());
            response.extend_from_slice(&[0x00, 0x04]);
            response.extend_from_slice(&MOCK_ADDRESS.octets());
        }

        Some(response)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
