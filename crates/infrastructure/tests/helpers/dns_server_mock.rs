#![allow(dead_code)]
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

pub const MOCK_ADDRESS: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
pub const MOCK_TTL: u32 = 60;

#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// One A record for whatever was asked, over UDP and TCP.
    Answer { address: Ipv4Addr, ttl: u32 },
    /// UDP replies carry TC=1 and a bogus address; TCP replies are complete.
    Truncated,
    /// UDP replies are larger than 4096 bytes without TC; TCP replies are
    /// the normal answer.
    Oversized,
    /// A reply with the wrong id, then the real one.
    SpoofThenAnswer,
    /// Only replies with the wrong id.
    SpoofOnly,
    /// Header-only replies with the given rcode.
    Rcode(u8),
    /// Never replies.
    Silent,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self::Answer {
            address: MOCK_ADDRESS,
            ttl: MOCK_TTL,
        }
    }
}

/// In-process nameserver listening on UDP and TCP on the same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let local_addr = socket.local_addr()?;
        let listener = TcpListener::bind(local_addr).await?;

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let udp_counter = Arc::clone(&udp_queries);
        let tcp_counter = Arc::clone(&tcp_queries);

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            udp_counter.fetch_add(1, Ordering::SeqCst);
                            for response in Self::udp_responses(behavior, &buf[..len]) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                    result = listener.accept() => {
                        if let Ok((stream, _)) = result {
                            tcp_counter.fetch_add(1, Ordering::SeqCst);
                            tokio::spawn(Self::serve_stream(behavior, stream));
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr: local_addr,
            udp_queries,
            tcp_queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    /// Answers one length-prefixed query on any byte stream (TCP or TLS).
    pub async fn serve_stream<S>(behavior: MockBehavior, mut stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut len_buf = [0u8; 2];
        if stream.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        if stream.read_exact(&mut query).await.is_err() {
            return;
        }

        let response = match behavior {
            MockBehavior::Silent => return,
            MockBehavior::Rcode(rcode) => Self::build_response(&query, rcode, false, &[]),
            MockBehavior::Answer { address, ttl } => {
                Self::build_response(&query, 0, false, &[Self::a_record(address, ttl)])
            }
            _ => Self::build_response(&query, 0, false, &[Self::a_record(MOCK_ADDRESS, MOCK_TTL)]),
        };

        let _ = stream.write_all(&(response.len() as u16).to_be_bytes()).await;
        let _ = stream.write_all(&response).await;
    }

    /// Single NOERROR reply carrying the mock A record.
    pub fn answer_for(query: &[u8]) -> Vec<u8> {
        Self::build_response(query, 0, false, &[Self::a_record(MOCK_ADDRESS, MOCK_TTL)])
    }

    fn udp_responses(behavior: MockBehavior, query: &[u8]) -> Vec<Vec<u8>> {
        if query.len() < 12 {
            return vec![];
        }

        let answer = Self::a_record(MOCK_ADDRESS, MOCK_TTL);
        match behavior {
            MockBehavior::Answer { address, ttl } => {
                vec![Self::build_response(query, 0, false, &[Self::a_record(address, ttl)])]
            }
            MockBehavior::Truncated => vec![Self::build_response(
                query,
                0,
                true,
                &[Self::a_record(Ipv4Addr::new(192, 0, 2, 255), 1)],
            )],
            MockBehavior::Oversized => {
                let records = vec![answer; 300];
                vec![Self::build_response(query, 0, false, &records)]
            }
            MockBehavior::SpoofThenAnswer => vec![
                Self::spoofed(Self::build_response(query, 0, false, &[answer])),
                Self::build_response(query, 0, false, &[answer]),
            ],
            MockBehavior::SpoofOnly => {
                vec![Self::spoofed(Self::build_response(query, 0, false, &[answer]))]
            }
            MockBehavior::Rcode(rcode) => vec![Self::build_response(query, rcode, false, &[])],
            MockBehavior::Silent => vec![],
        }
    }

    fn spoofed(mut response: Vec<u8>) -> Vec<u8> {
        response[0] ^= 0xFF;
        response[1] ^= 0xFF;
        response
    }

    /// Answer record whose owner is a pointer to the question name.
    fn a_record(address: Ipv4Addr, ttl: u32) -> [u8; 16] {
        let mut record = [0u8; 16];
        record[..6].copy_from_slice(&[0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01]);
        record[6..10].copy_from_slice(&ttl.to_be_bytes());
        record[10..12].copy_from_slice(&[0x00, 0x04]);
        record[12..].copy_from_slice(&address.octets());
        record
    }

    fn build_response(query: &[u8], rcode: u8, truncated: bool, answers: &[[u8; 16]]) -> Vec<u8> {
        let mut response = Vec::with_capacity(12 + query.len() + answers.len() * 16);

        response.extend_from_slice(&query[0..2]);

        let mut flags_hi = 0x81;
        if truncated {
            flags_hi |= 0x02;
        }
        response.push(flags_hi);
        response.push(0x80 | (rcode & 0x0F));

        response.extend_from_slice(&query[4..6]);
        response.extend_from_slice(&(answers.len() as u16).to_be_bytes());
        response.extend_from_slice(&[0x00, 0x00]);
        response.extend_from_slice(&[0x00, 0x00]);

        if query.len() > 12 {
            response.extend_from_slice(&query[12..]);
        }
        for answer in answers {
            response.extend_from_slice(answer);
        }

        response
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
