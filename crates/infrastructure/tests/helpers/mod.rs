mod dns_server_mock;
#[cfg(all(feature = "dns-over-rustls", feature = "dns-over-https"))]
mod tls_server_mock;

pub use dns_server_mock::{MockBehavior, MockDnsServer, MOCK_ADDRESS, MOCK_TTL};
#[cfg(all(feature = "dns-over-rustls", feature = "dns-over-https"))]
pub use tls_server_mock::{HttpReply, MockHttpServer, MockTlsServer};
