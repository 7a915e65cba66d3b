mod dns_server_mock;
mod sqlite;

pub use dns_server_mock::{MockBehavior, MockDnsServer, MOCK_ADDRESS, MOCK_TTL};
pub use sqlite::{connection_with, test_config};
