#![cfg(all(feature = "dns-over-rustls", feature = "dns-over-https"))]

use dns_sql_domain::{DnsQuery, NameserverAddr, RData, RecordType, TransportError};
use dns_sql_infrastructure::dns::transport::https::HttpsTransport;
use dns_sql_infrastructure::dns::transport::tls::TlsTransport;
use dns_sql_infrastructure::dns::transport::DnsTransport;
use dns_sql_infrastructure::dns::wire::{decode_message, encode_query, message_id};
use std::time::Duration;

mod helpers;
use helpers::{HttpReply, MockBehavior, MockHttpServer, MockTlsServer, MOCK_ADDRESS, MOCK_TTL};

const TIMEOUT: Duration = Duration::from_secs(5);

fn query_bytes(name: &str) -> (DnsQuery, Vec<u8>) {
    let query = DnsQuery::new(name, RecordType::A);
    let bytes = encode_query(&query).unwrap();
    (query, bytes)
}

#[tokio::test]
async fn test_tls_exchange_with_trusted_certificate() {
    let server = MockTlsServer::start(MockBehavior::default()).await;
    let transport = TlsTransport::new(NameserverAddr::Resolved(server.addr()), "localhost".to_string())
        .with_client_config(server.client_config());
    let (query, request) = query_bytes("example.test");

    let response = transport.send(&request, TIMEOUT).await.unwrap();

    assert_eq!(response.protocol_used, "TLS");
    assert_eq!(message_id(&response.bytes), Some(query.id));
    let message = decode_message(&response.bytes).unwrap();
    assert_eq!(message.answers.len(), 1);
    assert_eq!(message.answers[0].ttl, MOCK_TTL);
    assert_eq!(
        message.answers[0].rdata,
        RData::A {
            address: MOCK_ADDRESS
        }
    );
}

#[tokio::test]
async fn test_tls_untrusted_certificate_is_protocol_error() {
    let server = MockTlsServer::start(MockBehavior::default()).await;
    // Shared webpki roots do not include the self-signed certificate.
    let transport = TlsTransport::new(NameserverAddr::Resolved(server.addr()), "localhost".to_string());
    let (_, request) = query_bytes("example.test");

    let err = transport.send(&request, TIMEOUT).await.unwrap_err();

    assert!(matches!(err, TransportError::Protocol { .. }), "{err:?}");
}

#[tokio::test]
async fn test_tls_hostname_mismatch_is_protocol_error() {
    let server = MockTlsServer::start(MockBehavior::default()).await;
    let transport = TlsTransport::new(
        NameserverAddr::Resolved(server.addr()),
        "dns.example.net".to_string(),
    )
    .with_client_config(server.client_config());
    let (_, request) = query_bytes("example.test");

    let err = transport.send(&request, TIMEOUT).await.unwrap_err();

    assert!(matches!(err, TransportError::Protocol { .. }), "{err:?}");
}

#[tokio::test]
async fn test_https_exchange_posts_wire_message() {
    let server = MockHttpServer::start(HttpReply::Answer).await;
    let transport = HttpsTransport::new(server.url());
    let (query, request) = query_bytes("example.test");

    let response = transport.send(&request, TIMEOUT).await.unwrap();

    assert_eq!(response.protocol_used, "HTTPS");
    assert_eq!(server.requests(), 1);
    assert_eq!(message_id(&response.bytes), Some(query.id));
    let message = decode_message(&response.bytes).unwrap();
    assert_eq!(
        message.answers[0].rdata,
        RData::A {
            address: MOCK_ADDRESS
        }
    );
}

#[tokio::test]
async fn test_https_error_status_is_protocol_error() {
    for status in ["503 Service Unavailable", "404 Not Found", "415 Unsupported Media Type"] {
        let server = MockHttpServer::start(HttpReply::Status(status)).await;
        let transport = HttpsTransport::new(server.url());
        let (_, request) = query_bytes("example.test");

        let err = transport.send(&request, TIMEOUT).await.unwrap_err();

        match err {
            TransportError::Protocol { server: url, reason } => {
                assert_eq!(url, server.url());
                assert!(reason.contains(&format!("HTTP {}", &status[..3])), "{reason}");
            }
            other => panic!("expected a protocol error for {status}, got {other:?}"),
        }
    }
}
