//! Mock DNS-over-TLS upstream and DNS message builders shared by the
//! integration tests in this directory.
//!
//! The accept loop (`TlsAcceptor::accept`, a 2-byte length-prefix read,
//! a single write) is grounded on the teacher's `transport/dot.rs`
//! `DotServer::handle_tls_stream`. The self-signed certificate is built
//! the way the teacher's `transport/cert_gen.rs` builds one
//! (`CertificateParams` + `KeyPair::generate` + `self_signed`), trusted
//! in these tests via `TrustStrategy::PeerObserved` rather than a real CA.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rcgen::{CertificateParams, KeyPair};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use tollgate::dns::codec::{encode, Transport};
use tollgate::dns::enums::{DNSResourceClass, DNSResourceType};
use tollgate::dns::header::DNSHeader;
use tollgate::dns::message::DNSMessage;
use tollgate::dns::question::DNSQuestion;
use tollgate::dns::resource::{RData, ResourceRecord};

/// How the mock upstream responds once it has accepted a TLS connection.
#[derive(Clone)]
pub enum UpstreamBehavior {
    /// Reads one request, ignores its content, writes back this exact
    /// TCP-framed reply.
    FixedReply(Vec<u8>),
    /// Completes the handshake, then never reads or writes until the
    /// client gives up; used to exercise the resolver timeout (S6).
    Stall,
}

/// A throwaway DoT server bound to an ephemeral localhost port.
pub struct MockUpstream {
    pub addr: SocketAddr,
    connections: Arc<AtomicUsize>,
}

impl MockUpstream {
    pub async fn start(behavior: UpstreamBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock upstream");
        let addr = listener.local_addr().expect("local addr");
        let acceptor = TlsAcceptor::from(Arc::new(self_signed_server_config()));
        let connections = Arc::new(AtomicUsize::new(0));

        let connections_for_task = connections.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _peer)) = listener.accept().await else { break };
                connections_for_task.fetch_add(1, Ordering::SeqCst);
                let acceptor = acceptor.clone();
                let behavior = behavior.clone();
                tokio::spawn(async move {
                    let Ok(mut tls) = acceptor.accept(stream).await else { return };
                    match behavior {
                        UpstreamBehavior::FixedReply(reply) => {
                            let mut len_buf = [0u8; 2];
                            if tls.read_exact(&mut len_buf).await.is_err() {
                                return;
                            }
                            let body_len = u16::from_be_bytes(len_buf) as usize;
                            let mut body = vec![0u8; body_len];
                            if tls.read_exact(&mut body).await.is_err() {
                                return;
                            }
                            let _ = tls.write_all(&reply).await;
                        }
                        UpstreamBehavior::Stall => {
                            tokio::time::sleep(Duration::from_secs(3600)).await;
                        }
                    }
                });
            }
        });

        Self { addr, connections }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

fn self_signed_server_config() -> ServerConfig {
    let mut params = CertificateParams::default();
    params.subject_alt_names = vec![rcgen::SanType::IpAddress(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST))];
    let key_pair = KeyPair::generate().expect("generate key pair");
    let cert = params.self_signed(&key_pair).expect("self-sign certificate");

    let cert_der = CertificateDer::from(cert.der().to_vec());
    let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der], key_der)
        .expect("build server tls config")
}

/// Builds a single-question `A` query.
pub fn a_query(id: u16, labels: &[&str]) -> DNSMessage {
    DNSMessage {
        header: DNSHeader {
            id,
            rd: true,
            qdcount: 1,
            ..Default::default()
        },
        questions: vec![DNSQuestion {
            name: labels.iter().map(|s| s.to_string()).collect(),
            qtype: DNSResourceType::A,
            qclass: DNSResourceClass::IN,
        }],
        answers: vec![],
        authorities: vec![],
        additionals: vec![],
    }
}

/// Builds the reply to [`a_query`]: same question, one `A` answer
/// carrying `ip`, flagged `qr`/`ra`.
pub fn a_reply(id: u16, labels: &[&str], ip: [u8; 4]) -> DNSMessage {
    let name: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
    DNSMessage {
        header: DNSHeader {
            id,
            qr: true,
            rd: true,
            ra: true,
            qdcount: 1,
            ancount: 1,
            ..Default::default()
        },
        questions: vec![DNSQuestion {
            name: name.clone(),
            qtype: DNSResourceType::A,
            qclass: DNSResourceClass::IN,
        }],
        answers: vec![ResourceRecord {
            name,
            rtype: DNSResourceType::A,
            rclass: DNSResourceClass::IN,
            ttl: 60,
            rdata: RData::Opaque(ip.to_vec()),
        }],
        authorities: vec![],
        additionals: vec![],
    }
}

pub fn tcp_wire(msg: &DNSMessage) -> Vec<u8> {
    encode(msg, Transport::Tcp).expect("encode tcp")
}

pub fn udp_wire(msg: &DNSMessage) -> Vec<u8> {
    encode(msg, Transport::Udp).expect("encode udp")
}
