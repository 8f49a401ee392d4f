//! TLS trust-anchor strategies for the DoT client.
//!
//! Two strategies, chosen at construction by [`crate::config::TrustStrategy`]:
//!
//! - [`pinned_roots`] — the compiled-in `webpki-roots` bundle, a
//!   build-time-embedded anchor set and the secure default.
//! - [`harvest_peer_roots`] — dial the upstream once with certificate
//!   verification disabled, capture whatever chain it presents, and
//!   trust exactly that chain for the verified connection that follows.
//!   This is `InsecureSkipVerify` plus pin-on-first-sight in one step;
//!   it is NOT TOFU, because the pin is never persisted across calls,
//!   and it is NOT a secure default.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use super::DotError;

/// The compiled-in Mozilla root set shipped by `webpki-roots`.
pub fn pinned_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    roots
}

/// A verifier that accepts any certificate chain, used only to harvest
/// the peer's presented chain over a throwaway connection. Never used
/// for the connection a request is actually sent over.
#[derive(Debug)]
struct AcceptAnyCert;

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}

/// Opens an unverified TLS connection to `host:port` and returns the
/// peer certificate chain it presented, to be trusted for a subsequent
/// verified connection. Errors if the dial fails or the peer presents
/// an empty chain.
pub async fn harvest_peer_roots(host: &str, port: u16) -> Result<RootCertStore, DotError> {
    let tcp = TcpStream::connect((host, port)).await.map_err(|source| DotError::Dial {
        host: host.to_string(),
        port,
        source,
    })?;

    let mut danger_config = ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCert))
        .with_no_client_auth();
    danger_config.enable_sni = true;
    let connector = TlsConnector::from(Arc::new(danger_config));

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| DotError::Trust(format!("{host:?} is not a valid DNS name or IP address")))?;

    let tls = connector
        .connect(server_name, tcp)
        .await
        .map_err(|source| DotError::Handshake {
            host: host.to_string(),
            port,
            source,
        })?;

    let (_, conn) = tls.get_ref();
    let chain = conn
        .peer_certificates()
        .ok_or_else(|| DotError::Trust("upstream presented no certificate chain".to_string()))?;
    if chain.is_empty() {
        return Err(DotError::Trust("upstream presented an empty certificate chain".to_string()));
    }

    let mut roots = RootCertStore::empty();
    for cert in chain {
        roots
            .add(cert.clone())
            .map_err(|e| DotError::Trust(format!("failed to pin harvested certificate: {e}")))?;
    }
    Ok(roots)
}
