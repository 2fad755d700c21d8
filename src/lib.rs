//! Core TLS chain inspection: connect to an arbitrary IP under a chosen
//! SNI hostname, capture the certificate chain the peer presents, and
//! re-validate that chain independently against the platform root store.
//!
//! The handshake deliberately runs with peer verification disabled so that
//! expired, mismatched or untrusted chains can still be captured and
//! reported. Verification happens afterwards, over the captured material,
//! in [`validate_chain`].

use openssl::ssl::{Ssl, SslContext, SslMethod, SslVerifyMode};
use openssl::stack::Stack;
use openssl::x509::store::{X509Store, X509StoreBuilder, X509StoreRef};
use openssl::x509::verify::X509VerifyParam;
use openssl::x509::{X509, X509NameRef, X509Ref, X509StoreContext, X509VerifyResult};
use serde::{Deserialize, Serialize};
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use url::Url;

pub mod config;
pub mod error;
pub mod metrics;
pub mod server;

pub use error::TlsCheckError;

/// TLS port the connector always dials.
const TLS_PORT: u16 = 443;

/// Default bound on the TCP connect phase.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Reduces a raw hostname string to a bare host usable for SNI and
/// hostname matching.
///
/// Accepts a bare host, a `host:port` literal, or a URL with or without a
/// scheme. Inputs that cannot be parsed as a URL even with an `https://`
/// prefix are passed through verbatim; malformed input is tolerated, not
/// rejected. An explicit non-default port is retained as part of the
/// returned string.
pub fn normalize_hostname(raw: &str) -> String {
    if let Some(host) = host_component(raw) {
        return host;
    }
    if let Some(host) = host_component(&format!("https://{}", raw)) {
        return host;
    }
    raw.to_string()
}

fn host_component(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    match parsed.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

/// Connects to `ip:443` and captures the certificate chain presented
/// during the handshake, leaf first, in the order transmitted.
///
/// `sni_hostname` is sent as the server name so the peer selects the right
/// virtual host, but the handshake itself performs no certificate
/// verification; an invalid chain still completes and is returned for the
/// validator to judge. The connection is closed on every exit path when
/// the stream is dropped. Empty inputs are rejected before any network
/// activity.
pub fn fetch_chain(
    ip: &str,
    sni_hostname: &str,
    timeout: Duration,
) -> Result<Vec<X509>, TlsCheckError> {
    if ip.is_empty() {
        return Err(TlsCheckError::InvalidInput {
            field: "ip".to_string(),
            reason: "cannot be empty".to_string(),
        });
    }
    if sni_hostname.is_empty() {
        return Err(TlsCheckError::InvalidInput {
            field: "hostname".to_string(),
            reason: "cannot be empty".to_string(),
        });
    }

    let mut addresses =
        (ip, TLS_PORT)
            .to_socket_addrs()
            .map_err(|e| TlsCheckError::DnsResolution {
                host: ip.to_string(),
                source: e,
            })?;
    let socket_addr = addresses
        .next()
        .ok_or_else(|| TlsCheckError::DnsResolution {
            host: ip.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses resolved"),
        })?;

    let tcp_stream = TcpStream::connect_timeout(&socket_addr, timeout).map_err(|e| {
        if e.kind() == io::ErrorKind::TimedOut || e.kind() == io::ErrorKind::WouldBlock {
            TlsCheckError::Timeout {
                operation: format!("TCP connect to {}", socket_addr),
            }
        } else {
            TlsCheckError::ConnectionFailed {
                address: socket_addr.to_string(),
                source: e,
            }
        }
    })?;
    tcp_stream.set_read_timeout(Some(timeout))?;
    tcp_stream.set_write_timeout(Some(timeout))?;

    let mut context = SslContext::builder(SslMethod::tls())?;
    context.set_verify(SslVerifyMode::NONE);
    let context = context.build();

    let mut ssl = Ssl::new(&context)?;
    ssl.set_hostname(sni_hostname)?;

    let stream = ssl.connect(tcp_stream)?;

    let chain: Vec<X509> = match stream.ssl().peer_cert_chain() {
        Some(stack) => stack.iter().map(|cert| cert.to_owned()).collect(),
        None => Vec::new(),
    };
    if chain.is_empty() {
        return Err(TlsCheckError::NoCertificates);
    }
    Ok(chain)
}

/// Public projection of one captured certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertSummary {
    pub subject: String,
    pub issuer: String,
    pub not_before: String,
    pub not_after: String,
    /// SAN DNS names; populated only for the leaf certificate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,
    pub is_ca: bool,
    pub signature_algorithm: String,
}

/// Maps a captured chain to its public projections, preserving order.
///
/// SAN entries are meaningful only for the server identity being checked,
/// so `dns_names` is filled for index 0 and left empty for intermediates.
/// Validity timestamps come out as ASN.1 GMT strings. Pure projection with
/// no failure modes.
pub fn summarize_chain(chain: &[X509]) -> Vec<CertSummary> {
    chain
        .iter()
        .enumerate()
        .map(|(index, cert)| {
            let mut dns_names = Vec::new();
            if index == 0 {
                if let Some(sans) = cert.subject_alt_names() {
                    for san in sans {
                        if let Some(dns) = san.dnsname() {
                            dns_names.push(dns.to_string());
                        }
                    }
                }
            }
            CertSummary {
                subject: format_name(cert.subject_name()),
                issuer: format_name(cert.issuer_name()),
                not_before: cert.not_before().to_string(),
                not_after: cert.not_after().to_string(),
                dns_names,
                is_ca: cert_is_ca(cert),
                signature_algorithm: cert.signature_algorithm().object().to_string(),
            }
        })
        .collect()
}

fn format_name(name: &X509NameRef) -> String {
    let mut parts = Vec::new();
    for entry in name.entries() {
        let key = entry.object().nid().short_name().unwrap_or("UNDEF");
        let value = String::from_utf8_lossy(entry.data().as_slice());
        parts.push(format!("{}={}", key, value));
    }
    parts.join(", ")
}

// openssl does not expose BasicConstraints, so the CA flag is read from a
// one-off x509-parser pass over the DER encoding.
fn cert_is_ca(cert: &X509Ref) -> bool {
    cert.to_der()
        .ok()
        .and_then(|der| {
            x509_parser::parse_x509_certificate(&der)
                .ok()
                .map(|(_, parsed)| parsed.is_ca())
        })
        .unwrap_or(false)
}

/// Outcome of re-validating a captured chain. Produced once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainVerdict {
    Valid,
    Invalid(String),
}

impl ChainVerdict {
    /// Human-readable validation message for the API response.
    pub fn message(&self) -> String {
        match self {
            ChainVerdict::Valid => "Certificate chain is valid.".to_string(),
            ChainVerdict::Invalid(reason) => {
                format!("Certificate chain verification failed: {}", reason)
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ChainVerdict::Valid)
    }
}

/// Re-validates a captured chain against the platform root store.
///
/// Element 0 is treated as the leaf; the remaining elements form the only
/// intermediate pool available for path building, so a chain missing its
/// intermediates fails here even when the platform knows the issuer.
/// `hostname` is matched against the leaf per standard X.509 rules,
/// wildcards included. Deterministic and side-effect-free; never touches
/// the network.
pub fn validate_chain(chain: &[X509], hostname: &str) -> Result<ChainVerdict, TlsCheckError> {
    let store = platform_trust_store(hostname)?;
    verify_with_store(chain, &store)
}

fn platform_trust_store(hostname: &str) -> Result<X509Store, TlsCheckError> {
    let mut builder = X509StoreBuilder::new()?;
    builder.set_default_paths()?;
    let mut param = X509VerifyParam::new()?;
    param.set_host(hostname)?;
    builder.set_param(&param)?;
    Ok(builder.build())
}

fn verify_with_store(
    chain: &[X509],
    store: &X509StoreRef,
) -> Result<ChainVerdict, TlsCheckError> {
    let leaf = chain.first().ok_or(TlsCheckError::NoCertificates)?;

    let mut intermediates = Stack::new()?;
    for cert in chain.iter().skip(1) {
        intermediates.push(cert.clone())?;
    }

    let mut store_context = X509StoreContext::new()?;
    let result = store_context.init(store, leaf, &intermediates, |ctx| {
        ctx.verify_cert()?;
        Ok(ctx.error())
    })?;

    if result == X509VerifyResult::OK {
        Ok(ChainVerdict::Valid)
    } else {
        Ok(ChainVerdict::Invalid(result.error_string().to_string()))
    }
}
