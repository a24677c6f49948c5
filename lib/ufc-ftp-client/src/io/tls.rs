/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::WebPkiSupportedAlgorithms;
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::config::FtpTlsConfig;
use crate::error::FtpConnectError;

/// Accept any server certificate, but still check the handshake signatures.
#[derive(Debug)]
struct NoCertificateVerification {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for NoCertificateVerification {
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
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

/// The client side tls setup of one session.
///
/// The same rustls config and server name are used for the control channel and
/// all data channels, so data channels can resume the control channel session.
/// Many servers refuse data connections that do not.
#[derive(Clone)]
pub struct FtpTlsContext {
    connector: TlsConnector,
    server_name: ServerName<'static>,
    handshake_timeout: Duration,
}

impl FtpTlsContext {
    pub fn build(config: &FtpTlsConfig, host: &str) -> Result<Self, FtpConnectError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| FtpConnectError::InvalidTlsConfig(e.to_string()))?;

        let client_config = if config.accept_invalid_certs {
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoCertificateVerification {
                    algorithms: provider.signature_verification_algorithms,
                }))
                .with_no_client_auth()
        } else {
            let root_store = load_root_store(config)?;
            builder
                .with_root_certificates(root_store)
                .with_no_client_auth()
        };

        let name = config.server_name.as_deref().unwrap_or(host);
        let server_name = ServerName::try_from(name.to_string())
            .map_err(|e| FtpConnectError::InvalidTlsConfig(format!("invalid server name: {e}")))?;

        Ok(FtpTlsContext {
            connector: TlsConnector::from(Arc::new(client_config)),
            server_name,
            handshake_timeout: config.handshake_timeout,
        })
    }

    #[inline]
    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
    }

    pub(crate) async fn connect<S>(&self, stream: S) -> io::Result<TlsStream<S>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.connector
            .connect(self.server_name.clone(), stream)
            .await
    }
}

fn load_root_store(config: &FtpTlsConfig) -> Result<RootCertStore, FtpConnectError> {
    let mut root_store = RootCertStore::empty();
    if !config.no_default_ca_certs {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    if let Some(path) = &config.ca_cert_file {
        let contents = std::fs::read(path).map_err(|e| {
            FtpConnectError::InvalidTlsConfig(format!(
                "failed to read ca cert file {}: {e}",
                path.display()
            ))
        })?;
        let mut added = 0;
        for (i, r) in CertificateDer::pem_slice_iter(&contents).enumerate() {
            let cert = r.map_err(|e| {
                FtpConnectError::InvalidTlsConfig(format!("invalid certificate #{i}: {e:?}"))
            })?;
            root_store.add(cert).map_err(|e| {
                FtpConnectError::InvalidTlsConfig(format!("unsupported certificate #{i}: {e}"))
            })?;
            added += 1;
        }
        if added == 0 {
            return Err(FtpConnectError::InvalidTlsConfig(format!(
                "no valid certificate found in {}",
                path.display()
            )));
        }
    }

    if root_store.is_empty() {
        return Err(FtpConnectError::InvalidTlsConfig(
            "no ca certificate is available".to_string(),
        ));
    }
    Ok(root_store)
}
