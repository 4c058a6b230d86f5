//! Builds tonic's TLS transport config from the PEM paths in [`crate::TlsMaterial`]
//! (spec.md §4.5): plaintext, server-only TLS, or mutual TLS.

use std::path::Path;

use tonic::transport::{Certificate, Identity, ServerTlsConfig};

use crate::config::TlsMaterial;
use crate::Error;

/// Reads the PEM bytes at `path`, tagging any IO failure with the path for diagnostics.
fn read_pem(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| Error::TlsMaterial {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Builds a [`ServerTlsConfig`] for TLS or mutual TLS, or returns `None` for plaintext.
///
/// Mirrors spec.md §4.5's three modes: absent cert+key is plaintext (the caller never
/// invokes this), cert+key only presents a server identity, and cert+key+CA additionally
/// requires and verifies client certificates against the CA bundle.
pub fn build_tls_config(tls: &TlsMaterial) -> Result<Option<ServerTlsConfig>, Error> {
    let (cert_path, key_path) = match (&tls.cert, &tls.key) {
        (Some(cert), Some(key)) => (cert, key),
        _ => return Ok(None),
    };

    let cert_pem = read_pem(cert_path)?;
    let key_pem = read_pem(key_path)?;
    let identity = Identity::from_pem(cert_pem, key_pem);

    let mut config = ServerTlsConfig::new().identity(identity);

    if let Some(ca_path) = &tls.client_ca {
        let ca_pem = read_pem(ca_path)?;
        config = config.client_ca_root(Certificate::from_pem(ca_pem));
    }

    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rcgen::{generate_simple_self_signed, CertifiedKey};
    use tempfile::NamedTempFile;

    use super::*;
    use crate::config::{TlsMaterial, TransportMode};

    fn write_pem(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn self_signed_pair() -> (NamedTempFile, NamedTempFile) {
        let CertifiedKey { cert, key_pair } =
            generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        (write_pem(&cert.pem()), write_pem(&key_pair.serialize_pem()))
    }

    #[test]
    fn plaintext_material_builds_no_tls_config() {
        let tls = TlsMaterial::default();
        assert_eq!(tls.mode(), TransportMode::Plaintext);
        assert!(build_tls_config(&tls).unwrap().is_none());
    }

    #[test]
    fn cert_and_key_build_a_tls_config() {
        let (cert, key) = self_signed_pair();
        let tls = TlsMaterial {
            cert: Some(cert.path().to_path_buf()),
            key: Some(key.path().to_path_buf()),
            client_ca: None,
        };
        assert!(build_tls_config(&tls).unwrap().is_some());
    }

    #[test]
    fn mtls_material_with_ca_builds_a_tls_config() {
        let (cert, key) = self_signed_pair();
        let (ca_cert, _ca_key) = self_signed_pair();
        let tls = TlsMaterial {
            cert: Some(cert.path().to_path_buf()),
            key: Some(key.path().to_path_buf()),
            client_ca: Some(ca_cert.path().to_path_buf()),
        };
        assert_eq!(tls.mode(), TransportMode::MutualTls);
        assert!(build_tls_config(&tls).unwrap().is_some());
    }

    #[test]
    fn missing_cert_file_is_a_tls_material_error() {
        let tls = TlsMaterial {
            cert: Some("/nonexistent/cert.pem".into()),
            key: Some("/nonexistent/key.pem".into()),
            client_ca: None,
        };
        let err = build_tls_config(&tls).unwrap_err();
        assert!(matches!(err, Error::TlsMaterial { .. }));
    }
}
