//! CRL loading and issuer lookup.
//!
//! Only the issuer match and the signature check are performed; revocation
//! entries are not interpreted.

use ring::signature::{self, UnparsedPublicKey, VerificationAlgorithm};
use std::path::Path;
use tracing::debug;
use x509_parser::revocation_list::CertificateRevocationList;
use x509_parser::x509::SubjectPublicKeyInfo;
use x509_parser::{parse_x509_certificate, parse_x509_crl};

use crate::error::{Result, ScanError};
use crate::types::LoadedStore;

/// PEM label of a CRL block.
pub const PEM_CRL_TAG: &str = "X509 CRL";

const OID_SHA1_RSA: &str = "1.2.840.113549.1.1.5";
const OID_SHA256_RSA: &str = "1.2.840.113549.1.1.11";
const OID_SHA384_RSA: &str = "1.2.840.113549.1.1.12";
const OID_SHA512_RSA: &str = "1.2.840.113549.1.1.13";
const OID_ECDSA_SHA256: &str = "1.2.840.10045.4.3.2";
const OID_ECDSA_SHA384: &str = "1.2.840.10045.4.3.3";
const OID_ED25519: &str = "1.3.101.112";

const OID_CURVE_P256: &str = "1.2.840.10045.3.1.7";
const OID_CURVE_P384: &str = "1.3.132.0.34";

/// Read every CRL in `path`, as DER.
///
/// The file may hold any number of PEM `X509 CRL` blocks or one DER CRL.
///
/// # Errors
///
/// `ScanError::Io` if the file cannot be read, `ScanError::CrlParse` if it
/// holds no CRL or a CRL that does not parse.
pub fn load_crls(path: &Path) -> Result<Vec<Vec<u8>>> {
    let path_str = path.display().to_string();
    let data = std::fs::read(path).map_err(|e| ScanError::io(&path_str, e))?;
    let parse_err = |reason: String| ScanError::CrlParse {
        path: path_str.clone(),
        reason,
    };

    let ders: Vec<Vec<u8>> = match pem::parse_many(&data) {
        Ok(blocks) if !blocks.is_empty() => blocks
            .into_iter()
            .filter(|p| p.tag() == PEM_CRL_TAG)
            .map(pem::Pem::into_contents)
            .collect(),
        _ => vec![data],
    };
    if ders.is_empty() {
        return Err(parse_err(format!("no {PEM_CRL_TAG} block")));
    }
    for der in &ders {
        parse_x509_crl(der).map_err(|e| parse_err(e.to_string()))?;
    }
    debug!(path = %path_str, count = ders.len(), "loaded CRLs");
    Ok(ders)
}

/// Alias of the first entry whose subject is the CRL issuer and whose key
/// verifies the CRL signature.
///
/// Entries are tried in store order; a candidate whose check fails is
/// skipped.
#[must_use]
pub fn verify(store: &LoadedStore, crl: &CertificateRevocationList<'_>) -> Option<String> {
    let signed = crl.tbs_cert_list.as_ref();
    let sig_oid = crl.signature_algorithm.algorithm.to_id_string();

    for (alias, entry) in store.entries() {
        let Some(stored) = entry.certificate() else {
            continue;
        };
        let Ok((_, cert)) = parse_x509_certificate(&stored.der) else {
            continue;
        };
        if cert.subject() != crl.issuer() {
            continue;
        }
        let spki = cert.public_key();
        let Some(algorithm) = algorithm_for(&sig_oid, spki) else {
            debug!(alias, signature = %sig_oid, "unsupported CRL signature algorithm");
            continue;
        };
        let key = UnparsedPublicKey::new(algorithm, &*spki.subject_public_key.data);
        match key.verify(signed, &crl.signature_value.data) {
            Ok(()) => return Some(alias.to_string()),
            Err(_) => debug!(alias, "issuer name matches but signature does not verify"),
        }
    }
    None
}

/// [`verify`] over DER bytes; unparseable input matches nothing.
#[must_use]
pub fn verify_der(store: &LoadedStore, der: &[u8]) -> Option<String> {
    match parse_x509_crl(der) {
        Ok((_, crl)) => verify(store, &crl),
        Err(e) => {
            debug!(error = %e, "cannot parse CRL");
            None
        }
    }
}

fn algorithm_for(
    sig_oid: &str,
    spki: &SubjectPublicKeyInfo<'_>,
) -> Option<&'static dyn VerificationAlgorithm> {
    let curve = || {
        spki.algorithm
            .parameters
            .as_ref()
            .and_then(|p| p.as_oid().ok())
            .map(|oid| oid.to_id_string())
    };
    let alg: &'static dyn VerificationAlgorithm = match sig_oid {
        OID_SHA1_RSA => &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
        OID_SHA256_RSA => &signature::RSA_PKCS1_2048_8192_SHA256,
        OID_SHA384_RSA => &signature::RSA_PKCS1_2048_8192_SHA384,
        OID_SHA512_RSA => &signature::RSA_PKCS1_2048_8192_SHA512,
        OID_ECDSA_SHA256 => match curve()?.as_str() {
            OID_CURVE_P256 => &signature::ECDSA_P256_SHA256_ASN1,
            OID_CURVE_P384 => &signature::ECDSA_P384_SHA256_ASN1,
            _ => return None,
        },
        OID_ECDSA_SHA384 => match curve()?.as_str() {
            OID_CURVE_P256 => &signature::ECDSA_P256_SHA384_ASN1,
            OID_CURVE_P384 => &signature::ECDSA_P384_SHA384_ASN1,
            _ => return None,
        },
        OID_ED25519 => &signature::ED25519,
        _ => return None,
    };
    Some(alg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use crate::types::{StoreEntry, StoreFormat, StoredCertificate};
    use tempfile::TempDir;

    fn store_of(certs: &[(&str, &testutil::TestCert)]) -> LoadedStore {
        let mut store = LoadedStore::new(StoreFormat::Jks);
        for (alias, cert) in certs {
            store.insert(
                *alias,
                StoreEntry::TrustedCertificate(StoredCertificate::x509(cert.der.clone())),
            );
        }
        store
    }

    #[test]
    fn no_issuer_match_is_none() {
        let issuer = testutil::self_signed("CRL Issuer");
        let other = testutil::self_signed("Someone Else");
        let crl = testutil::crl_signed_by(&issuer);
        assert_eq!(verify_der(&store_of(&[("other", &other)]), &crl), None);
    }

    #[test]
    fn matching_issuer_with_valid_signature_is_found() {
        let issuer = testutil::self_signed("CRL Issuer");
        let other = testutil::self_signed("Someone Else");
        let crl = testutil::crl_signed_by(&issuer);
        let store = store_of(&[("other", &other), ("issuer", &issuer)]);
        assert_eq!(verify_der(&store, &crl).as_deref(), Some("issuer"));
    }

    #[test]
    fn same_subject_with_wrong_key_is_skipped() {
        let impostor = testutil::self_signed("Shared Name CA");
        let real = testutil::self_signed("Shared Name CA");
        let crl = testutil::crl_signed_by(&real);
        let store = store_of(&[("impostor", &impostor), ("real", &real)]);
        assert_eq!(verify_der(&store, &crl).as_deref(), Some("real"));

        let only_impostor = store_of(&[("impostor", &impostor)]);
        assert_eq!(verify_der(&only_impostor, &crl), None);
    }

    #[test]
    fn garbage_crl_matches_nothing() {
        let issuer = testutil::self_signed("CRL Issuer");
        assert_eq!(verify_der(&store_of(&[("i", &issuer)]), b"not a crl"), None);
    }

    #[test]
    fn loads_pem_and_der_files() {
        let issuer = testutil::self_signed("CRL Issuer");
        let crl = testutil::crl_signed_by(&issuer);
        let dir = TempDir::new().unwrap();

        let der_path = dir.path().join("issuer.crl");
        std::fs::write(&der_path, &crl).unwrap();
        assert_eq!(load_crls(&der_path).unwrap(), vec![crl.clone()]);

        let block = pem::encode(&pem::Pem::new(PEM_CRL_TAG, crl.clone()));
        let pem_path = dir.path().join("issuer.pem");
        std::fs::write(&pem_path, format!("{block}{block}")).unwrap();
        assert_eq!(load_crls(&pem_path).unwrap().len(), 2);
    }

    #[test]
    fn pem_without_crl_blocks_is_an_error() {
        let cert = testutil::self_signed("Not A CRL");
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cert.pem");
        std::fs::write(&path, cert.pem).unwrap();
        assert!(matches!(load_crls(&path), Err(ScanError::CrlParse { .. })));
    }
}
