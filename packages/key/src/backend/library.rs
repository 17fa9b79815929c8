//! In-process key production through the `openssl` crate
//!
//! Private keys are serialized as PKCS#8, encrypted with AES-256-CBC under
//! PBES2 when the family calls for it. Public keys are serialized as
//! SubjectPublicKeyInfo.

use crate::catalogue::{
    AlgorithmSpec, EdwardsCurve, NamedCurve, DSA_PARAMS_PEM, KEY_BIN, PRIVATE_KEY_DER,
    PRIVATE_KEY_PEM, PUBLIC_KEY_DER, PUBLIC_KEY_PEM, RSA_PUBLIC_EXPONENT,
};
use crate::encoding::dss_parameters_pem;
use crate::symmetric::AesKeyBuilder;
use crate::{KeyArtifact, KeyBackend, KeyError, Result};
use openssl::bn::BigNum;
use openssl::dsa::Dsa;
use openssl::ec::{Asn1Flag, EcGroup, EcKey};
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::symm::Cipher;
use secrecy::{ExposeSecret, SecretString};

/// Backend name recorded in metadata
pub const LIBRARY_BACKEND_NAME: &str = "openssl-library";

impl NamedCurve {
    /// OpenSSL NID of the curve
    #[must_use]
    pub fn nid(self) -> Nid {
        match self {
            NamedCurve::Prime256v1 => Nid::X9_62_PRIME256V1,
            NamedCurve::Secp384r1 => Nid::SECP384R1,
            NamedCurve::Secp521r1 => Nid::SECP521R1,
            NamedCurve::Secp256k1 => Nid::SECP256K1,
        }
    }
}

/// Key production backed by the linked OpenSSL library
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryBackend;

impl LibraryBackend {
    /// Create a library backend
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn generate_rsa(bits: u32) -> Result<PKey<Private>> {
        let exponent = BigNum::from_u32(RSA_PUBLIC_EXPONENT)
            .map_err(|e| KeyError::generation("RSA public exponent", e))?;
        let rsa = Rsa::generate_with_e(bits, &exponent)
            .map_err(|e| KeyError::generation(format!("RSA-{bits} generation failed"), e))?;
        PKey::from_rsa(rsa).map_err(|e| KeyError::generation("RSA key wrap", e))
    }

    fn generate_ec(curve: NamedCurve) -> Result<PKey<Private>> {
        let mut group = EcGroup::from_curve_name(curve.nid())
            .map_err(|e| KeyError::generation(format!("EC curve {}", curve.name()), e))?;
        // Encode the curve by name rather than by explicit parameters
        group.set_asn1_flag(Asn1Flag::NAMED_CURVE);
        let ec = EcKey::generate(&group)
            .map_err(|e| KeyError::generation(format!("EC {} generation failed", curve.name()), e))?;
        PKey::from_ec_key(ec).map_err(|e| KeyError::generation("EC key wrap", e))
    }

    /// Generate DSA parameters and a key; returns the key and the PEM parameter file
    fn generate_dsa(bits: u32) -> Result<(PKey<Private>, String)> {
        let params = Dsa::generate_params(bits)
            .map_err(|e| KeyError::generation(format!("DSA-{bits} parameter generation failed"), e))?;
        let params_pem = dss_parameters_pem(
            &params.p().to_vec(),
            &params.q().to_vec(),
            &params.g().to_vec(),
        )?;

        let dsa = params
            .generate_key()
            .map_err(|e| KeyError::generation(format!("DSA-{bits} generation failed"), e))?;
        let pkey = PKey::from_dsa(dsa).map_err(|e| KeyError::generation("DSA key wrap", e))?;
        Ok((pkey, params_pem))
    }

    fn generate_eddsa(curve: EdwardsCurve) -> Result<PKey<Private>> {
        let generated = match curve {
            EdwardsCurve::Ed25519 => PKey::generate_ed25519(),
            EdwardsCurve::Ed448 => PKey::generate_ed448(),
        };
        generated.map_err(|e| KeyError::generation(format!("{} generation failed", curve.name()), e))
    }

    /// Encode a key pair into `artifact` following the family policy of `spec`
    fn encode_pair(
        spec: &AlgorithmSpec,
        pkey: &PKey<Private>,
        passphrase: &SecretString,
        artifact: &mut KeyArtifact,
    ) -> Result<()> {
        let cipher = Cipher::aes_256_cbc();
        let secret = passphrase.expose_secret().as_bytes();

        let private_pem = if spec.encrypts_private_key() {
            pkey.private_key_to_pem_pkcs8_passphrase(cipher, secret)
        } else {
            pkey.private_key_to_pem_pkcs8()
        }
        .map_err(|e| KeyError::encoding(format!("{spec} private key PEM"), e))?;
        artifact.push(PRIVATE_KEY_PEM, private_pem);

        if spec.writes_der() {
            let private_der = if spec.encrypts_private_key() {
                pkey.private_key_to_pkcs8_passphrase(cipher, secret)
            } else {
                pkey.private_key_to_pkcs8()
            }
            .map_err(|e| KeyError::encoding(format!("{spec} private key DER"), e))?;
            artifact.push(PRIVATE_KEY_DER, private_der);
        }

        let public_pem = pkey
            .public_key_to_pem()
            .map_err(|e| KeyError::encoding(format!("{spec} public key PEM"), e))?;
        artifact.push(PUBLIC_KEY_PEM, public_pem);

        if spec.writes_der() {
            let public_der = pkey
                .public_key_to_der()
                .map_err(|e| KeyError::encoding(format!("{spec} public key DER"), e))?;
            artifact.push(PUBLIC_KEY_DER, public_der);
        }

        Ok(())
    }
}

impl KeyBackend for LibraryBackend {
    fn name(&self) -> &'static str {
        LIBRARY_BACKEND_NAME
    }

    fn tool_version(&self) -> Result<String> {
        Ok(openssl::version::version().to_string())
    }

    fn produce(&self, spec: &AlgorithmSpec, passphrase: &SecretString) -> Result<KeyArtifact> {
        let mut artifact = KeyArtifact::new();

        match *spec {
            AlgorithmSpec::Aes { bits } => {
                let key = AesKeyBuilder::new().with_size(bits).generate()?;
                artifact.push(KEY_BIN, key.to_vec());
            }
            AlgorithmSpec::Rsa { bits } => {
                let pkey = Self::generate_rsa(bits)?;
                Self::encode_pair(spec, &pkey, passphrase, &mut artifact)?;
            }
            AlgorithmSpec::Ec { curve } => {
                let pkey = Self::generate_ec(curve)?;
                Self::encode_pair(spec, &pkey, passphrase, &mut artifact)?;
            }
            AlgorithmSpec::Dsa { bits } => {
                let (pkey, params_pem) = Self::generate_dsa(bits)?;
                artifact.push(DSA_PARAMS_PEM, params_pem.into_bytes());
                Self::encode_pair(spec, &pkey, passphrase, &mut artifact)?;
            }
            AlgorithmSpec::EdDsa { curve } => {
                let pkey = Self::generate_eddsa(curve)?;
                Self::encode_pair(spec, &pkey, passphrase, &mut artifact)?;
            }
        }

        log::debug!("{spec}: produced {} files in-process", artifact.files().len());
        Ok(artifact)
    }
}
