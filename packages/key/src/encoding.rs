//! DER/PEM encoding of DSA domain parameters
//!
//! The `openssl` crate can generate DSA parameters but has no serializer for a
//! bare parameter set, so the `Dss-Parms` structure from RFC 3279 is encoded
//! with `der`:
//!
//! ```text
//! Dss-Parms ::= SEQUENCE { p INTEGER, q INTEGER, g INTEGER }
//! ```

use crate::{KeyError, Result};
use der::asn1::UintRef;
use der::pem::{LineEnding, PemLabel};
use der::{Encode, EncodePem, Sequence};

/// PEM label OpenSSL uses for DSA parameters
pub const DSA_PARAMETERS_LABEL: &str = "DSA PARAMETERS";

/// DSA domain parameters
#[derive(Clone, Copy, Debug, Eq, PartialEq, Sequence)]
pub struct DssParms<'a> {
    /// Prime modulus
    pub p: UintRef<'a>,
    /// Subgroup order
    pub q: UintRef<'a>,
    /// Generator
    pub g: UintRef<'a>,
}

impl PemLabel for DssParms<'_> {
    const PEM_LABEL: &'static str = DSA_PARAMETERS_LABEL;
}

impl<'a> DssParms<'a> {
    /// Parameters from big-endian unsigned magnitudes
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyFormat`] if a magnitude is not a valid
    /// unsigned integer.
    pub fn new(p: &'a [u8], q: &'a [u8], g: &'a [u8]) -> Result<Self> {
        let uint = |name: &str, bytes: &'a [u8]| {
            UintRef::new(bytes).map_err(|e| KeyError::encoding(format!("DSA parameter {name}"), e))
        };
        Ok(Self {
            p: uint("p", p)?,
            q: uint("q", q)?,
            g: uint("g", g)?,
        })
    }
}

/// DER-encode `Dss-Parms` from big-endian unsigned magnitudes
///
/// # Errors
///
/// Returns [`KeyError::InvalidKeyFormat`] if encoding fails.
pub fn dss_parameters_der(p: &[u8], q: &[u8], g: &[u8]) -> Result<Vec<u8>> {
    DssParms::new(p, q, g)?
        .to_der()
        .map_err(|e| KeyError::encoding("DSA parameters DER", e))
}

/// PEM-encode `Dss-Parms` from big-endian unsigned magnitudes
///
/// # Errors
///
/// Returns [`KeyError::InvalidKeyFormat`] if encoding fails.
pub fn dss_parameters_pem(p: &[u8], q: &[u8], g: &[u8]) -> Result<String> {
    DssParms::new(p, q, g)?
        .to_pem(LineEnding::LF)
        .map_err(|e| KeyError::encoding("DSA parameters PEM", e))
}
