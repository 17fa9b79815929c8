//! The static catalogue of generation jobs and the output layout it implies
//!
//! Every [`AlgorithmSpec`] maps to exactly one directory below the output root
//! and to a fixed list of file names, so the layout of a run is fully determined
//! by [`CATALOGUE`].

use std::fmt;
use std::path::{Path, PathBuf};

/// Top-level directory for symmetric keys
pub const SYMMETRIC_DIR: &str = "symmetric-encryption";
/// Top-level directory for asymmetric keys
pub const ASYMMETRIC_DIR: &str = "asymmetric-encryption";

/// Raw symmetric key file
pub const KEY_BIN: &str = "key.bin";
/// PKCS#8 private key, PEM
pub const PRIVATE_KEY_PEM: &str = "private_key.pem";
/// PKCS#8 private key, DER
pub const PRIVATE_KEY_DER: &str = "private_key.der";
/// SubjectPublicKeyInfo public key, PEM
pub const PUBLIC_KEY_PEM: &str = "public_key.pem";
/// SubjectPublicKeyInfo public key, DER
pub const PUBLIC_KEY_DER: &str = "public_key.der";
/// DSA domain parameters, PEM
pub const DSA_PARAMS_PEM: &str = "dsaparam.pem";

/// Public exponent used for every RSA key
pub const RSA_PUBLIC_EXPONENT: u32 = 65537;

const AES_FILES: &[&str] = &[KEY_BIN];
const PEM_DER_PAIR_FILES: &[&str] = &[
    PRIVATE_KEY_PEM,
    PRIVATE_KEY_DER,
    PUBLIC_KEY_PEM,
    PUBLIC_KEY_DER,
];
const DSA_FILES: &[&str] = &[DSA_PARAMS_PEM, PRIVATE_KEY_PEM, PUBLIC_KEY_PEM];
const PEM_PAIR_FILES: &[&str] = &[PRIVATE_KEY_PEM, PUBLIC_KEY_PEM];

/// Key family; each family owns one directory under the output root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// AES raw symmetric keys
    Aes,
    /// RSA key pairs
    Rsa,
    /// Elliptic-curve key pairs over named curves
    Ec,
    /// DSA key pairs with their domain parameters
    Dsa,
    /// Edwards-curve signing key pairs
    EdDsa,
}

impl Family {
    /// All families in run order
    pub const ALL: [Family; 5] = [
        Family::Aes,
        Family::Rsa,
        Family::Ec,
        Family::Dsa,
        Family::EdDsa,
    ];

    /// Directory of this family relative to the output root
    #[must_use]
    pub fn relative_dir(self) -> PathBuf {
        match self {
            Family::Aes => Path::new(SYMMETRIC_DIR).join("AES"),
            Family::Rsa => Path::new(ASYMMETRIC_DIR).join("RSA"),
            Family::Ec => Path::new(ASYMMETRIC_DIR).join("EC-Curves"),
            Family::Dsa => Path::new(ASYMMETRIC_DIR).join("DSA"),
            Family::EdDsa => Path::new(ASYMMETRIC_DIR).join("EdDSA"),
        }
    }
}

/// Named elliptic curves, identified by their OpenSSL short names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedCurve {
    /// NIST P-256
    Prime256v1,
    /// NIST P-384
    Secp384r1,
    /// NIST P-521
    Secp521r1,
    /// SECG secp256k1
    Secp256k1,
}

impl NamedCurve {
    /// OpenSSL curve name, also used in directory names and metadata
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            NamedCurve::Prime256v1 => "prime256v1",
            NamedCurve::Secp384r1 => "secp384r1",
            NamedCurve::Secp521r1 => "secp521r1",
            NamedCurve::Secp256k1 => "secp256k1",
        }
    }
}

/// Edwards curves used for EdDSA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdwardsCurve {
    /// Ed25519
    Ed25519,
    /// Ed448
    Ed448,
}

impl EdwardsCurve {
    /// Upper-case algorithm name, as used by `openssl genpkey -algorithm`
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EdwardsCurve::Ed25519 => "ED25519",
            EdwardsCurve::Ed448 => "ED448",
        }
    }
}

/// One generation job: a family and its parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmSpec {
    /// Raw AES key of `bits` length
    Aes {
        /// Key length in bits
        bits: u32,
    },
    /// RSA key pair with modulus of `bits` length
    Rsa {
        /// Modulus length in bits
        bits: u32,
    },
    /// EC key pair on a named curve
    Ec {
        /// Curve
        curve: NamedCurve,
    },
    /// DSA key pair with freshly generated domain parameters
    Dsa {
        /// Prime length in bits
        bits: u32,
    },
    /// EdDSA key pair
    EdDsa {
        /// Curve
        curve: EdwardsCurve,
    },
}

/// Every job of a run, in run order
pub const CATALOGUE: [AlgorithmSpec; 13] = [
    AlgorithmSpec::Aes { bits: 128 },
    AlgorithmSpec::Aes { bits: 192 },
    AlgorithmSpec::Aes { bits: 256 },
    AlgorithmSpec::Rsa { bits: 2048 },
    AlgorithmSpec::Rsa { bits: 3072 },
    AlgorithmSpec::Rsa { bits: 4096 },
    AlgorithmSpec::Ec {
        curve: NamedCurve::Prime256v1,
    },
    AlgorithmSpec::Ec {
        curve: NamedCurve::Secp384r1,
    },
    AlgorithmSpec::Ec {
        curve: NamedCurve::Secp521r1,
    },
    AlgorithmSpec::Ec {
        curve: NamedCurve::Secp256k1,
    },
    AlgorithmSpec::Dsa { bits: 2048 },
    AlgorithmSpec::EdDsa {
        curve: EdwardsCurve::Ed25519,
    },
    AlgorithmSpec::EdDsa {
        curve: EdwardsCurve::Ed448,
    },
];

impl AlgorithmSpec {
    /// Family this job belongs to
    #[must_use]
    pub fn family(&self) -> Family {
        match self {
            AlgorithmSpec::Aes { .. } => Family::Aes,
            AlgorithmSpec::Rsa { .. } => Family::Rsa,
            AlgorithmSpec::Ec { .. } => Family::Ec,
            AlgorithmSpec::Dsa { .. } => Family::Dsa,
            AlgorithmSpec::EdDsa { .. } => Family::EdDsa,
        }
    }

    /// Algorithm name recorded in metadata
    #[must_use]
    pub fn algorithm(&self) -> &'static str {
        match self {
            AlgorithmSpec::Aes { .. } => "AES",
            AlgorithmSpec::Rsa { .. } => "RSA",
            AlgorithmSpec::Ec { .. } => "EC",
            AlgorithmSpec::Dsa { .. } => "DSA",
            AlgorithmSpec::EdDsa { curve } => curve.name(),
        }
    }

    /// Bit length, for families parameterised by size
    #[must_use]
    pub fn bits(&self) -> Option<u32> {
        match self {
            AlgorithmSpec::Aes { bits }
            | AlgorithmSpec::Rsa { bits }
            | AlgorithmSpec::Dsa { bits } => Some(*bits),
            AlgorithmSpec::Ec { .. } | AlgorithmSpec::EdDsa { .. } => None,
        }
    }

    /// Curve name, for EC jobs
    #[must_use]
    pub fn curve(&self) -> Option<&'static str> {
        match self {
            AlgorithmSpec::Ec { curve } => Some(curve.name()),
            _ => None,
        }
    }

    /// Name of this job's own directory
    #[must_use]
    pub fn dir_name(&self) -> String {
        match self {
            AlgorithmSpec::Aes { bits } => format!("AES{bits}"),
            AlgorithmSpec::Rsa { bits } => format!("RSA{bits}"),
            AlgorithmSpec::Ec { curve } => format!("EC_{}", curve.name()),
            AlgorithmSpec::Dsa { bits } => format!("DSA{bits}"),
            AlgorithmSpec::EdDsa { curve } => curve.name().to_string(),
        }
    }

    /// Directory of this job relative to the output root
    #[must_use]
    pub fn relative_dir(&self) -> PathBuf {
        self.family().relative_dir().join(self.dir_name())
    }

    /// Files the job writes, in the order they are recorded in metadata
    #[must_use]
    pub fn file_names(&self) -> &'static [&'static str] {
        match self {
            AlgorithmSpec::Aes { .. } => AES_FILES,
            AlgorithmSpec::Rsa { .. } | AlgorithmSpec::Ec { .. } => PEM_DER_PAIR_FILES,
            AlgorithmSpec::Dsa { .. } => DSA_FILES,
            AlgorithmSpec::EdDsa { .. } => PEM_PAIR_FILES,
        }
    }

    /// Whether the private key is written password-encrypted
    ///
    /// EdDSA keys are always written in the clear; AES keys have no wrapper.
    #[must_use]
    pub fn encrypts_private_key(&self) -> bool {
        matches!(
            self,
            AlgorithmSpec::Rsa { .. } | AlgorithmSpec::Ec { .. } | AlgorithmSpec::Dsa { .. }
        )
    }

    /// Whether the key pair is additionally written as DER
    #[must_use]
    pub fn writes_der(&self) -> bool {
        matches!(self, AlgorithmSpec::Rsa { .. } | AlgorithmSpec::Ec { .. })
    }

    /// Run-log line recorded once the job has completed
    #[must_use]
    pub fn completion_message(&self, dir: &Path) -> String {
        let dir = dir.display();
        match self {
            AlgorithmSpec::Aes { bits } => format!("Generated AES {bits}-bit key -> {dir}"),
            AlgorithmSpec::Rsa { bits } => format!("Generated RSA {bits}-bit key pair -> {dir}"),
            AlgorithmSpec::Ec { curve } => format!("Generated EC {} key -> {dir}", curve.name()),
            AlgorithmSpec::Dsa { bits } => format!("Generated DSA {bits}-bit key -> {dir}"),
            AlgorithmSpec::EdDsa { curve } => format!("Generated {} key -> {dir}", curve.name()),
        }
    }
}

impl fmt::Display for AlgorithmSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.bits(), self.curve()) {
            (Some(bits), _) => write!(f, "{}-{bits}", self.algorithm()),
            (None, Some(curve)) => write!(f, "{} {curve}", self.algorithm()),
            (None, None) => f.write_str(self.algorithm()),
        }
    }
}
