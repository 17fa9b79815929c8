//! Key production by spawning the `openssl` command-line tool
//!
//! Every invocation writes to standard output and is captured; nothing is
//! written into the output tree by the tool itself. The passphrase reaches the
//! child through its environment (`-pass env:...`), never through argv, so it
//! does not show up in process listings or in error messages.

use crate::catalogue::{
    AlgorithmSpec, DSA_PARAMS_PEM, KEY_BIN, PRIVATE_KEY_DER, PRIVATE_KEY_PEM, PUBLIC_KEY_DER,
    PUBLIC_KEY_PEM, RSA_PUBLIC_EXPONENT,
};
use crate::{KeyArtifact, KeyBackend, KeyError, Result};
use keybatch_common::LoggingTransformer;
use secrecy::{ExposeSecret, SecretString};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

/// Backend name recorded in metadata
pub const CLI_BACKEND_NAME: &str = "openssl-cli";

/// Default executable looked up on `PATH`
pub const DEFAULT_OPENSSL_PROGRAM: &str = "openssl";

/// Environment variable carrying the passphrase into the child process
const PASSPHRASE_ENV: &str = "KEYBATCH_PASSPHRASE";
const PASS_SOURCE: &str = "env:KEYBATCH_PASSPHRASE";
const PRIVATE_KEY_CIPHER: &str = "-aes-256-cbc";
const PKCS8_CIPHER: &str = "aes-256-cbc";

/// Key production through an external `openssl` executable
#[derive(Debug, Clone)]
pub struct OpensslCliBackend {
    program: PathBuf,
}

impl Default for OpensslCliBackend {
    fn default() -> Self {
        Self::new(DEFAULT_OPENSSL_PROGRAM)
    }
}

/// Standard input and passphrase for one invocation
#[derive(Clone, Copy, Default)]
struct Invocation<'a> {
    stdin: Option<&'a [u8]>,
    passphrase: Option<&'a SecretString>,
}

impl OpensslCliBackend {
    /// Create a backend running `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Executable this backend runs
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the tool and return its standard output
    fn run(&self, args: &[&str], invocation: Invocation<'_>) -> Result<Vec<u8>> {
        let command_line = format!("{} {}", self.program.display(), args.join(" "));
        log::debug!("Running {command_line}");
        let started = Instant::now();

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(passphrase) = invocation.passphrase {
            command.env(PASSPHRASE_ENV, passphrase.expose_secret());
        }

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                KeyError::ToolNotFound(self.program.display().to_string())
            } else {
                KeyError::Io(e)
            }
        })?;

        // Key material is a few KiB; the tool reads all input before writing.
        // Exit status and stderr of a tool that quit early take precedence.
        let written = match (invocation.stdin, child.stdin.take()) {
            (Some(input), Some(mut stdin)) => stdin.write_all(input),
            _ => Ok(()),
        };

        let output = child.wait_with_output()?;
        let success = output.status.success();
        LoggingTransformer::log_performance_metric(&command_line, started.elapsed(), success);

        if !success {
            return Err(KeyError::ToolFailed {
                command: command_line,
                status: output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |code| code.to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        written?;
        Ok(output.stdout)
    }

    fn generate_aes(&self, bits: u32) -> Result<Vec<u8>> {
        let len = (bits / 8) as usize;
        let count = len.to_string();
        let key = self.run(&["rand", count.as_str()], Invocation::default())?;
        if key.len() != len {
            return Err(KeyError::InvalidKeySize {
                expected: len,
                actual: key.len(),
            });
        }
        Ok(key)
    }

    /// `genpkey` with the given options, encrypting the PKCS#8 output when asked
    fn genpkey(&self, options: &[&str], passphrase: Option<&SecretString>) -> Result<Vec<u8>> {
        let mut args = vec!["genpkey"];
        args.extend_from_slice(options);
        if passphrase.is_some() {
            args.extend_from_slice(&[PRIVATE_KEY_CIPHER, "-pass", PASS_SOURCE]);
        }
        self.run(
            &args,
            Invocation {
                stdin: None,
                passphrase,
            },
        )
    }

    /// Re-encode an encrypted PEM private key as encrypted PKCS#8 DER
    fn encrypted_der(&self, private_pem: &[u8], passphrase: &SecretString) -> Result<Vec<u8>> {
        self.run(
            &[
                "pkcs8",
                "-topk8",
                "-v2",
                PKCS8_CIPHER,
                "-passin",
                PASS_SOURCE,
                "-passout",
                PASS_SOURCE,
                "-outform",
                "DER",
            ],
            Invocation {
                stdin: Some(private_pem),
                passphrase: Some(passphrase),
            },
        )
    }

    /// Extract the public key from a PEM private key
    fn public_key(
        &self,
        private_pem: &[u8],
        passphrase: Option<&SecretString>,
        outform: &str,
    ) -> Result<Vec<u8>> {
        let mut args = vec!["pkey", "-pubout", "-outform", outform];
        if passphrase.is_some() {
            args.extend_from_slice(&["-passin", PASS_SOURCE]);
        }
        self.run(
            &args,
            Invocation {
                stdin: Some(private_pem),
                passphrase,
            },
        )
    }

    /// Encode the derived files for an already generated private key
    fn encode_pair(
        &self,
        spec: &AlgorithmSpec,
        private_pem: Vec<u8>,
        passphrase: Option<&SecretString>,
        artifact: &mut KeyArtifact,
    ) -> Result<()> {
        let public_pem = self.public_key(&private_pem, passphrase, "PEM")?;

        if spec.writes_der() {
            let private_der = match passphrase {
                Some(passphrase) => self.encrypted_der(&private_pem, passphrase)?,
                None => {
                    return Err(KeyError::Unsupported(format!(
                        "{spec}: unencrypted DER private keys"
                    )));
                }
            };
            let public_der = self.public_key(&private_pem, passphrase, "DER")?;

            artifact.push(PRIVATE_KEY_PEM, private_pem);
            artifact.push(PRIVATE_KEY_DER, private_der);
            artifact.push(PUBLIC_KEY_PEM, public_pem);
            artifact.push(PUBLIC_KEY_DER, public_der);
        } else {
            artifact.push(PRIVATE_KEY_PEM, private_pem);
            artifact.push(PUBLIC_KEY_PEM, public_pem);
        }

        Ok(())
    }
}

impl KeyBackend for OpensslCliBackend {
    fn name(&self) -> &'static str {
        CLI_BACKEND_NAME
    }

    fn tool_version(&self) -> Result<String> {
        let output = self.run(&["version"], Invocation::default())?;
        Ok(String::from_utf8_lossy(&output).trim().to_string())
    }

    fn produce(&self, spec: &AlgorithmSpec, passphrase: &SecretString) -> Result<KeyArtifact> {
        let mut artifact = KeyArtifact::new();
        let encryption = spec.encrypts_private_key().then_some(passphrase);

        match *spec {
            AlgorithmSpec::Aes { bits } => {
                artifact.push(KEY_BIN, self.generate_aes(bits)?);
            }
            AlgorithmSpec::Rsa { bits } => {
                let bits_opt = format!("rsa_keygen_bits:{bits}");
                let exponent_opt = format!("rsa_keygen_pubexp:{RSA_PUBLIC_EXPONENT}");
                let private_pem = self.genpkey(
                    &[
                        "-algorithm",
                        "RSA",
                        "-pkeyopt",
                        bits_opt.as_str(),
                        "-pkeyopt",
                        exponent_opt.as_str(),
                    ],
                    encryption,
                )?;
                self.encode_pair(spec, private_pem, encryption, &mut artifact)?;
            }
            AlgorithmSpec::Ec { curve } => {
                let curve_opt = format!("ec_paramgen_curve:{}", curve.name());
                let private_pem = self.genpkey(
                    &[
                        "-algorithm",
                        "EC",
                        "-pkeyopt",
                        curve_opt.as_str(),
                        "-pkeyopt",
                        "ec_param_enc:named_curve",
                    ],
                    encryption,
                )?;
                self.encode_pair(spec, private_pem, encryption, &mut artifact)?;
            }
            AlgorithmSpec::Dsa { bits } => {
                let bits_arg = bits.to_string();
                let params_pem =
                    self.run(&["dsaparam", bits_arg.as_str()], Invocation::default())?;

                // genpkey only reads parameters from a file
                let mut params_file = tempfile::NamedTempFile::new()?;
                params_file.write_all(&params_pem)?;
                params_file.flush()?;
                let params_path = params_file.path().to_string_lossy().into_owned();

                let private_pem =
                    self.genpkey(&["-paramfile", params_path.as_str()], encryption)?;
                artifact.push(DSA_PARAMS_PEM, params_pem);
                self.encode_pair(spec, private_pem, encryption, &mut artifact)?;
            }
            AlgorithmSpec::EdDsa { curve } => {
                let private_pem = self.genpkey(&["-algorithm", curve.name()], encryption)?;
                self.encode_pair(spec, private_pem, encryption, &mut artifact)?;
            }
        }

        log::debug!(
            "{spec}: produced {} files with {}",
            artifact.files().len(),
            self.program.display()
        );
        Ok(artifact)
    }
}
