use std::fmt::{Display, Formatter};

use crate::key::RsaKey;

/// Human-readable inspection view of a key.
///
/// Pure formatter: it assumes the key was validated when it was built and
/// only reads it.
pub struct Report<'a> {
    key: &'a RsaKey,
}

impl<'a> Report<'a> {
    pub fn new(key: &'a RsaKey) -> Self {
        Report { key }
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.key {
            RsaKey::Public(key) => {
                writeln!(f, "Key Type: {}", self.key.label())?;
                writeln!(f, "Key Size: {} bits", key.bits())?;
                writeln!(f, "Public Exponent (e): {}", key.public_exponent())?;
                writeln!(f, "Modulus (n): {}", key.modulus())
            }
            RsaKey::Private(key) => {
                writeln!(f, "Key Type: {}", self.key.label())?;
                writeln!(
                    f,
                    "Key Size: {} bits ({} bytes)",
                    key.bits(),
                    key.bits().div_ceil(8)
                )?;
                writeln!(
                    f,
                    "Public Exponent (e): {}",
                    key.public().public_exponent()
                )?;
                writeln!(f, "Private Exponent (d): {}", key.private_exponent())?;
                writeln!(
                    f,
                    "Modulus (n): {} ({} bits)",
                    key.public().modulus(),
                    key.bits()
                )?;
                writeln!(f)?;
                writeln!(f, "Primes: p x q = n")?;
                writeln!(f, "p ({} bits): {}", key.p().bits(), key.p())?;
                writeln!(f, "q ({} bits): {}", key.q().bits(), key.q())?;
                writeln!(f)?;
                writeln!(f, "CRT Values")?;
                writeln!(f, "dp = d mod (p-1): {}", key.crt().dp())?;
                writeln!(f, "dq = d mod (q-1): {}", key.crt().dq())?;
                writeln!(f, "qi = q^-1 mod p: {}", key.crt().qinv())
            }
        }
    }
}

/// Renders the inspection report for a key.
pub fn report(key: &RsaKey) -> String {
    Report::new(key).to_string()
}
