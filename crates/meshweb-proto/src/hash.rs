use std::fmt;
use std::str::FromStr;

/// A destination hash on the mesh substrate — opaque, 16 bytes, canonical
/// form is lowercase hex with no surrounding delimiters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct DestinationHash([u8; 16]);

#[derive(Debug, thiserror::Error)]
#[error("invalid destination hash '{0}' (expected 16 or 32 hex chars)")]
pub struct ParseHashError(String);

impl DestinationHash {
    pub const LEN: usize = 16;

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Parses a hex string. Tolerates an angle-bracket-wrapped form
    /// (`<hash>`) and a doubled 32-byte hex form, taking the first 16 bytes.
    pub fn parse(input: &str) -> Result<Self, ParseHashError> {
        let trimmed = input.trim().trim_start_matches('<').trim_end_matches('>');
        let bytes =
            hex::decode(trimmed).map_err(|_| ParseHashError(input.to_string()))?;
        let mut out = [0u8; 16];
        match bytes.len() {
            16 => {
                out.copy_from_slice(&bytes);
                Ok(Self(out))
            }
            32 => {
                out.copy_from_slice(&bytes[..16]);
                Ok(Self(out))
            }
            _ => Err(ParseHashError(input.to_string())),
        }
    }
}

impl fmt::Display for DestinationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for DestinationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DestinationHash({self})")
    }
}

impl FromStr for DestinationHash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
