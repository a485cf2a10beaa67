//! Base58 codec (Bitcoin alphabet)
//!
//! Leading zero bytes are encoded as leading `1` characters and restored on
//! decode, so the byte length of the input always survives a round trip.

use thiserror::Error;

/// Error type for Base58 decoding failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base58Error {
    #[error("Invalid base58 character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("Invalid base58 input: {0}")]
    Malformed(String),
}

impl Base58Error {
    /// Re-key a `bs58` byte index to a character position in `input`
    fn from_bs58(input: &str, error: bs58::decode::Error) -> Self {
        let index = match &error {
            bs58::decode::Error::InvalidCharacter { index, .. }
            | bs58::decode::Error::NonAsciiCharacter { index } => *index,
            other => return Base58Error::Malformed(other.to_string()),
        };

        match input.get(index..).and_then(|rest| rest.chars().next()) {
            Some(character) => Base58Error::InvalidCharacter {
                character,
                position: input[..index].chars().count(),
            },
            None => Base58Error::Malformed(error.to_string()),
        }
    }
}

/// Encode bytes as a Base58 string
///
/// # Examples
///
/// ```
/// use common_utils::base58;
///
/// assert_eq!(base58::encode(b"Hello World!"), "2NEpo7TZRRrLZSi2U");
/// assert_eq!(base58::encode(&[0, 0, 1]), "112");
/// ```
pub fn encode(input: &[u8]) -> String {
    bs58::encode(input).into_string()
}

/// Decode a Base58 string into bytes
///
/// # Examples
///
/// ```
/// use common_utils::base58;
///
/// assert_eq!(base58::decode("2NEpo7TZRRrLZSi2U").unwrap(), b"Hello World!");
///
/// let err = base58::decode("abc0").unwrap_err();
/// assert!(err.to_string().contains("position 3"));
/// ```
pub fn decode(input: &str) -> Result<Vec<u8>, Base58Error> {
    bs58::decode(input)
        .into_vec()
        .map_err(|e| Base58Error::from_bs58(input, e))
}
