//! Error types for cidrtag

use crate::address::AddressError;
use thiserror::Error;

/// Errors surfaced by tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Prefix length is larger than the address width.
    #[error("invalid prefix: length {length} exceeds {width}-bit address width")]
    InvalidPrefix { length: u8, width: u8 },

    /// Address could not be parsed; passed through from the address layer.
    #[error(transparent)]
    Address(#[from] AddressError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_details() {
        let e = Error::InvalidPrefix { length: 33, width: 32 };
        assert_eq!(
            e.to_string(),
            "invalid prefix: length 33 exceeds 32-bit address width"
        );

        let e: Error = AddressError::PrefixTooLong { length: 129, width: 128 }.into();
        assert_eq!(
            e,
            Error::Address(AddressError::PrefixTooLong { length: 129, width: 128 })
        );
        assert_eq!(e.to_string(), "prefix length 129 exceeds 128-bit address width");
    }
}
