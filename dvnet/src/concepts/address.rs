use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::feedback::AddressError;

/// Width of the zero-padded destination field on the wire.
pub const ADDRESS_WIDTH: usize = 5;

/// Name of a host or router.
///
/// A valid name is 1 to [`ADDRESS_WIDTH`] ASCII alphanumeric characters and does not start
/// with `'0'`, so the zero padding of the wire field can always be stripped back off.
/// The empty name is reserved for the routing broadcast address.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Address(String);

impl Address {
    pub fn new(name: impl Into<String>) -> Result<Self, AddressError> {
        let name = name.into();
        if name.is_empty() {
            return Err(AddressError::Empty);
        }
        if name.len() > ADDRESS_WIDTH {
            return Err(AddressError::TooLong {
                name,
                max: ADDRESS_WIDTH,
            });
        }
        if !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(AddressError::InvalidCharacter { name });
        }
        if name.starts_with('0') {
            return Err(AddressError::LeadingZero { name });
        }
        Ok(Self(name))
    }

    /// The destination of control packets, encoded as an all-zero field.
    pub fn broadcast() -> Self {
        Self(String::new())
    }

    pub fn is_broadcast(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fixed-width wire form, left padded with '0'.
    pub fn to_field(&self) -> [u8; ADDRESS_WIDTH] {
        let mut field = [b'0'; ADDRESS_WIDTH];
        let bytes = self.0.as_bytes();
        field[ADDRESS_WIDTH - bytes.len()..].copy_from_slice(bytes);
        field
    }

    pub fn from_field(field: &[u8]) -> Result<Self, AddressError> {
        let start = field.iter().position(|b| *b != b'0').unwrap_or(field.len());
        let trimmed = &field[start..];
        if trimmed.is_empty() {
            return Ok(Self::broadcast());
        }
        let name = std::str::from_utf8(trimmed).map_err(|_| AddressError::InvalidCharacter {
            name: String::from_utf8_lossy(trimmed).into_owned(),
        })?;
        Self::new(name)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_broadcast() {
            write!(f, "*")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_and_strips() {
        let addr = Address::new("H1").unwrap();
        assert_eq!(&addr.to_field(), b"000H1");
        assert_eq!(Address::from_field(b"000H1").unwrap(), addr);

        let numeric = Address::new("1270").unwrap();
        assert_eq!(&numeric.to_field(), b"01270");
        assert_eq!(Address::from_field(b"01270").unwrap(), numeric);
    }

    #[test]
    fn broadcast_is_all_zero() {
        assert_eq!(&Address::broadcast().to_field(), b"00000");
        assert!(Address::from_field(b"00000").unwrap().is_broadcast());
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(Address::new(""), Err(AddressError::Empty));
        assert!(matches!(Address::new("ROUTER"), Err(AddressError::TooLong { .. })));
        assert!(matches!(Address::new("A/B"), Err(AddressError::InvalidCharacter { .. })));
        assert!(matches!(Address::new("07"), Err(AddressError::LeadingZero { .. })));
    }
}
