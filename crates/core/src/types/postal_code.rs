//! Brazilian postal code (CEP) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// The input string is empty.
    #[error("postal code cannot be empty")]
    Empty,
    /// The input contains something other than digits and a single hyphen.
    #[error("postal code may only contain digits and a hyphen")]
    InvalidCharacter,
    /// The input does not have exactly eight digits.
    #[error("postal code must have {expected} digits (got {actual})")]
    WrongLength {
        /// Required digit count.
        expected: usize,
        /// Digits found in the input.
        actual: usize,
    },
}

/// A Brazilian postal code (CEP).
///
/// ## Constraints
///
/// - Exactly eight digits
/// - An optional hyphen after the fifth digit (`12245-820`)
/// - Surrounding whitespace is ignored
///
/// ## Examples
///
/// ```
/// use raiz_core::PostalCode;
///
/// assert_eq!(PostalCode::parse("12245820").unwrap().to_string(), "12245-820");
/// assert_eq!(PostalCode::parse(" 12245-820 ").unwrap().digits(), "12245820");
///
/// assert!(PostalCode::parse("").is_err());
/// assert!(PostalCode::parse("1224-5820").is_err());
/// assert!(PostalCode::parse("1224582").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Number of digits in a CEP.
    pub const DIGITS: usize = 8;

    /// Parse a `PostalCode` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other
    /// than digits and a hyphen in the sixth position, or does not contain
    /// exactly eight digits.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PostalCodeError::Empty);
        }

        let mut digits = String::with_capacity(Self::DIGITS);
        for (i, ch) in trimmed.chars().enumerate() {
            match ch {
                '0'..='9' => digits.push(ch),
                '-' if i == 5 => {}
                _ => return Err(PostalCodeError::InvalidCharacter),
            }
        }

        if digits.len() != Self::DIGITS {
            return Err(PostalCodeError::WrongLength {
                expected: Self::DIGITS,
                actual: digits.len(),
            });
        }

        Ok(Self(digits))
    }

    /// The eight digits without formatting.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, suffix) = self.0.split_at(5);
        write!(f, "{prefix}-{suffix}")
    }
}

impl std::str::FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = PostalCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.to_string()
    }
}
