use crate::{
    Result,
    constants::{CHANNEL_COUNT, CODE_ALPHABET, CODE_LENGTH, KEY_CLEAR, KEY_SUBMIT, MAX_DIGIT_KEY},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Keypad code (exactly 4 characters from `1`-`6`).
///
/// # Security
/// Comparison is constant-time so that matching a submission against the
/// stored codes does not leak how many leading digits were correct.
#[derive(Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code(String);

impl Code {
    /// Create a new code with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidCode` if:
    /// - The code is not exactly 4 characters
    /// - The code contains a character outside `1`-`6`
    pub fn new(code: &str) -> Result<Self> {
        let len = code.chars().count();
        if len != CODE_LENGTH {
            return Err(Error::InvalidCode(format!(
                "code must be {CODE_LENGTH} digits, got {len}"
            )));
        }

        if let Some(bad) = code.chars().find(|c| !CODE_ALPHABET.contains(c)) {
            return Err(Error::InvalidCode(format!(
                "code may only contain digits 1-6, got '{bad}'"
            )));
        }

        Ok(Code(code.to_string()))
    }

    /// Returns `true` if `code` would be accepted by [`new`](Self::new).
    ///
    /// Usable in const context, so built-in codes are checked at compile time.
    #[must_use]
    pub const fn is_well_formed(code: &str) -> bool {
        let bytes = code.as_bytes();
        if bytes.len() != CODE_LENGTH {
            return false;
        }
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] < b'1' || bytes[i] > b'0' + MAX_DIGIT_KEY {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Wrap a built-in code already checked with
    /// [`is_well_formed`](Self::is_well_formed) in a const assertion.
    pub(crate) fn from_builtin(code: &'static str) -> Self {
        Code(code.to_string())
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against raw submitted input in constant time.
    ///
    /// Inputs of a different length never match.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        self.0.as_bytes().ct_eq(input.as_bytes()).into()
    }

    /// Masked form for logs (`****`).
    #[must_use]
    pub fn masked(&self) -> String {
        "*".repeat(CODE_LENGTH)
    }
}

impl PartialEq for Code {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl std::hash::Hash for Code {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

// Debug stays masked so codes never end up in logs by accident.
impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Code({})", self.masked())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Code {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Code::new(s)
    }
}

impl TryFrom<String> for Code {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Code::new(&value)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.0
    }
}

/// Physical key identifier (1-8), one per input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId(u8);

impl KeyId {
    /// Create a key id with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidKeyId` if the id is outside 1-8.
    pub fn new(id: u8) -> Result<Self> {
        if id == 0 || usize::from(id) > CHANNEL_COUNT {
            return Err(Error::InvalidKeyId(id));
        }
        Ok(KeyId(id))
    }

    /// Key id reported by input channel `index` (0-based).
    ///
    /// # Errors
    /// Returns `Error::InvalidKeyId` if the index is past the last channel.
    pub fn from_channel(index: usize) -> Result<Self> {
        let id = u8::try_from(index + 1).map_err(|_| Error::InvalidKeyId(u8::MAX))?;
        KeyId::new(id)
    }

    /// Get the raw key id.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// 0-based input channel of this key.
    #[must_use]
    pub fn channel(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// Decode the key's role.
    #[must_use]
    pub fn key(self) -> Key {
        match self.0 {
            KEY_SUBMIT => Key::Submit,
            KEY_CLEAR => Key::Clear,
            d => {
                debug_assert!(d <= MAX_DIGIT_KEY);
                Key::Digit(char::from(b'0' + d))
            }
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for KeyId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id: u8 = s.trim().parse().map_err(|_| Error::InvalidKeyId(0))?;
        KeyId::new(id)
    }
}

/// Role of a pressed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Digit `'1'`-`'6'`.
    Digit(char),

    /// Finalize the buffered input.
    Submit,

    /// Discard the buffered input (or abort an admin session).
    Clear,
}

impl Key {
    /// Returns `true` for digit keys.
    #[inline]
    #[must_use]
    pub fn is_digit(self) -> bool {
        matches!(self, Key::Digit(_))
    }
}
