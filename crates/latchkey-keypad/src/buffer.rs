//! Digit accumulator between key presses and code classification.

use latchkey_core::{Code, Key, constants::CODE_LENGTH};

/// Result of finalizing the buffer.
///
/// The submit key finalizes whatever has been typed; only a full four-digit
/// entry is a [`Code`]. Anything shorter is passed on so the controller can
/// treat it as an unknown code (or an invalid admin entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Exactly four digits.
    Complete(Code),

    /// Fewer than four digits (possibly none).
    Partial(String),
}

impl Submission {
    /// The typed digits, whatever their count.
    pub fn as_str(&self) -> &str {
        match self {
            Submission::Complete(code) => code.as_str(),
            Submission::Partial(digits) => digits,
        }
    }

    /// The code, if the entry was complete.
    pub fn code(&self) -> Option<&Code> {
        match self {
            Submission::Complete(code) => Some(code),
            Submission::Partial(_) => None,
        }
    }
}

/// Accumulates up to [`CODE_LENGTH`] digits.
///
/// Digits past the fourth are dropped. Submit and clear keys never extend the
/// buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    digits: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key.
    ///
    /// Digits are appended while fewer than four are buffered; the clear key
    /// empties the buffer; the submit key is ignored here (call
    /// [`submit`](Self::submit)).
    pub fn push(&mut self, key: Key) {
        match key {
            Key::Digit(d) if self.digits.len() < CODE_LENGTH => self.digits.push(d),
            Key::Digit(_) | Key::Submit => {}
            Key::Clear => self.clear(),
        }
    }

    /// Take the buffered digits, leaving the buffer empty.
    pub fn submit(&mut self) -> Submission {
        let digits = std::mem::take(&mut self.digits);
        match Code::new(&digits) {
            Ok(code) => Submission::Complete(code),
            Err(_) => Submission::Partial(digits),
        }
    }

    /// Discard the buffered digits.
    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Returns `true` once four digits are buffered.
    pub fn is_full(&self) -> bool {
        self.digits.len() == CODE_LENGTH
    }
}
