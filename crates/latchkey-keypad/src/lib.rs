//! Keypad input for the latchkey door controller.
//!
//! Two small pieces sit between the raw input channels and the controller:
//!
//! - [`KeypadReader`] turns channel level snapshots into key presses by
//!   LOW→HIGH edge detection, reporting at most one key per poll.
//! - [`InputBuffer`] accumulates up to four digits until submit or clear.
//!
//! # Example
//!
//! ```
//! use latchkey_core::{Key, KeyId, ScanPolicy};
//! use latchkey_hardware::mock::MockSensor;
//! use latchkey_keypad::{InputBuffer, KeypadReader, Submission};
//!
//! # fn main() -> latchkey_hardware::Result<()> {
//! let (sensor, handle) = MockSensor::new();
//! let mut reader = KeypadReader::new(sensor, ScanPolicy::FirstInScanOrder)?;
//! let mut buffer = InputBuffer::new();
//!
//! handle.type_keys("12347")?;
//!
//! let mut submitted = None;
//! while submitted.is_none() {
//!     if let Some(id) = reader.poll()? {
//!         match id.key() {
//!             Key::Submit => submitted = Some(buffer.submit()),
//!             key => buffer.push(key),
//!         }
//!     }
//! }
//!
//! assert!(matches!(submitted, Some(Submission::Complete(code)) if code.as_str() == "1234"));
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod reader;

pub use buffer::{InputBuffer, Submission};
pub use reader::KeypadReader;
