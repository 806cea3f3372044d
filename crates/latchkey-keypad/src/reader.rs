//! Edge-detecting keypad reader.

use latchkey_core::{KeyId, ScanPolicy};
use latchkey_hardware::{ChannelSensor, ChannelState, Result};
use tracing::trace;

/// Polls a [`ChannelSensor`] and reports key presses.
///
/// A press is a LOW→HIGH transition of one channel between two consecutive
/// polls. The previous-state array is seeded from an initial read, so keys
/// already held when the reader is created are not reported, and it is
/// updated for every channel on every poll whether or not a press was found.
///
/// When several channels rise within the same poll only one key can be
/// reported; the [`ScanPolicy`] picks which. The others are consumed.
///
/// There is no debounce beyond the edge check: the poll interval must exceed
/// the mechanical bounce time of the buttons.
#[derive(Debug)]
pub struct KeypadReader<S> {
    sensor: S,
    prev: ChannelState,
    policy: ScanPolicy,
}

impl<S: ChannelSensor> KeypadReader<S> {
    /// Create a reader, taking the initial channel levels from `sensor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial read fails.
    pub fn new(sensor: S, policy: ScanPolicy) -> Result<Self> {
        let prev = sensor.read_channels()?;
        Ok(Self {
            sensor,
            prev,
            policy,
        })
    }

    /// Read all channels once and report the pressed key, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor read fails. The previous-state array is
    /// left untouched in that case.
    pub fn poll(&mut self) -> Result<Option<KeyId>> {
        let current = self.sensor.read_channels()?;

        let mut rising = self
            .prev
            .iter()
            .zip(current.iter())
            .enumerate()
            .filter(|(_, (was, is))| !**was && **is)
            .map(|(index, _)| index);

        let index = match self.policy {
            ScanPolicy::FirstInScanOrder => rising.next(),
            ScanPolicy::LastInScanOrder => rising.last(),
        };

        self.prev = current;

        let key = index.map(KeyId::from_channel).transpose()?;
        if let Some(key) = key {
            trace!(%key, "key press");
        }
        Ok(key)
    }

    /// Scan policy in effect.
    pub fn policy(&self) -> ScanPolicy {
        self.policy
    }

    /// Forget all input up to now: drop the sensor's backlog and take the
    /// current levels as the new previous state.
    ///
    /// A key still held afterwards is only reported after it is released and
    /// pressed again. Returns the number of dropped snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor cannot be drained or read.
    pub fn resync(&mut self) -> Result<usize> {
        let dropped = self.sensor.discard_pending()?;
        self.prev = self.sensor.read_channels()?;
        Ok(dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::constants::CHANNEL_COUNT;
    use latchkey_hardware::mock::MockSensor;
    use rstest::rstest;

    fn key(id: u8) -> KeyId {
        KeyId::new(id).unwrap()
    }

    fn reader(policy: ScanPolicy) -> (KeypadReader<MockSensor>, latchkey_hardware::mock::MockSensorHandle) {
        let (sensor, handle) = MockSensor::new();
        (KeypadReader::new(sensor, policy).unwrap(), handle)
    }

    #[test]
    fn test_idle_reports_nothing() {
        let (mut reader, _handle) = reader(ScanPolicy::default());
        assert_eq!(reader.poll().unwrap(), None);
        assert_eq!(reader.poll().unwrap(), None);
    }

    #[test]
    fn test_single_press_reported_once() {
        let (mut reader, handle) = reader(ScanPolicy::default());
        let mut held = [false; CHANNEL_COUNT];
        held[2] = true;
        handle.send_frame(held).unwrap();

        assert_eq!(reader.poll().unwrap(), Some(key(3)));
        // Still held: no new edge
        assert_eq!(reader.poll().unwrap(), None);
    }

    #[test]
    fn test_release_is_not_a_press() {
        let (mut reader, handle) = reader(ScanPolicy::default());
        handle.press(key(5)).unwrap();

        assert_eq!(reader.poll().unwrap(), Some(key(5)));
        assert_eq!(reader.poll().unwrap(), None);
    }

    #[test]
    fn test_key_held_at_startup_is_ignored() {
        let (sensor, handle) = MockSensor::new();
        let mut held = [false; CHANNEL_COUNT];
        held[0] = true;
        handle.send_frame(held).unwrap();

        let mut reader = KeypadReader::new(sensor, ScanPolicy::default()).unwrap();
        assert_eq!(reader.poll().unwrap(), None);

        handle.release().unwrap();
        handle.press(key(1)).unwrap();
        assert_eq!(reader.poll().unwrap(), None);
        assert_eq!(reader.poll().unwrap(), Some(key(1)));
    }

    #[rstest]
    #[case(ScanPolicy::FirstInScanOrder, 2)]
    #[case(ScanPolicy::LastInScanOrder, 7)]
    fn test_simultaneous_presses_follow_policy(#[case] policy: ScanPolicy, #[case] expected: u8) {
        let (mut reader, handle) = reader(policy);
        handle
            .press_together(&[key(2), key(4), key(7)])
            .unwrap();

        assert_eq!(reader.poll().unwrap(), Some(key(expected)));
        // The other rising channels were consumed, not replayed
        assert_eq!(reader.poll().unwrap(), None);
        assert_eq!(reader.poll().unwrap(), None);
    }

    #[test]
    fn test_sequence_of_presses() {
        let (mut reader, handle) = reader(ScanPolicy::default());
        handle.type_keys("1518").unwrap();

        let keys: Vec<u8> = std::iter::from_fn(|| Some(reader.poll().unwrap()))
            .take(8)
            .flatten()
            .map(KeyId::as_u8)
            .collect();
        assert_eq!(keys, vec![1, 5, 1, 8]);
    }

    #[test]
    fn test_resync_forgets_queued_presses() {
        let (mut reader, handle) = reader(ScanPolicy::default());
        handle.type_keys("1234").unwrap();
        handle.press(key(7)).unwrap();

        assert_eq!(reader.resync().unwrap(), 10);
        assert_eq!(reader.poll().unwrap(), None);

        handle.press(key(3)).unwrap();
        assert_eq!(reader.poll().unwrap(), Some(key(3)));
    }

    #[test]
    fn test_resync_treats_held_key_as_old() {
        let (mut reader, handle) = reader(ScanPolicy::default());
        let mut held = [false; CHANNEL_COUNT];
        held[4] = true;
        handle.send_frame(held).unwrap();

        reader.resync().unwrap();
        assert_eq!(reader.poll().unwrap(), None);
    }

    #[test]
    fn test_sensor_error_propagates() {
        let (sensor, handle) = MockSensor::new();
        let mut reader = KeypadReader::new(sensor, ScanPolicy::default()).unwrap();
        drop(handle);
        assert!(reader.poll().is_err());
    }
}
