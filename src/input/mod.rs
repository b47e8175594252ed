use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

pub mod error;

use error::BoardValidationError;

/// Number of toggle input lines on a board.
pub const TOGGLE_PIN_COUNT: usize = 4;

/// Number of wire input lines on a board.
pub const WIRE_PIN_COUNT: usize = 5;

/// A boolean input line periodically sampled by a phase solver.
///
/// Reads may be stale by up to one poll interval; solvers resolve torn samples on their next
/// poll.
pub trait PinSource: Send + Sync + 'static {
    fn read(&self) -> bool;
}

/// A single keypad keystroke.
///
/// `Delete` removes the last buffered digit and `Submit` submits the buffer for judging,
/// matching the `#` and `*` keys of a 3x4 matrix keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Delete,
    Submit,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digit(digit) => write!(f, "{digit}"),
            Self::Delete => write!(f, "#"),
            Self::Submit => write!(f, "*"),
        }
    }
}

/// An edge-triggered single-key buffer, as exposed by a matrix keypad scanner.
///
/// Only the most recent keypress is visible per poll. Consumers must call
/// [`clear_pressed_key`](Self::clear_pressed_key) after consuming a key, or the same press will
/// be observed again on the next poll.
pub trait KeypadSource: Send + Sync + 'static {
    fn peek_pressed_key(&self) -> Option<Key>;

    fn clear_pressed_key(&self);
}

/// Simulated digital input pin backed by an atomic level.
///
/// Stands in for a hardware pin when driving sessions from tests or a keyboard shim. The level
/// is sampled state, not an event: writers flip it, solvers observe it on their next poll.
#[derive(Debug)]
pub struct SimPin {
    level: AtomicBool,
}

impl SimPin {
    pub fn new(initial_level: bool) -> Arc<Self> {
        Arc::new(Self {
            level: AtomicBool::new(initial_level),
        })
    }

    /// Creates a pin reading `false`, e.g. an open toggle or unpressed button.
    pub fn low() -> Arc<Self> {
        Self::new(false)
    }

    /// Creates a pin reading `true`, e.g. an intact wire.
    pub fn high() -> Arc<Self> {
        Self::new(true)
    }

    pub fn set(&self, level: bool) {
        self.level.store(level, Ordering::Release);
    }

    pub fn toggle(&self) {
        self.level.fetch_xor(true, Ordering::AcqRel);
    }
}

impl PinSource for SimPin {
    fn read(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }
}

/// Simulated matrix keypad holding at most one pending keypress.
///
/// A new press overwrites any unconsumed one, matching the single-key visibility of the
/// hardware scanner.
#[derive(Debug, Default)]
pub struct SimKeypad {
    pending: Mutex<Option<Key>>,
}

impl SimKeypad {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<Key>> {
        self.pending
            .lock()
            .expect("`SimKeypad` mutex can't be poisoned")
    }

    pub fn press(&self, key: Key) {
        *self.lock_pending() = Some(key);
    }
}

impl KeypadSource for SimKeypad {
    fn peek_pressed_key(&self) -> Option<Key> {
        *self.lock_pending()
    }

    fn clear_pressed_key(&self) {
        self.lock_pending().take();
    }
}

/// Wiring bundle of the input devices a session polls.
///
/// Validated at construction: exactly [`TOGGLE_PIN_COUNT`] toggle pins and [`WIRE_PIN_COUNT`]
/// wire pins.
pub struct DeviceBoard {
    toggle_pins: Vec<Arc<dyn PinSource>>,
    button_pin: Arc<dyn PinSource>,
    keypad: Arc<dyn KeypadSource>,
    wire_pins: Vec<Arc<dyn PinSource>>,
}

impl DeviceBoard {
    pub fn new(
        toggle_pins: Vec<Arc<dyn PinSource>>,
        button_pin: Arc<dyn PinSource>,
        keypad: Arc<dyn KeypadSource>,
        wire_pins: Vec<Arc<dyn PinSource>>,
    ) -> Result<Self, BoardValidationError> {
        if toggle_pins.len() != TOGGLE_PIN_COUNT {
            return Err(BoardValidationError::InvalidTogglePinCount(
                toggle_pins.len(),
            ));
        }

        if wire_pins.len() != WIRE_PIN_COUNT {
            return Err(BoardValidationError::InvalidWirePinCount(wire_pins.len()));
        }

        Ok(Self {
            toggle_pins,
            button_pin,
            keypad,
            wire_pins,
        })
    }

    /// Builds a board backed entirely by simulated devices.
    ///
    /// Toggles and the button start low; wires start high (intact). The returned [`SimBoard`]
    /// holds the handles used to drive the devices.
    pub fn simulated() -> (Self, SimBoard) {
        let toggles: [Arc<SimPin>; TOGGLE_PIN_COUNT] = std::array::from_fn(|_| SimPin::low());
        let button = SimPin::low();
        let keypad = SimKeypad::new();
        let wires: [Arc<SimPin>; WIRE_PIN_COUNT] = std::array::from_fn(|_| SimPin::high());

        let board = Self {
            toggle_pins: toggles
                .iter()
                .map(|pin| pin.clone() as Arc<dyn PinSource>)
                .collect(),
            button_pin: button.clone(),
            keypad: keypad.clone(),
            wire_pins: wires
                .iter()
                .map(|pin| pin.clone() as Arc<dyn PinSource>)
                .collect(),
        };

        let sim = SimBoard {
            toggles,
            button,
            keypad,
            wires,
        };

        (board, sim)
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Vec<Arc<dyn PinSource>>,
        Arc<dyn PinSource>,
        Arc<dyn KeypadSource>,
        Vec<Arc<dyn PinSource>>,
    ) {
        (
            self.toggle_pins,
            self.button_pin,
            self.keypad,
            self.wire_pins,
        )
    }
}

/// Driver handles for a simulated [`DeviceBoard`].
pub struct SimBoard {
    pub toggles: [Arc<SimPin>; TOGGLE_PIN_COUNT],
    pub button: Arc<SimPin>,
    pub keypad: Arc<SimKeypad>,
    pub wires: [Arc<SimPin>; WIRE_PIN_COUNT],
}

#[cfg(test)]
mod tests;
