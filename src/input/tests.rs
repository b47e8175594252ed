use super::*;

#[test]
fn sim_pin_levels_are_observable() {
    let pin = SimPin::low();
    assert!(!pin.read());

    pin.set(true);
    assert!(pin.read());

    pin.toggle();
    assert!(!pin.read());

    assert!(SimPin::high().read());
}

#[test]
fn sim_keypad_holds_only_the_most_recent_press() {
    let keypad = SimKeypad::new();
    assert_eq!(keypad.peek_pressed_key(), None);

    keypad.press(Key::Digit(4));
    keypad.press(Key::Digit(7));
    assert_eq!(keypad.peek_pressed_key(), Some(Key::Digit(7)));

    // Peeking does not consume
    assert_eq!(keypad.peek_pressed_key(), Some(Key::Digit(7)));

    keypad.clear_pressed_key();
    assert_eq!(keypad.peek_pressed_key(), None);
}

#[test]
fn board_validates_pin_counts() {
    let keypad = SimKeypad::new();

    let three_toggles: Vec<Arc<dyn PinSource>> =
        (0..3).map(|_| SimPin::low() as Arc<dyn PinSource>).collect();
    let five_wires: Vec<Arc<dyn PinSource>> =
        (0..5).map(|_| SimPin::high() as Arc<dyn PinSource>).collect();

    let res = DeviceBoard::new(
        three_toggles,
        SimPin::low(),
        keypad.clone(),
        five_wires.clone(),
    );
    assert!(matches!(
        res,
        Err(BoardValidationError::InvalidTogglePinCount(3))
    ));

    let four_toggles: Vec<Arc<dyn PinSource>> =
        (0..4).map(|_| SimPin::low() as Arc<dyn PinSource>).collect();
    let six_wires: Vec<Arc<dyn PinSource>> =
        (0..6).map(|_| SimPin::high() as Arc<dyn PinSource>).collect();

    let res = DeviceBoard::new(four_toggles.clone(), SimPin::low(), keypad.clone(), six_wires);
    assert!(matches!(
        res,
        Err(BoardValidationError::InvalidWirePinCount(6))
    ));

    assert!(DeviceBoard::new(four_toggles, SimPin::low(), keypad, five_wires).is_ok());
}

#[test]
fn simulated_board_starts_with_expected_levels() {
    let (board, sim) = DeviceBoard::simulated();
    let (toggle_pins, button_pin, _, wire_pins) = board.into_parts();

    assert_eq!(toggle_pins.len(), TOGGLE_PIN_COUNT);
    assert_eq!(wire_pins.len(), WIRE_PIN_COUNT);

    assert!(toggle_pins.iter().all(|pin| !pin.read()));
    assert!(!button_pin.read());
    assert!(wire_pins.iter().all(|pin| pin.read()));

    // Sim handles drive the same underlying pins
    sim.toggles[2].set(true);
    assert!(toggle_pins[2].read());

    sim.button.set(true);
    assert!(button_pin.read());

    sim.wires[0].set(false);
    assert!(!wire_pins[0].read());
}
