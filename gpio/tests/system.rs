//! The process-wide instance. Kept in one test since the instance is
//! shared by everything in this binary.

use gpio::consts::{self, BOTH, HIGH, LOW};
use gpio::{GpioConfig, GpioError, Message, PinId, PullMode, system};
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

#[test]
fn test_system_lifecycle() {
    assert!(!system::is_initialized());
    assert_eq!(system::get(17), Err(GpioError::NotInitialized));
    assert_eq!(
        system::setup_irq(5, |_| {}, None, None),
        Err(GpioError::NotInitialized)
    );
    assert!(!system::handle_message(&Message::gpio(PinId::new(5).unwrap(), 1).unwrap()));
    system::close(5);

    system::init(GpioConfig::default()).unwrap();
    assert!(system::is_initialized());
    assert_eq!(
        system::init(GpioConfig::documented()),
        Err(GpioError::AlreadyInitialized)
    );

    system::setup_output(17, LOW, None).unwrap();
    system::set(17, HIGH).unwrap();
    assert_eq!(system::get(17), Ok(HIGH));

    system::setup_input(18, Some(PullMode::Up)).unwrap();
    assert_eq!(system::get(18), Ok(HIGH));

    let seen = Arc::new(AtomicI32::new(-1));
    let s = seen.clone();
    system::setup_irq(
        6,
        move |level| s.store(level, Ordering::SeqCst),
        None,
        Some(BOTH),
    )
    .unwrap();

    system::with(|gpio| gpio.hal_mut().drive(PinId::new(6).unwrap(), consts::HIGH)).unwrap();
    let queued = system::with(|gpio| system::on_interrupt(gpio.hal_mut())).unwrap();
    assert_eq!(queued, 1);

    while let Some(message) = system::events().pop() {
        assert!(system::handle_message(&message));
    }
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    system::close(6);
    assert!(system::handle_message(&Message::gpio(PinId::new(6).unwrap(), 0).unwrap()));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(system::with(|gpio| gpio.host().live()), Ok(0));

    // A callback may drive other pins and close its own
    let runs = Arc::new(AtomicI32::new(0));
    let r = runs.clone();
    system::setup_irq(
        7,
        move |level| {
            r.fetch_add(1, Ordering::SeqCst);
            system::set(17, if level == 1 { LOW } else { HIGH }).unwrap();
            assert_eq!(system::get(17), Ok(LOW));
            system::close(7);
        },
        None,
        None,
    )
    .unwrap();
    assert_eq!(system::with(|gpio| gpio.host().live()), Ok(1));

    system::with(|gpio| gpio.hal_mut().drive(PinId::new(7).unwrap(), HIGH)).unwrap();
    system::with(|gpio| system::on_interrupt(gpio.hal_mut())).unwrap();
    let message = system::events().pop().unwrap();
    assert!(system::handle_message(&message));

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(system::get(17), Ok(LOW));
    assert_eq!(system::with(|gpio| gpio.host().live()), Ok(0));
    assert_eq!(
        system::with(|gpio| gpio.registry().contains(PinId::new(7).unwrap())),
        Ok(false)
    );

    // Event for the closed pin no longer runs anything
    assert!(system::handle_message(&message));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    assert_eq!(
        system::setup_output(0, LOW, None),
        Err(GpioError::InvalidPin(0))
    );
}
