//! Tone keying: clocking a symbol sequence into the radio driver, one
//! tone per symbol period.
//!
//! The keyer is the only state shared between the scheduler's tick loop
//! and the tone clock's timer context, so it lives behind a mutex and
//! both sides reach it through [`SharedKeyer`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, trace};

use crate::constants::{SYMBOL_COUNT, TONE_PERIOD_MS, TONE_SPACING_HZ};
use crate::message::SymbolSequence;

/// Frequency synthesizer interface, called synchronously from the tone
/// clock context.
pub trait RadioDriver {
    /// One-time front-end setup before the first transmission.
    fn configure(&mut self);
    /// Key the RF output on or off.
    fn enable(&mut self, on: bool);
    /// Set the transmit offset from the dial frequency.
    fn set_tone(&mut self, offset_hz: f64, correction_ppm: i32);
}

/// Result of one keyer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyerStatus {
    /// No transmission armed.
    Idle,
    /// A tone was keyed; `cursor` symbols have been sent so far.
    Keyed { cursor: usize },
    /// The final symbol was keyed and the RF output disabled.
    Complete,
}

struct ActiveTransmission {
    symbols: SymbolSequence,
    cursor: usize,
    base_offset_hz: f64,
}

/// Keys one symbol per tick into the radio driver.
pub struct ToneKeyer<R: RadioDriver> {
    radio: R,
    offsets: Vec<f64>,
    offset_index: usize,
    correction_ppm: i32,
    active: Option<ActiveTransmission>,
}

/// Handle shared between the scheduler and the tone clock.
pub type SharedKeyer<R> = Arc<Mutex<ToneKeyer<R>>>;

impl<R: RadioDriver> ToneKeyer<R> {
    pub fn new(radio: R, offsets: Vec<f64>, correction_ppm: i32) -> ToneKeyer<R> {
        assert!(!offsets.is_empty(), "at least one transmit offset required");
        ToneKeyer {
            radio,
            offsets,
            offset_index: 0,
            correction_ppm,
            active: None,
        }
    }

    pub fn shared(self) -> SharedKeyer<R> {
        Arc::new(Mutex::new(self))
    }

    /// One-time front-end configuration, forwarded to the radio.
    pub fn configure(&mut self) {
        self.radio.configure();
    }

    /// Load a symbol sequence for transmission. The base offset rotates
    /// through the configured list, one slot per transmission.
    pub fn arm(&mut self, symbols: SymbolSequence) {
        let base_offset_hz = self.offsets[self.offset_index];
        self.offset_index = (self.offset_index + 1) % self.offsets.len();
        debug!(base_offset_hz, "keyer armed");
        self.active = Some(ActiveTransmission {
            symbols,
            cursor: 0,
            base_offset_hz,
        });
    }

    /// Key the next tone. Enables RF before the first symbol and disables
    /// it after the last.
    pub fn tick(&mut self) -> KeyerStatus {
        let Some(tx) = self.active.as_mut() else {
            return KeyerStatus::Idle;
        };

        if tx.cursor == 0 {
            self.radio.enable(true);
        }

        let symbol = tx.symbols[tx.cursor];
        let offset_hz = tx.base_offset_hz + symbol as f64 * TONE_SPACING_HZ;
        self.radio.set_tone(offset_hz, self.correction_ppm);
        tx.cursor += 1;
        trace!(cursor = tx.cursor, symbol, offset_hz, "tone keyed");

        if tx.cursor == SYMBOL_COUNT {
            self.radio.enable(false);
            self.active = None;
            debug!("transmission complete");
            KeyerStatus::Complete
        } else {
            KeyerStatus::Keyed { cursor: tx.cursor }
        }
    }

    /// Drop any armed transmission and force the RF output off. Safe to
    /// call mid-sequence.
    pub fn abort(&mut self) {
        if self.active.take().is_some() {
            debug!("transmission aborted");
        }
        self.radio.enable(false);
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Symbols sent so far, if a transmission is in flight.
    pub fn cursor(&self) -> Option<usize> {
        self.active.as_ref().map(|tx| tx.cursor)
    }
}

/// Periodic trigger that drives the keyer while a message is in flight.
pub trait ToneClock {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Production clock: a thread that ticks the keyer once per symbol
/// period until the transmission completes or the clock is stopped.
pub struct ThreadToneClock<R: RadioDriver + Send + 'static> {
    keyer: SharedKeyer<R>,
    worker: Option<(Arc<AtomicBool>, JoinHandle<()>)>,
}

impl<R: RadioDriver + Send + 'static> ThreadToneClock<R> {
    pub fn new(keyer: SharedKeyer<R>) -> ThreadToneClock<R> {
        ThreadToneClock { keyer, worker: None }
    }
}

impl<R: RadioDriver + Send + 'static> ToneClock for ThreadToneClock<R> {
    fn start(&mut self) {
        self.stop();
        let halt = Arc::new(AtomicBool::new(false));
        let halt_flag = Arc::clone(&halt);
        let keyer = Arc::clone(&self.keyer);
        let handle = std::thread::spawn(move || loop {
            std::thread::sleep(Duration::from_millis(TONE_PERIOD_MS));
            if halt_flag.load(Ordering::Relaxed) {
                break;
            }
            let status = keyer.lock().unwrap().tick();
            if matches!(status, KeyerStatus::Complete | KeyerStatus::Idle) {
                break;
            }
        });
        self.worker = Some((halt, handle));
    }

    fn stop(&mut self) {
        if let Some((halt, handle)) = self.worker.take() {
            halt.store(true, Ordering::Relaxed);
            let _ = handle.join();
        }
    }
}
