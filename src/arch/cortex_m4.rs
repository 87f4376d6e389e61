//! # Cortex-M4 Port Layer (STM32F4)
//!
//! Hardware-specific code for an STM32F4-class Cortex-M4 board: the SysTick
//! tick timer, the independent watchdog (IWDG), the heartbeat LED, and the
//! factory-programmed unique ID.
//!
//! ## Interrupts
//!
//! SysTick is the only interrupt the run loop relies on. Its handler calls
//! the registered tick callback and nothing else, so it is O(1) and never
//! touches state the run loop mutates. SysTick runs at the lowest exception
//! priority; it still preempts Thread mode, which is where the run loop
//! lives.
//!
//! Peripheral registers outside the core are accessed by address with
//! volatile reads and writes; there is no PAC dependency.

use core::cell::Cell;
use core::convert::Infallible;
use core::ptr;

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use cortex_m_rt::exception;
use critical_section::Mutex;
use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};

use crate::arch::{Board, Watchdog};
use crate::config::SYSTEM_CLOCK_HZ;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Register map
// ---------------------------------------------------------------------------

const RCC_AHB1ENR: *mut u32 = 0x4002_3830 as *mut u32;
const RCC_AHB1ENR_GPIOAEN: u32 = 1 << 0;

const GPIOA_BASE: usize = 0x4002_0000;
const GPIO_MODER: usize = 0x00;
const GPIO_ODR: usize = 0x14;
const GPIO_BSRR: usize = 0x18;

const IWDG_KR: *mut u32 = 0x4000_3000 as *mut u32;
const IWDG_PR: *mut u32 = 0x4000_3004 as *mut u32;
const IWDG_RLR: *mut u32 = 0x4000_3008 as *mut u32;
const IWDG_SR: *const u32 = 0x4000_300C as *const u32;

const IWDG_KEY_RELOAD: u32 = 0xAAAA;
const IWDG_KEY_UNLOCK: u32 = 0x5555;
const IWDG_KEY_START: u32 = 0xCCCC;

/// LSI / 64 = 500 Hz, so one reload count is 2 ms.
const IWDG_PRESCALER_DIV64: u32 = 4;
const IWDG_MS_PER_COUNT: u32 = 2;
const IWDG_MAX_RELOAD: u32 = 0x0FFF;

const UID_BASE: *const u8 = 0x1FFF_7A10 as *const u8;

/// User LED LD2 on Nucleo-F401RE.
const HEARTBEAT_LED_PIN: u8 = 5;

// ---------------------------------------------------------------------------
// SysTick
// ---------------------------------------------------------------------------

/// Tick callback invoked from the SysTick handler.
static TICK_CALLBACK: Mutex<Cell<Option<fn()>>> = Mutex::new(Cell::new(None));

/// Configure the SysTick timer to fire at `tick_hz` using the processor
/// clock.
pub fn configure_systick(syst: &mut SYST, tick_hz: u32) {
    let reload = SYSTEM_CLOCK_HZ / tick_hz - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

/// Set SysTick to the lowest exception priority.
pub fn set_systick_priority() {
    unsafe {
        // System Handler Priority Register 3 (SHPR3): 0xE000_ED20
        // Bits [31:24] = SysTick priority
        let shpr3: *mut u32 = 0xE000_ED20 as *mut u32;
        let val = ptr::read_volatile(shpr3);
        ptr::write_volatile(shpr3, val | (0xFF << 24));
    }
}

/// SysTick exception handler. Calls the registered tick callback.
#[exception]
fn SysTick() {
    let callback = critical_section::with(|cs| TICK_CALLBACK.borrow(cs).get());
    if let Some(on_tick) = callback {
        on_tick();
    }
}

// ---------------------------------------------------------------------------
// Independent watchdog
// ---------------------------------------------------------------------------

/// The IWDG. Once started it cannot be stopped until reset.
pub struct IndependentWatchdog {
    _private: (),
}

impl IndependentWatchdog {
    /// Start the watchdog with an expiry window of at least `timeout_ms`
    /// (capped at the hardware maximum of about 8 s).
    pub fn start(timeout_ms: u32) -> Self {
        let reload = timeout_ms
            .div_ceil(IWDG_MS_PER_COUNT)
            .clamp(1, IWDG_MAX_RELOAD);
        unsafe {
            ptr::write_volatile(IWDG_KR, IWDG_KEY_START);
            ptr::write_volatile(IWDG_KR, IWDG_KEY_UNLOCK);
            ptr::write_volatile(IWDG_PR, IWDG_PRESCALER_DIV64);
            ptr::write_volatile(IWDG_RLR, reload);
            // PVU / RVU clear once the new values reach the LSI domain
            while ptr::read_volatile(IWDG_SR) != 0 {}
            ptr::write_volatile(IWDG_KR, IWDG_KEY_RELOAD);
        }
        Self { _private: () }
    }
}

impl Watchdog for IndependentWatchdog {
    #[inline]
    fn service(&mut self) {
        unsafe {
            ptr::write_volatile(IWDG_KR, IWDG_KEY_RELOAD);
        }
    }
}

// ---------------------------------------------------------------------------
// GPIO output pin
// ---------------------------------------------------------------------------

/// Push-pull output on a GPIO port, driven through BSRR.
pub struct GpioOutput {
    base: usize,
    pin: u8,
}

impl GpioOutput {
    /// Configure `pin` of the port at `base` as a general-purpose output.
    ///
    /// # Safety
    /// The port clock must be enabled and no other code may own the pin.
    pub unsafe fn new(base: usize, pin: u8) -> Self {
        let moder = (base + GPIO_MODER) as *mut u32;
        let shift = u32::from(pin) * 2;
        let val = ptr::read_volatile(moder) & !(0b11 << shift);
        ptr::write_volatile(moder, val | (0b01 << shift));
        Self { base, pin }
    }

    fn bsrr(&self, bits: u32) {
        unsafe {
            ptr::write_volatile((self.base + GPIO_BSRR) as *mut u32, bits);
        }
    }

    fn odr_bit(&self) -> bool {
        let odr = unsafe { ptr::read_volatile((self.base + GPIO_ODR) as *const u32) };
        odr & (1 << self.pin) != 0
    }
}

impl ErrorType for GpioOutput {
    type Error = Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        self.bsrr(1 << (u32::from(self.pin) + 16));
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        self.bsrr(1 << self.pin);
        Ok(())
    }
}

impl StatefulOutputPin for GpioOutput {
    fn is_set_high(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(self.odr_bit())
    }

    fn is_set_low(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(!self.odr_bit())
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Nucleo-F401RE running from the 16 MHz HSI.
pub struct Stm32f4Board {
    core: cortex_m::Peripherals,
}

impl Stm32f4Board {
    /// Take the core peripherals. Fails if they were already taken.
    pub fn take() -> Result<Self> {
        let core = cortex_m::Peripherals::take().ok_or(Error::PeripheralsTaken)?;
        Ok(Self { core })
    }
}

impl Board for Stm32f4Board {
    type Indicator = GpioOutput;
    type Watchdog = IndependentWatchdog;

    fn start_tick_timer(&mut self, tick_hz: u32, on_tick: fn()) {
        critical_section::with(|cs| TICK_CALLBACK.borrow(cs).set(Some(on_tick)));
        set_systick_priority();
        configure_systick(&mut self.core.SYST, tick_hz);
    }

    fn start_watchdog(&mut self, timeout_ms: u32) -> IndependentWatchdog {
        IndependentWatchdog::start(timeout_ms)
    }

    fn heartbeat_indicator(&mut self) -> GpioOutput {
        unsafe {
            let val = ptr::read_volatile(RCC_AHB1ENR);
            ptr::write_volatile(RCC_AHB1ENR, val | RCC_AHB1ENR_GPIOAEN);
            GpioOutput::new(GPIOA_BASE, HEARTBEAT_LED_PIN)
        }
    }

    fn serial_number(&self) -> Option<[u8; 12]> {
        let mut serial = [0u8; 12];
        for (i, byte) in serial.iter_mut().enumerate() {
            *byte = unsafe { ptr::read_volatile(UID_BASE.add(i)) };
        }
        Some(serial)
    }
}
