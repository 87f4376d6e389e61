//! # NetLoop Firmware
//!
//! Nucleo-F401RE build. The board has no Ethernet controller, so the
//! network stack is `OfflineStack` and the display contents are mirrored
//! over RTT instead of driving a physical LCD.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use log::{error, info};
use rtt_target::rtt_init_log;

use netloop::arch::cortex_m4::Stm32f4Board;
use netloop::config::DISPLAY_LINES;
use netloop::display::{DisplayBuffer, LcdPanel};
use netloop::kernel;
use netloop::network::OfflineStack;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {
        cortex_m::asm::wfi();
    }
}

/// Prints each refreshed frame to the RTT log, one line per display line.
struct RttPanel;

impl LcdPanel for RttPanel {
    fn refresh(&mut self, buffer: &DisplayBuffer) {
        for line in 0..DISPLAY_LINES {
            match core::str::from_utf8(buffer.line(line)) {
                Ok(text) => info!("LCD{}: {}", line + 1, text),
                Err(_) => info!("LCD{}: {:?}", line + 1, buffer.line(line)),
            }
        }
    }
}

/// Firmware entry point. Brings the board up and runs the scheduler.
/// Does not return.
#[entry]
fn main() -> ! {
    rtt_init_log!();

    let board = match Stm32f4Board::take() {
        Ok(board) => board,
        Err(err) => {
            error!("{}", err);
            loop {
                cortex_m::asm::wfi();
            }
        }
    };

    kernel::start(board, OfflineStack::new(), RttPanel)
}
