//! # NetLoop Configuration
//!
//! Compile-time constants for the tick clock, the run loop, the character
//! display, and the device's default network identity. Nothing here is read
//! from storage at runtime.

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Raw tick rate in Hz. The SysTick interrupt advances the tick counter
/// once per period.
pub const TICK_HZ: u32 = 1024;

/// Right shift applied to the raw counter by `TickClock::now()`.
/// A shift of 8 divides by 256.
pub const TICK_SHIFT: u32 = 8;

/// Rate of the coarsened clock returned by `TickClock::now()`.
pub const COARSE_TICK_HZ: u32 = TICK_HZ >> TICK_SHIFT;

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

/// Heartbeat period in coarse ticks (one second).
pub const HEARTBEAT_PERIOD: u32 = COARSE_TICK_HZ;

/// Heartbeat period expressed in milliseconds.
pub const HEARTBEAT_PERIOD_MS: u32 = HEARTBEAT_PERIOD * 1000 / COARSE_TICK_HZ;

/// Watchdog expiry window in milliseconds. The watchdog is serviced from
/// the heartbeat task, so this must comfortably exceed the heartbeat period.
pub const WATCHDOG_TIMEOUT_MS: u32 = 4000;

/// Capacity of the scheduler's periodic task table.
pub const MAX_TASKS: usize = 4;

const _: () = assert!(HEARTBEAT_PERIOD_MS < WATCHDOG_TIMEOUT_MS);
const _: () = assert!(COARSE_TICK_HZ > 0);

// ---------------------------------------------------------------------------
// Character display
// ---------------------------------------------------------------------------

/// Characters per display line.
pub const DISPLAY_COLUMNS: usize = 16;

/// Number of display lines.
pub const DISPLAY_LINES: usize = 2;

/// Total cells in the display text buffer.
pub const DISPLAY_CAPACITY: usize = DISPLAY_COLUMNS * DISPLAY_LINES;

/// Absolute buffer position where the current IPv4 address is rendered
/// (start of line 2).
pub const ADDRESS_LINE_OFFSET: usize = DISPLAY_COLUMNS;

/// Text shown on line 1 during bring-up.
pub const BANNER: &str = "NetLoop";

// ---------------------------------------------------------------------------
// Default network identity
// ---------------------------------------------------------------------------

/// Placeholder link-layer address, used only when the board cannot provide
/// a unique serial number to derive one from.
pub const DEFAULT_MAC: [u8; 6] = [0x00, 0x04, 0xA3, 0x01, 0x02, 0x03];

/// Default IPv4 address (link-local), octet 1.
pub const DEFAULT_IP_BYTE1: u8 = 169;
/// Default IPv4 address (link-local), octet 2.
pub const DEFAULT_IP_BYTE2: u8 = 254;
/// Default IPv4 address (link-local), octet 3.
pub const DEFAULT_IP_BYTE3: u8 = 1;
/// Default IPv4 address (link-local), octet 4.
pub const DEFAULT_IP_BYTE4: u8 = 1;

/// Default subnet mask, octet 1.
pub const DEFAULT_MASK_BYTE1: u8 = 255;
/// Default subnet mask, octet 2.
pub const DEFAULT_MASK_BYTE2: u8 = 255;
/// Default subnet mask, octet 3.
pub const DEFAULT_MASK_BYTE3: u8 = 0;
/// Default subnet mask, octet 4.
pub const DEFAULT_MASK_BYTE4: u8 = 0;

/// Default gateway, octet 1.
pub const DEFAULT_GATE_BYTE1: u8 = 169;
/// Default gateway, octet 2.
pub const DEFAULT_GATE_BYTE2: u8 = 254;
/// Default gateway, octet 3.
pub const DEFAULT_GATE_BYTE3: u8 = 1;
/// Default gateway, octet 4.
pub const DEFAULT_GATE_BYTE4: u8 = 1;

/// Default primary DNS server, octet 1.
pub const DEFAULT_PRIMARY_DNS_BYTE1: u8 = 169;
/// Default primary DNS server, octet 2.
pub const DEFAULT_PRIMARY_DNS_BYTE2: u8 = 254;
/// Default primary DNS server, octet 3.
pub const DEFAULT_PRIMARY_DNS_BYTE3: u8 = 1;
/// Default primary DNS server, octet 4.
pub const DEFAULT_PRIMARY_DNS_BYTE4: u8 = 1;

/// Default secondary DNS server (unset), octet 1.
pub const DEFAULT_SECONDARY_DNS_BYTE1: u8 = 0;
/// Default secondary DNS server (unset), octet 2.
pub const DEFAULT_SECONDARY_DNS_BYTE2: u8 = 0;
/// Default secondary DNS server (unset), octet 3.
pub const DEFAULT_SECONDARY_DNS_BYTE3: u8 = 0;
/// Default secondary DNS server (unset), octet 4.
pub const DEFAULT_SECONDARY_DNS_BYTE4: u8 = 0;

/// Whether the network stack should request a DHCP lease at startup.
pub const DEFAULT_DHCP_ENABLED: bool = true;

/// Whether the device boots in provisioning mode.
pub const DEFAULT_PROVISIONING_MODE: bool = true;
