//! # Display Notifier
//!
//! Shows the current IPv4 address on line 2 of the display, refreshing the
//! panel exactly once per distinct address value.

use log::{info, warn};

use crate::config::ADDRESS_LINE_OFFSET;
use crate::display::{CharDisplay, LcdPanel};
use crate::identity::{IpAddress, NetworkIdentity};

pub struct DisplayNotifier {
    /// `None` until the first refresh; never equal to a real address.
    last_shown: Option<IpAddress>,
    refreshes: u32,
}

impl DisplayNotifier {
    pub const fn new() -> Self {
        Self {
            last_shown: None,
            refreshes: 0,
        }
    }

    /// Address currently on the display, if any has been shown yet.
    pub const fn last_shown(&self) -> Option<IpAddress> {
        self.last_shown
    }

    /// Number of refreshes triggered so far.
    pub const fn refreshes(&self) -> u32 {
        self.refreshes
    }

    /// Re-render and refresh if `identity.address` differs from what is on
    /// the display. Returns `true` if a refresh happened.
    pub fn check_and_refresh<P: LcdPanel>(
        &mut self,
        identity: &NetworkIdentity,
        display: &mut CharDisplay<P>,
    ) -> bool {
        let address = identity.address;
        if self.last_shown == Some(address) {
            return false;
        }

        if let Err(err) = display.write_address(ADDRESS_LINE_OFFSET, address) {
            warn!("address not rendered: {}", err);
        }
        self.last_shown = Some(address);
        self.refreshes = self.refreshes.wrapping_add(1);
        display.refresh();

        info!("IPv4 address is now {}", address);
        true
    }
}

impl Default for DisplayNotifier {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
