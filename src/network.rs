//! # Network Stack Interface
//!
//! The protocol stack (link, ARP, IP, TCP/UDP, DHCP, application services)
//! is provided elsewhere. The run loop only initializes it once and then
//! polls it once per iteration.

use log::info;

use crate::identity::{ConfigStore, NetworkIdentity};

/// Entry points the run loop uses to drive a network stack.
pub trait NetworkStack {
    /// Bring the stack up with the configured identity. Called exactly once,
    /// after the config store is initialized and before the loop starts.
    fn init(&mut self, identity: &NetworkIdentity);

    /// Do one bounded slice of work: drain received frames, run timers,
    /// advance protocol state machines.
    ///
    /// Must return promptly. The watchdog is only serviced between polls, so
    /// any internal retry or backoff has to be spread across calls rather
    /// than waited out here. May update the identity, for example when a
    /// DHCP lease is granted or lost.
    fn poll(&mut self, config: &mut ConfigStore);
}

impl<N: NetworkStack + ?Sized> NetworkStack for &mut N {
    fn init(&mut self, identity: &NetworkIdentity) {
        (**self).init(identity)
    }

    fn poll(&mut self, config: &mut ConfigStore) {
        (**self).poll(config)
    }
}

/// Stack for boards without an Ethernet interface. The identity keeps its
/// defaults forever.
#[derive(Debug, Default)]
pub struct OfflineStack {
    polls: u32,
}

impl OfflineStack {
    pub const fn new() -> Self {
        Self { polls: 0 }
    }

    pub const fn polls(&self) -> u32 {
        self.polls
    }
}

impl NetworkStack for OfflineStack {
    fn init(&mut self, identity: &NetworkIdentity) {
        info!(
            "no network interface; keeping {} / {} ({})",
            identity.address, identity.mask, identity.mac
        );
    }

    fn poll(&mut self, _config: &mut ConfigStore) {
        self.polls = self.polls.wrapping_add(1);
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_stack_leaves_identity_alone() {
        let mut config = ConfigStore::init();
        let before = *config.identity();
        let mut stack = OfflineStack::new();

        stack.init(config.identity());
        for _ in 0..10 {
            stack.poll(&mut config);
        }

        assert_eq!(stack.polls(), 10);
        assert_eq!(*config.identity(), before);
    }

    #[test]
    fn test_stack_usable_through_mutable_reference() {
        let mut config = ConfigStore::init();
        let mut stack = OfflineStack::new();
        {
            let mut by_ref = &mut stack;
            NetworkStack::poll(&mut by_ref, &mut config);
        }
        assert_eq!(stack.polls(), 1);
    }
}
