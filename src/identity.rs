//! # Network Identity
//!
//! The device's link-layer and IPv4 configuration, and the store that owns
//! it for the lifetime of the run loop.
//!
//! `ConfigStore` is built once at startup from the compile-time defaults in
//! `config.rs`, handed to the network stack for initialization, and from
//! then on only the network stack mutates it (for example when a DHCP lease
//! is granted or lost). The display notifier reads it every iteration.

use core::fmt;
use core::net::Ipv4Addr;

use crate::config::*;

// ---------------------------------------------------------------------------
// Link-layer address
// ---------------------------------------------------------------------------

/// A 6-byte Ethernet MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Derive a stable per-device address from the chip's unique serial
    /// number.
    ///
    /// Serial bytes are XOR-folded into the last five octets. The first
    /// octet is fixed to `0x02`: unicast, locally administered, so the
    /// result can never collide with a vendor-assigned address.
    pub fn from_serial(serial: &[u8]) -> Self {
        let mut octets = [0x02, 0, 0, 0, 0, 0];
        for (i, byte) in serial.iter().enumerate() {
            octets[1 + i % 5] ^= byte;
        }
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub const fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }

    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

// ---------------------------------------------------------------------------
// IPv4 address
// ---------------------------------------------------------------------------

/// An IPv4 address packed little-endian into a `u32`: the first dotted
/// octet lives in the least significant byte.
///
/// This is the representation the network stack hands back, so equality
/// checks against it are a single word compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct IpAddress(u32);

impl IpAddress {
    pub const UNSPECIFIED: IpAddress = IpAddress(0);

    /// Combine four independent byte constants, first octet first.
    pub const fn from_bytes(b1: u8, b2: u8, b3: u8, b4: u8) -> Self {
        Self(b1 as u32 | (b2 as u32) << 8 | (b3 as u32) << 16 | (b4 as u32) << 24)
    }

    pub const fn from_packed(value: u32) -> Self {
        Self(value)
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    /// Octets in dotted-quad order.
    pub const fn octets(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    pub const fn is_unspecified(self) -> bool {
        self.0 == 0
    }
}

impl From<IpAddress> for Ipv4Addr {
    fn from(addr: IpAddress) -> Self {
        Ipv4Addr::from(addr.octets())
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        let [b1, b2, b3, b4] = addr.octets();
        Self::from_bytes(b1, b2, b3, b4)
    }
}

/// Dotted decimal, no leading zeros, no trailing separator.
impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [b1, b2, b3, b4] = self.octets();
        write!(f, "{b1}.{b2}.{b3}.{b4}")
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentityFlags {
    /// Request a DHCP lease instead of keeping the static address.
    pub dhcp_enabled: bool,
    /// Device is waiting to be provisioned.
    pub provisioning: bool,
}

/// Everything the network stack needs to bring the interface up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkIdentity {
    pub mac: MacAddress,
    pub address: IpAddress,
    pub mask: IpAddress,
    pub gateway: IpAddress,
    pub primary_dns: IpAddress,
    pub secondary_dns: IpAddress,
    pub flags: IdentityFlags,
}

pub const DEFAULT_ADDRESS: IpAddress = IpAddress::from_bytes(
    DEFAULT_IP_BYTE1,
    DEFAULT_IP_BYTE2,
    DEFAULT_IP_BYTE3,
    DEFAULT_IP_BYTE4,
);

pub const DEFAULT_MASK: IpAddress = IpAddress::from_bytes(
    DEFAULT_MASK_BYTE1,
    DEFAULT_MASK_BYTE2,
    DEFAULT_MASK_BYTE3,
    DEFAULT_MASK_BYTE4,
);

pub const DEFAULT_GATEWAY: IpAddress = IpAddress::from_bytes(
    DEFAULT_GATE_BYTE1,
    DEFAULT_GATE_BYTE2,
    DEFAULT_GATE_BYTE3,
    DEFAULT_GATE_BYTE4,
);

pub const DEFAULT_PRIMARY_DNS: IpAddress = IpAddress::from_bytes(
    DEFAULT_PRIMARY_DNS_BYTE1,
    DEFAULT_PRIMARY_DNS_BYTE2,
    DEFAULT_PRIMARY_DNS_BYTE3,
    DEFAULT_PRIMARY_DNS_BYTE4,
);

pub const DEFAULT_SECONDARY_DNS: IpAddress = IpAddress::from_bytes(
    DEFAULT_SECONDARY_DNS_BYTE1,
    DEFAULT_SECONDARY_DNS_BYTE2,
    DEFAULT_SECONDARY_DNS_BYTE3,
    DEFAULT_SECONDARY_DNS_BYTE4,
);

impl NetworkIdentity {
    /// The compiled-in identity with the given link-layer address.
    pub const fn defaults(mac: MacAddress) -> Self {
        Self {
            mac,
            address: DEFAULT_ADDRESS,
            mask: DEFAULT_MASK,
            gateway: DEFAULT_GATEWAY,
            primary_dns: DEFAULT_PRIMARY_DNS,
            secondary_dns: DEFAULT_SECONDARY_DNS,
            flags: IdentityFlags {
                dhcp_enabled: DEFAULT_DHCP_ENABLED,
                provisioning: DEFAULT_PROVISIONING_MODE,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Config store
// ---------------------------------------------------------------------------

/// Owner of the live network identity.
///
/// Constructed exactly once during bring-up, before the network stack is
/// initialized. Keeps a copy of the default address and mask so a stack
/// that loses its lease can fall back to them.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    identity: NetworkIdentity,
    default_address: IpAddress,
    default_mask: IpAddress,
}

impl ConfigStore {
    /// Populate the identity from the compile-time defaults, including the
    /// placeholder MAC.
    pub const fn init() -> Self {
        Self::with_mac(MacAddress::new(DEFAULT_MAC))
    }

    /// Populate the identity from the compile-time defaults with a
    /// board-supplied link-layer address.
    pub const fn with_mac(mac: MacAddress) -> Self {
        let identity = NetworkIdentity::defaults(mac);
        Self {
            default_address: identity.address,
            default_mask: identity.mask,
            identity,
        }
    }

    pub fn identity(&self) -> &NetworkIdentity {
        &self.identity
    }

    /// Mutable access for the network stack.
    pub fn identity_mut(&mut self) -> &mut NetworkIdentity {
        &mut self.identity
    }

    /// Current IPv4 address.
    pub fn address(&self) -> IpAddress {
        self.identity.address
    }

    pub fn default_address(&self) -> IpAddress {
        self.default_address
    }

    pub fn default_mask(&self) -> IpAddress {
        self.default_mask
    }

    /// Restore the default address and mask. Returns `true` if either
    /// changed.
    pub fn revert_to_defaults(&mut self) -> bool {
        let changed = self.identity.address != self.default_address
            || self.identity.mask != self.default_mask;
        self.identity.address = self.default_address;
        self.identity.mask = self.default_mask;
        changed
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_bytes_combine_little_endian() {
        let addr = IpAddress::from_bytes(192, 168, 1, 10);
        assert_eq!(addr.packed(), 0x0A01_A8C0);
        assert_eq!(addr.octets(), [192, 168, 1, 10]);
    }

    #[test]
    fn test_ip_display_has_no_leading_zeros() {
        assert_eq!(IpAddress::from_bytes(192, 168, 1, 10).to_string(), "192.168.1.10");
        assert_eq!(IpAddress::UNSPECIFIED.to_string(), "0.0.0.0");
        assert_eq!(IpAddress::from_bytes(10, 0, 20, 255).to_string(), "10.0.20.255");
    }

    #[test]
    fn test_ipv4addr_conversion() {
        let addr = IpAddress::from(Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(addr.octets(), [10, 1, 2, 3]);
        assert_eq!(Ipv4Addr::from(addr), Ipv4Addr::new(10, 1, 2, 3));
    }

    #[test]
    fn test_init_uses_compiled_defaults() {
        let store = ConfigStore::init();
        let identity = store.identity();
        assert_eq!(identity.mac.octets(), DEFAULT_MAC);
        assert_eq!(identity.address.octets(), [169, 254, 1, 1]);
        assert_eq!(identity.mask.octets(), [255, 255, 0, 0]);
        assert_eq!(identity.gateway.octets(), [169, 254, 1, 1]);
        assert_eq!(identity.primary_dns.octets(), [169, 254, 1, 1]);
        assert!(identity.secondary_dns.is_unspecified());
        assert!(identity.flags.dhcp_enabled);
        assert!(identity.flags.provisioning);
        assert_eq!(store.default_address(), identity.address);
        assert_eq!(store.default_mask(), identity.mask);
    }

    #[test]
    fn test_revert_to_defaults() {
        let mut store = ConfigStore::init();
        assert!(!store.revert_to_defaults());

        store.identity_mut().address = IpAddress::from_bytes(10, 0, 0, 42);
        store.identity_mut().mask = IpAddress::from_bytes(255, 255, 255, 0);
        assert!(store.revert_to_defaults());
        assert_eq!(store.address(), DEFAULT_ADDRESS);
        assert_eq!(store.identity().mask, DEFAULT_MASK);
    }

    #[test]
    fn test_mac_from_serial_is_local_unicast() {
        let serial = [0x31, 0x00, 0x2F, 0x00, 0x0A, 0x51, 0x34, 0x38, 0x33, 0x38, 0x35, 0x37];
        let mac = MacAddress::from_serial(&serial);
        assert!(mac.is_locally_administered());
        assert!(!mac.is_multicast());
        assert_eq!(mac, MacAddress::from_serial(&serial));
        assert_ne!(mac, MacAddress::from_serial(&[0u8; 12]));
    }

    #[test]
    fn test_mac_display() {
        assert_eq!(MacAddress::new(DEFAULT_MAC).to_string(), "00:04:A3:01:02:03");
    }
}
