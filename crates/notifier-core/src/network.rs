//! Network bring-up port
//!
//! The control loop needs an address before it can post anything, and it must
//! give the network stack a chance to renew that address on every iteration.
//! [`NetworkStack`] is the narrow seam for both; DHCP, DNS and transport stay
//! inside the implementation.

use core::fmt;
use core::future::Future;
use core::net::Ipv4Addr;

/// Six-byte link-layer address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const UNSPECIFIED: MacAddress = MacAddress([0; 6]);

    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Addresses granted by the network.
///
/// Gateway and DNS are [`Ipv4Addr::UNSPECIFIED`] when the lease did not carry
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lease {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub dns: Ipv4Addr,
}

impl Lease {
    pub const fn new(ip: Ipv4Addr, gateway: Ipv4Addr, dns: Ipv4Addr) -> Self {
        Self { ip, gateway, dns }
    }
}

/// What a single housekeeping call observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseMaintenance {
    /// Nothing to do, the lease is still valid
    Unchanged,
    /// A lease for the last known address was granted again
    Renewed(Lease),
    /// A lease for a different address was granted, or the first one
    Rebound(Lease),
    /// The lease expired and the stack is looking for a new one
    Lost,
}

/// Turns successive lease snapshots into [`LeaseMaintenance`] events.
///
/// Stacks that renew in the background only expose the current lease (if
/// any). The tracker remembers the last known lease across a loss, so an
/// address handed back after an outage reports as renewed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaseTracker {
    last_known: Option<Lease>,
    bound: bool,
}

impl LeaseTracker {
    pub const fn new() -> Self {
        Self {
            last_known: None,
            bound: false,
        }
    }

    /// Record a lease obtained during startup
    pub fn bind(&mut self, lease: Lease) {
        self.last_known = Some(lease);
        self.bound = true;
    }

    /// Lease currently held, if bound
    pub fn current(&self) -> Option<Lease> {
        if self.bound { self.last_known } else { None }
    }

    /// Compare `snapshot` with what was seen last and report the transition
    pub fn observe(&mut self, snapshot: Option<Lease>) -> LeaseMaintenance {
        let Some(lease) = snapshot else {
            if self.bound {
                self.bound = false;
                return LeaseMaintenance::Lost;
            }
            return LeaseMaintenance::Unchanged;
        };

        let previous = self.last_known;
        let was_bound = self.bound;
        self.bind(lease);

        match previous {
            Some(old) if was_bound && old == lease => LeaseMaintenance::Unchanged,
            Some(old) if old.ip == lease.ip => LeaseMaintenance::Renewed(lease),
            _ => LeaseMaintenance::Rebound(lease),
        }
    }
}

/// Port for network address management
pub trait NetworkStack {
    /// Link-layer address the lease is requested for
    fn hardware_address(&self) -> MacAddress;

    /// Obtain an address lease.
    ///
    /// This waits until a lease is granted. There is no timeout: a device
    /// without a network never leaves startup.
    fn acquire_lease(&mut self, hardware_address: MacAddress) -> impl Future<Output = Lease>;

    /// Periodic renew/rebind housekeeping, called once per loop iteration.
    ///
    /// Must return promptly when there is nothing to do.
    fn maintain_lease(&mut self) -> impl Future<Output = LeaseMaintenance>;
}
