//! WiFi bring-up and DHCP lease tracking
//!
//! The radio connection and the embassy-net runner live in their own tasks;
//! [`WifiNetwork`] is what the control loop sees of them.

use embassy_net::driver::HardwareAddress;
use embassy_net::{Runner, Stack, StaticConfigV4};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState};
use log::{info, warn};
use notifier_core::{Lease, LeaseMaintenance, LeaseTracker, MacAddress, NetworkStack};

use crate::secrets::{WIFI_PASSWORD, WIFI_SSID};

/// Delay before reconnecting after the access point dropped us
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Keep the station associated, reconnecting whenever the link drops
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>) {
    info!("WiFi connection task started");

    loop {
        if matches!(esp_radio::wifi::sta_state(), WifiStaState::Connected) {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            warn!("WiFi disconnected");
            Timer::after(RECONNECT_DELAY).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let client_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(WIFI_SSID.into())
                    .with_password(WIFI_PASSWORD.into()),
            );
            if let Err(e) = controller.set_config(&client_config) {
                warn!("Failed to set WiFi configuration: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
            info!("Starting WiFi");
            if let Err(e) = controller.start_async().await {
                warn!("Failed to start WiFi: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
        }

        info!("Connecting to {}", WIFI_SSID);
        match controller.connect_async().await {
            Ok(()) => info!("WiFi connected"),
            Err(e) => {
                warn!("Failed to connect to WiFi: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
            }
        }
    }
}

/// Drive the embassy-net stack (DHCP, DNS, TCP)
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// [`NetworkStack`] over an embassy-net stack configured for DHCPv4
pub struct WifiNetwork {
    stack: Stack<'static>,
    tracker: LeaseTracker,
}

impl WifiNetwork {
    pub fn new(stack: Stack<'static>) -> Self {
        Self {
            stack,
            tracker: LeaseTracker::new(),
        }
    }

    fn current_lease(&self) -> Option<Lease> {
        self.stack.config_v4().map(|config| lease_from(&config))
    }
}

fn lease_from(config: &StaticConfigV4) -> Lease {
    Lease {
        ip: config.address.address(),
        gateway: config.gateway.unwrap_or(core::net::Ipv4Addr::UNSPECIFIED),
        dns: config
            .dns_servers
            .first()
            .copied()
            .unwrap_or(core::net::Ipv4Addr::UNSPECIFIED),
    }
}

impl NetworkStack for WifiNetwork {
    fn hardware_address(&self) -> MacAddress {
        match self.stack.hardware_address() {
            HardwareAddress::Ethernet(octets) => MacAddress::new(octets),
            _ => MacAddress::UNSPECIFIED,
        }
    }

    async fn acquire_lease(&mut self, hardware_address: MacAddress) -> Lease {
        info!("Requesting DHCP lease for {}", hardware_address);
        loop {
            self.stack.wait_config_up().await;
            if let Some(lease) = self.current_lease() {
                self.tracker.bind(lease);
                return lease;
            }
        }
    }

    async fn maintain_lease(&mut self) -> LeaseMaintenance {
        // Renewal itself runs inside the net task; report what it did
        self.tracker.observe(self.current_lease())
    }
}
