//! ESP32-S3 firmware-specific modules for the sensor notifier
//!
//! This crate contains the hardware-specific code that cannot compile on
//! desktop targets: ADC and GPIO adapters, WiFi bring-up, the DHCP lease
//! collaborator and the HTTP delivery client. All control logic lives in
//! `notifier_core`.

#![no_std]

pub mod board;
pub mod http_delivery;
pub mod secrets;
pub mod wifi;
