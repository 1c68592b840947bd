//! Build-time secrets injected by `build.rs`

use notifier_core::http::Endpoint;

pub const WIFI_SSID: &str = env!("NOTIFIER_WIFI_SSID");
pub const WIFI_PASSWORD: &str = env!("NOTIFIER_WIFI_PASSWORD");

pub const ENDPOINT: Endpoint<'static> = Endpoint {
    host: env!("NOTIFIER_POST_HOST"),
    port: match u16::from_str_radix(env!("NOTIFIER_POST_PORT"), 10) {
        Ok(port) => port,
        Err(_) => panic!("POST_PORT is validated by build.rs"),
    },
    path: env!("NOTIFIER_POST_PATH"),
    token: env!("NOTIFIER_POST_TOKEN"),
};
