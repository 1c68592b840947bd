//! Build script: linker setup and build-time secrets
//!
//! WiFi credentials and the posting endpoint are read from the environment or
//! from a `.env` file and baked into the binary as `NOTIFIER_*` variables, so
//! they never live in source control.

const SECRETS: &[(&str, Option<&str>)] = &[
    ("WIFI_SSID", None),
    ("WIFI_PASSWORD", None),
    ("POST_HOST", None),
    ("POST_PORT", Some("80")),
    ("POST_PATH", Some("/update")),
    ("POST_TOKEN", None),
];

fn main() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");

    println!("cargo:rerun-if-changed=.env");
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    for &(key, default) in SECRETS {
        println!("cargo:rerun-if-env-changed={key}");

        let value = match (std::env::var(key), default) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.to_owned(),
            (Err(_), None) => {
                println!("cargo:warning={key} is not set; see .env.example");
                String::new()
            }
        };

        if key == "POST_PORT" && value.parse::<u16>().map_or(true, |port| port == 0) {
            panic!("POST_PORT must be a port number, got {value:?}");
        }

        println!("cargo:rustc-env=NOTIFIER_{key}={value}");
    }
}
