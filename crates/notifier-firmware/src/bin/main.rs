#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_net::StackResources;
use esp_hal::analog::adc::{Adc, AdcConfig, Attenuation};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};
use rtt_target::rprintln;
use static_cell::StaticCell;

use notifier_core::{AppError, LogSink, Notifier, NotifierConfig, Peripherals};
use notifier_firmware::board::{AdcSensor, EmbassyClock};
use notifier_firmware::http_delivery::HttpDelivery;
use notifier_firmware::secrets::ENDPOINT;
use notifier_firmware::wifi::{WifiNetwork, connection_task, net_task};

/// Sockets: DHCP, DNS and the delivery TCP connection
const SOCKET_COUNT: usize = 3;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

/// Report a fatal startup error and stop
fn halt(err: AppError) -> ! {
    error!("{}", err);
    panic!("{}", err);
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "the notifier owns its socket buffers and lives for the whole program"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // The radio driver allocates its buffers on this heap
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    rprintln!("Embassy initialized!");

    // Network bring-up
    static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    let radio = esp_radio::init().unwrap_or_else(|e| {
        error!("Radio init error: {:?}", e);
        halt(AppError::network("radio controller init failed"))
    });
    let radio_init = RADIO.init(radio);
    let (wifi_controller, interfaces) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default()).unwrap_or_else(
            |e| {
                error!("WiFi init error: {:?}", e);
                halt(AppError::network("WiFi controller init failed"))
            },
        );

    let rng = Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());

    static RESOURCES: StaticCell<StackResources<SOCKET_COUNT>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        seed,
    );

    if spawner.spawn(connection_task(wifi_controller)).is_err() {
        halt(AppError::network("cannot spawn WiFi connection task"));
    }
    if spawner.spawn(net_task(runner)).is_err() {
        halt(AppError::network("cannot spawn network task"));
    }

    // Board I/O
    let button = Input::new(
        peripherals.GPIO4,
        InputConfig::default().with_pull(Pull::Down),
    );
    let success_indicator = Output::new(peripherals.GPIO5, Level::Low, OutputConfig::default());
    let busy_indicator = Output::new(peripherals.GPIO6, Level::Low, OutputConfig::default());

    let mut adc_config = AdcConfig::new();
    let sensor_pin = adc_config.enable_pin(peripherals.GPIO1, Attenuation::_11dB);
    let adc = Adc::new(peripherals.ADC1, adc_config);

    info!("Board initialized");

    let board = Peripherals {
        button,
        sensor: AdcSensor::new(adc, sensor_pin),
        success_indicator,
        busy_indicator,
        delay: embassy_time::Delay,
        clock: EmbassyClock,
    };

    let mut notifier = Notifier::new(
        NotifierConfig::DEFAULT,
        board,
        WifiNetwork::new(stack),
        HttpDelivery::new(stack, ENDPOINT),
        LogSink,
    )
    .unwrap_or_else(halt);

    notifier.run().await
}
