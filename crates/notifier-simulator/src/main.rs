//! Desktop simulator for the sensor notifier.
//!
//! Runs the `notifier_core` control loop against simulated hardware so the
//! full press → sample → post → blink cycle can be exercised without a board.
//! The button is driven from stdin, one command per line:
//!
//! | Command | Action                                        |
//! |---------|-----------------------------------------------|
//! | p       | Press; the service accepts the message        |
//! | r       | Press; the service rejects it with status 503 |
//! | c       | Press; the service cannot be reached          |
//! | b       | Bouncy press (two closures 50 ms apart)       |
//! | q       | Quit                                          |
//!
//! The second closure of a bouncy press lands while the first cycle is still
//! sampling, so it is never seen and only one message goes out.
//!
//! Indicator changes and diagnostics are printed through `env_logger`
//! (`RUST_LOG=debug` adds the loop state transitions).

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::io::BufRead;
use std::net::Ipv4Addr;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use embassy_futures::block_on;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use log::{error, info};

use notifier_core::config::DEFAULT_HARDWARE_ADDRESS;
use notifier_core::{
    AnalogInput, Clock, DeliveryClient, DeliveryOutcome, Lease, LeaseMaintenance, LogSink,
    MacAddress, NetworkStack, Notifier, NotifierConfig, Peripherals, PollOutcome,
};

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

/// How long a simulated press holds the button closed
const PRESS_DURATION_MS: u32 = 30;

/// Gap between the two closures of a bouncy press
const BOUNCE_GAP_MS: u32 = 50;

/// Simulated DHCP exchange time
const LEASE_DELAY: Duration = Duration::from_millis(500);

/// Simulated round trip to the posting service
const POST_LATENCY: Duration = Duration::from_millis(150);

/// Status the simulated service answers with on `r`
const REJECT_STATUS: u16 = 503;

/// Full-scale value of the simulated 10-bit ADC
const ADC_MAX: f64 = 1023.0;

// ---------------------------------------------------------------------------
// Console commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Press the button; the delivery will end with this outcome
    Press(DeliveryOutcome),
    BouncyPress,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "p" | "" => Some(Self::Press(DeliveryOutcome::Sent)),
            "r" => Some(Self::Press(DeliveryOutcome::Rejected(REJECT_STATUS))),
            "c" => Some(Self::Press(DeliveryOutcome::ConnectionFailed)),
            "b" => Some(Self::BouncyPress),
            "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Forward stdin lines as commands until EOF or `q`
fn read_commands(tx: Sender<Command>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match Command::parse(&line) {
            Some(command) => {
                if tx.send(command).is_err() || command == Command::Quit {
                    return;
                }
            }
            None => eprintln!("unknown command {:?} (p, r, c, b, q)", line.trim()),
        }
    }
    let _ = tx.send(Command::Quit);
}

// ---------------------------------------------------------------------------
// Simulated hardware
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct StdClock {
    start: Instant,
}

impl Clock for StdClock {
    fn now_ms(&self) -> u32 {
        // Truncation gives the same wrapping counter as the firmware
        self.start.elapsed().as_millis() as u32
    }
}

struct StdDelay;

impl DelayNs for StdDelay {
    async fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    async fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// State shared between the simulated button and the simulated service
#[derive(Default)]
struct Console {
    /// Button-closed windows `[start, end)` in clock milliseconds
    presses: RefCell<Vec<(u32, u32)>>,
    /// Outcome the next delivery reports
    next_outcome: Cell<Option<DeliveryOutcome>>,
    quit: Cell<bool>,
}

struct SimButton {
    console: Rc<Console>,
    commands: Receiver<Command>,
    clock: StdClock,
}

impl SimButton {
    fn drain_commands(&mut self) {
        let now = self.clock.now_ms();
        loop {
            let command = match self.commands.try_recv() {
                Ok(command) => command,
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => Command::Quit,
            };

            let mut presses = self.console.presses.borrow_mut();
            match command {
                Command::Press(outcome) => {
                    presses.push((now, now + PRESS_DURATION_MS));
                    self.console.next_outcome.set(Some(outcome));
                }
                Command::BouncyPress => {
                    presses.push((now, now + PRESS_DURATION_MS));
                    let second = now + BOUNCE_GAP_MS;
                    presses.push((second, second + PRESS_DURATION_MS));
                    self.console.next_outcome.set(Some(DeliveryOutcome::Sent));
                }
                Command::Quit => {
                    self.console.quit.set(true);
                    return;
                }
            }
        }
    }
}

impl ErrorType for SimButton {
    type Error = Infallible;
}

impl InputPin for SimButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.drain_commands();

        let now = self.clock.now_ms();
        let mut presses = self.console.presses.borrow_mut();
        presses.retain(|&(_, end)| end > now);
        Ok(presses.iter().any(|&(start, end)| (start..end).contains(&now)))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Generates slowly varying readings with a little noise.
struct SimSensor {
    clock: StdClock,
    noise: u32,
}

impl AnalogInput for SimSensor {
    async fn read(&mut self) -> i32 {
        let t = f64::from(self.clock.now_ms()) / 1000.0;

        // xorshift noise, +-8 counts
        self.noise ^= self.noise << 13;
        self.noise ^= self.noise >> 17;
        self.noise ^= self.noise << 5;
        let jitter = f64::from(self.noise % 17) - 8.0;

        let level = 512.0 + 300.0 * (t / 20.0).sin() + jitter;
        level.clamp(0.0, ADC_MAX) as i32
    }
}

struct SimLed {
    name: &'static str,
}

impl ErrorType for SimLed {
    type Error = Infallible;
}

impl OutputPin for SimLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        info!(target: "led", "{:<7} ○", self.name);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        info!(target: "led", "{:<7} ●", self.name);
        Ok(())
    }
}

struct SimNetwork {
    hardware_address: MacAddress,
}

impl NetworkStack for SimNetwork {
    fn hardware_address(&self) -> MacAddress {
        self.hardware_address
    }

    async fn acquire_lease(&mut self, _hardware_address: MacAddress) -> Lease {
        thread::sleep(LEASE_DELAY);
        Lease::new(
            Ipv4Addr::new(192, 168, 1, 77),
            Ipv4Addr::new(192, 168, 1, 1),
            Ipv4Addr::new(192, 168, 1, 1),
        )
    }

    async fn maintain_lease(&mut self) -> LeaseMaintenance {
        LeaseMaintenance::Unchanged
    }
}

struct SimService {
    console: Rc<Console>,
}

impl DeliveryClient for SimService {
    async fn post(&mut self, message: &str) -> DeliveryOutcome {
        info!("POST status={:?}", message);
        thread::sleep(POST_LATENCY);
        self.console
            .next_outcome
            .take()
            .unwrap_or(DeliveryOutcome::Sent)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting notifier simulator");
    info!("Commands: p=press  r=press (rejected)  c=press (unreachable)  b=bouncy press (one message)  q=quit");

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || read_commands(tx));

    let clock = StdClock {
        start: Instant::now(),
    };
    let console = Rc::new(Console::default());

    let board = Peripherals {
        button: SimButton {
            console: Rc::clone(&console),
            commands: rx,
            clock,
        },
        sensor: SimSensor {
            clock,
            noise: 0x2545_F491,
        },
        success_indicator: SimLed { name: "success" },
        busy_indicator: SimLed { name: "busy" },
        delay: StdDelay,
        clock,
    };

    let config = NotifierConfig::DEFAULT;
    let notifier = Notifier::new(
        config,
        board,
        SimNetwork {
            hardware_address: DEFAULT_HARDWARE_ADDRESS,
        },
        SimService {
            console: Rc::clone(&console),
        },
        LogSink,
    );
    let mut notifier = match notifier {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    block_on(async {
        notifier.start().await;
        info!("Ready, waiting for button presses");

        let mut idle = StdDelay;
        while !console.quit.get() {
            match notifier.poll().await {
                PollOutcome::Idle => {}
                PollOutcome::Debounced => info!("Press suppressed by debounce"),
                PollOutcome::Delivered(outcome) => info!("Cycle finished: {}", outcome),
            }
            idle.delay_ms(config.poll_interval_ms).await;
        }
    });

    info!("Simulator exiting");
}
