//! HTTP delivery client over embassy-net
//!
//! Resolves the endpoint host, opens a TCP connection, writes one form post
//! and reads back just enough of the response to get the status code.

use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::Duration;
use log::{debug, warn};
use notifier_core::http::{self, Endpoint};
use notifier_core::{DeliveryClient, DeliveryOutcome};

/// Socket timeout; covers connect, write and the wait for the status line
const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);

const RX_BUFFER_SIZE: usize = 512;
const TX_BUFFER_SIZE: usize = http::REQUEST_CAPACITY;

/// Why a post never produced a status code
#[derive(Debug)]
enum PostFailure {
    Dns(embassy_net::dns::Error),
    NoAddress,
    Connect(embassy_net::tcp::ConnectError),
    Io(embassy_net::tcp::Error),
    ClosedEarly,
    Http(http::HttpError),
}

pub struct HttpDelivery {
    stack: Stack<'static>,
    endpoint: Endpoint<'static>,
    rx_buffer: [u8; RX_BUFFER_SIZE],
    tx_buffer: [u8; TX_BUFFER_SIZE],
}

impl HttpDelivery {
    pub fn new(stack: Stack<'static>, endpoint: Endpoint<'static>) -> Self {
        Self {
            stack,
            endpoint,
            rx_buffer: [0; RX_BUFFER_SIZE],
            tx_buffer: [0; TX_BUFFER_SIZE],
        }
    }

    async fn try_post(&mut self, message: &str) -> Result<u16, PostFailure> {
        let request = http::compose_post(&self.endpoint, message).map_err(PostFailure::Http)?;

        let addresses = self
            .stack
            .dns_query(self.endpoint.host, DnsQueryType::A)
            .await
            .map_err(PostFailure::Dns)?;
        let address = *addresses.first().ok_or(PostFailure::NoAddress)?;
        debug!("{} resolved to {}", self.endpoint.host, address);

        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buffer, &mut self.tx_buffer);
        socket.set_timeout(Some(SOCKET_TIMEOUT));
        socket
            .connect((address, self.endpoint.port))
            .await
            .map_err(PostFailure::Connect)?;

        let result = exchange(&mut socket, request.as_bytes()).await;
        socket.close();
        result
    }
}

/// Send `request` and read until the status line is complete
async fn exchange(socket: &mut TcpSocket<'_>, request: &[u8]) -> Result<u16, PostFailure> {
    let mut sent = 0;
    while sent < request.len() {
        match socket.write(&request[sent..]).await.map_err(PostFailure::Io)? {
            0 => return Err(PostFailure::ClosedEarly),
            n => sent += n,
        }
    }
    socket.flush().await.map_err(PostFailure::Io)?;

    let mut response = [0u8; 128];
    let mut received = 0;
    while !http::has_status_line(&response[..received]) && received < response.len() {
        match socket.read(&mut response[received..]).await.map_err(PostFailure::Io)? {
            0 => break,
            n => received += n,
        }
    }

    if received == 0 {
        return Err(PostFailure::ClosedEarly);
    }
    http::parse_status_line(&response[..received]).map_err(PostFailure::Http)
}

impl DeliveryClient for HttpDelivery {
    async fn post(&mut self, message: &str) -> DeliveryOutcome {
        match self.try_post(message).await {
            Ok(status) => {
                debug!("{} answered {}", self.endpoint.host, status);
                DeliveryOutcome::from_status(status)
            }
            Err(failure) => {
                warn!("Post to {} failed: {:?}", self.endpoint.host, failure);
                DeliveryOutcome::ConnectionFailed
            }
        }
    }
}
