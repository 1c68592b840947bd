//! Minimal HTTP/1.0 form-post codec
//!
//! The posting service takes `token` and `status` form fields and answers with
//! a plain status line. Only the request text and the status code are handled
//! here; sockets belong to the delivery adapter.

use core::fmt::{self, Write};

use thiserror_no_std::Error;

/// Capacity of a composed request (headers plus a fully escaped message)
pub const REQUEST_CAPACITY: usize = 1536;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    #[error("request does not fit in the request buffer")]
    RequestTooLarge,
    #[error("malformed status line")]
    MalformedStatusLine,
}

/// Where and how messages are posted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
    pub token: &'a str,
}

/// Form-urlencoding writer (`application/x-www-form-urlencoded`)
pub struct FormEncoded<'a>(pub &'a str);

impl FormEncoded<'_> {
    /// Length of the encoded text
    pub fn len(&self) -> usize {
        self.0
            .bytes()
            .map(|b| match b {
                b if is_unreserved(b) || b == b' ' => 1,
                _ => 3,
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FormEncoded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";

        for b in self.0.bytes() {
            if is_unreserved(b) {
                f.write_char(b as char)?;
            } else if b == b' ' {
                f.write_char('+')?;
            } else {
                f.write_char('%')?;
                f.write_char(HEX[usize::from(b >> 4)] as char)?;
                f.write_char(HEX[usize::from(b & 0x0F)] as char)?;
            }
        }
        Ok(())
    }
}

const fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~')
}

/// Build the full request posting `message` to `endpoint`.
pub fn compose_post(
    endpoint: &Endpoint<'_>,
    message: &str,
) -> Result<heapless::String<REQUEST_CAPACITY>, HttpError> {
    let token = FormEncoded(endpoint.token);
    let status = FormEncoded(message);
    let content_length = "token=".len() + token.len() + "&status=".len() + status.len();

    let mut request = heapless::String::new();
    write!(
        request,
        "POST {path} HTTP/1.0\r\n\
         Host: {host}\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: {content_length}\r\n\
         Connection: close\r\n\
         \r\n\
         token={token}&status={status}",
        path = endpoint.path,
        host = endpoint.host,
    )
    .map_err(|_| HttpError::RequestTooLarge)?;

    Ok(request)
}

/// Extract the status code from the first line of a response.
///
/// Accepts `HTTP/1.0 200 OK`, `HTTP/1.1 503 Service Unavailable` and the
/// like; anything after the code is ignored.
pub fn parse_status_line(response: &[u8]) -> Result<u16, HttpError> {
    let line_end = response
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(response.len());
    let line = core::str::from_utf8(&response[..line_end])
        .map_err(|_| HttpError::MalformedStatusLine)?
        .trim_end_matches('\r');

    let mut parts = line.split(' ').filter(|part| !part.is_empty());
    let version = parts.next().ok_or(HttpError::MalformedStatusLine)?;
    if !version.starts_with("HTTP/") {
        return Err(HttpError::MalformedStatusLine);
    }

    let code = parts.next().ok_or(HttpError::MalformedStatusLine)?;
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HttpError::MalformedStatusLine);
    }
    code.parse().map_err(|_| HttpError::MalformedStatusLine)
}

/// True once `response` holds a complete status line
pub fn has_status_line(response: &[u8]) -> bool {
    response.contains(&b'\n')
}
