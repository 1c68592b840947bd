//! Message formatting
//!
//! A template carries exactly one `%d` placeholder which receives the averaged
//! sensor value in base-10. Messages are rendered into a fixed-capacity stack
//! buffer; templates are validated up front so that rendering can never run out
//! of room, whatever the value.

use core::fmt::{self, Write};

use thiserror_no_std::Error;

/// Size of the message buffer including the terminating NUL
pub const MESSAGE_CAPACITY: usize = 256;

/// Longest text a message can hold (the last unit is reserved for the NUL)
pub const MAX_MESSAGE_LEN: usize = MESSAGE_CAPACITY - 1;

/// Placeholder replaced by the value
pub const PLACEHOLDER: &str = "%d";

/// Width of the longest `i32` rendering, `-2147483648`
pub const MAX_VALUE_WIDTH: usize = 11;

/// Longest template text allowed around the placeholder
pub const MAX_TEMPLATE_TEXT: usize = MAX_MESSAGE_LEN - MAX_VALUE_WIDTH;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template has no %d placeholder")]
    MissingPlaceholder,
    #[error("template has more than one %d placeholder")]
    MultiplePlaceholders,
    #[error("template text is {len} bytes, at most {max} fit")]
    TooLong { len: usize, max: usize },
}

/// A validated message template, split around its placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTemplate<'a> {
    prefix: &'a str,
    suffix: &'a str,
}

impl<'a> MessageTemplate<'a> {
    pub fn parse(template: &'a str) -> Result<Self, TemplateError> {
        let (prefix, suffix) = template
            .split_once(PLACEHOLDER)
            .ok_or(TemplateError::MissingPlaceholder)?;

        if suffix.contains(PLACEHOLDER) {
            return Err(TemplateError::MultiplePlaceholders);
        }

        let len = prefix.len() + suffix.len();
        if len > MAX_TEMPLATE_TEXT {
            return Err(TemplateError::TooLong {
                len,
                max: MAX_TEMPLATE_TEXT,
            });
        }

        Ok(Self { prefix, suffix })
    }

    /// Render `value` into a new message.
    pub fn render(&self, value: i32) -> Message {
        let mut text = heapless::String::new();
        // Cannot fail: parse() reserved MAX_VALUE_WIDTH bytes for the value
        let written = write!(text, "{}{}{}", self.prefix, value, self.suffix);
        debug_assert!(written.is_ok(), "validated template overflowed");
        Message { text }
    }
}

/// Rendered message text, always shorter than [`MESSAGE_CAPACITY`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: heapless::String<MAX_MESSAGE_LEN>,
}

impl Message {
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The message as a NUL-terminated byte buffer, for C-style consumers.
    pub fn to_bytes_with_nul(&self) -> heapless::Vec<u8, MESSAGE_CAPACITY> {
        let mut bytes = heapless::Vec::new();
        // Text is at most MAX_MESSAGE_LEN bytes, the NUL takes the last slot
        let text = bytes.extend_from_slice(self.text.as_bytes());
        let nul = bytes.push(0);
        debug_assert!(text.is_ok() && nul.is_ok(), "message exceeds its buffer");
        bytes
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render `value` through `template` in one step.
pub fn format(value: i32, template: &str) -> Result<Message, TemplateError> {
    MessageTemplate::parse(template).map(|template| template.render(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::format;
    use std::string::String;

    #[test]
    fn test_render_positive() {
        let message = format(100, "Sensor Value: %d").unwrap();
        assert_eq!(message.as_str(), "Sensor Value: 100");
    }

    #[test]
    fn test_render_negative_and_extremes() {
        let template = MessageTemplate::parse("v=%d;").unwrap();
        assert_eq!(template.render(-42).as_str(), "v=-42;");
        assert_eq!(template.render(0).as_str(), "v=0;");
        assert_eq!(template.render(i32::MIN).as_str(), "v=-2147483648;");
        assert_eq!(template.render(i32::MAX).as_str(), "v=2147483647;");
    }

    #[test]
    fn test_placeholder_at_edges() {
        assert_eq!(format(7, "%d").unwrap().as_str(), "7");
        assert_eq!(format(7, "%d units").unwrap().as_str(), "7 units");
        assert_eq!(format(7, "reading %d").unwrap().as_str(), "reading 7");
    }

    #[test]
    fn test_other_percent_signs_are_literal() {
        assert_eq!(format(55, "humidity %d %").unwrap().as_str(), "humidity 55 %");
    }

    #[test]
    fn test_template_errors() {
        assert_eq!(
            MessageTemplate::parse("no placeholder"),
            Err(TemplateError::MissingPlaceholder)
        );
        assert_eq!(
            MessageTemplate::parse("%d and %d"),
            Err(TemplateError::MultiplePlaceholders)
        );

        let long: String = "a".repeat(MAX_TEMPLATE_TEXT + 1) + "%d";
        assert_eq!(
            MessageTemplate::parse(&long),
            Err(TemplateError::TooLong {
                len: MAX_TEMPLATE_TEXT + 1,
                max: MAX_TEMPLATE_TEXT
            })
        );
    }

    #[test]
    fn test_longest_template_fits_every_value() {
        let text = "b".repeat(MAX_TEMPLATE_TEXT);
        let template_src = format!("{}%d", text);
        let template = MessageTemplate::parse(&template_src).unwrap();

        for value in [i32::MIN, -1, 0, 1, i32::MAX] {
            let message = template.render(value);
            let expected = format!("{text}{value}");
            assert_eq!(message.as_str(), expected);
            assert!(message.len() < MESSAGE_CAPACITY);
        }
    }

    #[test]
    fn test_nul_terminated_bytes() {
        let message = format(-3, "t%d").unwrap();
        let bytes = message.to_bytes_with_nul();
        assert_eq!(bytes.as_slice(), b"t-3\0");
        assert!(bytes.len() <= MESSAGE_CAPACITY);
    }
    #[test]
    fn test_longest_message_keeps_nul() {
        let text = "x".repeat(MAX_TEMPLATE_TEXT);
        let template = format!("{text}%d");
        let message = format(i32::MIN, &template).unwrap();
        assert_eq!(message.len(), MAX_MESSAGE_LEN);

        let bytes = message.to_bytes_with_nul();
        assert_eq!(bytes.len(), MESSAGE_CAPACITY, "buffer must be exactly full");
        assert_eq!(bytes.last(), Some(&0));
    }
}
