use encoding_rs::{Encoding, UTF_8};
use log::warn;
use std::borrow::Cow;
use std::fmt::Write;

use crate::error::*;

pub const DEFAULT_CHARSET: &'static str = "UTF-8";

/// Converts raw input bytes in the configured character encoding into UTF-8 text.
#[derive(Clone, Copy, Debug)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl Charset {
    pub fn new(label: &str) -> Result<Self> {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => Ok(Self { encoding }),
            None => Err(Error::new(ErrorId::Config, format!("unsupported charset `{}`", label))),
        }
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn convert<'a>(&self, data: &'a [u8]) -> Cow<'a, str> {
        if self.encoding != UTF_8 {
            return self.encoding.decode_without_bom_handling(data).0;
        }
        match std::str::from_utf8(data) {
            Ok(s) => Cow::Borrowed(s),
            Err(_) => {
                let escaped = escape_invalid(data);
                warn!("Received an event that has a different character encoding than you configured \
                    (expected charset: {}): {}", self.name(), escaped);
                Cow::Owned(escaped)
            }
        }
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self { encoding: UTF_8 }
    }
}

/// Keeps valid UTF-8 sequences and writes everything else as `\xNN` escapes.
fn escape_invalid(data: &[u8]) -> String {
    let mut r = String::with_capacity(data.len());
    for chunk in data.utf8_chunks() {
        r.push_str(chunk.valid());
        for b in chunk.invalid() {
            let _ = write!(r, "\\x{:02X}", b);
        }
    }
    r
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn utf8_passthrough() {
        let c = Charset::new("UTF-8").unwrap();
        assert_eq!(c.name(), "UTF-8");
        let r = c.convert("héllo".as_bytes());
        assert!(matches!(r, Cow::Borrowed("héllo")));
    }

    #[test]
    fn utf8_invalid_bytes_escaped() {
        let c = Charset::default();
        assert_eq!(c.convert(b"ab\xffc\xc3"), "ab\\xFFc\\xC3");
    }

    #[test]
    fn cp1252() {
        let c = Charset::new("CP1252").unwrap();
        assert_eq!(c.name(), "windows-1252");
        assert_eq!(c.convert(b"caf\xe9 \x80"), "café €");
    }

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(Charset::new("utf8").unwrap().name(), "UTF-8");
        assert_eq!(Charset::new("iso-8859-1").unwrap().name(), "windows-1252");
    }

    #[test]
    fn unsupported() {
        let e = Charset::new("klingon").unwrap_err();
        assert_eq!(*e.id(), ErrorId::Config);
    }
}
