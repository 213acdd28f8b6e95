// src/trust/key_info.rs

//! Key information service client
//!
//! The service answers `GET <server>/key/<FINGERPRINT>` with
//!
//! ```xml
//! <key-lookup>
//!   <item vote="good">Thomas Leonard created Zero Install and ROX.</item>
//!   <item vote="bad">Key has been revoked.</item>
//! </key-lookup>
//! ```

use crate::error::{Error, Result};
use crate::http::Downloader;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::{debug, warn};

/// One line of advice about a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHint {
    pub vote: Option<String>,
    pub text: String,
}

impl KeyHint {
    pub fn is_good(&self) -> bool {
        self.vote.as_deref() == Some("good")
    }
}

/// Parse a `<key-lookup>` reply
pub fn parse_key_lookup(xml: &str) -> Result<Vec<KeyHint>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut hints = Vec::new();
    let mut current: Option<KeyHint> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"item" => {
                let vote = e
                    .try_get_attribute("vote")
                    .map_err(|e| Error::ParseError(format!("Invalid key lookup reply: {}", e)))?
                    .map(|attr| attr.unescape_value().map(|v| v.into_owned()))
                    .transpose()
                    .map_err(|e| Error::ParseError(format!("Invalid key lookup reply: {}", e)))?;
                current = Some(KeyHint {
                    vote,
                    text: String::new(),
                });
            }
            Ok(Event::Text(text)) => {
                if let Some(ref mut hint) = current {
                    let text = text
                        .unescape()
                        .map_err(|e| Error::ParseError(format!("Invalid key lookup reply: {}", e)))?;
                    hint.text.push_str(&text);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"item" => {
                if let Some(hint) = current.take() {
                    hints.push(hint);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::ParseError(format!(
                    "Invalid key lookup reply at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
    }
    Ok(hints)
}

/// Queries the key information service
pub struct KeyInfoClient<'a> {
    server: Option<String>,
    downloader: &'a dyn Downloader,
}

impl<'a> KeyInfoClient<'a> {
    /// A client for `server`; `None` disables lookups
    pub fn new(server: Option<&str>, downloader: &'a dyn Downloader) -> Self {
        Self {
            server: server.map(|s| s.trim_end_matches('/').to_string()),
            downloader,
        }
    }

    /// Hints about a key; empty when the service is disabled or fails
    pub fn lookup(&self, fingerprint: &str) -> Vec<KeyHint> {
        let Some(ref server) = self.server else {
            return Vec::new();
        };
        let url = format!("{}/key/{}", server, fingerprint);
        debug!("Looking up key information at {}", url);

        let result = self.downloader.download(&url).and_then(|body| {
            let xml = String::from_utf8(body)
                .map_err(|e| Error::ParseError(format!("Key lookup reply is not UTF-8: {}", e)))?;
            parse_key_lookup(&xml)
        });
        match result {
            Ok(hints) => hints,
            Err(e) => {
                warn!("Unable to get key information for {}: {}", fingerprint, e);
                Vec::new()
            }
        }
    }
}

/// Whether any hint votes in favour of the key
pub fn has_good_vote(hints: &[KeyHint]) -> bool {
    hints.iter().any(KeyHint::is_good)
}
