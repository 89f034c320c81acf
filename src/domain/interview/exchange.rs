//! Server replies to uploads and result requests

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Opaque session identifier assigned by the server
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Servers send either a string or a bare integer
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Signed(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// Reply to an audio upload.
///
/// Every field is optional on the wire; `null` and missing are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExchangeReply {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    button_text: Option<String>,
    #[serde(default)]
    session_id: Option<SessionId>,
    #[serde(default)]
    is_last: Option<bool>,
}

impl ExchangeReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }

    pub fn with_button_text(mut self, label: impl Into<String>) -> Self {
        self.button_text = Some(label.into());
        self
    }

    pub fn with_session_id(mut self, id: SessionId) -> Self {
        self.session_id = Some(id);
        self
    }

    pub fn with_last(mut self, is_last: bool) -> Self {
        self.is_last = Some(is_last);
        self
    }

    /// Prompt text; empty when the server sent none
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Next prompt audio, skipping blank values
    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn button_text(&self) -> Option<&str> {
        self.button_text
            .as_deref()
            .filter(|label| !label.trim().is_empty())
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn is_last(&self) -> bool {
        self.is_last.unwrap_or(false)
    }
}

/// Reply to the result request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultReply {
    #[serde(default)]
    redirect_url: Option<String>,
}

impl ResultReply {
    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_reply() {
        let reply: ExchangeReply = serde_json::from_str(
            r#"{"text":"Next question","audio_url":"/media/q2.mp3","button_text":"Answer","session_id":"abc","is_last":false}"#,
        )
        .unwrap();
        assert_eq!(reply.text(), "Next question");
        assert_eq!(reply.audio_url(), Some("/media/q2.mp3"));
        assert_eq!(reply.button_text(), Some("Answer"));
        assert_eq!(reply.session_id(), Some(&SessionId::new("abc")));
        assert!(!reply.is_last());
    }

    #[test]
    fn missing_and_null_fields_default() {
        let reply: ExchangeReply =
            serde_json::from_str(r#"{"text":null,"is_last":null}"#).unwrap();
        assert_eq!(reply.text(), "");
        assert_eq!(reply.audio_url(), None);
        assert_eq!(reply.session_id(), None);
        assert!(!reply.is_last());

        let empty: ExchangeReply = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ExchangeReply::default());
    }

    #[test]
    fn numeric_session_id() {
        let reply: ExchangeReply = serde_json::from_str(r#"{"session_id":42}"#).unwrap();
        assert_eq!(reply.session_id().map(SessionId::as_str), Some("42"));
    }

    #[test]
    fn blank_audio_url_is_none() {
        let reply = ExchangeReply::new("hi").with_audio_url("  ");
        assert_eq!(reply.audio_url(), None);
    }

    #[test]
    fn unknown_fields_ignored() {
        let reply: ExchangeReply =
            serde_json::from_str(r#"{"text":"t","extra":[1,2]}"#).unwrap();
        assert_eq!(reply.text(), "t");
    }

    #[test]
    fn result_reply() {
        let reply: ResultReply =
            serde_json::from_str(r#"{"redirect_url":"/done/"}"#).unwrap();
        assert_eq!(reply.redirect_url(), Some("/done/"));

        let none: ResultReply = serde_json::from_str("{}").unwrap();
        assert_eq!(none.redirect_url(), None);
    }
}
