use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The messaging channels an organization can connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Whatsapp,
    Instagram,
    Telegram,
    Messenger,
}

impl ChannelKind {
    /// Stable identifier used in routes and stored documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Whatsapp => "whatsapp",
            ChannelKind::Instagram => "instagram",
            ChannelKind::Telegram => "telegram",
            ChannelKind::Messenger => "messenger",
        }
    }

    /// Channels that use the Meta webhook subscription handshake
    /// (hub.mode / hub.verify_token / hub.challenge).
    pub fn uses_meta_handshake(&self) -> bool {
        matches!(
            self,
            ChannelKind::Whatsapp | ChannelKind::Instagram | ChannelKind::Messenger
        )
    }
}

/// Credentials an organization supplies when connecting a channel.
///
/// `account_id` is the channel-scoped account the token acts for: the
/// WhatsApp phone number id, the Messenger/Instagram page id. Telegram
/// needs none; the bot token alone identifies the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCredentials {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl ChannelCredentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            account_id: None,
        }
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whatsapp" => Ok(ChannelKind::Whatsapp),
            "instagram" => Ok(ChannelKind::Instagram),
            "telegram" => Ok(ChannelKind::Telegram),
            "messenger" => Ok(ChannelKind::Messenger),
            other => Err(format!("unknown channel: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_str() {
        for kind in [
            ChannelKind::Whatsapp,
            ChannelKind::Instagram,
            ChannelKind::Telegram,
            ChannelKind::Messenger,
        ] {
            assert_eq!(kind.as_str().parse::<ChannelKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&ChannelKind::Whatsapp).unwrap();
        assert_eq!(json, "\"whatsapp\"");
        let parsed: ChannelKind = serde_json::from_str("\"telegram\"").unwrap();
        assert_eq!(parsed, ChannelKind::Telegram);
    }

    #[test]
    fn test_unknown_channel_rejected() {
        assert!("sms".parse::<ChannelKind>().is_err());
    }
}
