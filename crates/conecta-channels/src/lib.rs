//! Outbound side of the relay: one thin HTTP client per messaging channel,
//! plus the [`Responder`] seam a host plugs its own processing into.

pub mod echo;
pub mod messenger;
pub mod telegram;
pub mod traits;
pub mod whatsapp;

pub use echo::EchoResponder;
pub use messenger::MessengerSender;
pub use telegram::TelegramSender;
pub use traits::{ChannelSender, Responder};
pub use whatsapp::WhatsAppSender;

use anyhow::{bail, Result};
use conecta_types::{ChannelCredentials, ChannelKind};

/// Build the sender matching a stored channel connection.
///
/// Instagram DMs go through the same Graph API send surface as Messenger,
/// so both map to [`MessengerSender`].
pub fn sender_for(channel: ChannelKind, credentials: &ChannelCredentials) -> Result<Box<dyn ChannelSender>> {
    match channel {
        ChannelKind::Whatsapp => {
            let Some(phone_number_id) = credentials.account_id.as_deref() else {
                bail!("whatsapp connection is missing its phone number id");
            };
            Ok(Box::new(WhatsAppSender::new(
                &credentials.access_token,
                phone_number_id,
            )?))
        }
        ChannelKind::Messenger | ChannelKind::Instagram => Ok(Box::new(MessengerSender::new(
            channel,
            &credentials.access_token,
        )?)),
        ChannelKind::Telegram => Ok(Box::new(TelegramSender::new(&credentials.access_token)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_requires_phone_number_id() {
        let credentials = ChannelCredentials::new("token");
        assert!(sender_for(ChannelKind::Whatsapp, &credentials).is_err());

        let credentials = credentials.with_account_id("15551234567");
        assert!(sender_for(ChannelKind::Whatsapp, &credentials).is_ok());
    }

    #[test]
    fn test_instagram_maps_to_messenger_sender() {
        let credentials = ChannelCredentials::new("token");
        let sender = sender_for(ChannelKind::Instagram, &credentials).unwrap();
        assert_eq!(sender.channel(), ChannelKind::Instagram);
    }

    #[test]
    fn test_telegram_needs_only_the_bot_token() {
        let credentials = ChannelCredentials::new("123456:bot-token");
        let sender = sender_for(ChannelKind::Telegram, &credentials).unwrap();
        assert_eq!(sender.channel(), ChannelKind::Telegram);
    }
}
