use crate::config::WorkflowConfig;
use crate::domain::channel::MessageBody;
use crate::domain::ports::{CustomerStoreRef, MessengerRef};
use crate::domain::profile::CustomerId;
use crate::domain::reminder::ReminderTier;
use crate::error::Result;
use tracing::{error, info};

/// Repayment reminder escalation.
///
/// Each scheduled fire sends one nudge whose tone and channel depend on the
/// customer's strike level, then advances the strike counter. Failures are
/// swallowed here: a misfire must never take the scheduler down or cancel
/// the next fire.
pub struct ReminderService {
    store: CustomerStoreRef,
    messenger: MessengerRef,
    config: WorkflowConfig,
}

impl ReminderService {
    pub fn new(store: CustomerStoreRef, messenger: MessengerRef, config: WorkflowConfig) -> Self {
        Self {
            store,
            messenger,
            config,
        }
    }

    pub async fn on_reminder_fire(&self, customer: &CustomerId) {
        if let Err(error) = self.escalate(customer).await {
            error!(customer = %customer, %error, "reminder handling failed");
        }
    }

    async fn escalate(&self, customer: &CustomerId) -> Result<()> {
        let mut profile = self.store.get_profile(customer).await?;
        info!(customer = %customer, "processing reminder");

        let strike = profile.strike_level();
        let name = profile
            .name
            .clone()
            .unwrap_or_else(|| customer.to_string());
        let balance = profile.outstanding_balance();

        let (channel, body) = match ReminderTier::for_strike(strike) {
            ReminderTier::Friendly => (
                &self.config.sms,
                MessageBody::Text(format!(
                    "Hello {name}, this is a friendly reminder to pay back my KES {balance}"
                )),
            ),
            ReminderTier::Firm => (
                &self.config.sms,
                MessageBody::Text(format!(
                    "Hey {name}, you still need to pay back my KES {balance}"
                )),
            ),
            ReminderTier::Urgent => (
                &self.config.voice,
                MessageBody::Voice(format!(
                    "Yo {name}!!! You need to pay back my KES {balance}"
                )),
            ),
        };
        self.messenger.send_message(channel, customer, body).await?;

        // Counter keeps growing past the last tier; the tier mapping
        // saturates, the count does not.
        profile.strike = Some(strike + 1);
        self.store.set_profile(customer, profile).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::channel::{Channel, ChannelKind};
    use crate::domain::payment::PurseId;
    use crate::domain::ports::{CustomerStore, Messenger};
    use crate::domain::profile::{Balance, CustomerProfile};
    use crate::error::EngineError;
    use crate::infrastructure::in_memory::InMemoryProvider;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn test_config() -> WorkflowConfig {
        WorkflowConfig {
            purse: PurseId::new("purse-test"),
            sms: Channel::sms("22123"),
            voice: Channel::voice("+254700000000"),
            disbursement: Channel::cellular("525900"),
            repayment_lead: chrono::Duration::seconds(60),
            reminder_interval: std::time::Duration::from_secs(60),
        }
    }

    async fn seed(provider: &InMemoryProvider, customer: &CustomerId) {
        provider
            .set_profile(
                customer,
                CustomerProfile {
                    name: Some("Wanjiru".to_string()),
                    balance: Some(Balance::new(dec!(500))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_three_fires_escalate_tone_and_channel() {
        let provider = InMemoryProvider::new();
        let service = ReminderService::new(
            Arc::new(provider.clone()),
            Arc::new(provider.clone()),
            test_config(),
        );
        let customer = CustomerId::new("+254711000010");
        seed(&provider, &customer).await;

        service.on_reminder_fire(&customer).await;
        service.on_reminder_fire(&customer).await;
        service.on_reminder_fire(&customer).await;

        let sent = provider.drain_outbox().await;
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].channel.kind, ChannelKind::Sms);
        assert!(sent[0].body.content().contains("friendly reminder"));
        assert_eq!(sent[1].channel.kind, ChannelKind::Sms);
        assert!(sent[1].body.content().contains("still need to pay back"));
        assert_eq!(sent[2].channel.kind, ChannelKind::Voice);
        assert!(sent[2].body.content().contains("Yo Wanjiru"));

        let profile = provider.get_profile(&customer).await.unwrap();
        assert_eq!(profile.strike, Some(4));
    }

    #[tokio::test]
    async fn test_fourth_fire_stays_on_voice() {
        let provider = InMemoryProvider::new();
        let service = ReminderService::new(
            Arc::new(provider.clone()),
            Arc::new(provider.clone()),
            test_config(),
        );
        let customer = CustomerId::new("+254711000011");
        seed(&provider, &customer).await;

        for _ in 0..4 {
            service.on_reminder_fire(&customer).await;
        }

        let sent = provider.drain_outbox().await;
        assert_eq!(sent[3].channel.kind, ChannelKind::Voice);
        let profile = provider.get_profile(&customer).await.unwrap();
        assert_eq!(profile.strike, Some(5));
    }

    /// A messenger that always fails, to prove a misfire is contained.
    struct BrokenMessenger;

    #[async_trait]
    impl Messenger for BrokenMessenger {
        async fn send_message(
            &self,
            _channel: &Channel,
            _customer: &CustomerId,
            _body: MessageBody,
        ) -> crate::error::Result<()> {
            Err(EngineError::Storage("messenger offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_fire_is_swallowed_and_leaves_strike_unchanged() {
        let provider = InMemoryProvider::new();
        let service = ReminderService::new(
            Arc::new(provider.clone()),
            Arc::new(BrokenMessenger),
            test_config(),
        );
        let customer = CustomerId::new("+254711000012");
        seed(&provider, &customer).await;

        // Must not panic or propagate.
        service.on_reminder_fire(&customer).await;

        let profile = provider.get_profile(&customer).await.unwrap();
        assert_eq!(profile.strike, None, "failed fire does not advance the counter");
    }
}
