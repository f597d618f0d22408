use crate::domain::channel::{Channel, MessageBody};
use crate::domain::payment::{DisbursementReceipt, PaymentStatus, PurseId};
use crate::domain::ports::{CustomerStore, Messenger, PaymentGateway, ReminderScheduler};
use crate::domain::profile::{Amount, CustomerId, CustomerProfile, ProfileField};
use crate::domain::reminder::ReminderRequest;
use crate::domain::session::SessionData;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A message the provider was asked to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: Channel,
    pub customer: CustomerId,
    pub body: MessageBody,
}

/// A disbursement the gateway was asked to make.
#[derive(Debug, Clone, PartialEq)]
pub struct DisbursementRecord {
    pub purse: PurseId,
    pub channel: Channel,
    pub customer: CustomerId,
    pub amount: Amount,
    pub currency: String,
}

#[derive(Default)]
struct ProviderState {
    profiles: HashMap<CustomerId, CustomerProfile>,
    sessions: HashMap<CustomerId, SessionData>,
    reminders: HashMap<CustomerId, HashMap<String, ReminderRequest>>,
    outbox: Vec<SentMessage>,
    disbursements: Vec<DisbursementRecord>,
    next_receipt: Option<DisbursementReceipt>,
}

/// An in-memory stand-in for the whole provider connection.
///
/// Implements every port over `Arc<RwLock<..>>` state, so `Clone` hands out
/// shared views of one simulated provider. Outbound traffic is recorded
/// rather than delivered: the outbox, disbursement log and reminder table
/// are inspectable, which is what the tests and the CLI transcript build on.
#[derive(Default, Clone)]
pub struct InMemoryProvider {
    state: Arc<RwLock<ProviderState>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the receipt returned by the next `initiate_payment` call.
    /// Consumed once; subsequent calls report `queued` again.
    pub async fn set_next_disbursement_status(&self, status: PaymentStatus, description: &str) {
        let mut state = self.state.write().await;
        state.next_receipt = Some(DisbursementReceipt {
            status,
            description: description.to_string(),
        });
    }

    /// Removes and returns everything sent since the last drain.
    pub async fn drain_outbox(&self) -> Vec<SentMessage> {
        let mut state = self.state.write().await;
        std::mem::take(&mut state.outbox)
    }

    pub async fn disbursements(&self) -> Vec<DisbursementRecord> {
        let state = self.state.read().await;
        state.disbursements.clone()
    }

    pub async fn reminder(&self, customer: &CustomerId, key: &str) -> Option<ReminderRequest> {
        let state = self.state.read().await;
        state
            .reminders
            .get(customer)
            .and_then(|entries| entries.get(key))
            .cloned()
    }
}

#[async_trait]
impl CustomerStore for InMemoryProvider {
    async fn get_profile(&self, customer: &CustomerId) -> Result<CustomerProfile> {
        let state = self.state.read().await;
        Ok(state.profiles.get(customer).cloned().unwrap_or_default())
    }

    async fn set_profile(&self, customer: &CustomerId, profile: CustomerProfile) -> Result<()> {
        let mut state = self.state.write().await;
        state.profiles.insert(customer.clone(), profile);
        Ok(())
    }

    async fn delete_fields(&self, customer: &CustomerId, fields: &[ProfileField]) -> Result<()> {
        let mut state = self.state.write().await;
        let mut now_empty = false;
        if let Some(profile) = state.profiles.get_mut(customer) {
            for field in fields {
                profile.clear_field(*field);
            }
            now_empty = profile.is_empty();
        }
        if now_empty {
            state.profiles.remove(customer);
        }
        Ok(())
    }

    async fn load_session(&self, customer: &CustomerId) -> Result<Option<SessionData>> {
        let state = self.state.read().await;
        Ok(state.sessions.get(customer).copied())
    }

    async fn save_session(&self, customer: &CustomerId, session: SessionData) -> Result<()> {
        let mut state = self.state.write().await;
        state.sessions.insert(customer.clone(), session);
        Ok(())
    }

    async fn clear_session(&self, customer: &CustomerId) -> Result<()> {
        let mut state = self.state.write().await;
        state.sessions.remove(customer);
        Ok(())
    }
}

#[async_trait]
impl Messenger for InMemoryProvider {
    async fn send_message(
        &self,
        channel: &Channel,
        customer: &CustomerId,
        body: MessageBody,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.outbox.push(SentMessage {
            channel: channel.clone(),
            customer: customer.clone(),
            body,
        });
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for InMemoryProvider {
    async fn initiate_payment(
        &self,
        purse: &PurseId,
        channel: &Channel,
        customer: &CustomerId,
        amount: Amount,
        currency: &str,
    ) -> Result<DisbursementReceipt> {
        let mut state = self.state.write().await;
        state.disbursements.push(DisbursementRecord {
            purse: purse.clone(),
            channel: channel.clone(),
            customer: customer.clone(),
            amount,
            currency: currency.to_string(),
        });
        Ok(state.next_receipt.take().unwrap_or(DisbursementReceipt {
            status: PaymentStatus::Queued,
            description: "disbursement queued".to_string(),
        }))
    }
}

#[async_trait]
impl ReminderScheduler for InMemoryProvider {
    async fn schedule(&self, customer: &CustomerId, request: ReminderRequest) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .reminders
            .entry(customer.clone())
            .or_default()
            .insert(request.key.clone(), request);
        Ok(())
    }

    async fn cancel(&self, customer: &CustomerId, key: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(entries) = state.reminders.get_mut(customer) {
            entries.remove(key);
        }
        Ok(())
    }
}
