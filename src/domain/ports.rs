use super::channel::{Channel, MessageBody};
use super::payment::{DisbursementReceipt, PurseId};
use super::profile::{Amount, CustomerId, CustomerProfile, ProfileField};
use super::reminder::ReminderRequest;
use super::session::SessionData;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Per-customer state held by the provider: the metadata profile and the
/// transient USSD session pointer. Writes are full-snapshot overwrites;
/// partial-field updates only exist as explicit deletes.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Returns the stored profile, or an empty default when the customer has
    /// never been written.
    async fn get_profile(&self, customer: &CustomerId) -> Result<CustomerProfile>;
    async fn set_profile(&self, customer: &CustomerId, profile: CustomerProfile) -> Result<()>;
    async fn delete_fields(&self, customer: &CustomerId, fields: &[ProfileField]) -> Result<()>;

    async fn load_session(&self, customer: &CustomerId) -> Result<Option<SessionData>>;
    async fn save_session(&self, customer: &CustomerId, session: SessionData) -> Result<()>;
    async fn clear_session(&self, customer: &CustomerId) -> Result<()>;
}

/// Outbound message delivery. Delivery guarantees and retries live with the
/// provider, not here.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(
        &self,
        channel: &Channel,
        customer: &CustomerId,
        body: MessageBody,
    ) -> Result<()>;
}

/// Mobile-money disbursement from the merchant purse to a customer.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate_payment(
        &self,
        purse: &PurseId,
        channel: &Channel,
        customer: &CustomerId,
        amount: Amount,
        currency: &str,
    ) -> Result<DisbursementReceipt>;
}

/// Recurring reminder scheduling, keyed per customer.
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    async fn schedule(&self, customer: &CustomerId, request: ReminderRequest) -> Result<()>;
    async fn cancel(&self, customer: &CustomerId, key: &str) -> Result<()>;
}

pub type CustomerStoreRef = Arc<dyn CustomerStore>;
pub type MessengerRef = Arc<dyn Messenger>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type ReminderSchedulerRef = Arc<dyn ReminderScheduler>;
