use crate::application::loan::LoanWorkflow;
use crate::application::reminder::ReminderService;
use crate::application::session::{UssdHandler, UssdResponder};
use crate::config::WorkflowConfig;
use crate::domain::payment::Payment;
use crate::domain::ports::{
    CustomerStoreRef, MessengerRef, PaymentGatewayRef, ReminderSchedulerRef,
};
use crate::domain::profile::CustomerId;
use crate::domain::reminder::LOAN_REMINDER_KEY;
use crate::domain::session::Menu;
use std::sync::Arc;
use tracing::{error, warn};

/// An event delivered by the provider connection.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Ussd { customer: CustomerId, input: String },
    Payment { customer: CustomerId, payment: Payment },
    Reminder { customer: CustomerId, key: String },
}

/// Routes inbound provider events to the session state machine, the loan
/// workflow and the reminder policy, and owns the error boundary: handler
/// failures are logged here and never propagate back to the connection.
///
/// Events for one customer must be delivered serially — that ordering is the
/// provider's guarantee, not enforced here. Profile read-then-write is
/// last-write-wins with no versioning, so two concurrent events for the same
/// customer could lose a write.
pub struct EventDispatcher {
    store: CustomerStoreRef,
    sessions: UssdHandler,
    loans: Arc<LoanWorkflow>,
    reminders: ReminderService,
}

impl EventDispatcher {
    pub fn new(
        store: CustomerStoreRef,
        messenger: MessengerRef,
        gateway: PaymentGatewayRef,
        scheduler: ReminderSchedulerRef,
        config: WorkflowConfig,
    ) -> Self {
        let loans = Arc::new(LoanWorkflow::new(
            store.clone(),
            messenger.clone(),
            gateway,
            scheduler,
            config.clone(),
        ));
        let sessions = UssdHandler::new(store.clone(), loans.clone());
        let reminders = ReminderService::new(store.clone(), messenger, config);
        Self {
            store,
            sessions,
            loans,
            reminders,
        }
    }

    /// Handles one event to completion. Returns the menu to render for a
    /// USSD exchange; `None` for non-USSD events and for exchanges that
    /// failed before a reply was produced (the subscriber sees nothing —
    /// there is no generic error screen).
    pub async fn dispatch(&self, event: InboundEvent) -> Option<Menu> {
        match event {
            InboundEvent::Ussd { customer, input } => self.on_ussd(&customer, &input).await,
            InboundEvent::Payment { customer, payment } => {
                if let Err(error) = self.loans.process_payment(&customer, &payment).await {
                    error!(customer = %customer, %error, "payment handling failed");
                }
                None
            }
            InboundEvent::Reminder { customer, key } => {
                if key == LOAN_REMINDER_KEY {
                    self.reminders.on_reminder_fire(&customer).await;
                } else {
                    warn!(customer = %customer, key = %key, "ignoring unknown reminder key");
                }
                None
            }
        }
    }

    async fn on_ussd(&self, customer: &CustomerId, input: &str) -> Option<Menu> {
        let session = match self.store.load_session(customer).await {
            Ok(session) => session,
            Err(error) => {
                error!(customer = %customer, %error, "failed to load session state");
                return None;
            }
        };

        let (responder, reply) = UssdResponder::channel();
        if let Err(error) = self.sessions.handle(customer, input, session, responder).await {
            // The exchange may still have produced a reply before failing;
            // partial completion is accepted.
            error!(customer = %customer, %error, "USSD handling failed");
        }

        let reply = reply.await.ok()?;
        if let Err(error) = self.store.save_session(customer, reply.next).await {
            error!(customer = %customer, %error, "failed to persist session state");
        }
        Some(reply.menu)
    }
}
