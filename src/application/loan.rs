use crate::config::WorkflowConfig;
use crate::domain::channel::MessageBody;
use crate::domain::payment::Payment;
use crate::domain::ports::{
    CustomerStoreRef, MessengerRef, PaymentGatewayRef, ReminderSchedulerRef,
};
use crate::domain::profile::{Amount, Balance, CustomerId, CustomerProfile, LOAN_FIELDS};
use crate::domain::reminder::{LOAN_REMINDER_KEY, ReminderRequest};
use crate::error::Result;
use chrono::Utc;
use tracing::{error, info};

const CURRENCY: &str = "KES";

/// Loan lifecycle: disbursement at order confirmation, reconciliation of
/// incoming repayments, and teardown once the balance reaches zero.
///
/// Every step awaits the previous one; a failed step leaves the earlier
/// side effects in place (no compensation) and the error propagates to the
/// dispatcher boundary.
pub struct LoanWorkflow {
    store: CustomerStoreRef,
    messenger: MessengerRef,
    gateway: PaymentGatewayRef,
    scheduler: ReminderSchedulerRef,
    config: WorkflowConfig,
}

impl LoanWorkflow {
    pub fn new(
        store: CustomerStoreRef,
        messenger: MessengerRef,
        gateway: PaymentGatewayRef,
        scheduler: ReminderSchedulerRef,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            store,
            messenger,
            gateway,
            scheduler,
            config,
        }
    }

    /// Disburses `amount` to the customer and records the loan.
    ///
    /// Fail-closed: a rejected disbursement (or a non-positive amount) is
    /// logged and aborts before any profile write or reminder — the customer
    /// can retry with a future order.
    pub async fn approve_loan(&self, customer: &CustomerId, amount: Balance) -> Result<()> {
        info!(customer = %customer, %amount, "processing loan");

        let profile = self.store.get_profile(customer).await?;
        let name = profile
            .name
            .clone()
            .unwrap_or_else(|| customer.to_string());

        let Ok(amount) = Amount::new(amount.0) else {
            error!(customer = %customer, %amount, "refusing to disburse a non-positive amount");
            return Ok(());
        };

        let receipt = self
            .gateway
            .initiate_payment(
                &self.config.purse,
                &self.config.disbursement,
                customer,
                amount,
                CURRENCY,
            )
            .await?;
        if !receipt.status.is_accepted() {
            error!(
                customer = %customer,
                status = %receipt.status,
                description = %receipt.description,
                "failed to send KES {} to {}",
                amount.value(),
                customer,
            );
            return Ok(());
        }

        let due_at = Utc::now() + self.config.repayment_lead;
        self.store
            .set_profile(
                customer,
                CustomerProfile {
                    balance: Some(amount.into()),
                    ..profile
                },
            )
            .await?;

        let text = format!(
            "Congratulations {name}!\nYour loan of KES {} has been approved!\nYou are expected to pay it back by {}",
            amount.value(),
            due_at.to_rfc2822(),
        );
        self.messenger
            .send_message(&self.config.sms, customer, MessageBody::Text(text))
            .await?;

        self.scheduler
            .schedule(
                customer,
                ReminderRequest {
                    key: LOAN_REMINDER_KEY.to_string(),
                    remind_at: due_at,
                    interval: self.config.reminder_interval,
                    payload: String::new(),
                },
            )
            .await?;

        Ok(())
    }

    /// Reconciles an incoming repayment against the outstanding balance.
    ///
    /// The new balance is always `balance - amount`, written unconditionally.
    /// At or below zero the loan is torn down: reminder cancelled, thank-you
    /// sent, loan fields and session state deleted. Over-payment is forgiven
    /// surplus and behaves exactly like exact repayment.
    pub async fn process_payment(&self, customer: &CustomerId, payment: &Payment) -> Result<()> {
        info!(customer = %customer, "processing payment");

        let profile = self.store.get_profile(customer).await?;
        let name = profile
            .name
            .clone()
            .unwrap_or_else(|| customer.to_string());

        let new_balance = profile.outstanding_balance() - payment.amount.into();
        self.store
            .set_profile(
                customer,
                CustomerProfile {
                    balance: Some(new_balance),
                    ..profile
                },
            )
            .await?;

        if new_balance <= Balance::ZERO {
            self.scheduler.cancel(customer, LOAN_REMINDER_KEY).await?;
            self.messenger
                .send_message(
                    &self.config.sms,
                    customer,
                    MessageBody::Text(format!(
                        "Thank you for your payment {name}, your loan has been fully repaid!"
                    )),
                )
                .await?;
            self.store.delete_fields(customer, &LOAN_FIELDS).await?;
            self.store.clear_session(customer).await?;
        } else {
            self.messenger
                .send_message(
                    &self.config.sms,
                    customer,
                    MessageBody::Text(format!(
                        "Hey {name}!\nThank you for your payment, but you still owe me KES {new_balance}"
                    )),
                )
                .await?;
        }

        Ok(())
    }
}
