use crate::application::loan::LoanWorkflow;
use crate::domain::ports::CustomerStoreRef;
use crate::domain::profile::CustomerId;
use crate::domain::session::{Menu, SessionAction, SessionData, transition};
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::info;

/// Reply to one USSD exchange: the menu to render plus the session state the
/// provider should hand back on the next exchange.
#[derive(Debug, PartialEq, Eq)]
pub struct UssdReply {
    pub menu: Menu,
    pub next: SessionData,
}

/// Consume-once reply handle for a USSD exchange.
///
/// `respond` takes `self`, so a handler can answer at most once; dropping the
/// responder without answering surfaces to the dispatcher as a failed
/// exchange with no reply.
pub struct UssdResponder {
    tx: oneshot::Sender<UssdReply>,
}

impl UssdResponder {
    pub fn channel() -> (Self, oneshot::Receiver<UssdReply>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn respond(self, menu: Menu, next: SessionData) {
        // The dispatcher holding the receiver may already be gone; nothing
        // left to do for this exchange then.
        let _ = self.tx.send(UssdReply { menu, next });
    }
}

/// Handles one USSD exchange: read the profile, run the screen transition,
/// reply, persist the full profile snapshot, then run any requested side
/// effect.
pub struct UssdHandler {
    store: CustomerStoreRef,
    loans: Arc<LoanWorkflow>,
}

impl UssdHandler {
    pub fn new(store: CustomerStoreRef, loans: Arc<LoanWorkflow>) -> Self {
        Self { store, loans }
    }

    /// All values the transition consults come from the profile read at the
    /// top of this method. The reply goes out before the store write; a
    /// write failure after that point leaves a sent menu behind, which is
    /// accepted (no rollback).
    pub async fn handle(
        &self,
        customer: &CustomerId,
        input: &str,
        session: Option<SessionData>,
        responder: UssdResponder,
    ) -> Result<()> {
        info!(customer = %customer, "processing USSD input");

        let mut profile = self.store.get_profile(customer).await?;
        let screen = session
            .map(|s| s.screen)
            .or(profile.screen)
            .unwrap_or_default();

        let step = transition(screen, input, &profile);
        responder.respond(
            step.menu,
            SessionData {
                screen: step.next_screen,
            },
        );

        if let Some(items) = step.items {
            profile.items = items;
        }
        profile.screen = Some(step.next_screen);
        self.store.set_profile(customer, profile).await?;

        // Disbursement runs last so the loan's own profile write is the one
        // that sticks.
        if let SessionAction::Disburse(amount) = step.action {
            self.loans.approve_loan(customer, amount).await?;
        }

        Ok(())
    }
}
