//! Application layer containing the workflow orchestration.
//!
//! This module wires the domain state machine and policies to the provider
//! ports: one USSD exchange handler, the loan lifecycle workflow, the
//! reminder escalation service, and the event dispatcher that routes inbound
//! provider events to the three of them.

pub mod dispatcher;
pub mod loan;
pub mod reminder;
pub mod session;
