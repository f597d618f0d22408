use moni::application::dispatcher::EventDispatcher;
use moni::config::WorkflowConfig;
use moni::domain::channel::Channel;
use moni::domain::payment::PurseId;
use moni::infrastructure::in_memory::InMemoryProvider;
use std::sync::Arc;

pub fn test_config() -> WorkflowConfig {
    WorkflowConfig {
        purse: PurseId::new("purse-test"),
        sms: Channel::sms("22123"),
        voice: Channel::voice("+254700000000"),
        disbursement: Channel::cellular("525900"),
        repayment_lead: chrono::Duration::seconds(60),
        reminder_interval: std::time::Duration::from_secs(60),
    }
}

/// A dispatcher wired entirely to one in-memory provider, plus the provider
/// itself for seeding and inspection.
pub fn engine() -> (EventDispatcher, InMemoryProvider) {
    let provider = InMemoryProvider::new();
    let dispatcher = EventDispatcher::new(
        Arc::new(provider.clone()),
        Arc::new(provider.clone()),
        Arc::new(provider.clone()),
        Arc::new(provider.clone()),
        test_config(),
    );
    (dispatcher, provider)
}
