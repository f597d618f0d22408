use crate::domain::channel::Channel;
use crate::domain::payment::PurseId;
use crate::error::{EngineError, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Runtime configuration, loaded from an optional `moni.toml` plus
/// `MONI_*`-prefixed environment variables (the environment wins). All
/// fields default to sandbox values so a local replay runs unconfigured.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SMS short code messages are sent from.
    #[serde(default = "default_sms_short_code")]
    pub sms_short_code: String,
    /// Caller id for synthesized voice calls.
    #[serde(default = "default_voice_number")]
    pub voice_number: String,
    /// M-Pesa paybill used as the disbursement rail.
    #[serde(default = "default_mpesa_paybill")]
    pub mpesa_paybill: String,
    /// Funding purse for outbound disbursements.
    #[serde(default = "default_purse_id")]
    pub purse_id: String,
    /// Service code subscribers dial, for the startup banner.
    #[serde(default = "default_ussd_code")]
    pub ussd_code: String,
    /// Seconds between disbursement and the repayment due date.
    #[serde(default = "default_repayment_lead_secs")]
    pub repayment_lead_secs: u64,
    /// Seconds between reminder fires once the due date passes.
    #[serde(default = "default_reminder_interval_secs")]
    pub reminder_interval_secs: u64,
}

fn default_sms_short_code() -> String {
    "22123".to_string()
}

fn default_voice_number() -> String {
    "+254700000000".to_string()
}

fn default_mpesa_paybill() -> String {
    "525900".to_string()
}

fn default_purse_id() -> String {
    "purse-sandbox".to_string()
}

fn default_ussd_code() -> String {
    "*384*22123#".to_string()
}

fn default_repayment_lead_secs() -> u64 {
    60
}

fn default_reminder_interval_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sms_short_code: default_sms_short_code(),
            voice_number: default_voice_number(),
            mpesa_paybill: default_mpesa_paybill(),
            purse_id: default_purse_id(),
            ussd_code: default_ussd_code(),
            repayment_lead_secs: default_repayment_lead_secs(),
            reminder_interval_secs: default_reminder_interval_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("moni").required(false))
            .add_source(Environment::with_prefix("MONI"))
            .build()
            .map_err(|e| EngineError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| EngineError::Config(e.to_string()))
    }

    /// The channel/purse/timing bundle the workflows carry around.
    pub fn workflow(&self) -> WorkflowConfig {
        WorkflowConfig {
            purse: PurseId::new(self.purse_id.clone()),
            sms: Channel::sms(self.sms_short_code.clone()),
            voice: Channel::voice(self.voice_number.clone()),
            disbursement: Channel::cellular(self.mpesa_paybill.clone()),
            repayment_lead: chrono::Duration::seconds(self.repayment_lead_secs as i64),
            reminder_interval: std::time::Duration::from_secs(self.reminder_interval_secs),
        }
    }
}

/// Channels, purse and timing shared by the loan workflow and the reminder
/// escalation service.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub purse: PurseId,
    pub sms: Channel,
    pub voice: Channel,
    pub disbursement: Channel,
    pub repayment_lead: chrono::Duration,
    pub reminder_interval: std::time::Duration,
}
