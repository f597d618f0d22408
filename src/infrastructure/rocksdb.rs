use crate::domain::ports::CustomerStore;
use crate::domain::profile::{CustomerId, CustomerProfile, ProfileField};
use crate::domain::session::SessionData;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for customer profiles.
pub const CF_PROFILES: &str = "profiles";
/// Column Family for USSD session pointers.
pub const CF_SESSIONS: &str = "sessions";

fn storage_err(e: rocksdb::Error) -> EngineError {
    EngineError::Storage(e.to_string())
}

/// A persistent customer store backed by RocksDB.
///
/// Profiles and session pointers live in separate Column Families, both
/// keyed by the customer's phone number and serde_json-encoded. Only the
/// customer state is persistent; messaging, payments and reminders stay with
/// the provider.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// both column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_profiles = ColumnFamilyDescriptor::new(CF_PROFILES, Options::default());
        let cf_sessions = ColumnFamilyDescriptor::new(CF_SESSIONS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_profiles, cf_sessions])
            .map_err(storage_err)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &'static str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| EngineError::Storage(format!("{name} column family not found")))
    }
}

#[async_trait]
impl CustomerStore for RocksDbStore {
    async fn get_profile(&self, customer: &CustomerId) -> Result<CustomerProfile> {
        let cf = self.cf(CF_PROFILES)?;
        let result = self
            .db
            .get_cf(&cf, customer.as_str().as_bytes())
            .map_err(storage_err)?;

        match result {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(CustomerProfile::default()),
        }
    }

    async fn set_profile(&self, customer: &CustomerId, profile: CustomerProfile) -> Result<()> {
        let cf = self.cf(CF_PROFILES)?;
        let value = serde_json::to_vec(&profile)?;
        self.db
            .put_cf(&cf, customer.as_str().as_bytes(), value)
            .map_err(storage_err)?;
        Ok(())
    }

    async fn delete_fields(&self, customer: &CustomerId, fields: &[ProfileField]) -> Result<()> {
        let mut profile = self.get_profile(customer).await?;
        for field in fields {
            profile.clear_field(*field);
        }

        let cf = self.cf(CF_PROFILES)?;
        if profile.is_empty() {
            self.db
                .delete_cf(&cf, customer.as_str().as_bytes())
                .map_err(storage_err)?;
        } else {
            let value = serde_json::to_vec(&profile)?;
            self.db
                .put_cf(&cf, customer.as_str().as_bytes(), value)
                .map_err(storage_err)?;
        }
        Ok(())
    }

    async fn load_session(&self, customer: &CustomerId) -> Result<Option<SessionData>> {
        let cf = self.cf(CF_SESSIONS)?;
        let result = self
            .db
            .get_cf(&cf, customer.as_str().as_bytes())
            .map_err(storage_err)?;

        match result {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save_session(&self, customer: &CustomerId, session: SessionData) -> Result<()> {
        let cf = self.cf(CF_SESSIONS)?;
        let value = serde_json::to_vec(&session)?;
        self.db
            .put_cf(&cf, customer.as_str().as_bytes(), value)
            .map_err(storage_err)?;
        Ok(())
    }

    async fn clear_session(&self, customer: &CustomerId) -> Result<()> {
        let cf = self.cf(CF_SESSIONS)?;
        self.db
            .delete_cf(&cf, customer.as_str().as_bytes())
            .map_err(storage_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::{Balance, LOAN_FIELDS};
    use crate::domain::session::Screen;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_PROFILES).is_some());
        assert!(store.db.cf_handle(CF_SESSIONS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_profile_roundtrip() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();
        let customer = CustomerId::new("+254711000040");

        assert!(store.get_profile(&customer).await.unwrap().is_empty());

        let profile = CustomerProfile {
            name: Some("Wanjiru".to_string()),
            balance: Some(Balance::new(dec!(100.0))),
            strike: Some(2),
            items: vec!["apple".to_string()],
            screen: Some(Screen::Home),
        };
        store.set_profile(&customer, profile.clone()).await.unwrap();
        assert_eq!(store.get_profile(&customer).await.unwrap(), profile);
    }

    #[tokio::test]
    async fn test_rocksdb_delete_fields() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();
        let customer = CustomerId::new("+254711000041");

        store
            .set_profile(
                &customer,
                CustomerProfile {
                    name: Some("Wanjiru".to_string()),
                    balance: Some(Balance::new(dec!(100.0))),
                    items: vec!["apple".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        store.delete_fields(&customer, &LOAN_FIELDS).await.unwrap();
        let profile = store.get_profile(&customer).await.unwrap();
        assert!(profile.name.is_none());
        assert_eq!(profile.items, vec!["apple".to_string()]);
    }

    #[tokio::test]
    async fn test_rocksdb_session_roundtrip() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();
        let customer = CustomerId::new("+254711000042");

        assert!(store.load_session(&customer).await.unwrap().is_none());

        let session = SessionData {
            screen: Screen::FinishOrder,
        };
        store.save_session(&customer, session).await.unwrap();
        assert_eq!(store.load_session(&customer).await.unwrap(), Some(session));

        store.clear_session(&customer).await.unwrap();
        assert!(store.load_session(&customer).await.unwrap().is_none());
    }
}
