use crate::domain::ledger::{
    Expense, ExpenseId, LedgerSnapshot, NewExpense, NewPayment, Payment, PaymentId,
};
use crate::domain::participant::Participant;
use crate::domain::ports::LedgerStore;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, Snapshot};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for registered participants.
pub const CF_PARTICIPANTS: &str = "participants";
/// Column Family for the expense log.
pub const CF_EXPENSES: &str = "expenses";
/// Column Family for the payment log.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent ledger using RocksDB.
///
/// Each record kind lives in its own Column Family, keyed by its big-endian
/// id so iteration follows append order. Appends are serialized by a single
/// lock and written with one `put`, so they are atomic. Snapshots read
/// through a RocksDB snapshot and therefore see one consistent state.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    append_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the participant, expense and payment column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_PARTICIPANTS, CF_EXPENSES, CF_PAYMENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            append_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::InternalError(format!("{name} column family not found")))
    }

    fn next_id(&self, name: &str) -> Result<u64> {
        let cf = self.cf(name)?;
        match self.db.iterator_cf(cf, IteratorMode::End).next() {
            Some(item) => {
                let (key, _) = item?;
                Ok(decode_key(&key)? + 1)
            }
            None => Ok(1),
        }
    }

    fn put<T: Serialize>(&self, name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }

    fn read_all<T: DeserializeOwned>(&self, snapshot: &Snapshot<'_>, name: &str) -> Result<Vec<T>> {
        let cf = self.cf(name)?;
        snapshot
            .iterator_cf(cf, IteratorMode::Start)
            .map(|item| -> Result<T> {
                let (_key, value) = item?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }

    fn all_participants(&self) -> Result<Vec<Participant>> {
        let snapshot = self.db.snapshot();
        self.read_all(&snapshot, CF_PARTICIPANTS)
    }
}

fn decode_key(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| LedgerError::InternalError(format!("malformed record key of {} bytes", key.len())))?;
    Ok(u64::from_be_bytes(bytes))
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn register_participant(&self, participant: Participant) -> Result<()> {
        let _guard = self.append_lock.lock().await;
        for existing in self.all_participants()? {
            if existing.id == participant.id {
                return Err(LedgerError::validation(format!(
                    "Participant {} already exists",
                    participant.id
                )));
            }
            if existing.username == participant.username {
                return Err(LedgerError::validation(format!(
                    "Username {} is taken",
                    participant.username
                )));
            }
        }
        // Participant ids are u32; widen so every family shares the key layout.
        let key = u64::from(participant.id.0).to_be_bytes();
        self.put(CF_PARTICIPANTS, &key, &participant)
    }

    async fn participants(&self) -> Result<Vec<Participant>> {
        self.all_participants()
    }

    async fn append_expense(&self, expense: NewExpense) -> Result<Expense> {
        let _guard = self.append_lock.lock().await;
        let id = self.next_id(CF_EXPENSES)?;
        let expense = expense.with_id(ExpenseId(id));
        self.put(CF_EXPENSES, &id.to_be_bytes(), &expense)?;
        Ok(expense)
    }

    async fn append_payment(&self, payment: NewPayment) -> Result<Payment> {
        let _guard = self.append_lock.lock().await;
        let id = self.next_id(CF_PAYMENTS)?;
        let payment = payment.with_id(PaymentId(id));
        self.put(CF_PAYMENTS, &id.to_be_bytes(), &payment)?;
        Ok(payment)
    }

    async fn snapshot(&self) -> Result<LedgerSnapshot> {
        let snapshot = self.db.snapshot();
        Ok(LedgerSnapshot {
            participants: self.read_all(&snapshot, CF_PARTICIPANTS)?,
            expenses: self.read_all(&snapshot, CF_EXPENSES)?,
            payments: self.read_all(&snapshot, CF_PAYMENTS)?,
        })
    }
}
