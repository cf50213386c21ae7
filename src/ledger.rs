use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use crate::error::GateError;

/// A row in the payment audit log. Append-only: rows are never mutated
/// or deleted by the gate.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaymentRecord {
    pub id: i64,
    pub payer_address: String,
    pub endpoint: String,
    pub amount_usdc: String,
    pub tx_hash: String,
    pub network: String,
    pub description: Option<String>,
    pub created_at: i64,
}

/// SQLite-backed payment audit ledger.
#[derive(Clone)]
pub struct PaymentLedger {
    conn: Arc<Mutex<Connection>>,
}

impl PaymentLedger {
    pub fn open(path: &str) -> Result<Self, GateError> {
        let conn = Connection::open(path)?;
        let ledger = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        ledger.init_schema()?;
        Ok(ledger)
    }

    fn init_schema(&self) -> Result<(), GateError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| GateError::Internal("ledger lock poisoned".to_string()))?;

        // WAL for better concurrent read/write behavior
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS x402_payments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                payer_address TEXT NOT NULL,
                endpoint TEXT NOT NULL,
                amount_usdc TEXT NOT NULL,
                tx_hash TEXT,
                network TEXT DEFAULT 'eip155:8453',
                description TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        Ok(())
    }

    /// Append one accepted-payment row. One insert-and-commit per
    /// accepted payment; the gate never reads this table back.
    pub fn append(
        &self,
        payer_address: &str,
        endpoint: &str,
        amount_usdc: &str,
        tx_hash: &str,
        network: &str,
        description: &str,
    ) -> Result<(), GateError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| GateError::Internal("ledger lock poisoned".to_string()))?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            r#"
            INSERT INTO x402_payments (payer_address, endpoint, amount_usdc, tx_hash, network, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![payer_address, endpoint, amount_usdc, tx_hash, network, description, now],
        )?;

        Ok(())
    }

    /// Execute additional schema SQL. Lets embedding applications extend
    /// the database with their own tables without touching ledger code.
    pub fn execute_schema(&self, sql: &str) -> Result<(), GateError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| GateError::Internal("ledger lock poisoned".to_string()))?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// List the most recent payments, newest first. Operator/test
    /// helper; not part of the gate's decision path.
    pub fn recent(&self, limit: u32) -> Result<Vec<PaymentRecord>, GateError> {
        let limit = limit.clamp(1, 500);
        let conn = self
            .conn
            .lock()
            .map_err(|_| GateError::Internal("ledger lock poisoned".to_string()))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, payer_address, endpoint, amount_usdc, tx_hash, network, description, created_at
            FROM x402_payments
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let records = stmt
            .query_map(params![limit], |row| {
                Ok(PaymentRecord {
                    id: row.get(0)?,
                    payer_address: row.get(1)?,
                    endpoint: row.get(2)?,
                    amount_usdc: row.get(3)?,
                    tx_hash: row.get(4)?,
                    network: row.get(5)?,
                    description: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
