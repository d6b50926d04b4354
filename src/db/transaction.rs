// src/db/transaction.rs

use crate::db::connection::SqlitePool;
use crate::error::Result;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::Arc;
use tokio::task;

/// Runs `op` inside an immediate transaction on a blocking thread.
///
/// The transaction commits only when `op` returns `Ok`. Returning an error (or
/// panicking) drops the transaction, which rolls it back.
pub async fn with_transaction<T, F>(pool: &Arc<SqlitePool>, op: F) -> Result<T>
where
	F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
	T: Send + 'static,
{
	let pool = pool.clone();

	task::spawn_blocking(move || -> Result<T> {
		let mut conn = pool.get()?;
		let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

		let value = op(&tx)?;
		tx.commit()?;

		Ok(value)
	})
		.await?
}

/// Runs a read-only `op` against a pooled connection on a blocking thread.
pub async fn with_connection<T, F>(pool: &Arc<SqlitePool>, op: F) -> Result<T>
where
	F: FnOnce(&Connection) -> Result<T> + Send + 'static,
	T: Send + 'static,
{
	let pool = pool.clone();

	task::spawn_blocking(move || -> Result<T> {
		let conn = pool.get()?;
		op(&conn)
	})
		.await?
}
