use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::new("invalid_argument", message, Vec::new())
    }

    pub fn field_too_long(field: &str, max_chars: usize, actual_chars: usize) -> Self {
        Self::invalid_argument(&format!(
            "Field `{field}` holds {actual_chars} characters; at most {max_chars} are allowed."
        ))
        .with_data(json!({
            "field": field,
            "max_chars": max_chars,
            "actual_chars": actual_chars,
        }))
    }

    pub fn duplicate_turnover(account_id: i64, turnover_id: i64) -> Self {
        Self::new(
            "duplicate_turnover",
            &format!("Turnover {turnover_id} of account {account_id} already exists."),
            vec![
                "Each (account_id, turnover_id) pair can only be imported once.".to_string(),
                "Skip rows that were already imported from the banking source.".to_string(),
            ],
        )
        .with_data(json!({
            "account_id": account_id,
            "turnover_id": turnover_id,
        }))
    }

    pub fn record_not_found(kind: &str, id: i64) -> Self {
        Self::new(
            "record_not_found",
            &format!("No {kind} with id {id} exists."),
            Vec::new(),
        )
        .with_data(json!({
            "kind": kind,
            "id": id,
        }))
    }

    pub fn missing_reference(detail: &str) -> Self {
        Self::new(
            "record_not_found",
            &format!("A referenced record does not exist: {detail}"),
            vec!["Create the referenced person, account or turnover first.".to_string()],
        )
    }

    pub fn dump_write_failed(detail: &str) -> Self {
        Self::new(
            "dump_write_failed",
            &format!("Could not write turnover dump: {detail}"),
            vec!["Check that the output destination is writable.".to_string()],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn ledger_init_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_permission_denied",
            &format!("Cannot initialize ledger at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `CROESUS_HOME` to a writable directory."
            )],
        )
    }

    pub fn ledger_locked(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_locked",
            &format!("Ledger database is locked at `{location}`."),
            vec![format!(
                "Close other processes using `{location}` so the lock is released."
            )],
        )
    }

    pub fn ledger_corrupt(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_corrupt",
            &format!("Ledger database appears corrupt at `{location}`."),
            vec![format!(
                "Replace `{location}` with a valid croesus ledger file or restore from backup."
            )],
        )
    }

    pub fn migration_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "migration_failed",
            &format!("Ledger migration failed at `{location}`: {detail}"),
            vec!["Resolve conflicting schema objects referenced in the error details.".to_string()],
        )
    }

    pub fn ledger_init_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_failed",
            &format!("Ledger initialization failed at `{location}`: {detail}"),
            Vec::new(),
        )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
