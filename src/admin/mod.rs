//! Table administration client.
//!
//! `TableAdmin` is the seam every command handler talks to. `RestTableAdmin`
//! implements it over the Bigtable Admin v2 REST surface; tests substitute a
//! recording mock.
//!
//! Resource names:
//!   projects/{project}/instances/{instance}
//!   projects/{project}/instances/{instance}/tables/{table}
//!   projects/{project}/instances/{instance}/clusters/{cluster}/snapshots/{snapshot}

pub mod gc_rule;
pub mod rest;
pub mod types;

pub use gc_rule::GcRule;
pub use rest::RestTableAdmin;
pub use types::{ColumnFamilyModification, ConsistencyToken, Snapshot, Table, TableView};

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Errors raised by an admin client.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("invalid {kind} id '{id}'")]
    InvalidId { kind: &'static str, id: String },

    #[error("failed to start client runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type AdminResult<T> = std::result::Result<T, AdminError>;

/// Table administration operations for one project/instance.
///
/// Table and cluster arguments are short ids; implementations expand them into
/// full resource names.
pub trait TableAdmin {
    fn project(&self) -> &str;
    fn instance_id(&self) -> &str;

    fn create_table(&self, table_id: &str, config: &Table) -> AdminResult<Table>;
    fn list_tables(&self, view: TableView) -> AdminResult<Vec<Table>>;
    fn get_table(&self, table_id: &str, view: TableView) -> AdminResult<Table>;
    fn delete_table(&self, table_id: &str) -> AdminResult<()>;
    fn modify_column_families(
        &self,
        table_id: &str,
        modifications: &[ColumnFamilyModification],
    ) -> AdminResult<Table>;
    fn drop_all_rows(&self, table_id: &str) -> AdminResult<()>;
    fn drop_rows_by_prefix(&self, table_id: &str, prefix: &[u8]) -> AdminResult<()>;

    fn generate_consistency_token(&self, table_id: &str) -> AdminResult<ConsistencyToken>;
    fn check_consistency(&self, table_id: &str, token: &ConsistencyToken) -> AdminResult<bool>;
    /// Block until the table is consistent for `token` or the client gives up.
    /// Returns `false` when polling was exhausted.
    fn wait_for_consistency(&self, table_id: &str, token: &ConsistencyToken)
    -> AdminResult<bool>;

    fn get_snapshot(&self, cluster_id: &str, snapshot_id: &str) -> AdminResult<Snapshot>;
    fn list_snapshots(&self, cluster_id: &str) -> AdminResult<Vec<Snapshot>>;
    fn delete_snapshot(&self, cluster_id: &str, snapshot_id: &str) -> AdminResult<()>;
}

/* ---- Resource ids ---- */

static RESOURCE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[_a-zA-Z0-9][-_.a-zA-Z0-9]*$").expect("resource id pattern compiles")
});

// Domain-scoped projects carry a `domain:` prefix.
static PROJECT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][-_.:a-zA-Z0-9]*$").expect("project id pattern compiles")
});

/// Reject ids that would change the shape of a resource name or URL
/// (`/`, `?`, `#`, `%`, whitespace, `..` and so on).
pub fn validate_id(kind: &'static str, id: &str) -> AdminResult<()> {
    let pattern = if kind == "project" {
        &PROJECT_ID
    } else {
        &RESOURCE_ID
    };
    if pattern.is_match(id) && !id.contains("..") {
        Ok(())
    } else {
        Err(AdminError::InvalidId {
            kind,
            id: id.to_string(),
        })
    }
}

/* ---- Resource names ---- */

pub fn instance_name(project: &str, instance: &str) -> String {
    format!("projects/{project}/instances/{instance}")
}

pub fn table_name(project: &str, instance: &str, table: &str) -> String {
    format!("{}/tables/{table}", instance_name(project, instance))
}

pub fn cluster_name(project: &str, instance: &str, cluster: &str) -> String {
    format!("{}/clusters/{cluster}", instance_name(project, instance))
}

pub fn snapshot_name(project: &str, instance: &str, cluster: &str, snapshot: &str) -> String {
    format!(
        "{}/snapshots/{snapshot}",
        cluster_name(project, instance, cluster)
    )
}

/// Last path segment of a resource name (`.../tables/t` -> `t`).
pub fn short_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
