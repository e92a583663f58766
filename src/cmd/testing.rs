//! Recording `TableAdmin` used by handler and dispatcher tests.

use std::cell::RefCell;

use super::args::ArgQueue;
use super::error::CommandError;
use super::Handler;
use crate::admin::{
    AdminError, AdminResult, ColumnFamilyModification, ConsistencyToken, Snapshot, Table,
    TableAdmin, TableView, snapshot_name, table_name,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTable(String, Table),
    ListTables(TableView),
    GetTable(String, TableView),
    DeleteTable(String),
    ModifyColumnFamilies(String, Vec<ColumnFamilyModification>),
    DropAllRows(String),
    DropRowsByPrefix(String, Vec<u8>),
    GenerateConsistencyToken(String),
    CheckConsistency(String, ConsistencyToken),
    WaitForConsistency(String, ConsistencyToken),
    GetSnapshot(String, String),
    ListSnapshots(String),
    DeleteSnapshot(String, String),
}

#[derive(Default)]
pub struct MockAdmin {
    calls: RefCell<Vec<Call>>,
    tables: Vec<String>,
    snapshots: Vec<String>,
    consistent: bool,
    failure: Option<(u16, String)>,
    detail: Option<Snapshot>,
}

impl MockAdmin {
    pub fn with_tables<I: IntoIterator<Item = &'static str>>(mut self, ids: I) -> Self {
        self.tables = ids.into_iter().map(String::from).collect();
        self
    }

    pub fn with_snapshots<I: IntoIterator<Item = &'static str>>(mut self, ids: I) -> Self {
        self.snapshots = ids.into_iter().map(String::from).collect();
        self
    }

    /// `get_snapshot` returns `snapshot` with its name filled in.
    pub fn with_snapshot_detail(mut self, snapshot: Snapshot) -> Self {
        self.detail = Some(snapshot);
        self
    }

    pub fn consistent(mut self, consistent: bool) -> Self {
        self.consistent = consistent;
        self
    }

    /// Every call fails with this HTTP status after being recorded.
    pub fn failing(mut self, status: u16, message: &str) -> Self {
        self.failure = Some((status, message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) -> AdminResult<()> {
        self.calls.borrow_mut().push(call);
        match &self.failure {
            Some((status, message)) => Err(AdminError::Status {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn named_table(&self, table_id: &str) -> Table {
        let mut t = crate::cmd::table::initial_schema();
        t.name = table_name("p", "i", table_id);
        t
    }

    fn named_snapshot(&self, cluster_id: &str, snapshot_id: &str) -> Snapshot {
        Snapshot {
            name: snapshot_name("p", "i", cluster_id, snapshot_id),
            state: Some("READY".into()),
            ..Default::default()
        }
    }
}

impl TableAdmin for MockAdmin {
    fn project(&self) -> &str {
        "p"
    }

    fn instance_id(&self) -> &str {
        "i"
    }

    fn create_table(&self, table_id: &str, config: &Table) -> AdminResult<Table> {
        self.record(Call::CreateTable(table_id.into(), config.clone()))?;
        Ok(Table {
            name: table_name("p", "i", table_id),
            ..config.clone()
        })
    }

    fn list_tables(&self, view: TableView) -> AdminResult<Vec<Table>> {
        self.record(Call::ListTables(view))?;
        Ok(self
            .tables
            .iter()
            .map(|id| Table {
                name: table_name("p", "i", id),
                ..Default::default()
            })
            .collect())
    }

    fn get_table(&self, table_id: &str, view: TableView) -> AdminResult<Table> {
        self.record(Call::GetTable(table_id.into(), view))?;
        Ok(self.named_table(table_id))
    }

    fn delete_table(&self, table_id: &str) -> AdminResult<()> {
        self.record(Call::DeleteTable(table_id.into()))
    }

    fn modify_column_families(
        &self,
        table_id: &str,
        modifications: &[ColumnFamilyModification],
    ) -> AdminResult<Table> {
        self.record(Call::ModifyColumnFamilies(
            table_id.into(),
            modifications.to_vec(),
        ))?;
        Ok(self.named_table(table_id))
    }

    fn drop_all_rows(&self, table_id: &str) -> AdminResult<()> {
        self.record(Call::DropAllRows(table_id.into()))
    }

    fn drop_rows_by_prefix(&self, table_id: &str, prefix: &[u8]) -> AdminResult<()> {
        self.record(Call::DropRowsByPrefix(table_id.into(), prefix.to_vec()))
    }

    fn generate_consistency_token(&self, table_id: &str) -> AdminResult<ConsistencyToken> {
        self.record(Call::GenerateConsistencyToken(table_id.into()))?;
        Ok(ConsistencyToken::new(format!("token-{table_id}")))
    }

    fn check_consistency(&self, table_id: &str, token: &ConsistencyToken) -> AdminResult<bool> {
        self.record(Call::CheckConsistency(table_id.into(), token.clone()))?;
        Ok(self.consistent)
    }

    fn wait_for_consistency(
        &self,
        table_id: &str,
        token: &ConsistencyToken,
    ) -> AdminResult<bool> {
        self.record(Call::WaitForConsistency(table_id.into(), token.clone()))?;
        Ok(self.consistent)
    }

    fn get_snapshot(&self, cluster_id: &str, snapshot_id: &str) -> AdminResult<Snapshot> {
        self.record(Call::GetSnapshot(cluster_id.into(), snapshot_id.into()))?;
        Ok(match &self.detail {
            Some(detail) => Snapshot {
                name: snapshot_name("p", "i", cluster_id, snapshot_id),
                ..detail.clone()
            },
            None => self.named_snapshot(cluster_id, snapshot_id),
        })
    }

    fn list_snapshots(&self, cluster_id: &str) -> AdminResult<Vec<Snapshot>> {
        self.record(Call::ListSnapshots(cluster_id.into()))?;
        Ok(self
            .snapshots
            .iter()
            .map(|s| self.named_snapshot(cluster_id, s))
            .collect())
    }

    fn delete_snapshot(&self, cluster_id: &str, snapshot_id: &str) -> AdminResult<()> {
        self.record(Call::DeleteSnapshot(cluster_id.into(), snapshot_id.into()))
    }
}

/// Run `handler` against `admin` with `args`, returning captured stdout.
pub fn run(handler: Handler, admin: &MockAdmin, args: &[&str]) -> Result<String, CommandError> {
    let mut queue = ArgQueue::new(args.iter().copied());
    let mut out = Vec::new();
    handler(admin, &mut queue, &mut out)?;
    Ok(String::from_utf8(out).expect("handler output is utf-8"))
}
