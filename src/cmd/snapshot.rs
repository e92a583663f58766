//! Per-cluster snapshot commands.

use std::io::Write;

use super::args::ArgQueue;
use super::error::CommandError;
use crate::admin::{TableAdmin, short_id};

pub const GET_SNAPSHOT_USAGE: &str =
    "get-snapshot: <project-id> <instance-id> <cluster-id> <snapshot-id>";
pub const LIST_SNAPSHOTS_USAGE: &str = "list-snapshots: <project-id> <instance-id> <cluster-id>";
pub const DELETE_SNAPSHOT_USAGE: &str =
    "delete-snapshot: <project-id> <instance-id> <cluster-id> <snapshot-id>";

fn cluster_and_snapshot(
    args: &mut ArgQueue,
    usage: &str,
) -> Result<(String, String), CommandError> {
    args.expect_exact(2, usage)?;
    let cluster_id = args.required(usage)?;
    let snapshot_id = args.required(usage)?;
    Ok((cluster_id, snapshot_id))
}

pub fn get_snapshot(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let (cluster_id, snapshot_id) = cluster_and_snapshot(args, GET_SNAPSHOT_USAGE)?;
    let snapshot = admin.get_snapshot(&cluster_id, &snapshot_id)?;
    writeln!(out, "GetSnapshot name : {}", snapshot.name)?;
    if let Some(state) = &snapshot.state {
        writeln!(out, "State : {state}")?;
    }
    if let Some(source) = &snapshot.source_table {
        writeln!(out, "Source table : {}", short_id(&source.name))?;
    }
    if let Some(bytes) = &snapshot.data_size_bytes {
        writeln!(out, "Data size : {bytes} bytes")?;
    }
    if let Some(created) = &snapshot.create_time {
        writeln!(out, "Created : {created}")?;
    }
    if let Some(expires) = &snapshot.delete_time {
        writeln!(out, "Expires : {expires}")?;
    }
    if let Some(description) = snapshot.description.as_deref().filter(|d| !d.is_empty()) {
        writeln!(out, "Description : {description}")?;
    }
    Ok(())
}

pub fn list_snapshots(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    args.expect_exact(1, LIST_SNAPSHOTS_USAGE)?;
    let cluster_id = args.required(LIST_SNAPSHOTS_USAGE)?;

    let snapshots = admin.list_snapshots(&cluster_id)?;
    writeln!(out, "Snapshot Name List")?;
    for s in &snapshots {
        writeln!(out, "Snapshot Name:{}", s.name)?;
    }
    Ok(())
}

pub fn delete_snapshot(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let (cluster_id, snapshot_id) = cluster_and_snapshot(args, DELETE_SNAPSHOT_USAGE)?;
    admin.delete_snapshot(&cluster_id, &snapshot_id)?;
    writeln!(out, "Snapshot deleted: {snapshot_id}")?;
    Ok(())
}
