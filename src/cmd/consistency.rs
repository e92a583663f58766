//! Replication consistency commands.

use std::io::Write;

use super::args::ArgQueue;
use super::error::CommandError;
use crate::admin::{ConsistencyToken, TableAdmin};

pub const WAIT_FOR_CONSISTENCY_USAGE: &str =
    "wait-for-consistency-check: <project-id> <instance-id> <table-id>";
pub const CHECK_CONSISTENCY_USAGE: &str =
    "check-consistency: <project-id> <instance-id> <table-id> <consistency-token>";

pub const CONSISTENT: &str = "Table is consistent";
pub const NOT_CONSISTENT: &str = "Table is not consistent";
pub const NOT_YET_CONSISTENT: &str =
    "Table is not yet consistent, Please Try again Later with the same Token!";

/// Generate a fresh token, then let the client wait until it is satisfied.
pub fn wait_for_consistency_check(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    args.expect_exact(1, WAIT_FOR_CONSISTENCY_USAGE)?;
    let table_id = args.required(WAIT_FOR_CONSISTENCY_USAGE)?;

    let token = admin.generate_consistency_token(&table_id)?;
    tracing::debug!(%token, table = %table_id, "waiting for consistency");
    let consistent = admin.wait_for_consistency(&table_id, &token)?;
    writeln!(out, "{}", if consistent { CONSISTENT } else { NOT_CONSISTENT })?;
    Ok(())
}

pub fn check_consistency(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    args.expect_exact(2, CHECK_CONSISTENCY_USAGE)?;
    let table_id = args.required(CHECK_CONSISTENCY_USAGE)?;
    let token = ConsistencyToken::new(args.required(CHECK_CONSISTENCY_USAGE)?);

    let consistent = admin.check_consistency(&table_id, &token)?;
    writeln!(
        out,
        "{}",
        if consistent {
            CONSISTENT
        } else {
            NOT_YET_CONSISTENT
        }
    )?;
    Ok(())
}
