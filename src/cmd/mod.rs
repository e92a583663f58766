/*!
Command registry and dispatcher.

Invocation shape:
  table-admin <command> <project-id> <instance-id> [command arguments]

Layout:
  args.rs         ArgQueue (positional shifting)
  error.rs        CommandError (Usage | Admin | Output)
  table.rs        create/list/get/delete/modify table, drop rows
  consistency.rs  wait-for-consistency-check, check-consistency
  snapshot.rs     get/list/delete snapshot
  format.rs       colour + column-family listing helpers

Conventions:
  - Every handler has the `Handler` signature, validates its exact argument
    count first and makes one admin call (wait-for-consistency-check makes two:
    token generation, then the wait).
  - Each `Command` carries its own static usage line; the program usage text
    is the concatenation of those lines in registration order.
*/

pub mod args;
pub mod consistency;
pub mod error;
pub mod format;
pub mod snapshot;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

use std::io::Write;

pub use args::ArgQueue;
pub use error::CommandError;

use crate::admin::{AdminError, TableAdmin};
use format::{Role, Stream, StyleOptions, color};

/// Exit status for success.
pub const EXIT_OK: i32 = 0;
/// Exit status for usage errors, unknown commands and failed admin calls.
pub const EXIT_FAILURE: i32 = 1;

pub const MISSING_ARGS: &str = "Missing command and/or project-id/ or instance-id";

pub type Handler =
    fn(&dyn TableAdmin, &mut ArgQueue, &mut dyn Write) -> Result<(), CommandError>;

/// One registry entry.
pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub run: Handler,
}

/// All commands, in help order.
pub static COMMANDS: &[Command] = &[
    Command {
        name: "create-table",
        usage: table::CREATE_TABLE_USAGE,
        run: table::create_table,
    },
    Command {
        name: "list-tables",
        usage: table::LIST_TABLES_USAGE,
        run: table::list_tables,
    },
    Command {
        name: "get-table",
        usage: table::GET_TABLE_USAGE,
        run: table::get_table,
    },
    Command {
        name: "delete-table",
        usage: table::DELETE_TABLE_USAGE,
        run: table::delete_table,
    },
    Command {
        name: "modify-table",
        usage: table::MODIFY_TABLE_USAGE,
        run: table::modify_table,
    },
    Command {
        name: "drop-all-rows",
        usage: table::DROP_ALL_ROWS_USAGE,
        run: table::drop_all_rows,
    },
    Command {
        name: "drop-rows-by-prefix",
        usage: table::DROP_ROWS_BY_PREFIX_USAGE,
        run: table::drop_rows_by_prefix,
    },
    Command {
        name: "wait-for-consistency-check",
        usage: consistency::WAIT_FOR_CONSISTENCY_USAGE,
        run: consistency::wait_for_consistency_check,
    },
    Command {
        name: "check-consistency",
        usage: consistency::CHECK_CONSISTENCY_USAGE,
        run: consistency::check_consistency,
    },
    Command {
        name: "get-snapshot",
        usage: snapshot::GET_SNAPSHOT_USAGE,
        run: snapshot::get_snapshot,
    },
    Command {
        name: "list-snapshots",
        usage: snapshot::LIST_SNAPSHOTS_USAGE,
        run: snapshot::list_snapshots,
    },
    Command {
        name: "delete-snapshot",
        usage: snapshot::DELETE_SNAPSHOT_USAGE,
        run: snapshot::delete_snapshot,
    },
];

pub fn find(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// Aggregate usage: one indented line per command.
pub fn usage_text() -> String {
    COMMANDS
        .iter()
        .map(|c| format!("    {}\n", c.usage))
        .collect()
}

pub fn print_usage(err: &mut dyn Write, program: &str, msg: &str) {
    let style = StyleOptions::detect(Stream::Stderr);
    // Nothing useful to do if stderr is gone.
    let _ = writeln!(
        err,
        "{}\nUsage: {program} <command> [arguments]\n\nCommands:\n{}",
        color(Role::Error, msg, &style),
        usage_text()
    );
}

/// Run one invocation and return the process exit status.
///
/// `argv` holds the positional arguments after the program name. `connect`
/// builds the admin client for `(project, instance)` and is only called once
/// the command name has been validated.
pub fn dispatch<C>(
    argv: Vec<String>,
    program: &str,
    connect: C,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    C: FnOnce(&str, &str) -> Result<Box<dyn TableAdmin>, AdminError>,
{
    let mut args = ArgQueue::new(argv);
    if args.len() < 3 {
        print_usage(err, program, MISSING_ARGS);
        return EXIT_FAILURE;
    }
    let (Some(command_name), Some(project_id), Some(instance_id)) =
        (args.consume(), args.consume(), args.consume())
    else {
        print_usage(err, program, MISSING_ARGS);
        return EXIT_FAILURE;
    };

    let Some(command) = find(&command_name) else {
        print_usage(err, program, &format!("Unknown command: {command_name}"));
        return EXIT_FAILURE;
    };

    tracing::debug!(
        command = command.name,
        project = %project_id,
        instance = %instance_id,
        remaining = args.len(),
        "dispatching"
    );

    let admin = match connect(&project_id, &instance_id) {
        Ok(a) => a,
        Err(e) => {
            let _ = writeln!(err, "Error: {e}");
            return EXIT_FAILURE;
        }
    };
    tracing::trace!(
        project = admin.project(),
        instance = admin.instance_id(),
        "admin client constructed"
    );

    match (command.run)(admin.as_ref(), &mut args, out) {
        Ok(()) => EXIT_OK,
        Err(e) if e.is_usage() => {
            print_usage(err, program, &e.to_string());
            EXIT_FAILURE
        }
        Err(e) => {
            tracing::debug!(error = ?e, command = command.name, "command failed");
            let _ = writeln!(err, "Error: {e}");
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::testing::MockAdmin;
    use std::cell::Cell;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn dispatch_with(admin: MockAdmin, args: &[&str]) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = dispatch(
            strings(args),
            "table-admin",
            move |_, _| Ok(Box::new(admin) as Box<dyn TableAdmin>),
            &mut out,
            &mut err,
        );
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn every_command_rejects_wrong_arity() {
        let admin = MockAdmin::default();
        for cmd in COMMANDS {
            let mut args = ArgQueue::new(["a", "b", "c", "d", "e"]);
            let mut out = Vec::new();
            let err = (cmd.run)(&admin, &mut args, &mut out).unwrap_err();
            assert!(err.is_usage(), "{} should fail with usage", cmd.name);
            assert!(
                err.to_string().contains(cmd.name),
                "usage for {} was {err}",
                cmd.name
            );
        }
        assert!(admin.calls().is_empty());
    }

    #[test]
    fn usage_text_has_one_line_per_command_in_order() {
        let text = usage_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), COMMANDS.len());
        for (line, cmd) in lines.iter().zip(COMMANDS) {
            assert!(line.starts_with("    "));
            assert!(line.trim_start().starts_with(cmd.name));
        }
    }

    #[test]
    fn command_names_are_unique() {
        for (i, a) in COMMANDS.iter().enumerate() {
            assert!(COMMANDS[i + 1..].iter().all(|b| b.name != a.name));
            assert!(find(a.name).is_some());
        }
    }

    #[test]
    fn missing_arguments_never_connect() {
        let connected = Cell::new(false);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = dispatch(
            strings(&["list-tables", "p"]),
            "table-admin",
            |_, _| {
                connected.set(true);
                Ok(Box::new(MockAdmin::default()) as Box<dyn TableAdmin>)
            },
            &mut out,
            &mut err,
        );
        assert_eq!(code, EXIT_FAILURE);
        assert!(!connected.get());
        assert!(String::from_utf8(err).unwrap().contains(MISSING_ARGS));
    }

    #[test]
    fn unknown_command_exits_one() {
        let (code, out, err) = dispatch_with(MockAdmin::default(), &["frobnicate", "p", "i"]);
        assert_eq!(code, EXIT_FAILURE);
        assert!(out.is_empty());
        assert!(err.contains("Unknown command: frobnicate"));
        assert!(err.contains("Commands:"));
    }

    #[test]
    fn usage_error_prints_command_usage() {
        let (code, _, err) = dispatch_with(MockAdmin::default(), &["get-table", "p", "i"]);
        assert_eq!(code, EXIT_FAILURE);
        assert!(err.contains(table::GET_TABLE_USAGE));
        assert!(err.contains("Usage: table-admin <command> [arguments]"));
    }

    #[test]
    fn admin_failure_exits_one() {
        let admin = MockAdmin::default().failing(403, "permission denied");
        let (code, _, err) = dispatch_with(admin, &["delete-table", "p", "i", "t1"]);
        assert_eq!(code, EXIT_FAILURE);
        assert!(err.contains("permission denied"));
    }

    #[test]
    fn connect_failure_exits_one() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = dispatch(
            strings(&["list-tables", "p", "i"]),
            "table-admin",
            |_, _| Err(AdminError::InvalidEndpoint("bad".into())),
            &mut out,
            &mut err,
        );
        assert_eq!(code, EXIT_FAILURE);
        assert!(String::from_utf8(err).unwrap().contains("invalid endpoint"));
    }

    #[test]
    fn success_exits_zero() {
        let admin = MockAdmin::default().consistent(true);
        let (code, out, err) =
            dispatch_with(admin, &["check-consistency", "p", "i", "t1", "tok"]);
        assert_eq!(code, EXIT_OK);
        assert_eq!(out, "Table is consistent\n");
        assert!(err.is_empty());
    }
}
