//! Positional argument queue shared by the dispatcher and every handler.

use std::collections::VecDeque;

use super::error::CommandError;

/// Remaining positional arguments, consumed left to right.
#[derive(Debug, Clone, Default)]
pub struct ArgQueue {
    args: VecDeque<String>,
}

impl ArgQueue {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Remove and return the first argument, or `None` when exhausted.
    pub fn consume(&mut self) -> Option<String> {
        self.args.pop_front()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Fail with `usage` unless exactly `count` arguments remain.
    pub fn expect_exact(&self, count: usize, usage: &str) -> Result<(), CommandError> {
        if self.args.len() == count {
            Ok(())
        } else {
            Err(CommandError::Usage(usage.to_string()))
        }
    }

    /// Consume one argument that `expect_exact` already guaranteed.
    pub fn required(&mut self, usage: &str) -> Result<String, CommandError> {
        self.consume()
            .ok_or_else(|| CommandError::Usage(usage.to_string()))
    }
}
