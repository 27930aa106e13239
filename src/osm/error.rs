// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

use crate::GraphError;

/// Error conditions which may occur when reading or writing map files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The map source couldn't be opened, read or written.
    /// XML writing failures are reported here as well.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Unparsable line; only reported with [Options::strict](super::Options::strict).
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error(transparent)]
    Storage(#[from] GraphError),
}
