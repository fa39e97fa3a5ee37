//! Delegation of the ordering to an external line sorter.
//!
//! Every entry is written as one line of a temporary key file:
//!
//! ```text
//! <index> TAB <key>                    (no normalization)
//! <index> TAB <normalized key> TAB <key>
//! ```
//!
//! The sorter must print all lines back in the desired order; the leading
//! index of each output line forms the resulting permutation.

use std::{
    io::{BufWriter, Write},
    path::Path,
    process::{Command, Stdio},
};

use cqp_bitfield::Bitfield;
use cqp_common::{Result, error::Error};
use tempfile::NamedTempFile;

use super::{clause::SortClause, comparator::SortContext, options::ExternalSortConfig};
use crate::interval::try_with_capacity;

pub(crate) fn external_order(
    n: usize,
    ctx: &SortContext<'_>,
    clause: &SortClause,
    normalize: impl Fn(&str) -> String,
    config: &ExternalSortConfig,
) -> Result<Vec<usize>> {
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut file = match &config.temp_dir {
        Some(dir) => tempfile::Builder::new().prefix("cqp-sort-").tempfile_in(dir),
        None => tempfile::Builder::new().prefix("cqp-sort-").tempfile(),
    }
    .map_err(|e| Error::io("creating sort key file", e))?;

    let result = write_keys(&mut file, n, ctx, clause, normalize)
        .and_then(|()| run_sorter(file.path(), n, clause, config));

    let path = file.path().to_path_buf();
    if let Err(e) = file.close() {
        log::warn!("failed to remove sort key file {}: {e}", path.display());
    }
    result
}

fn write_keys(
    file: &mut NamedTempFile,
    n: usize,
    ctx: &SortContext<'_>,
    clause: &SortClause,
    normalize: impl Fn(&str) -> String,
) -> Result<()> {
    let io_err = |e| Error::io("writing sort key file", e);
    let mut writer = BufWriter::new(file);
    for i in 0..n {
        ctx.check_interrupt()?;
        let key = ctx.key_text(i)?;
        if clause.normalized() {
            writeln!(writer, "{i}\t{}\t{key}", normalize(&key)).map_err(io_err)?;
        } else {
            writeln!(writer, "{i}\t{key}").map_err(io_err)?;
        }
    }
    writer.flush().map_err(io_err)
}

fn run_sorter(
    path: &Path,
    n: usize,
    clause: &SortClause,
    config: &ExternalSortConfig,
) -> Result<Vec<usize>> {
    let mut command = Command::new(&config.program);
    command.args(&config.extra_args);
    if config.standard_key_args {
        command.args(["-s", "-t", "\t", "-k2,2"]);
        if clause.normalized() && clause.break_ties {
            command.arg("-k3,3");
        }
        if clause.descending {
            command.arg("-r");
        }
    }
    command
        .arg(path)
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    log::debug!("running external sort: {command:?}");

    let output = command.output().map_err(|e| {
        Error::external_tool(format!("cannot run {}: {e}", config.program.display()))
    })?;
    if !output.status.success() {
        return Err(Error::external_tool(format!(
            "{} failed ({}): {}",
            config.program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    parse_order(&output.stdout, n)
}

/// Reads the permutation from the sorter's output: the leading index of every
/// line, each in range and seen exactly once, `n` lines in total.
pub(crate) fn parse_order(output: &[u8], n: usize) -> Result<Vec<usize>> {
    let mut perm = try_with_capacity(n)?;
    let mut seen = Bitfield::empty(n);
    for line in output.split(|&b| b == b'\n').filter(|line| !line.is_empty()) {
        let field = line.split(|&b| b == b'\t').next().unwrap_or_default();
        let index = std::str::from_utf8(field)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&index| index < n && !seen.get(index))
            .ok_or_else(|| {
                Error::external_tool(format!(
                    "malformed line in sorter output: {:?}",
                    String::from_utf8_lossy(line)
                ))
            })?;
        seen.set(index);
        perm.push(index);
    }
    if perm.len() != n {
        return Err(Error::external_tool(format!(
            "sorter returned {} lines, expected {n}",
            perm.len()
        )));
    }
    Ok(perm)
}
