//! `--export`: dump the command log as JSON lines.

use std::io::Write;

use anyhow::{Context, Result};
use cahier_core::store::Store;

/// Write every record, in id order, as one JSON object per line.
/// Returns how many were written.
pub fn write_jsonl<W: Write>(store: &Store, mut out: W) -> Result<usize> {
    let records = store.load().context("loading command log")?;
    for record in &records {
        serde_json::to_writer(&mut out, record).context("encoding record")?;
        out.write_all(b"\n").context("writing export")?;
    }
    out.flush().context("flushing export")?;
    Ok(records.len())
}
