//! `/proc/meminfo` reader.

use super::MemoryStatsSource;
use crate::core::{MempushError, MemorySnapshot, Result};
use std::path::PathBuf;

/// Reads counters from a Linux `meminfo` file.
#[derive(Debug, Clone)]
pub struct ProcMeminfo {
    path: PathBuf,
}

impl ProcMeminfo {
    /// Read from `path`, normally `/proc/meminfo`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl MemoryStatsSource for ProcMeminfo {
    async fn refresh(&self) -> Result<MemorySnapshot> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        parse_meminfo(&raw)
    }
}

/// Parse meminfo text into a snapshot.
///
/// Values are given in kB and converted to bytes. `FreeTotal` is
/// `MemFree + Buffers + Cached`.
pub fn parse_meminfo(raw: &str) -> Result<MemorySnapshot> {
    let mut free = None;
    let mut buffers = None;
    let mut cached = None;

    for line in raw.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let slot = match key.trim() {
            "MemFree" => &mut free,
            "Buffers" => &mut buffers,
            "Cached" => &mut cached,
            _ => continue,
        };
        *slot = Some(parse_kb(key, rest)?);
    }

    let require = |value: Option<u64>, key: &str| {
        value.ok_or_else(|| MempushError::meminfo(format!("missing {key} field")))
    };
    let free = require(free, "MemFree")?;
    let buffers = require(buffers, "Buffers")?;
    let cached = require(cached, "Cached")?;

    let free_total = free
        .checked_add(buffers)
        .and_then(|v| v.checked_add(cached))
        .ok_or_else(|| MempushError::meminfo("FreeTotal overflows u64"))?;

    Ok(MemorySnapshot {
        buffers,
        cached,
        free,
        free_total,
    })
}

fn parse_kb(key: &str, rest: &str) -> Result<u64> {
    let mut parts = rest.split_whitespace();
    let value = parts
        .next()
        .ok_or_else(|| MempushError::meminfo(format!("{key} has no value")))?;
    let kb: u64 = value
        .parse()
        .map_err(|e| MempushError::meminfo(format!("{key} value '{value}': {e}")))?;

    match parts.next() {
        Some("kB") => kb
            .checked_mul(1024)
            .ok_or_else(|| MempushError::meminfo(format!("{key} overflows u64"))),
        Some(unit) => Err(MempushError::meminfo(format!("{key} has unexpected unit '{unit}'"))),
        // Unitless fields are page counts; none of the ones read here are.
        None => Err(MempushError::meminfo(format!("{key} has no unit"))),
    }
}
