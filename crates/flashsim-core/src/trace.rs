//! Trace ingestion and generation.
//!
//! Three input formats are accepted and normalized to [`Request`] records:
//!
//! - **Extended CSV** (6 columns): `timestamp_us, process_id, user_id, op,
//!   address, size_bytes`. Declared user ids must be consistent per process.
//! - **Legacy CSV** (5 columns): `timestamp_us, process_id, op, address,
//!   size_bytes`; tenant ids are assigned densely in order of first
//!   appearance of each process.
//! - **blkparse output**: only `Q` (queue) actions produce requests; the
//!   request size is the sector count times 512, the op is a write iff the
//!   RWBS field contains `W`, and the tenant label is `pid:comm` when the
//!   command name is present.
//!
//! CSV timestamps are microseconds and are converted to the simulator's
//! floating-point seconds; blkparse timestamps are already seconds. Records
//! are sorted by `(arrival_ts, user_id)` before delivery to the driver.

use flashsim_schedulers::{OpKind, Request};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

const SECTOR_SIZE_BYTES: u64 = 512;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("line {line}: unknown op type '{op}'")]
    UnknownOp { line: usize, op: String },
    #[error("line {line}: process '{process}' has conflicting user ids ({first} vs {second})")]
    ConflictingUser {
        line: usize,
        process: String,
        first: u32,
        second: u32,
    },
}

impl TraceError {
    fn malformed(line: usize, message: impl Into<String>) -> Self {
        TraceError::Malformed {
            line,
            message: message.into(),
        }
    }
}

/// Load and parse a trace file.
pub fn load_trace_csv(path: &Path) -> Result<Vec<Request>, TraceError> {
    let file = std::fs::File::open(path)?;
    parse_trace(BufReader::new(file))
}

/// Parse a trace from any reader. See the module docs for accepted formats.
pub fn parse_trace<R: Read>(reader: BufReader<R>) -> Result<Vec<Request>, TraceError> {
    let mut parser = TraceParser::default();
    let mut saw_data_line = false;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !saw_data_line && looks_like_header(trimmed) {
            continue;
        }
        parser.parse_line(trimmed, line_no)?;
        saw_data_line = true;
    }

    let mut requests = parser.requests;
    requests.sort_by(|a, b| {
        a.arrival_ts
            .total_cmp(&b.arrival_ts)
            .then(a.user_id.cmp(&b.user_id))
    });
    Ok(requests)
}

/// Tenant count implied by a trace: `max(user_id) + 1`, or 0 when empty.
pub fn infer_user_count(requests: &[Request]) -> usize {
    requests
        .iter()
        .map(|r| r.user_id as usize + 1)
        .max()
        .unwrap_or(0)
}

/// A header row is any first line whose leading field is not numeric.
fn looks_like_header(line: &str) -> bool {
    match line.split(',').next() {
        Some(first) => first.trim().parse::<i64>().is_err(),
        None => true,
    }
}

#[derive(Default)]
struct TraceParser {
    requests: Vec<Request>,
    process_user_ids: HashMap<String, u32>,
    next_auto_user_id: u32,
}

impl TraceParser {
    fn parse_line(&mut self, line: &str, line_no: usize) -> Result<(), TraceError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match fields.len() {
            6 => self.parse_extended_csv(&fields, line_no),
            5 => self.parse_legacy_csv(&fields, line_no),
            _ => self.parse_blkparse(line, line_no),
        }
    }

    fn parse_extended_csv(&mut self, fields: &[&str], line_no: usize) -> Result<(), TraceError> {
        let arrival_ts = parse_timestamp_us(fields[0], line_no)?;
        let process = fields[1];
        let user_id: u32 = fields[2].parse().map_err(|e| {
            TraceError::malformed(line_no, format!("invalid user_id '{}': {}", fields[2], e))
        })?;
        let op = parse_op(fields[3], line_no)?;
        let size_bytes = parse_size(fields[5], line_no)?;

        match self.process_user_ids.entry(process.to_string()) {
            Entry::Occupied(existing) if *existing.get() != user_id => {
                return Err(TraceError::ConflictingUser {
                    line: line_no,
                    process: process.to_string(),
                    first: *existing.get(),
                    second: user_id,
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(user_id);
            }
        }

        self.requests
            .push(Request::new(user_id, op, arrival_ts, size_bytes));
        Ok(())
    }

    fn parse_legacy_csv(&mut self, fields: &[&str], line_no: usize) -> Result<(), TraceError> {
        let arrival_ts = parse_timestamp_us(fields[0], line_no)?;
        let process = fields[1];
        let op = parse_op(fields[2], line_no)?;
        let size_bytes = parse_size(fields[4], line_no)?;

        let user_id = self.user_for_process(process);
        self.requests
            .push(Request::new(user_id, op, arrival_ts, size_bytes));
        Ok(())
    }

    fn parse_blkparse(&mut self, line: &str, line_no: usize) -> Result<(), TraceError> {
        let mut tokens = line.split_whitespace();

        // blkparse lines lead with the device as "major,minor".
        let device = tokens
            .next()
            .ok_or_else(|| TraceError::malformed(line_no, "expected CSV or blkparse format"))?;
        if !device.contains(',') {
            return Err(TraceError::malformed(
                line_no,
                "expected CSV or blkparse format",
            ));
        }

        let _cpu = tokens.next();
        let _seq = tokens.next();
        let (Some(ts_str), Some(pid), Some(action), Some(rwbs)) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(TraceError::malformed(
                line_no,
                "expected CSV or blkparse format",
            ));
        };

        let Ok(arrival_ts) = ts_str.parse::<f64>() else {
            return Err(TraceError::malformed(
                line_no,
                "expected CSV or blkparse format",
            ));
        };

        // Non-queue events are recognized but produce no request.
        if action != "Q" {
            return Ok(());
        }

        let (Some(_lba), Some(plus), Some(sectors_str)) =
            (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(TraceError::malformed(
                line_no,
                "incomplete blkparse data for queue event",
            ));
        };
        if plus != "+" {
            return Err(TraceError::malformed(
                line_no,
                "expected '+' before sector count",
            ));
        }

        let sectors: u64 = sectors_str.parse().map_err(|e| {
            TraceError::malformed(line_no, format!("invalid sector count: {}", e))
        })?;
        let size_bytes = u32::try_from(sectors * SECTOR_SIZE_BYTES)
            .map_err(|_| TraceError::malformed(line_no, "request size exceeds 32 bits"))?;

        let mut label = pid.to_string();
        if let Some(command) = tokens.next() {
            let command = command.trim_start_matches('[').trim_end_matches(']');
            if !command.is_empty() {
                label.push(':');
                label.push_str(command);
            }
        }

        let op = if rwbs.to_ascii_uppercase().contains('W') {
            OpKind::Write
        } else {
            OpKind::Read
        };

        let user_id = self.user_for_process(&label);
        self.requests
            .push(Request::new(user_id, op, arrival_ts, size_bytes));
        Ok(())
    }

    fn user_for_process(&mut self, process: &str) -> u32 {
        if let Some(&uid) = self.process_user_ids.get(process) {
            return uid;
        }
        let uid = self.next_auto_user_id;
        self.process_user_ids.insert(process.to_string(), uid);
        self.next_auto_user_id += 1;
        uid
    }
}

fn parse_timestamp_us(field: &str, line_no: usize) -> Result<f64, TraceError> {
    let ts_us: f64 = field.parse().map_err(|e| {
        TraceError::malformed(line_no, format!("invalid timestamp '{}': {}", field, e))
    })?;
    Ok(ts_us / 1_000_000.0)
}

fn parse_size(field: &str, line_no: usize) -> Result<u32, TraceError> {
    field.parse().map_err(|e| {
        TraceError::malformed(line_no, format!("invalid size '{}': {}", field, e))
    })
}

fn parse_op(field: &str, line_no: usize) -> Result<OpKind, TraceError> {
    match field.to_ascii_lowercase().as_str() {
        "read" => Ok(OpKind::Read),
        "write" => Ok(OpKind::Write),
        _ => Err(TraceError::UnknownOp {
            line: line_no,
            op: field.to_string(),
        }),
    }
}

/// Generate a synthetic trace: `count` 4 KiB requests spread uniformly over
/// `users` tenants with random 1–1000 µs inter-arrival gaps. Deterministic
/// for a given seed.
pub fn gen_trace(users: u32, count: usize, seed: u64) -> Vec<Request> {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut requests = Vec::with_capacity(count);
    let mut ts_us: u64 = 0;
    for _ in 0..count {
        let user_id = rng.gen_range(0..users.max(1));
        let op = if rng.gen_bool(0.5) {
            OpKind::Read
        } else {
            OpKind::Write
        };
        requests.push(Request::new(user_id, op, ts_us as f64 / 1_000_000.0, 4096));
        ts_us += rng.gen_range(1..=1000);
    }
    requests
}

/// Write requests as extended 6-column CSV, one `processN` label per tenant.
pub fn write_trace_csv(requests: &[Request], path: &Path) -> Result<(), TraceError> {
    use std::io::Write;

    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    writeln!(writer, "timestamp,process_id,user_id,type,address,size")?;
    for r in requests {
        writeln!(
            writer,
            "{:.0},process{},{},{},0,{}",
            r.arrival_ts * 1_000_000.0,
            r.user_id,
            r.user_id,
            r.op.as_str(),
            r.size_bytes,
        )?;
    }
    Ok(())
}
