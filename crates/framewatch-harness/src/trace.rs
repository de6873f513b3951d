#![forbid(unsafe_code)]

//! Per-tick trace with JSONL export and a deterministic digest chain.
//!
//! Each line is one sweep:
//!
//! ```json
//! {"event":"tick","tick":2,"swept":true,"invoked":3,"redraws":1,"redraw_requests":1,
//!  "detached":0,"failures":[],"elapsed_us":12,"digest":"9f0c…"}
//! ```
//!
//! The digest chains every deterministic field of every tick so far
//! (everything except `elapsed_us`). Two runs of the same scenario produce
//! the same final digest.

use framewatch_runtime::TickReport;
use serde_json::json;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub tick: u64,
    pub swept: bool,
    pub invoked: usize,
    pub redraws: usize,
    /// Redraw requests the host received during the tick, eager ones
    /// included.
    pub redraw_requests: usize,
    pub detached: usize,
    pub failures: Vec<String>,
    pub elapsed_us: u64,
    pub digest: String,
}

impl TraceEntry {
    fn to_json(&self) -> serde_json::Value {
        json!({
            "event": "tick",
            "tick": self.tick,
            "swept": self.swept,
            "invoked": self.invoked,
            "redraws": self.redraws,
            "redraw_requests": self.redraw_requests,
            "detached": self.detached,
            "failures": self.failures,
            "elapsed_us": self.elapsed_us,
            "digest": self.digest,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct TickTrace {
    entries: Vec<TraceEntry>,
    chain: [u8; 32],
}

impl TickTrace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one tick.
    pub fn record(&mut self, report: &TickReport, redraw_requests: usize) {
        let failures: Vec<String> = report
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.component, f.error))
            .collect();

        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.chain);
        hasher.update(&report.tick.to_le_bytes());
        hasher.update(&[u8::from(report.swept)]);
        for count in [
            report.invoked,
            report.redraws,
            redraw_requests,
            report.detached,
        ] {
            hasher.update(&(count as u64).to_le_bytes());
        }
        for failure in &report.failures {
            hasher.update(failure.error.to_string().as_bytes());
        }
        self.chain = *hasher.finalize().as_bytes();

        self.entries.push(TraceEntry {
            tick: report.tick,
            swept: report.swept,
            invoked: report.invoked,
            redraws: report.redraws,
            redraw_requests,
            detached: report.detached,
            failures,
            elapsed_us: report.elapsed.as_micros() as u64,
            digest: blake3::Hash::from(self.chain).to_hex().to_string(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Digest after the last recorded tick, `None` if nothing was recorded.
    #[must_use]
    pub fn final_digest(&self) -> Option<&str> {
        self.entries.last().map(|e| e.digest.as_str())
    }

    /// Serialize as JSONL, one object per tick plus a closing summary line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_json().to_string());
            out.push('\n');
        }
        let total_redraws: usize = self.entries.iter().map(|e| e.redraw_requests).sum();
        let summary = json!({
            "event": "trace_summary",
            "ticks": self.entries.len(),
            "redraw_requests": total_redraws,
            "final_digest": self.final_digest(),
        });
        out.push_str(&summary.to_string());
        out
    }
}
