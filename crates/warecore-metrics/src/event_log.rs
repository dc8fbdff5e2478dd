//! Persistent event log covering exactly the §6 `Log` surface: an
//! in-memory buffer every caller can read back immediately, plus
//! optional durable persistence in a `sled` tree for offline replay.
//! No chart/report/PDF generation here (§1 Non-goal: no statistics/
//! reporting surface).

use crate::event::{LogEntry, LogKind};
use sled::{Db, Tree};
use std::io;
use std::path::Path;
use warecore_ids::Tick;

/// Append-only, in-memory record of every event logged this run. Always
/// present, regardless of whether durable persistence is enabled.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tick: Tick, kind: LogKind) {
        self.entries.push(LogEntry { tick, kind });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `EventLog` plus an optional `sled`-backed mirror for durable replay.
pub struct EventLogWriter {
    log: EventLog,
    sink: Option<PersistentSink>,
}

struct PersistentSink {
    db: Db,
    events: Tree,
    next_id: u64,
}

impl EventLogWriter {
    /// An in-memory-only writer (the default; matches simulation mode,
    /// where nothing outlives the process).
    pub fn in_memory() -> Self {
        Self { log: EventLog::new(), sink: None }
    }

    /// A writer that also mirrors every event into a `sled` database at
    /// `path`, surviving process restarts.
    pub fn with_persistence(path: &Path) -> io::Result<Self> {
        let db = sled::open(path).map_err(|e| io::Error::other(format!("sled error: {e}")))?;
        let events = db
            .open_tree("events")
            .map_err(|e| io::Error::other(format!("sled error: {e}")))?;
        let next_id = events.len() as u64;
        Ok(Self {
            log: EventLog::new(),
            sink: Some(PersistentSink { db, events, next_id }),
        })
    }

    /// Record an event (§6 `Log(kind)`), mirroring to disk if persistence
    /// is enabled.
    pub fn record(&mut self, tick: Tick, kind: LogKind) -> io::Result<()> {
        self.log.record(tick, kind.clone());
        if let Some(sink) = &mut self.sink {
            let entry = LogEntry { tick, kind };
            let key = sink.next_id.to_be_bytes();
            sink.next_id += 1;
            let value = serde_json::to_vec(&entry)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            sink.events
                .insert(key, value)
                .map_err(|e| io::Error::other(format!("sled error: {e}")))?;
        }
        Ok(())
    }

    pub fn flush(&self) -> io::Result<()> {
        if let Some(sink) = &self.sink {
            sink.db.flush().map_err(|e| io::Error::other(format!("sled error: {e}")))?;
        }
        Ok(())
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }
}

impl Drop for EventLogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecore_ids::{AgentId, TaskId};

    #[test]
    fn test_in_memory_writer_buffers_entries() {
        let mut writer = EventLogWriter::in_memory();
        writer
            .record(Tick::new(1), LogKind::TaskAssigned { task_id: TaskId::new(0), agent_id: AgentId::new(0) })
            .unwrap();
        assert_eq!(writer.log().len(), 1);
    }

    #[test]
    fn test_persistent_writer_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events");
        {
            let mut writer = EventLogWriter::with_persistence(&path).unwrap();
            writer
                .record(Tick::new(5), LogKind::OrderFulfilled { order_id: warecore_ids::OrderId::new(1) })
                .unwrap();
            writer.flush().unwrap();
        }
        let writer = EventLogWriter::with_persistence(&path).unwrap();
        let sink = writer.sink.as_ref().unwrap();
        assert_eq!(sink.events.len(), 1);
    }
}
