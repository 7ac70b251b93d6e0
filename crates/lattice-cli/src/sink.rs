//! JSONL snapshot sink.
//!
//! One JSON object per line, tagged with the stage that produced it.
//! The writer is flushed after every batch, so lines for completed
//! stages are durable before the next stage starts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lattice_pipeline::{FlushBatch, GraphSink};
use serde_json::json;

pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl GraphSink for JsonlSink {
    fn flush(&mut self, batch: FlushBatch<'_>) -> anyhow::Result<()> {
        for entity in batch.entities {
            let line = json!({
                "kind": "entity",
                "stage": batch.stage.as_str(),
                "entity": entity,
            });
            writeln!(self.writer, "{}", line)?;
        }
        for relationship in batch.relationships {
            let line = json!({
                "kind": "relationship",
                "stage": batch.stage.as_str(),
                "relationship": relationship,
            });
            writeln!(self.writer, "{}", line)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
