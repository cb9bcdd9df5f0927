use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use generals::ServerEvent;

/// Appends every received event to a JSON-lines file, for later replay.
pub struct Recorder {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Recorder {
    pub fn new(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Could not create recording '{}'", path.display()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, event: &ServerEvent) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        writeln!(self.writer)?;
        // Flush every line, so that the trace survives a crash
        self.writer.flush()?;
        Ok(())
    }
}

/// Reads a trace written by a [`Recorder`].
pub fn load_trace(path: &Path) -> anyhow::Result<Vec<ServerEvent>> {
    let file =
        File::open(path).with_context(|| format!("Could not open trace '{}'", path.display()))?;
    let mut events = Vec::new();
    for (line_idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str::<ServerEvent>(&line)
            .with_context(|| format!("Invalid event on line {}", line_idx + 1))?;
        events.push(event);
    }
    Ok(events)
}
