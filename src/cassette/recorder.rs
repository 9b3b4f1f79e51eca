//! Records interactions into a cassette file.
//!
//! A call reserves its slot when it is issued and fills it when it completes.
//! Overlapping calls therefore land in the cassette in issue order, which is
//! the order the replayer hands them back out.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;

use super::format::{Cassette, Interaction};

/// A call that has been issued but may not have completed yet.
#[derive(Debug)]
struct Slot {
    port: String,
    method: String,
    input: serde_json::Value,
    output: Option<serde_json::Value>,
}

/// Collects interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    next_seq: u64,
    slots: BTreeMap<u64, Slot>,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            commit: commit.into(),
            next_seq: 0,
            slots: BTreeMap::new(),
        }
    }

    /// Reserve the next slot for a call that is about to be issued.
    ///
    /// Returns the slot's sequence number, to be passed to [`Self::complete`].
    pub fn reserve(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
    ) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert(
            seq,
            Slot { port: port.into(), method: method.into(), input, output: None },
        );
        seq
    }

    /// Store the output of a reserved call.
    ///
    /// Returns `false` if `seq` was never reserved.
    pub fn complete(&mut self, seq: u64, output: serde_json::Value) -> bool {
        match self.slots.get_mut(&seq) {
            Some(slot) => {
                slot.output = Some(output);
                true
            }
            None => false,
        }
    }

    /// Finish recording and write the cassette YAML file to disk.
    ///
    /// Interactions are written in reservation order and renumbered from
    /// zero. Slots that never completed are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        let reserved = self.slots.len();
        let interactions: Vec<Interaction> = self
            .slots
            .into_values()
            .filter_map(|slot| {
                let output = slot.output?;
                Some((slot.port, slot.method, slot.input, output))
            })
            .zip(0u64..)
            .map(|((port, method, input, output), seq)| Interaction {
                seq,
                port,
                method,
                input,
                output,
            })
            .collect();
        if interactions.len() < reserved {
            tracing::warn!(
                dropped = reserved - interactions.len(),
                "cassette has calls that never completed"
            );
        }

        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            commit: self.commit,
            interactions,
        };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path)
    }
}
