//! Shared test support: an in-memory transport with a controllable
//! completion schedule and a counter of fetches actually issued.

use std::collections::{HashMap, VecDeque};

use weft::fetch::{FetchFailure, FetchOutcome, FetchRequest, Transport};

/// Serves byte ranges from in-memory files. In auto mode completions are
/// queued as soon as a fetch begins; in manual mode they are held until
/// the test releases them, in whatever order it likes.
#[derive(Default)]
pub struct StubTransport {
    files: HashMap<String, Vec<u8>>,
    auto: bool,
    pub pending: Vec<FetchRequest>,
    ready: VecDeque<FetchOutcome>,
    pub fetch_count: usize,
}

impl StubTransport {
    pub fn auto() -> Self {
        Self {
            auto: true,
            ..Self::default()
        }
    }

    pub fn manual() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(path.to_string(), bytes);
        self
    }

    fn outcome_for(&self, request: &FetchRequest) -> FetchOutcome {
        let result = self
            .files
            .get(&request.path)
            .and_then(|bytes| {
                bytes
                    .get(request.range.start as usize..request.range.end as usize)
                    .map(<[u8]>::to_vec)
            })
            .ok_or_else(|| FetchFailure {
                status: 404,
                message: format!("no data for `{}`", request.path),
            });
        FetchOutcome {
            id: request.id.clone(),
            result,
        }
    }

    /// Releases the held request with the given id.
    pub fn release(&mut self, id: &str) {
        if let Some(pos) = self.pending.iter().position(|r| r.id == id) {
            let request = self.pending.remove(pos);
            let outcome = self.outcome_for(&request);
            self.ready.push_back(outcome);
        }
    }

    /// Releases every held request in reverse issue order.
    pub fn release_all_reversed(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for request in pending.into_iter().rev() {
            let outcome = self.outcome_for(&request);
            self.ready.push_back(outcome);
        }
    }

}

impl Transport for StubTransport {
    fn begin_fetch(&mut self, request: FetchRequest) {
        self.fetch_count += 1;
        if self.auto {
            let outcome = self.outcome_for(&request);
            self.ready.push_back(outcome);
        } else {
            self.pending.push(request);
        }
    }

    fn poll_outcome(&mut self) -> Option<FetchOutcome> {
        self.ready.pop_front()
    }

    fn wait_outcome(&mut self) -> Option<FetchOutcome> {
        self.ready.pop_front()
    }
}

/// Little-endian f32 payload.
pub fn f32_bytes(values: &[f32]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}

/// Little-endian u16 payload.
pub fn u16_bytes(values: &[u16]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}
