//! The byte-range fetch primitive.
//!
//! A [`Transport`] starts fetches without blocking and delivers completion
//! events when asked, so all resolution logic runs on one logical thread
//! and tests can replay completions in any order.

use std::collections::VecDeque;
use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// A byte-range fetch issued by the fetch coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Logical resource id; echoed back in the outcome.
    pub id: String,
    /// Source path, relative to the transport's root.
    pub path: String,
    /// Absolute byte range inside the source, end exclusive.
    pub range: Range<u64>,
}

/// Why a fetch failed.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    /// HTTP-style status code; 0 for non-HTTP failures.
    pub status: u16,
    pub message: String,
}

/// Completion event delivered by a transport.
#[derive(Debug)]
pub struct FetchOutcome {
    pub id: String,
    pub result: Result<Vec<u8>, FetchFailure>,
}

/// Asynchronous byte-range fetch source.
pub trait Transport {
    /// Starts a fetch. Must not block on the transfer; the result is
    /// delivered later through [`Transport::poll_outcome`].
    fn begin_fetch(&mut self, request: FetchRequest);

    /// Non-blocking: the next completion event, if one has arrived.
    fn poll_outcome(&mut self) -> Option<FetchOutcome>;

    /// Blocking: waits for the next completion event. Returns `None` once
    /// no fetch remains outstanding.
    fn wait_outcome(&mut self) -> Option<FetchOutcome>;
}

/// Reads byte ranges from files under a root directory. Completions are
/// queued immediately; they still flow through the same event path as a
/// network transport.
pub struct FileTransport {
    root: PathBuf,
    ready: VecDeque<FetchOutcome>,
}

impl FileTransport {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        let path = root.as_ref();
        let root = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self {
            root,
            ready: VecDeque::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_range(&self, request: &FetchRequest) -> std::io::Result<Vec<u8>> {
        let mut file = std::fs::File::open(self.root.join(&request.path))?;
        file.seek(SeekFrom::Start(request.range.start))?;
        let len = (request.range.end - request.range.start) as usize;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl Transport for FileTransport {
    fn begin_fetch(&mut self, request: FetchRequest) {
        let result = self.read_range(&request).map_err(|e| FetchFailure {
            status: 0,
            message: e.to_string(),
        });
        self.ready.push_back(FetchOutcome {
            id: request.id,
            result,
        });
    }

    fn poll_outcome(&mut self) -> Option<FetchOutcome> {
        self.ready.pop_front()
    }

    fn wait_outcome(&mut self) -> Option<FetchOutcome> {
        self.ready.pop_front()
    }
}

/// HTTP transport issuing partial-content requests via `ehttp`.
///
/// Completions arrive on ehttp's worker threads and are handed back to the
/// pump thread over a channel.
#[cfg(feature = "http")]
pub struct HttpRangeTransport {
    root_url: String,
    outstanding: usize,
    tx: flume::Sender<FetchOutcome>,
    rx: flume::Receiver<FetchOutcome>,
}

#[cfg(feature = "http")]
impl HttpRangeTransport {
    #[must_use]
    pub fn new(root_url: &str) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            root_url: root_url.trim_end_matches('/').to_string(),
            outstanding: 0,
            tx,
            rx,
        }
    }

    fn join(&self, path: &str) -> String {
        format!("{}/{}", self.root_url, path.trim_start_matches('/'))
    }
}

#[cfg(feature = "http")]
impl Transport for HttpRangeTransport {
    fn begin_fetch(&mut self, request: FetchRequest) {
        let mut req = ehttp::Request::get(self.join(&request.path));
        // HTTP ranges are inclusive on both ends
        req.headers.insert(
            "Range",
            format!("bytes={}-{}", request.range.start, request.range.end - 1),
        );

        let tx = self.tx.clone();
        let id = request.id;
        self.outstanding += 1;
        ehttp::fetch(req, move |result| {
            let outcome = match result {
                Ok(response) if response.status == 200 || response.status == 206 => FetchOutcome {
                    id,
                    result: Ok(response.bytes),
                },
                Ok(response) => FetchOutcome {
                    id,
                    result: Err(FetchFailure {
                        status: response.status,
                        message: response.status_text,
                    }),
                },
                Err(message) => FetchOutcome {
                    id,
                    result: Err(FetchFailure {
                        status: 0,
                        message,
                    }),
                },
            };
            let _ = tx.send(outcome);
        });
    }

    fn poll_outcome(&mut self) -> Option<FetchOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => {
                self.outstanding -= 1;
                Some(outcome)
            }
            Err(_) => None,
        }
    }

    fn wait_outcome(&mut self) -> Option<FetchOutcome> {
        if self.outstanding == 0 {
            return None;
        }
        match self.rx.recv() {
            Ok(outcome) => {
                self.outstanding -= 1;
                Some(outcome)
            }
            Err(_) => None,
        }
    }
}
