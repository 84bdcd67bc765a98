//! Deduplicated, memoized byte-range fetching.
//!
//! The coordinator is the single gate between the resolution pipeline and
//! the transport: each distinct resource id is fetched at most once, every
//! successful resolution is cached for the coordinator's lifetime, and all
//! consumers waiting on an in-flight id are notified together when it
//! resolves.

use std::collections::hash_map::Entry;
use std::ops::Range;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::document::ElementType;
use crate::errors::{Result, WeftError};
use crate::fetch::transport::{FetchFailure, FetchOutcome, FetchRequest, Transport};

/// How raw fetched bytes become a typed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// `count` 16-bit index elements.
    IndexU16 { count: u32 },
    /// `count` elements of `components` packed f32 values each.
    FloatArray { count: u32, components: u32 },
}

/// A typed resource produced by a converter, shared by every waiter.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceData {
    U16(Vec<u16>),
    F32(Vec<f32>),
}

/// Everything needed to issue one byte-range fetch: the logical id, the
/// source path, and where the typed element range sits inside the source.
#[derive(Debug, Clone)]
pub struct BufferSpec {
    pub id: String,
    pub path: String,
    /// Buffer-view base offset plus the record's local byte offset.
    pub byte_offset: u64,
    pub element_type: ElementType,
    pub count: u32,
}

impl BufferSpec {
    /// Absolute byte range of the element data, end exclusive.
    #[must_use]
    pub fn byte_range(&self) -> Range<u64> {
        let len = self.element_type.byte_size() * u64::from(self.count);
        self.byte_offset..self.byte_offset + len
    }
}

/// Result of dispatching one transport completion: the resolved (or
/// failed) resource together with every consumer context that was waiting
/// on it.
#[derive(Debug)]
pub enum FetchEvent<C> {
    Resolved {
        id: String,
        data: Arc<ResourceData>,
        waiters: Vec<C>,
    },
    Failed {
        id: String,
        failure: FetchFailure,
        waiters: Vec<C>,
    },
}

struct InFlight<C> {
    converter: Converter,
    waiters: Vec<C>,
}

/// Deduplicates in-flight and completed fetches by resource id.
pub struct FetchCoordinator<C> {
    resources: FxHashMap<String, Arc<ResourceData>>,
    in_flight: FxHashMap<String, InFlight<C>>,
}

impl<C> Default for FetchCoordinator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FetchCoordinator<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources: FxHashMap::default(),
            in_flight: FxHashMap::default(),
        }
    }

    /// Memoized fast path: a previously resolved id returns its cached
    /// value synchronously and `waiter` is not registered. Otherwise
    /// returns `None`; the first request for an id starts the fetch and
    /// any further request for the same id only adds a waiter.
    pub fn get_buffer(
        &mut self,
        spec: &BufferSpec,
        converter: Converter,
        waiter: C,
        transport: &mut impl Transport,
    ) -> Option<Arc<ResourceData>> {
        if let Some(data) = self.resources.get(&spec.id) {
            return Some(data.clone());
        }

        match self.in_flight.entry(spec.id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().waiters.push(waiter);
            }
            Entry::Vacant(entry) => {
                entry.insert(InFlight {
                    converter,
                    waiters: vec![waiter],
                });
                transport.begin_fetch(FetchRequest {
                    id: spec.id.clone(),
                    path: spec.path.clone(),
                    range: spec.byte_range(),
                });
            }
        }

        None
    }

    /// Dispatches one transport completion. Converts the payload once,
    /// caches it under the id, and hands back every waiter so the caller
    /// can route the typed value to each of them.
    pub fn complete(&mut self, outcome: FetchOutcome) -> Option<FetchEvent<C>> {
        let Some(in_flight) = self.in_flight.remove(&outcome.id) else {
            log::warn!("fetch completion for unknown request id `{}`", outcome.id);
            return None;
        };

        match outcome.result {
            Ok(bytes) => match convert(in_flight.converter, &bytes, &outcome.id) {
                Ok(data) => {
                    let data = Arc::new(data);
                    self.store_resource(&outcome.id, data.clone());
                    Some(FetchEvent::Resolved {
                        id: outcome.id,
                        data,
                        waiters: in_flight.waiters,
                    })
                }
                Err(err) => Some(FetchEvent::Failed {
                    id: outcome.id,
                    failure: FetchFailure {
                        status: 0,
                        message: err.to_string(),
                    },
                    waiters: in_flight.waiters,
                }),
            },
            Err(failure) => Some(FetchEvent::Failed {
                id: outcome.id,
                failure,
                waiters: in_flight.waiters,
            }),
        }
    }

    fn store_resource(&mut self, id: &str, data: Arc<ResourceData>) {
        if id.is_empty() {
            log::error!("resource has no id, cannot store");
            return;
        }
        if self.resources.contains_key(id) {
            log::warn!("resource `{id}` is already stored, overriding");
        }
        self.resources.insert(id.to_string(), data);
    }

    #[must_use]
    pub fn contains_resource(&self, id: &str) -> bool {
        self.resources.contains_key(id)
    }

    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Clears the memoized resource cache.
    pub fn remove_all_resources(&mut self) {
        self.resources.clear();
    }
}

fn convert(converter: Converter, bytes: &[u8], id: &str) -> Result<ResourceData> {
    match converter {
        Converter::IndexU16 { count } => {
            let needed = count as usize * 2;
            if bytes.len() < needed {
                return Err(WeftError::ShortPayload {
                    id: id.to_string(),
                    expected: needed,
                    actual: bytes.len(),
                });
            }
            Ok(ResourceData::U16(bytemuck::pod_collect_to_vec(
                &bytes[..needed],
            )))
        }
        Converter::FloatArray { count, components } => {
            let needed = count as usize * components as usize * 4;
            if bytes.len() < needed {
                return Err(WeftError::ShortPayload {
                    id: id.to_string(),
                    expected: needed,
                    actual: bytes.len(),
                });
            }
            Ok(ResourceData::F32(bytemuck::pod_collect_to_vec(
                &bytes[..needed],
            )))
        }
    }
}
