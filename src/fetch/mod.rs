pub mod coordinator;
pub mod transport;

pub use coordinator::{BufferSpec, Converter, FetchCoordinator, FetchEvent, ResourceData};
#[cfg(feature = "http")]
pub use transport::HttpRangeTransport;
pub use transport::{FetchFailure, FetchOutcome, FetchRequest, FileTransport, Transport};
