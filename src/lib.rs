pub mod cache;
pub mod call_names;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod formats;
pub mod handlers;
pub mod interval;
pub mod source;
pub mod storage;
pub mod types;
pub mod variant;

pub use config::Config;
pub use error::{Error, Result};
pub use events::{DataEvent, Subscription, Topic};
pub use interval::{ContigInterval, GenomeRange};
pub use source::VariantDataSource;
pub use variant::{Call, Variant, VariantContext};
