pub mod calendar;
pub mod date_recognizer;
pub mod discovery;
pub mod etl;
pub mod extractor;
pub mod pipeline;
pub mod window;

pub use crate::domain::model::{FeedResult, ServiceEvent};
pub use crate::domain::ports::{ConfigProvider, PageFetcher, Pipeline, Storage};
pub use crate::utils::error::Result;
