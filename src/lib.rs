//! ns-3 Video Trace Extractor
//!
//! Converts the per-frame metadata of MPEG-4 videos, as reported by ffprobe,
//! into trace files replayed by ns-3's `UdpTraceClient`.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod outcome;
pub mod probe;
pub mod sanitize;
pub mod trace;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::dispatch::{process_file, Dispatcher};
pub use crate::error::{Result, TraceError};
pub use crate::outcome::OutcomeCode;
pub use crate::probe::{parse_frames, Ffprobe, FrameProbe, FrameRecord, FrameRecordSet};
pub use crate::sanitize::{sanitize, InputSanitizer, RejectReason, Rejection, SanitizeReport};
pub use crate::trace::{render, render_line, TraceWriter};
