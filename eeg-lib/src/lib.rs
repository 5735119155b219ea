pub mod assembler;
pub mod constants;
pub mod consumer;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod gain;
pub mod handoff;
pub mod port;
pub mod session;
pub mod synthetic;


// Re-export the main pipeline types for easy access
pub use assembler::FrameAssembler;
pub use consumer::{ConsumerReport, run_consumer};
pub use decoder::{ChannelValues, decode_bytes, decode_frame};
pub use error::EegError;
pub use frame::Frame;
pub use gain::{GainSource, GainStore};
pub use handoff::{FrameReceiver, FrameSender, SendOutcome};
pub use session::{SessionConfig, SessionEnd, SessionReport, SourceKind};
pub use synthetic::SyntheticSource;
