pub mod demo;
pub mod drug;
pub mod ingest;
pub mod normalize;
pub mod options;
pub mod results;
pub mod session;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use demo::demo_drugs;
pub use drug::{Category, Drug};
pub use ingest::{IngestError, SourceFormat, load_bytes, load_path, load_source, parse_records};
pub use normalize::{RawRecord, normalize_records, normalize_value};
pub use options::{AnswerOption, generate_options};
pub use results::{Summary, accuracy};
pub use session::{
    ATTEMPTS_PER_ROUND, MIN_POOL_SIZE, MissedAttribute, MissedItem, POINTS_PER_CORRECT, Phase,
    REQUIRED_SELECTIONS, RoundOutcome, Session, SessionError, SessionStats, Verdict,
};
