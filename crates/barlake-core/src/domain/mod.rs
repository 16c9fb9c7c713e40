pub mod frame;
pub mod symbol;
pub mod timestamp;

pub use frame::{OhlcvFrame, OhlcvRecord, RawCell, RawColumn, RawFrame};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
