mod args;
mod driver;
mod progress;
mod types;
mod write;

pub use args::*;
pub use driver::{MZIsomerError, MZIsomerSolver};
pub use progress::ProgressRecord;
pub use types::*;
pub use write::*;
