pub mod analysis;
pub mod dataset;
pub mod error;
pub mod imaging;
pub mod operations;
pub mod patching;

pub use analysis::*;
pub use dataset::*;
pub use error::{BuildError, BuildResult};
pub use imaging::*;
pub use patching::*;
