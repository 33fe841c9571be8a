mod analysis;
mod guide;
mod profile;

pub use analysis::*;
pub use guide::*;
pub use profile::*;
