mod merge_clusters;
mod proximity;

pub use merge_clusters::*;
pub use proximity::*;
