pub mod distance;
pub mod index;
pub mod pairwise;
pub mod scorer;
pub mod util;
