pub mod mbf;

pub use mbf::{FloatError, Mbf};
