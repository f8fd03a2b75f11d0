mod draft;
mod optimization;
mod user;

pub use draft::*;
pub use optimization::*;
pub use user::*;
