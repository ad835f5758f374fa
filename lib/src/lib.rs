mod error;
mod multipart;
mod payload;
mod shrink;
mod thumbnail;
mod upload;

pub use error::*;
pub use multipart::*;
pub use payload::*;
pub use shrink::*;
pub use thumbnail::*;
pub use upload::*;
