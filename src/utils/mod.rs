// Utils compartidos

pub mod constants;
pub mod dates;
pub mod navigation;
pub mod storage;

pub use constants::*;
pub use dates::*;
pub use navigation::*;
pub use storage::*;
