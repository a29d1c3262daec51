pub mod category;
pub use category::*;

pub mod type_info;
pub use type_info::*;

pub mod inspector;
pub use inspector::*;
