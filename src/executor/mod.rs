pub mod helpers;
pub use helpers::*;

pub mod execution_config;
pub use execution_config::*;

pub mod function_call;
pub use function_call::*;

pub mod scalar_executor;
pub use scalar_executor::*;

pub mod aggregate_executor;
pub use aggregate_executor::*;
