pub mod clock;
pub mod completion;
pub mod config_manager;
pub mod error;
pub mod reminder;
pub mod session;
pub mod storage;
pub mod traits;
pub mod types;

pub use clock::*;
pub use completion::*;
pub use config_manager::*;
pub use error::*;
pub use reminder::*;
pub use session::*;
pub use storage::*;
pub use traits::*;
pub use types::*;
