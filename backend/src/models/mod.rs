pub mod commit;
pub mod diagnostic;
pub mod repository;

pub use commit::*;
pub use diagnostic::*;
pub use repository::*;
