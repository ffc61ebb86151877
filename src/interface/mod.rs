mod fetcher;
mod lister;
mod observer;
mod persister;
mod reporter;
mod scheduler;

pub use fetcher::*;
pub use lister::*;
pub use observer::*;
pub use persister::*;
pub use reporter::*;
pub use scheduler::*;
