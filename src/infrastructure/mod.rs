mod fetcher_github;
mod fetcher_rate_limiter;
mod github_client;
mod harvester;
mod lister_github;
mod lister_paginated;
mod observer_log;
mod persister_filesystem;
mod rate_limiter;
mod report_writer;
mod scheduler_parallel;
mod scheduler_worker;

pub use fetcher_github::*;
pub use fetcher_rate_limiter::*;
pub use github_client::*;
pub use harvester::*;
pub use lister_github::*;
pub use lister_paginated::*;
pub use observer_log::*;
pub use persister_filesystem::*;
pub use rate_limiter::*;
pub use report_writer::*;
pub use scheduler_parallel::*;
pub use scheduler_worker::*;
