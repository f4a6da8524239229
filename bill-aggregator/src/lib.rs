pub mod types;
pub mod config;
pub mod db;
pub mod traits;
pub mod filters;
pub mod legiscan;
pub mod bill_manager;
pub mod user_manager;
pub mod keyword_manager;
pub mod interaction_manager;
pub mod ad_manager;
pub mod digest;
pub mod tracker;
pub mod scheduler;

pub use types::*;
pub use config::Config;
pub use traits::{BillSearch, DigestMailer};
pub use legiscan::{LegiscanClient, LegiscanStatus};
pub use bill_manager::BillManager;
pub use user_manager::UserManager;
pub use keyword_manager::KeywordManager;
pub use interaction_manager::InteractionManager;
pub use ad_manager::AdManager;
pub use digest::{collect_digests, dispatch_digests, is_upcoming_bill, KeywordEntry};
pub use tracker::{BillTracker, SearchParams};
pub use scheduler::DigestScheduler;
