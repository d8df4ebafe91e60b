pub mod logger;
pub mod paging;
