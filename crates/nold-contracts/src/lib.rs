pub mod listing;
pub mod pricing;
pub mod prompt;
pub mod request;
pub mod response;
pub mod response_log;
