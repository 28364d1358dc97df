pub mod message;
pub mod record;
pub mod request;
pub mod response;
pub mod status;
