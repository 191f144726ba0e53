pub mod plugin;
pub mod secret;
pub mod service_account;
