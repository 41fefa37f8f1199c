pub mod auth;

pub mod grading;

pub mod system;

#[cfg(test)]
pub(crate) mod test_app;

pub use auth::configure_auth_routes;
pub use grading::configure_grading_routes;
pub use system::configure_system_routes;
