mod admin_controller;
mod health_controller;
mod webhook_controller;

pub use admin_controller::AdminController;
pub use health_controller::HealthController;
pub use webhook_controller::WebhookController;
