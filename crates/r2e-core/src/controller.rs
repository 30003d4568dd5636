use std::future::Future;
use std::pin::Pin;

use crate::config::{MissingKeyError, R2eConfig};
use crate::http::Router;
use crate::meta::MetaRegistry;

/// Implemented by the `#[derive(Controller)]` macro for every controller
/// struct. `T` is the application state type the controller is mounted on.
pub trait Controller<T: Clone + Send + Sync + 'static> {
    /// Build this controller's router, with its path prefix already nested.
    fn routes() -> Router<T>;

    /// Wrap any pre-auth-guarded routes with their guard middleware.
    ///
    /// Default implementation does nothing — most controllers have no
    /// `#[pre_auth_guard(...)]` routes.
    fn apply_pre_auth_guards(router: Router<T>, _state: &T) -> Router<T> {
        router
    }

    /// Push this controller's route metadata into the registry.
    ///
    /// Used for OpenAPI spec generation. Default implementation pushes nothing.
    fn register_meta(_registry: &mut MetaRegistry) {}

    /// Register event consumers declared on this controller.
    ///
    /// Called during `serve()` with the application state, before startup hooks.
    /// Default implementation does nothing.
    fn register_consumers(
        _state: T,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async {})
    }

    /// Validate this controller's `#[config(...)]` keys against `config`.
    ///
    /// Default implementation reports no errors.
    fn validate_config(_config: &R2eConfig) -> Vec<MissingKeyError> {
        Vec::new()
    }
}

/// Implemented for controllers with no `#[inject(identity)]` fields: lets the
/// framework construct a controller instance directly from application
/// state, without going through a request.
pub trait StatefulConstruct<T> {
    fn from_state(state: &T) -> Self;
}
