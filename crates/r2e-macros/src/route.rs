//! HTTP method and route-path parsing shared across `#[get]`/`#[post]`/... attributes.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Name of the `axum::routing::{get,post,...}` constructor for this method.
    pub fn as_routing_fn(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }
}

/// A route path literal, e.g. the `"/users/{id}"` in `#[get("/users/{id}")]`.
pub struct RoutePath {
    pub path: String,
}

impl syn::parse::Parse for RoutePath {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let lit: syn::LitStr = input.parse()?;
        Ok(RoutePath { path: lit.value() })
    }
}
