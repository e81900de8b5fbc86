//! URL helpers for talking to the ERP gateway
//!
//! The gateway exposes two tiers: newer routes live at the API root, older
//! ones are still mounted under the `/products` router.

/// Prefix of the legacy router
pub const LEGACY_PREFIX: &str = "products";

/// Join the API base URL with a root-mounted path
///
/// # Example
/// ```rust
/// use warehouse_data::shared::api_utils::api_url;
/// assert_eq!(api_url("http://127.0.0.1:3000/api/", "quants"), "http://127.0.0.1:3000/api/quants");
/// ```
pub fn api_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Join the API base URL with a path served by the legacy `/products` router
///
/// # Example
/// ```rust
/// use warehouse_data::shared::api_utils::legacy_api_url;
/// assert_eq!(
///     legacy_api_url("http://127.0.0.1:3000/api", "lots"),
///     "http://127.0.0.1:3000/api/products/lots"
/// );
/// ```
pub fn legacy_api_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        LEGACY_PREFIX,
        path.trim_start_matches('/')
    )
}
