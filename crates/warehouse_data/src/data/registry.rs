//! Resource registry: which gateway route serves which collection.
//!
//! The table is kept verbatim rather than derived from key names: the mount
//! tier of a route cannot be guessed from its name (the legacy `/products`
//! router still serves lots, packages, categories, inventories, ...).

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::shared::api_utils::{api_url, legacy_api_url};

pub const PRODUCTS: &str = "products";
pub const LOCATIONS: &str = "locations";
pub const WAREHOUSES: &str = "warehouses";
pub const QUANTS: &str = "quants";
pub const PICKINGS: &str = "pickings";
pub const LOTS: &str = "lots";
pub const INVENTORY: &str = "inventory";
pub const INVENTORY_LINES: &str = "inventoryLines";
pub const STOCK_RULES: &str = "stockRules";
pub const LANDED_COSTS: &str = "landedCosts";

/// Registry entry of one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub key: &'static str,
    pub endpoint_path: &'static str,
    pub mounts_at_root: bool,
    pub response_field: &'static str,
}

const fn root(
    key: &'static str,
    endpoint_path: &'static str,
    response_field: &'static str,
) -> ResourceDescriptor {
    ResourceDescriptor {
        key,
        endpoint_path,
        mounts_at_root: true,
        response_field,
    }
}

const fn legacy(
    key: &'static str,
    endpoint_path: &'static str,
    response_field: &'static str,
) -> ResourceDescriptor {
    ResourceDescriptor {
        key,
        endpoint_path,
        mounts_at_root: false,
        response_field,
    }
}

/// Every collection the dashboard knows about
pub const RESOURCES: &[ResourceDescriptor] = &[
    // Catalogue
    root(PRODUCTS, "products", PRODUCTS),
    legacy("productTemplates", "templates", "templates"),
    legacy("productVariants", "variants", "variants"),
    legacy("categories", "categories", "categories"),
    legacy("attributes", "attributes", "attributes"),
    legacy("uom", "uom", "uoms"),
    legacy("barcodes", "barcodes", "barcodes"),
    // Topology
    root(WAREHOUSES, "warehouses", WAREHOUSES),
    root(LOCATIONS, "locations", LOCATIONS),
    legacy("storageCategories", "storage-categories", "storageCategories"),
    root("routes", "routes", "routes"),
    root(STOCK_RULES, "stock-rules", STOCK_RULES),
    root("putawayRules", "putaway-rules", "putawayRules"),
    root("reorderRules", "reordering-rules", "orderpoints"),
    // Stock
    root(QUANTS, "quants", QUANTS),
    legacy(LOTS, "lots", LOTS),
    legacy("packages", "packages", "packages"),
    legacy("packageTypes", "package-types", "packageTypes"),
    legacy(INVENTORY, "inventory", "inventories"),
    legacy(INVENTORY_LINES, "inventory-lines", "lines"),
    root("scraps", "scraps", "scraps"),
    root("valuationLayers", "valuation-layers", "layers"),
    // Operations
    root(PICKINGS, "pickings", PICKINGS),
    root("pickingTypes", "picking-types", "pickingTypes"),
    root("stockMoves", "stock-moves", "moves"),
    root("stockMoveLines", "stock-move-lines", "moveLines"),
    root("batches", "picking-batches", "batches"),
    root("waves", "picking-waves", "waves"),
    root("backorders", "backorders", "backorders"),
    root("returns", "returns", "returns"),
    root("moveHistory", "move-history", "history"),
    // Logistics and costing
    root("deliveryCarriers", "carriers", "carriers"),
    root(LANDED_COSTS, "landed-costs", LANDED_COSTS),
    root("partners", "partners", "partners"),
    legacy("suppliers", "suppliers", "suppliers"),
    root("companies", "companies", "companies"),
    root("users", "users", "users"),
    // Reporting
    root("stockReport", "reports/stock", "report"),
];

static INDEX: Lazy<HashMap<&'static str, &'static ResourceDescriptor>> =
    Lazy::new(|| RESOURCES.iter().map(|d| (d.key, d)).collect());

/// All registered descriptors, in table order
pub fn all() -> &'static [ResourceDescriptor] {
    RESOURCES
}

pub fn descriptor(key: &str) -> Option<&'static ResourceDescriptor> {
    INDEX.get(key).copied()
}

/// Endpoint path of a key; unregistered keys are used as the path itself
pub fn resolve_endpoint(key: &str) -> &str {
    descriptor(key).map(|d| d.endpoint_path).unwrap_or(key)
}

/// Absolute URL: `{base}/{path}` for root-mounted keys, `{base}/products/{path}` otherwise
pub fn resolve_url(key: &str, path: &str, base_url: &str) -> String {
    match descriptor(key) {
        Some(d) if d.mounts_at_root => api_url(base_url, path),
        _ => legacy_api_url(base_url, path),
    }
}

/// Property of the response body holding the result array
pub fn resolve_response_field(key: &str) -> &str {
    descriptor(key).map(|d| d.response_field).unwrap_or(key)
}

/// Store slot a key writes to; `None` means writes are dropped
pub fn resolve_setter(key: &str) -> Option<&'static str> {
    descriptor(key).map(|d| d.key)
}
