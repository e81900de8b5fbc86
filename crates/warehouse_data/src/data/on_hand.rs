//! "On Hand" view of quants: stock sitting in internal locations with
//! something actually available.

use std::collections::HashMap;

use crate::shared::records::{number_field, record_id, relation_id, str_field, Record};

const INTERNAL_USAGE: &str = "internal";

/// Keep quants whose location is internal and whose available quantity is > 0
///
/// Location usage is looked up in `locations`; when that collection is not
/// loaded yet no quant can match and the result is empty.
pub fn filter_on_hand(quants: Vec<Record>, locations: &[Record]) -> Vec<Record> {
    let usage_by_location: HashMap<i64, &str> = locations
        .iter()
        .filter_map(|loc| Some((record_id(loc)?, str_field(loc, "usage")?)))
        .collect();

    quants
        .into_iter()
        .filter(|quant| {
            let internal = quant
                .get("location_id")
                .and_then(relation_id)
                .and_then(|id| usage_by_location.get(&id))
                .is_some_and(|usage| *usage == INTERNAL_USAGE);
            internal && available_quantity(quant) > 0.0
        })
        .collect()
}

/// `available_quantity`, falling back to `quantity`, then 0
pub fn available_quantity(quant: &Record) -> f64 {
    number_field(quant, "available_quantity")
        .or_else(|| number_field(quant, "quantity"))
        .unwrap_or(0.0)
}
