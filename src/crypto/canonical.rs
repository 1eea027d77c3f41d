use crate::fields::FieldMap;

/// Build the canonical `k1=v1&k2=v2` string used as signing input.
///
/// Keys come out in ascending order, pairs with empty values are dropped
/// entirely, and no URL encoding is applied.
pub fn canonicalize(fields: &FieldMap) -> String {
    fields
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
