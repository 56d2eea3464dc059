use serde_json::Value;

use super::model::Attributes;

/// Flatten nested objects into dot-path keys (`http.request.method`).
///
/// Arrays are kept intact as a single value. An empty nested object is
/// kept as `{}` so that no source field disappears. Flattening an already
/// flat mapping returns it unchanged.
pub fn flatten<'a, I>(fields: I) -> Attributes
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    let mut out = Attributes::new();
    for (key, value) in fields {
        flatten_into(key, value, &mut out);
    }
    out
}

fn flatten_into(path: &str, value: &Value, out: &mut Attributes) {
    match value {
        Value::Object(obj) if !obj.is_empty() => {
            for (key, nested) in obj {
                let nested_path = format!("{}.{}", path, key);
                flatten_into(&nested_path, nested, out);
            }
        }
        _ => {
            out.insert(path.to_string(), value.clone());
        }
    }
}
