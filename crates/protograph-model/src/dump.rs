//! Diagnostic rendering of graphs and member tables

use crate::value::Value;

/// Render a value graph as pretty-printed JSON for logs and debugging
///
/// Rendering never fails: unserializable content degrades to a placeholder.
#[must_use]
pub fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "<unrenderable>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::TypeName;
    use crate::value::StructValue;

    #[test]
    fn renders_structs_with_fields() {
        let mut employee = StructValue::new(TypeName::new("Employee"));
        employee.set_field("name", Value::Text("bob".into()));
        let rendered = render(&Value::Struct(employee));
        assert!(rendered.contains("\"name\""));
        assert!(rendered.contains("bob"));
    }
}
