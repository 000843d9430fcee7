//! Data access functions

use super::single_arg;
use crate::ast::quote_string;
use crate::rich_text::Fragment;
use tessera_core::document::join_path;
use tessera_core::{ConversionMode, FormulaError, FormulaResult, FormulaValue, Inline, RuntimeContext};

/// GET(path): resolve a dotted data path through the runtime context
pub fn fn_get(args: &[FormulaValue], ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let path = single_arg("get", args)?.as_string();
    ctx.get(&path)
}

/// GET_PROPERTY(json_object, key)
///
/// The object is JSON text; a missing key yields null.
pub fn fn_get_property(
    args: &[FormulaValue],
    _ctx: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    let (object, key) = match args {
        [object, key] => (object, key.as_string()),
        _ => {
            return Err(FormulaError::ArgumentCount {
                function: "get_property".to_string(),
                expected: "2".to_string(),
                actual: args.len(),
            })
        }
    };

    let text = match object {
        FormulaValue::String(text) => text,
        other => {
            return Err(FormulaError::evaluation(format!(
                "get_property expects a JSON object, got {}",
                other.type_name()
            )))
        }
    };

    let parsed: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        FormulaError::evaluation(format!("get_property expects a JSON object: {}", e))
    })?;

    match parsed {
        serde_json::Value::Object(map) => {
            Ok(map.get(&key).map(FormulaValue::from).unwrap_or_default())
        }
        _ => Err(FormulaError::evaluation(
            "get_property expects a JSON object",
        )),
    }
}

/// `get('a.b')` with a literal path becomes a data reference in both modes
pub fn get_to_node(args: &[Fragment], _mode: ConversionMode) -> Option<Fragment> {
    match args {
        [Fragment::Text { display, .. }] if !display.is_empty() => {
            Some(Fragment::Inline(Inline::data_reference(display)))
        }
        _ => None,
    }
}

/// Data references export as `get('a.b')`
pub fn get_from_node(inline: &Inline) -> Option<String> {
    match inline {
        Inline::DataReference { path } if !path.is_empty() => {
            Some(format!("get({})", quote_string(&join_path(path))))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tessera_core::EmptyContext;

    fn s(v: &str) -> FormulaValue {
        FormulaValue::string(v)
    }

    #[test]
    fn test_get() {
        let ctx = json!({"row": {"Name": "Apple"}});
        assert_eq!(fn_get(&[s("row.Name")], &ctx), Ok(s("Apple")));
        assert_eq!(
            fn_get(&[s("row.Color")], &ctx),
            Err(FormulaError::UnresolvedReference("row.Color".into()))
        );
    }

    #[test]
    fn test_get_property() {
        let object = s(r#"{"foo": "bar", "n": 2}"#);
        assert_eq!(
            fn_get_property(&[object.clone(), s("foo")], &EmptyContext),
            Ok(s("bar"))
        );
        assert_eq!(
            fn_get_property(&[object.clone(), s("n")], &EmptyContext),
            Ok(FormulaValue::Number(2.0))
        );
        assert_eq!(
            fn_get_property(&[object, s("baz")], &EmptyContext),
            Ok(FormulaValue::Null)
        );
        assert!(fn_get_property(&[s("foo"), s("foo")], &EmptyContext).is_err());
        assert!(fn_get_property(&[FormulaValue::Number(100.0), s("foo")], &EmptyContext).is_err());
        assert!(fn_get_property(&[s("[1, 2]"), s("foo")], &EmptyContext).is_err());
    }

    #[test]
    fn test_get_hooks() {
        let arg = Fragment::Text {
            display: "row.Name".into(),
            source: "'row.Name'".into(),
        };
        assert_eq!(
            get_to_node(&[arg], ConversionMode::Advanced),
            Some(Fragment::Inline(Inline::data_reference("row.Name")))
        );
        assert_eq!(get_to_node(&[Fragment::NewLine], ConversionMode::Simple), None);

        assert_eq!(
            get_from_node(&Inline::data_reference("row.it's")),
            Some(r"get('row.it\'s')".to_string())
        );
        assert_eq!(get_from_node(&Inline::DataReference { path: vec![] }), None);
        assert_eq!(get_from_node(&Inline::ClosingParen), None);
    }
}
