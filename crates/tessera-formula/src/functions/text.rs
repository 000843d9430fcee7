//! Text functions

use super::single_arg;
use crate::rich_text::{display_run, Fragment};
use tessera_core::{ConversionMode, FormulaResult, FormulaValue, Inline, RuntimeContext, Wrapper};

/// CONCAT(value, value, ...)
///
/// Lists contribute their items joined with `,`.
pub fn fn_concat(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let joined: String = args.iter().map(FormulaValue::as_string).collect();
    Ok(FormulaValue::String(joined))
}

/// UPPER(text)
pub fn fn_upper(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let text = single_arg("upper", args)?;
    Ok(FormulaValue::String(text.as_string().to_uppercase()))
}

/// LOWER(text)
pub fn fn_lower(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let text = single_arg("lower", args)?;
    Ok(FormulaValue::String(text.as_string().to_lowercase()))
}

/// CAPITALIZE(text): first character upper case, the rest lower case
pub fn fn_capitalize(
    args: &[FormulaValue],
    _ctx: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    let text = single_arg("capitalize", args)?.as_string();
    let mut chars = text.chars();
    let capitalized = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    };
    Ok(FormulaValue::String(capitalized))
}

/// Lays `concat` out as a text template in simple mode: text and data
/// references flow inline and `'\n'` arguments start a new paragraph.
pub fn concat_to_node(args: &[Fragment], mode: ConversionMode) -> Option<Fragment> {
    if mode != ConversionMode::Simple {
        return None;
    }

    let mut paragraphs: Vec<Vec<Inline>> = vec![Vec::new()];
    for arg in args {
        match arg {
            Fragment::Text { display, .. } => paragraphs.last_mut()?.push(display_run(display)),
            Fragment::Inline(inline @ Inline::DataReference { .. }) => {
                paragraphs.last_mut()?.push(inline.clone())
            }
            Fragment::NewLine => paragraphs.push(Vec::new()),
            _ => return None,
        }
    }

    let mut wrappers: Vec<Wrapper> = paragraphs.into_iter().map(Wrapper::new).collect();
    if wrappers.len() == 1 {
        wrappers.pop().map(Fragment::Wrapper)
    } else {
        Some(Fragment::Wrappers(wrappers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tessera_core::{EmptyContext, ZERO_WIDTH_SPACE};

    fn s(v: &str) -> FormulaValue {
        FormulaValue::string(v)
    }

    fn text(v: &str) -> Fragment {
        Fragment::Text {
            display: v.to_string(),
            source: format!("'{}'", v),
        }
    }

    #[test]
    fn test_concat() {
        assert_eq!(fn_concat(&[s("a"), s("b")], &EmptyContext), Ok(s("ab")));
        assert_eq!(
            fn_concat(
                &[FormulaValue::from(vec!["Apple", "Banana"]), s("Cherry")],
                &EmptyContext
            ),
            Ok(s("Apple,BananaCherry"))
        );
        assert_eq!(
            fn_concat(&[FormulaValue::Number(1.0), FormulaValue::Boolean(true)], &EmptyContext),
            Ok(s("1true"))
        );
    }

    #[test]
    fn test_case_functions() {
        assert_eq!(fn_upper(&[s("Apple")], &EmptyContext), Ok(s("APPLE")));
        assert_eq!(fn_lower(&[s("ApPle")], &EmptyContext), Ok(s("apple")));
        assert_eq!(fn_capitalize(&[s("ApPle")], &EmptyContext), Ok(s("Apple")));
        assert_eq!(fn_capitalize(&[s("")], &EmptyContext), Ok(s("")));
        assert_eq!(
            fn_upper(&[FormulaValue::Number(2.5)], &EmptyContext),
            Ok(s("2.5"))
        );
    }

    #[test]
    fn test_concat_to_node_paragraphs() {
        let node = concat_to_node(
            &[text("a"), Fragment::NewLine, text("b"), text("")],
            ConversionMode::Simple,
        );
        assert_eq!(
            node,
            Some(Fragment::Wrappers(vec![
                Wrapper::new(vec![Inline::text("a")]),
                Wrapper::new(vec![
                    Inline::text("b"),
                    Inline::text(ZERO_WIDTH_SPACE.to_string())
                ]),
            ]))
        );

        let node = concat_to_node(
            &[text("Hi "), Fragment::Inline(Inline::data_reference("row.Name"))],
            ConversionMode::Simple,
        );
        assert_eq!(
            node,
            Some(Fragment::Wrapper(Wrapper::new(vec![
                Inline::text("Hi "),
                Inline::data_reference("row.Name"),
            ])))
        );
    }

    #[test]
    fn test_concat_to_node_declines() {
        assert_eq!(
            concat_to_node(&[text("a"), text("b")], ConversionMode::Advanced),
            None
        );
        let nested = Fragment::Wrapper(Wrapper::new(vec![Inline::function("upper")]));
        assert_eq!(
            concat_to_node(&[text("a"), nested], ConversionMode::Simple),
            None
        );
    }
}
