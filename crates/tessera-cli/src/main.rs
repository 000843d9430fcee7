//! Tessera CLI - formula checking, evaluation and rich-text conversion

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tessera::prelude::*;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(author, version, about = "Formula checking, evaluation and conversion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Formula authoring mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Simple,
    Advanced,
    Raw,
}

impl From<Mode> for FormulaMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Simple => FormulaMode::Simple,
            Mode::Advanced => FormulaMode::Advanced,
            Mode::Raw => FormulaMode::Raw,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a formula and print its canonical source
    Parse {
        /// Formula text ("-" reads stdin)
        formula: String,

        /// Print the syntax tree as well
        #[arg(short, long)]
        tree: bool,
    },

    /// Evaluate a formula against a JSON context
    #[command(alias = "evaluate")]
    Eval {
        /// Formula text ("-" reads stdin)
        formula: String,

        /// JSON file with the values `get(...)` resolves against
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Authoring mode
        #[arg(short, long, value_enum, default_value = "simple")]
        mode: Mode,

        /// Print this instead of failing when the formula has an error
        #[arg(short, long)]
        default: Option<String>,

        /// Print the value as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Check whether a formula parses and evaluates
    Check {
        /// Formula text ("-" reads stdin)
        formula: String,

        /// JSON file with the values `get(...)` resolves against
        #[arg(short, long)]
        context: Option<PathBuf>,
    },

    /// Convert a formula to an editor document (JSON)
    ToRichText {
        /// Formula text ("-" reads stdin)
        formula: String,

        /// Authoring mode
        #[arg(short, long, value_enum, default_value = "simple")]
        mode: Mode,
    },

    /// Convert an editor document (JSON) back to a formula
    FromRichText {
        /// Document file (default: stdin)
        input: Option<PathBuf>,

        /// Authoring mode
        #[arg(short, long, value_enum, default_value = "simple")]
        mode: Mode,
    },

    /// List the built-in functions
    Functions,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let functions = FunctionRegistry::new();

    match cli.command {
        Commands::Parse { formula, tree } => parse(&read_formula(&formula)?, tree),
        Commands::Eval {
            formula,
            context,
            mode,
            default,
            json,
        } => {
            let context = load_context(context.as_deref())?;
            let value = eval(
                &read_formula(&formula)?,
                mode.into(),
                default,
                &functions,
                &context,
            )?;
            if json {
                println!("{}", serde_json::to_string(&value)?);
            } else {
                println!("{}", value);
            }
            Ok(())
        }
        Commands::Check { formula, context } => {
            let context = load_context(context.as_deref())?;
            check(&read_formula(&formula)?, &functions, &context)
        }
        Commands::ToRichText { formula, mode } => {
            let doc = formula_to_rich_text(&read_formula(&formula)?, mode.into(), &functions)
                .context("Failed to convert formula")?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }
        Commands::FromRichText { input, mode } => {
            let text = match input {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read '{}'", path.display()))?,
                None => read_stdin()?,
            };
            let doc: Document =
                serde_json::from_str(&text).context("Input is not an editor document")?;
            let formula = rich_text_to_formula(&doc, mode.into(), &functions)
                .context("Failed to convert document")?;
            println!("{}", formula);
            Ok(())
        }
        Commands::Functions => {
            list_functions(&functions);
            Ok(())
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text)
}

fn read_formula(arg: &str) -> Result<String> {
    if arg == "-" {
        Ok(read_stdin()?.trim_end_matches(['\r', '\n']).to_string())
    } else {
        Ok(arg.to_string())
    }
}

/// Load a JSON context file; without one every `get(...)` is unresolved
fn load_context(path: Option<&Path>) -> Result<serde_json::Value> {
    let Some(path) = path else {
        return Ok(serde_json::Value::Object(Default::default()));
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let value = serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not valid JSON", path.display()))?;
    log::debug!("Loaded context from '{}'", path.display());
    Ok(value)
}

fn parse(formula: &str, tree: bool) -> Result<()> {
    let ast = parse_formula(formula)?;
    println!("{}", ast);
    if tree {
        println!("{:#?}", ast);
    }
    Ok(())
}

fn eval(
    formula: &str,
    mode: FormulaMode,
    default: Option<String>,
    functions: &FunctionRegistry,
    context: &dyn RuntimeContext,
) -> Result<FormulaValue> {
    if let Some(default) = default {
        let options = DisplayOptions::default()
            .with_mode(mode)
            .with_default(FormulaValue::String(default));
        return Ok(evaluate_for_display(formula, &options, functions, context));
    }

    if formula.is_empty() || mode == FormulaMode::Raw {
        return Ok(FormulaValue::String(formula.to_string()));
    }
    let ast = parse_formula(formula)?;
    evaluate(&ast, functions, context).with_context(|| format!("Failed to evaluate '{}'", formula))
}

fn check(formula: &str, functions: &FunctionRegistry, context: &dyn RuntimeContext) -> Result<()> {
    if is_formula_valid(formula, functions, context) {
        println!("valid");
        return Ok(());
    }

    // Re-run to report the first error
    match parse_formula(formula) {
        Err(e) => bail!("invalid: {}", e),
        Ok(ast) => match evaluate(&ast, functions, context) {
            Err(e) => bail!("invalid: {}", e),
            Ok(_) => bail!("invalid"),
        },
    }
}

fn list_functions(functions: &FunctionRegistry) {
    let mut defs: Vec<_> = functions.iter().collect();
    defs.sort_by_key(|def| def.name);

    for def in defs {
        let arity = match def.max_args {
            Some(max) if max == def.min_args => format!("{}", max),
            Some(max) => format!("{}-{}", def.min_args, max),
            None => format!("{}+", def.min_args),
        };
        match def.operator_symbol {
            Some(symbol) => println!("{:<12} {:<6} ({})", def.name, arity, symbol),
            None => println!("{:<12} {}", def.name, arity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_load_context_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"row": {{"Name": "Apple"}}}}"#).unwrap();

        let context = load_context(Some(file.path())).unwrap();
        let functions = FunctionRegistry::new();
        let value = eval(
            "upper(get('row.Name'))",
            FormulaMode::Simple,
            None,
            &functions,
            &context,
        )
        .unwrap();
        assert_eq!(value, FormulaValue::string("APPLE"));
    }

    #[test]
    fn test_load_context_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_context(Some(file.path())).is_err());
    }

    #[test]
    fn test_eval_default_and_raw() {
        let functions = FunctionRegistry::new();
        let context = load_context(None).unwrap();

        assert!(eval("get('x')", FormulaMode::Simple, None, &functions, &context).is_err());
        assert_eq!(
            eval(
                "get('x')",
                FormulaMode::Simple,
                Some("n/a".into()),
                &functions,
                &context
            )
            .unwrap(),
            FormulaValue::string("n/a")
        );
        assert_eq!(
            eval("upper(", FormulaMode::Raw, None, &functions, &context).unwrap(),
            FormulaValue::string("upper(")
        );
    }

    #[test]
    fn test_check_reports_errors() {
        let functions = FunctionRegistry::new();
        let context = load_context(None).unwrap();

        assert!(check("1 + 2", &functions, &context).is_ok());
        let err = check("upper(", &functions, &context).unwrap_err();
        assert!(err.to_string().starts_with("invalid: "));
    }
}
