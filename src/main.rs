use std::path::PathBuf;

use clap::Parser;
use flag_provider_bridge::{
    EvaluationContext, EvaluationEngine, FlagType, FlagValue, Provider, ProviderConfig,
    ProviderError, Result, TestData,
};
use serde_json::{Number, Value};

/// Simple runner: resolve one flag from a flag data file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Flag key to evaluate
    flag_key: String,
    /// Default value as JSON; text that is not JSON is used as a string
    default: String,
    /// Flag data file: a JSON object mapping flag keys to flag definitions
    #[arg(long)]
    flags: PathBuf,
    /// Value type the flag is resolved as
    #[arg(long = "type", value_enum, default_value_t = FlagType::Boolean)]
    flag_type: FlagType,
    /// Evaluation context as a JSON object (optional)
    #[arg(long)]
    context: Option<String>,
    /// Provider name reported in metadata (optional)
    #[arg(long)]
    name: Option<String>,
}

fn main() {
    // Diagnostics go to stderr, results to stdout.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = Args::parse();
    match run(&args) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<String> {
    let engine = TestData::from_file(&args.flags)?;
    let mut config = ProviderConfig::default();
    if let Some(name) = &args.name {
        config = config.with_name(name.clone());
    }
    let provider = Provider::with_config(engine, config);

    let context = args
        .context
        .as_deref()
        .map(serde_json::from_str::<EvaluationContext>)
        .transpose()?;
    let default = parse_default(&args.default, args.flag_type);

    let key = &args.flag_key;
    let ctx = context.as_ref();
    match args.flag_type {
        FlagType::Boolean => evaluate::<bool, _>(&provider, key, default, ctx),
        FlagType::String => evaluate::<String, _>(&provider, key, default, ctx),
        FlagType::Integer => evaluate::<i64, _>(&provider, key, default, ctx),
        FlagType::Float => evaluate::<f64, _>(&provider, key, default, ctx),
        FlagType::Number => evaluate::<Number, _>(&provider, key, default, ctx),
        FlagType::Object => evaluate::<Value, _>(&provider, key, default, ctx),
    }
}

/// JSON when it parses, raw text otherwise. String flags always take the raw
/// text, so `true` or `123` stay strings.
fn parse_default(raw: &str, flag_type: FlagType) -> Value {
    if flag_type == FlagType::String {
        return match serde_json::from_str::<Value>(raw) {
            Ok(Value::String(s)) => Value::String(s),
            _ => Value::String(raw.to_string()),
        };
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn evaluate<T, E>(
    provider: &Provider<E>,
    flag_key: &str,
    default: Value,
    context: Option<&EvaluationContext>,
) -> Result<String>
where
    T: FlagValue + serde::Serialize,
    E: EvaluationEngine,
{
    let default = typed_default::<T>(default)?;
    let details = provider.resolve_value(flag_key, default, context);
    Ok(serde_json::to_string_pretty(&details)?)
}

fn typed_default<T: FlagValue>(value: Value) -> Result<T> {
    let mismatch = |value: &Value| ProviderError::DefaultType {
        value: value.to_string(),
        expected: T::FLAG_TYPE.to_string(),
    };
    if !T::FLAG_TYPE.matches(&value) {
        return Err(mismatch(&value));
    }
    let err = mismatch(&value);
    T::from_value(value).ok_or(err)
}
