use serde::Serialize;
use serde_json::json;
use std::io::Read;
use steerage::layout::LayoutOptions;
use steerage::{
    DEMOGRAPHIC_ATTRIBUTES, FlowConfig, Record, SurvivalFilter, aggregate, flow_layout,
    parse_table, survival_probability,
};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Selector(String),
    Io(std::io::Error),
    Table(steerage::Error),
    Layout(steerage::layout::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Selector(msg) => write!(f, "invalid selector: {msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Table(err) => write!(f, "{err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<steerage::Error> for CliError {
    fn from(value: steerage::Error) -> Self {
        Self::Table(value)
    }
}

impl From<steerage::layout::Error> for CliError {
    fn from(value: steerage::layout::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Aggregate,
    Survival,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    source: Option<String>,
    target: Option<String>,
    config_path: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    margin_x: Option<f64>,
    margin_y: Option<f64>,
    node_width: Option<f64>,
    node_padding: Option<f64>,
    is_child: Option<bool>,
    is_male: Option<bool>,
    passenger_class: Option<u8>,
    min_age: Option<f64>,
    max_age: Option<f64>,
}

fn usage() -> &'static str {
    "steerage-cli\n\
\n\
USAGE:\n\
  steerage-cli [layout] [--source <attr>] [--target <attr>] [--width <w>] [--height <h>] [--margin-x <x>] [--margin-y <y>] [--node-width <w>] [--node-padding <p>] [--config <json-path>] [--pretty] [<path>|-]\n\
  steerage-cli aggregate [--source <attr>] [--target <attr>] [--config <json-path>] [--pretty] [<path>|-]\n\
  steerage-cli survival [--child|--adult] [--gender male|female] [--class 1|2|3] [--min-age <n>] [--max-age <n>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the delimited table is read from stdin (header row first).\n\
  - Selectors must be demographic attributes (gender, class, age, embarked, sibsp, survived)\n\
    and source must differ from target. Defaults: --source class --target survived.\n\
  - layout prints positioned nodes and link bands as JSON; aggregate prints the raw\n\
    node/link graph; survival prints a survival fraction (or null when nothing matches).\n\
  - --config points at a JSON file deserialized as the flow configuration (layout geometry\n\
    plus categorization policy); explicit geometry flags override it.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    fn take_f64(it: &mut impl Iterator<Item = String>) -> Result<f64, CliError> {
        let Some(raw) = it.next() else {
            return Err(CliError::Usage(usage()));
        };
        let value = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
        if !value.is_finite() {
            return Err(CliError::Usage(usage()));
        }
        Ok(value)
    }

    let mut it = argv.iter().skip(1).cloned().peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "aggregate" => args.command = Command::Aggregate,
            "survival" => args.command = Command::Survival,
            "--pretty" => args.pretty = true,
            "--source" => {
                let Some(attr) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.source = Some(attr);
            }
            "--target" => {
                let Some(attr) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.target = Some(attr);
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config_path = Some(path);
            }
            "--width" => args.width = Some(take_f64(&mut it)?),
            "--height" => args.height = Some(take_f64(&mut it)?),
            "--margin-x" => args.margin_x = Some(take_f64(&mut it)?),
            "--margin-y" => args.margin_y = Some(take_f64(&mut it)?),
            "--node-width" => args.node_width = Some(take_f64(&mut it)?),
            "--node-padding" => args.node_padding = Some(take_f64(&mut it)?),
            "--child" => args.is_child = Some(true),
            "--adult" => args.is_child = Some(false),
            "--gender" => {
                let Some(gender) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.is_male = match gender.as_str() {
                    "male" => Some(true),
                    "female" => Some(false),
                    _ => return Err(CliError::Usage(usage())),
                };
            }
            "--class" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let class = raw.parse::<u8>().map_err(|_| CliError::Usage(usage()))?;
                if !(1..=3).contains(&class) {
                    return Err(CliError::Usage(usage()));
                }
                args.passenger_class = Some(class);
            }
            "--min-age" => args.min_age = Some(take_f64(&mut it)?),
            "--max-age" => args.max_age = Some(take_f64(&mut it)?),
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

/// The selector surface: both attributes must come from the demographic set
/// and must differ from each other.
fn validate_selectors(source: &str, target: &str) -> Result<(), CliError> {
    for attr in [source, target] {
        if !DEMOGRAPHIC_ATTRIBUTES.contains(&attr) {
            return Err(CliError::Selector(format!(
                "unknown attribute {attr:?} (expected one of {})",
                DEMOGRAPHIC_ATTRIBUTES.join(", ")
            )));
        }
    }
    if source == target {
        return Err(CliError::Selector(format!(
            "source and target must differ (both are {source:?})"
        )));
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<FlowConfig, CliError> {
    let mut config = match args.config_path.as_deref() {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => FlowConfig::default(),
    };
    let layout = &mut config.layout;
    let overrides = [
        (&mut layout.width, args.width),
        (&mut layout.height, args.height),
        (&mut layout.margin_x, args.margin_x),
        (&mut layout.margin_y, args.margin_y),
        (&mut layout.node_width, args.node_width),
        (&mut layout.node_padding, args.node_padding),
    ];
    for (slot, value) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }
    Ok(config)
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let records: Vec<Record> = parse_table(&text)?;

    match args.command {
        Command::Layout | Command::Aggregate => {
            let source = args.source.as_deref().unwrap_or("class");
            let target = args.target.as_deref().unwrap_or("survived");
            validate_selectors(source, target)?;
            let config = load_config(&args)?;

            match args.command {
                Command::Aggregate => {
                    let graph = aggregate(&records, source, target, &config.categories);
                    write_json(&graph, args.pretty)
                }
                _ => {
                    let layout = flow_layout(&records, source, target, &config)?;
                    write_json(&layout, args.pretty)
                }
            }
        }
        Command::Survival => {
            let filter = SurvivalFilter {
                is_child: args.is_child,
                is_male: args.is_male,
                passenger_class: args.passenger_class,
                age_range: match (args.min_age, args.max_age) {
                    (None, None) => None,
                    (min, max) => {
                        Some((min.unwrap_or(0.0), max.unwrap_or(f64::INFINITY)))
                    }
                },
            };
            let probability = survival_probability(&records, &filter);
            write_json(&json!({ "probability": probability }), args.pretty)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
