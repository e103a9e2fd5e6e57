use narwhal::{
    Engine, EngineConfig, FilterConfig, GraphDocument, LoadMode, Severity, SvgOptions,
};
use serde::Serialize;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Engine(narwhal::Error),
    Config(narwhal::ConfigError),
    Json(serde_json::Error),
    UnknownNode(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Engine(err) => write!(f, "{err}"),
            CliError::Config(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::UnknownNode(id) => write!(f, "node `{id}` is not visible"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<narwhal::Error> for CliError {
    fn from(value: narwhal::Error) -> Self {
        Self::Engine(value)
    }
}

impl From<narwhal::ConfigError> for CliError {
    fn from(value: narwhal::ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum Command {
    #[default]
    Layout,
    Legend,
    Draw,
    Render,
    Details(String),
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    focal: Option<String>,
    filter: FilterConfig,
    prune: bool,
    pretty: bool,
    title: Option<String>,
    out: Option<String>,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    focal: Option<&'a str>,
    positions: &'a std::collections::BTreeMap<String, narwhal::Point>,
    shells: &'a [Vec<String>],
    outer_ring: &'a [String],
    visible_edges: &'a [String],
}

fn usage() -> &'static str {
    "narwhal-cli\n\
\n\
USAGE:\n\
  narwhal-cli [layout] [OPTIONS] [<path>|-]\n\
  narwhal-cli legend [OPTIONS] [<path>|-]\n\
  narwhal-cli draw [OPTIONS] [<path>|-]\n\
  narwhal-cli render [--title <text>] [--out <path>] [OPTIONS] [<path>|-]\n\
  narwhal-cli details <node-id> [OPTIONS] [<path>|-]\n\
\n\
OPTIONS:\n\
  --config <path>          engine configuration JSON, merged over the defaults\n\
  --focal <node-id>        node to place at the layout origin\n\
  --types <a,b,...>        entity type whitelist\n\
  --severity-min <level>   low | medium | high | critical\n\
  --query <text>           case-insensitive label/attribute search\n\
  --prune                  drop edges with missing endpoints instead of failing\n\
  --pretty                 pretty-print JSON output\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the graph document is read from stdin.\n\
  - The graph document is JSON: { \"nodes\": [...], \"edges\": [...] }.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - Set RUST_LOG (e.g. RUST_LOG=narwhal=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "legend" => args.command = Command::Legend,
            "draw" => args.command = Command::Draw,
            "render" => args.command = Command::Render,
            "details" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.command = Command::Details(id.clone());
            }
            "--pretty" => args.pretty = true,
            "--prune" => args.prune = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--focal" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.focal = Some(id.clone());
            }
            "--types" => {
                let Some(list) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.filter = std::mem::take(&mut args.filter).with_types(
                    list.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string),
                );
            }
            "--severity-min" => {
                let Some(level) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.filter.severity_min = Some(
                    level
                        .parse::<Severity>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--query" => {
                let Some(q) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.filter.text_query = Some(q.clone());
            }
            "--title" => {
                let Some(title) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.title = Some(title.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
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

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn build_engine(args: &Args) -> Result<Engine, CliError> {
    let config = match args.config.as_deref() {
        Some(path) => EngineConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let mut engine = Engine::with_config(config)?;

    let doc = GraphDocument::from_json_str(&read_input(args.input.as_deref())?)?;
    let mode = if args.prune {
        LoadMode::PruneDangling
    } else {
        LoadMode::Strict
    };
    let report = engine.load_graph_with(doc.nodes, doc.edges, mode)?;
    tracing::debug!(
        nodes = report.nodes,
        edges = report.edges,
        pruned = report.pruned_edges,
        "graph loaded"
    );
    engine.set_filter(args.filter.clone())?;
    if let Some(focal) = args.focal.as_deref() {
        engine.set_focal_node(Some(focal))?;
    }
    Ok(engine)
}

fn run(args: Args) -> Result<(), CliError> {
    let mut engine = build_engine(&args)?;
    match &args.command {
        Command::Layout => {
            let layout = engine.layout();
            let out = LayoutOut {
                focal: layout.focal.as_deref(),
                positions: &layout.positions,
                shells: &layout.shells,
                outer_ring: &layout.outer_ring,
                visible_edges: &engine.visible().visible_edges,
            };
            write_json(&out, args.pretty)
        }
        Command::Legend => write_json(&engine.legend(), args.pretty),
        Command::Draw => write_json(&engine.draw_list(), args.pretty),
        Command::Render => {
            let options = SvgOptions {
                title: args.title.clone(),
                ..Default::default()
            };
            write_text(&engine.export_svg(&options), args.out.as_deref())
        }
        Command::Details(id) => {
            engine.select_node(Some(id.as_str()))?;
            let details = engine
                .selected_details()
                .ok_or_else(|| CliError::UnknownNode(id.clone()))?;
            write_json(&details, args.pretty)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
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

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
