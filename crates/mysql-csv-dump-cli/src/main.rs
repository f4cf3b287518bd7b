//! mysql-csv-dump CLI - export MySQL tables to delimited text files.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{CommandFactory, Parser};
use mysql_csv_dump::{BinaryFormat, Config, DumpError, DumpResult, Dumper};
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

#[derive(Parser)]
#[command(name = "mysql-csv-dump")]
#[command(about = "Dump MySQL tables to CSV files, one file per table")]
#[command(version)]
struct Cli {
    /// Database to export
    database: Option<String>,

    /// Tables to export [default: every table in DATABASE]
    tables: Vec<String>,

    /// Path to YAML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database user [default: root]
    #[arg(long)]
    user: Option<String>,

    /// Database password
    #[arg(long, env = "MYSQL_PWD", hide_env_values = true)]
    password: Option<String>,

    /// Database host [default: 127.0.0.1]
    #[arg(long)]
    hostname: Option<String>,

    /// Database port [default: 3306]
    #[arg(long)]
    port: Option<u16>,

    /// TLS mode: disabled, preferred, required, verify_ca, verify_identity [default: preferred]
    #[arg(long)]
    ssl_mode: Option<String>,

    /// Directory to write the files into [default: .]
    #[arg(long)]
    outdir: Option<PathBuf>,

    /// Gzip each output file
    #[arg(long)]
    compress_file: bool,

    /// Export every table inside one transaction [default: true]
    #[arg(long, value_name = "BOOL")]
    single_transaction: Option<bool>,

    /// Do not write the column-name header
    #[arg(long)]
    skip_header: bool,

    /// Field delimiter; accepts \t, \n, \r and \\ [default: tab]
    #[arg(long)]
    fields_terminated_by: Option<String>,

    /// Quote character for fields that need it [default: "]
    #[arg(long)]
    fields_optionally_enclosed_by: Option<String>,

    /// Escape character [default: \]
    #[arg(long)]
    fields_escaped_by: Option<String>,

    /// Record terminator; accepts \t, \n, \r and \\ [default: \n]
    #[arg(long)]
    lines_terminated_by: Option<String>,

    /// Text written for NULL values [default: empty]
    #[arg(long)]
    null_value: Option<String>,

    /// Rendering of binary columns: hex, base64 or utf8 [default: hex]
    #[arg(long)]
    binary_format: Option<String>,

    /// Exit with success even when some tables failed
    #[arg(long)]
    ignore_table_errors: bool,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            if matches!(e, DumpError::Config(_)) {
                eprintln!("\n{}", Cli::command().render_usage());
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), DumpError> {
    let cli = Cli::parse();

    // JSON results own stdout; logs move to stderr
    setup_logging(&cli.verbosity, &cli.log_format, cli.output_json)
        .map_err(DumpError::Config)?;

    let output_json = cli.output_json;
    let config = build_config(cli)?;

    let dumper = Dumper::new(config)?;
    info!(
        "Dumping database {} to {:?}",
        dumper.config().source.database,
        dumper.config().export.output_dir
    );

    let result = dumper.run().await?;

    if output_json {
        println!("{}", result.to_json()?);
    } else {
        print_summary(&result);
    }

    if !dumper.config().export.ignore_table_errors {
        result.ensure_complete()?;
    }

    Ok(())
}

/// Start from the config file (or defaults) and apply command-line overrides.
fn build_config(cli: Cli) -> Result<Config, DumpError> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::read(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    let source = &mut config.source;
    if let Some(database) = cli.database {
        source.database = database;
    }
    if let Some(user) = cli.user {
        source.user = user;
    }
    if let Some(password) = cli.password {
        source.password = password;
    }
    if let Some(host) = cli.hostname {
        source.host = host;
    }
    if let Some(port) = cli.port {
        source.port = port;
    }
    if let Some(ssl_mode) = cli.ssl_mode {
        source.ssl_mode = ssl_mode;
    }

    if source.database.is_empty() {
        return Err(DumpError::Config(
            "DATABASE is required (argument or source.database in --config)".to_string(),
        ));
    }

    let export = &mut config.export;
    if !cli.tables.is_empty() {
        export.tables = cli.tables;
    }
    if let Some(outdir) = cli.outdir {
        export.output_dir = outdir;
    }
    export.compress |= cli.compress_file;
    if let Some(single_transaction) = cli.single_transaction {
        export.single_transaction = single_transaction;
    }
    export.skip_header |= cli.skip_header;
    if let Some(delimiter) = cli.fields_terminated_by {
        export.fields_terminated_by = delimiter;
    }
    if let Some(quote) = cli.fields_optionally_enclosed_by {
        export.fields_enclosed_by = quote;
    }
    if let Some(escape) = cli.fields_escaped_by {
        export.fields_escaped_by = escape;
    }
    if let Some(terminator) = cli.lines_terminated_by {
        export.lines_terminated_by = terminator;
    }
    if let Some(null_value) = cli.null_value {
        export.null_value = null_value;
    }
    if let Some(binary_format) = cli.binary_format {
        export.binary_format = BinaryFormat::from_str(&binary_format)?;
    }
    export.ignore_table_errors |= cli.ignore_table_errors;

    config.validate()?;
    Ok(config)
}

fn print_summary(result: &DumpResult) {
    let status_msg = if result.tables_failed == 0 {
        "Dump completed!"
    } else {
        "Dump completed with errors!"
    };
    println!("\n{}", status_msg);
    println!("  Run ID: {}", result.run_id);
    println!("  Duration: {:.2}s", result.duration_seconds);
    println!("  Tables: {}/{}", result.tables_success, result.tables_total);
    println!("  Rows: {}", result.rows_exported);
    println!("  Throughput: {} rows/sec", result.rows_per_second);
    if !result.failed_tables.is_empty() {
        println!("  Failed tables:");
        for failure in &result.failed_tables {
            println!("    {}: {}", failure.table, failure.error);
        }
    }
}

fn setup_logging(verbosity: &str, format: &str, to_stderr: bool) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("unknown verbosity '{}'", other)),
    };

    let writer = if to_stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(writer);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("log format must be text or json, got '{}'", other)),
    }

    Ok(())
}
