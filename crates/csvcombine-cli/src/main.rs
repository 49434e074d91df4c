//! csvcombine CLI
//!
//! Command-line tool for combining CSV files with the same structure into one dataset.

use clap::{Parser, Subcommand, ValueEnum};
use csvcombine_core::config::{DELIMITER, QUOTECHAR, REGEX, SKIP_LINES, STOP};
use csvcombine_core::{
    CombinedResult, CsvCombineTask, DirectoryStore, LogSink, ParameterSet, ResourceFilter,
    ResourceStore, Session,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "csvcombine")]
#[command(about = "Combine CSV files with the same structure to one dataset", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List resources, optionally filtered by a file name regex
    List {
        /// Store root; each subdirectory is a project
        #[arg(short, long)]
        root: PathBuf,

        /// Regular expression matched against the start of each name
        #[arg(long)]
        regex: Option<String>,

        /// Restrict to these projects
        #[arg(short, long)]
        project: Vec<String>,
    },

    /// Combine all matching resources into one deduplicated dataset
    Combine {
        /// Store root; each subdirectory is a project
        #[arg(short, long)]
        root: PathBuf,

        /// JSON job file with parameters
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Regular expression matched against the start of each name
        #[arg(long)]
        regex: Option<String>,

        /// Delimiter in the input CSV files
        #[arg(short, long)]
        delimiter: Option<String>,

        /// Quote character in the input CSV files
        #[arg(short, long)]
        quotechar: Option<String>,

        /// Number of rows to skip before the header row
        #[arg(short, long)]
        skip_lines: Option<String>,

        /// Return an empty dataset instead of failing when nothing is found
        #[arg(long)]
        no_stop: bool,

        /// Parameter overrides applied last (name=value)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<String>,

        /// Restrict to these projects
        #[arg(short, long)]
        project: Vec<String>,

        /// User the session acts for
        #[arg(long)]
        user: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a job file template
    CreateConfig {
        /// Output path for the job file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn run() -> csvcombine_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            root,
            regex,
            project,
        } => cmd_list(&root, regex.as_deref(), &project),
        Commands::Combine {
            root,
            config,
            regex,
            delimiter,
            quotechar,
            skip_lines,
            no_stop,
            overrides,
            project,
            user,
            format,
            output,
        } => {
            let mut params = match config {
                Some(path) => ParameterSet::load(path)?,
                None => ParameterSet::new(),
            };
            let flags = [
                (REGEX, regex),
                (DELIMITER, delimiter),
                (QUOTECHAR, quotechar),
                (SKIP_LINES, skip_lines),
                (STOP, no_stop.then(|| "false".to_string())),
            ];
            params.rebind(
                flags
                    .into_iter()
                    .filter_map(|(name, value)| value.map(|v| (name, v))),
            );
            for assignment in &overrides {
                params.apply_assignment(assignment)?;
            }

            let session = build_session(user, project);
            cmd_combine(&root, &params, &session, format, output.as_deref())
        }
        Commands::CreateConfig { output } => cmd_create_config(&output),
    }
}

fn build_session(user: Option<String>, projects: Vec<String>) -> Session {
    let session = match user {
        Some(user) => Session::for_user(user),
        None => Session::anonymous(),
    };
    if projects.is_empty() {
        session
    } else {
        session.with_projects(projects)
    }
}

fn cmd_list(root: &Path, regex: Option<&str>, projects: &[String]) -> csvcombine_core::Result<()> {
    let store = DirectoryStore::new(root);
    let session = build_session(None, projects.to_vec());
    let catalog = store.list_resources(&session)?;

    let resources = match regex {
        Some(pattern) => ResourceFilter::new(pattern)?.select(&catalog),
        None => catalog,
    };

    println!("Resources ({}):", resources.len());
    println!();
    for resource in &resources {
        println!("  {}", resource);
    }

    Ok(())
}

fn cmd_combine(
    root: &Path,
    params: &ParameterSet,
    session: &Session,
    format: OutputFormat,
    output: Option<&Path>,
) -> csvcombine_core::Result<()> {
    tracing::debug!(?params, "resolving parameters");
    let config = params.resolve()?;
    let delimiter = config.delimiter;
    let task = CsvCombineTask::new(config);
    let store = DirectoryStore::new(root);

    let result = task.execute(&store, session, &mut LogSink)?;

    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_result(&result, format, delimiter, &mut writer)?;
            writer.flush()?;
            eprintln!(
                "Exported {} rows ({} columns) to {}",
                result.row_count(),
                result.column_count(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_result(&result, format, delimiter, &mut writer)?;
            writer.flush()?;
        }
    }

    Ok(())
}

fn write_result<W: Write>(
    result: &CombinedResult,
    format: OutputFormat,
    delimiter: u8,
    writer: &mut W,
) -> csvcombine_core::Result<()> {
    match format {
        OutputFormat::Csv => result.write_csv(writer, delimiter),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, result)?;
            writeln!(writer)?;
            Ok(())
        }
    }
}

fn cmd_create_config(output: &Path) -> csvcombine_core::Result<()> {
    let params = ParameterSet::template();
    params.save(output)?;

    println!("Created job file: {}", output.display());
    println!();
    println!("Edit the file to configure your combine run, then run:");
    println!("  csvcombine combine --root <dir> --config {}", output.display());

    Ok(())
}
