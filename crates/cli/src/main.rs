use anyhow::Result;
use cdmerge_core::{BaseOptions, ComponentDescriptor, MergeRequest, Outputs};
use clap::{Parser, Subcommand};
use console::{Term, style};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// cdmerge - Aggregate build fragments into one component descriptor
#[derive(Parser)]
#[command(name = "cdmerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge fragment archives into a component descriptor
    Merge {
        /// Directory containing *.ocm-artefacts fragment archives
        #[arg(long, default_value = ".")]
        search_dir: PathBuf,

        /// Directory receiving component-descriptor.yaml and blobs.d/
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Scratch directory for staging (a temp dir is used if not given)
        #[arg(long)]
        workspace: Option<PathBuf>,

        /// Inline base descriptor YAML text
        #[arg(long, conflicts_with = "descriptor_file")]
        descriptor: Option<String>,

        /// File containing the base descriptor YAML
        #[arg(long)]
        descriptor_file: Option<PathBuf>,

        /// Gzipped tar containing the base component-descriptor.yaml
        #[arg(long)]
        base_archive: Option<PathBuf>,

        /// Component name, used to generate a skeleton when no base is given
        #[arg(long)]
        component_name: Option<String>,

        /// Component version for the generated skeleton
        #[arg(long)]
        component_version: Option<String>,

        /// Only consume archives named <context>-*.ocm-artefacts
        #[arg(long)]
        context: Option<String>,

        /// Re-hash sha256 blobs against their file names before storing
        #[arg(long)]
        verify_blobs: bool,

        /// Append published outputs as key=value lines to this file
        #[arg(long)]
        outputs_file: Option<PathBuf>,

        /// Print the full descriptor text to stdout after the outputs
        #[arg(long)]
        print_descriptor: bool,
    },

    /// Parse a descriptor and print a summary
    Show {
        /// Path to a component-descriptor.yaml
        descriptor: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .init();

    match cli.command {
        Commands::Merge {
            search_dir,
            out_dir,
            workspace,
            descriptor,
            descriptor_file,
            base_archive,
            component_name,
            component_version,
            context,
            verify_blobs,
            outputs_file,
            print_descriptor,
        } => cmd_merge(MergeArgs {
            search_dir,
            out_dir,
            workspace,
            descriptor,
            descriptor_file,
            base_archive,
            component_name,
            component_version,
            context,
            verify_blobs,
            outputs_file,
            print_descriptor,
        }),
        Commands::Show { descriptor } => cmd_show(&descriptor),
    }
}

struct MergeArgs {
    search_dir: PathBuf,
    out_dir: PathBuf,
    workspace: Option<PathBuf>,
    descriptor: Option<String>,
    descriptor_file: Option<PathBuf>,
    base_archive: Option<PathBuf>,
    component_name: Option<String>,
    component_version: Option<String>,
    context: Option<String>,
    verify_blobs: bool,
    outputs_file: Option<PathBuf>,
    print_descriptor: bool,
}

fn cmd_merge(args: MergeArgs) -> Result<()> {
    let term = Term::stderr();

    let inline = match (&args.descriptor, &args.descriptor_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(fs::read_to_string(path)?),
        (None, None) => None,
    };

    // Keep the temp workspace alive for the whole pass
    let temp_workspace;
    let workspace = match &args.workspace {
        Some(path) => path.clone(),
        None => {
            temp_workspace = tempfile::TempDir::new()?;
            temp_workspace.path().to_path_buf()
        }
    };

    let request = MergeRequest {
        workspace,
        search_dir: args.search_dir.clone(),
        out_dir: args.out_dir.clone(),
        base: BaseOptions {
            inline,
            archive: args.base_archive.clone(),
            component_name: args.component_name.clone(),
            component_version: args.component_version.clone(),
        },
        context: args.context.clone(),
        verify_blobs: args.verify_blobs,
    };

    term.write_line(&format!(
        "{} Merging fragments from {}",
        style("::").cyan().bold(),
        args.search_dir.display()
    ))?;

    let outputs = match cdmerge_core::run(&request) {
        Ok(outputs) => outputs,
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))?;
            std::process::exit(1);
        }
    };

    term.write_line(&format!(
        "{} Emitted descriptor for {}",
        style("::").green().bold(),
        outputs.component_version
    ))?;

    print_outputs(&outputs, args.print_descriptor);

    if let Some(path) = &args.outputs_file {
        write_outputs_file(path, &outputs)?;
    }

    Ok(())
}

/// Published outputs, one key=value per line on stdout
fn print_outputs(outputs: &Outputs, print_descriptor: bool) {
    println!("name={}", outputs.name);
    println!("version={}", outputs.version);
    println!("component-version={}", outputs.component_version);
    if print_descriptor {
        println!("{}", outputs.descriptor);
    }
}

fn write_outputs_file(path: &Path, outputs: &Outputs) -> Result<()> {
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "name={}", outputs.name)?;
    writeln!(file, "version={}", outputs.version)?;
    writeln!(file, "component-version={}", outputs.component_version)?;
    Ok(())
}

fn cmd_show(path: &Path) -> Result<()> {
    let term = Term::stderr();

    if !path.exists() {
        term.write_line(&format!(
            "{} Descriptor not found: {}",
            style("error:").red().bold(),
            path.display()
        ))?;
        std::process::exit(1);
    }

    let text = fs::read_to_string(path)?;
    let desc = match ComponentDescriptor::from_yaml(&text) {
        Ok(d) => d,
        Err(e) => {
            term.write_line(&format!(
                "{} Failed to parse {}: {}",
                style("error:").red().bold(),
                path.display(),
                e
            ))?;
            std::process::exit(1);
        }
    };

    let component = &desc.component;
    println!("Component: {}", component.name);
    println!("Version:   {}", component.version);
    println!("Sources:   {}", component.sources.len());
    println!("Resources: {}", component.resources.len());

    for artefact in component.sources.iter().chain(component.resources.iter()) {
        println!(
            "  {} ({}) {}",
            artefact.name,
            artefact.artefact_type,
            artefact.version.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
