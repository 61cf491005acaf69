//! compsets CLI: inspect, validate and filter compartment set documents.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use compartment_sets::compartment::{CompartmentSet, CompartmentSets};
use compartment_sets::selection::Selection;

#[derive(Parser)]
#[command(name = "compsets", version, about = "Compartment set documents")]
struct Cli {
    /// Indent JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a compartment sets file is valid.
    Validate {
        /// Path to the compartment sets JSON file.
        file: PathBuf,
    },

    /// List the sets of a file with their population and size.
    List {
        /// Path to the compartment sets JSON file.
        file: PathBuf,
    },

    /// Print the locations of one set.
    Show {
        /// Path to the compartment sets JSON file.
        file: PathBuf,

        /// Name of the compartment set.
        name: String,

        /// Only show these node ids (e.g. "1,2,10-20").
        #[arg(long)]
        node_ids: Option<Selection>,
    },

    /// Emit a document holding one set restricted to the given node ids.
    Filter {
        /// Path to the compartment sets JSON file.
        file: PathBuf,

        /// Name of the compartment set.
        name: String,

        /// Node ids to keep (e.g. "1,2,10-20").
        #[arg(long)]
        node_ids: Selection,
    },

    /// Re-serialize a file with sets in name order.
    Dump {
        /// Path to the compartment sets JSON file.
        file: PathBuf,
    },
}

fn print_json(sets: &CompartmentSets, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", sets.to_json_pretty()?);
    } else {
        println!("{}", sets.to_json());
    }
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file } => {
            let sets = CompartmentSets::from_file(&file)?;
            let locations: usize = sets.values().map(CompartmentSet::len).sum();
            println!(
                "{}: {} compartment sets, {} locations",
                file.display(),
                sets.len(),
                locations
            );
        }

        Commands::List { file } => {
            let sets = CompartmentSets::from_file(&file)?;
            if sets.is_empty() {
                println!("No compartment sets.");
            } else {
                println!("Compartment sets ({}):", sets.len());
                for (name, set) in sets.items() {
                    println!(
                        "  {name}  population={}  size={}  node_ids={}",
                        set.population(),
                        set.len(),
                        set.node_ids().flat_size()
                    );
                }
            }
        }

        Commands::Show {
            file,
            name,
            node_ids,
        } => {
            let sets = CompartmentSets::from_file(&file)?;
            let set = sets.at(&name)?;
            let selection = node_ids.unwrap_or_default();

            println!("{name}: population={:?} size={}", set.population(), set.len());
            println!("  node ids: [{}]", set.node_ids());
            println!("  selected: {}", set.size(&selection));
            for loc in set.filtered_iter(selection) {
                println!(
                    "  {:>10}  section={:<6}  offset={}",
                    loc.node_id(),
                    loc.section_index(),
                    loc.offset()
                );
            }
        }

        Commands::Filter {
            file,
            name,
            node_ids,
        } => {
            let sets = CompartmentSets::from_file(&file)?;
            let filtered = sets.at(&name)?.filter(&node_ids);
            tracing::info!(
                name = %name,
                kept = filtered.len(),
                "filtered compartment set"
            );
            let doc: CompartmentSets = std::iter::once((name, filtered)).collect();
            print_json(&doc, cli.pretty)?;
        }

        Commands::Dump { file } => {
            let sets = CompartmentSets::from_file(&file)?;
            print_json(&sets, cli.pretty)?;
        }
    }

    Ok(())
}
