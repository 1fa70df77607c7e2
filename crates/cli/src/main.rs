use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};

use kindred_core::degree::Degree;
use kindred_core::graph::{Graph, GraphMode};
use kindred_core::io::{demographics, ml_relate, parentage, relatedness};
use kindred_core::naming::UniqueNamer;
use kindred_core::pedigree::Pedigree;
use kindred_core::sources::RelatednessSource;
use kindred_core::validate::check_consistency;

#[derive(Parser)]
#[command(name = "kindred")]
#[command(version)]
#[command(about = "Infer pedigrees from pairwise relatedness estimates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a relatedness pedigree
    ///
    /// Uses pairwise relatedness scores, plus optional demographics and
    /// parentage records, to build an effective pedigree, generating the
    /// necessary number of unknown individuals along the way.
    Build {
        /// Three-column relatedness file (ID1, ID2, Rel)
        #[arg(short, long)]
        relatedness: String,

        /// Output DOT file
        #[arg(short, long)]
        output: String,

        /// Three-column demographics file (ID, Sex, Birth Year)
        #[arg(long)]
        demographics: Option<String>,

        /// Three-column parentage file (ID, Sire, Dam)
        #[arg(long)]
        parentage: Option<String>,

        /// Write individuals left unmapped by pruning to this file
        #[arg(long)]
        unmapped: Option<String>,

        /// Relatedness input format: "three-column" (default) or "ml-relate"
        #[arg(long, default_value = "three-column")]
        input_format: String,

        /// Normalize relatedness values to [0,1] before use
        #[arg(long)]
        normalize: bool,

        /// Maximum relational distance to incorporate
        #[arg(long, default_value = "9")]
        max_distance: u32,

        /// Orient edges (parent to child, older to younger) while building
        #[arg(long)]
        directed: bool,

        /// Remove arrow heads from the pedigree, using simple lines
        #[arg(long)]
        rm_arrows: bool,

        /// Keep any loops drawn between an individual and itself
        #[arg(long)]
        keep_loops: bool,

        /// Print a JSON run summary to stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            relatedness,
            output,
            demographics,
            parentage,
            unmapped,
            input_format,
            normalize,
            max_distance,
            directed,
            rm_arrows,
            keep_loops,
            json,
        } => cmd_build(
            &relatedness,
            &output,
            demographics.as_deref(),
            parentage.as_deref(),
            unmapped.as_deref(),
            &input_format,
            normalize,
            max_distance,
            directed,
            rm_arrows,
            keep_loops,
            json,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_build(
    relatedness_path: &str,
    output_path: &str,
    demographics_path: Option<&str>,
    parentage_path: Option<&str>,
    unmapped_path: Option<&str>,
    input_format: &str,
    normalize: bool,
    max_distance: u32,
    directed: bool,
    rm_arrows: bool,
    keep_loops: bool,
    json: bool,
) -> Result<()> {
    let max_degree = if max_distance > 9 {
        log::warn!(
            "Estimating relational distance beyond 9 is ill-advised; clamping {} to 9",
            max_distance
        );
        Degree::Ninth
    } else {
        Degree::try_from(max_distance).context("Invalid --max-distance")?
    };

    // Load inputs
    let rel: Box<dyn RelatednessSource> = match input_format.to_lowercase().as_str() {
        "three-column" => Box::new(
            relatedness::ThreeColumnCsv::from_csv(relatedness_path, normalize).with_context(
                || format!("Failed to load relatedness from '{}'", relatedness_path),
            )?,
        ),
        "ml-relate" => Box::new(
            ml_relate::MlRelateCsv::from_csv(relatedness_path, normalize).with_context(|| {
                format!("Failed to load relatedness from '{}'", relatedness_path)
            })?,
        ),
        other => {
            anyhow::bail!(
                "Unknown input format '{}'. Use 'three-column' (default) or 'ml-relate'.",
                other
            );
        }
    };
    eprintln!(
        "Loaded relatedness for {} individuals from '{}'",
        rel.indvs().len(),
        relatedness_path
    );

    let pars: Option<parentage::ThreeColumnCsv> = parentage_path
        .map(|path| {
            parentage::ThreeColumnCsv::from_csv(path)
                .with_context(|| format!("Failed to load parentage from '{}'", path))
        })
        .transpose()?;

    let current_year = chrono::Utc::now().year() as u32;
    let dems: Option<demographics::ThreeColumnCsv> = demographics_path
        .map(|path| {
            demographics::ThreeColumnCsv::from_csv(path, current_year)
                .with_context(|| format!("Failed to load demographics from '{}'", path))
        })
        .transpose()?;

    // All cross-source problems are reported together before building.
    check_consistency(rel.as_ref(), pars.as_ref(), dems.as_ref())
        .context("Input files disagree")?;

    // Build and prune
    let mode = if directed {
        GraphMode::Directed
    } else {
        GraphMode::Undirected
    };
    let mut namer = UniqueNamer::new();
    let graph = Graph::from_sources(
        mode,
        rel.as_ref(),
        max_degree,
        pars.as_ref(),
        dems.as_ref(),
        &mut namer,
    )
    .context("Failed to build pedigree graph")?;
    eprintln!(
        "Built graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let pruned = graph.prune_to_shortest(keep_loops);
    eprintln!(
        "Pruned graph: {} nodes, {} edges",
        pruned.node_count(),
        pruned.edge_count()
    );

    // Render and write outputs
    let (pedigree, unmapped_names) = Pedigree::from_graph(&pruned, pruned.knowns(), rm_arrows);

    fs::write(output_path, pedigree.to_string())
        .with_context(|| format!("Could not create output file '{}'", output_path))?;

    if let Some(path) = unmapped_path {
        if unmapped_names.is_empty() {
            log::info!("No unmapped individuals");
        } else {
            let mut file = fs::File::create(path)
                .with_context(|| format!("Could not create unmapped file '{}'", path))?;
            writeln!(file, "{}", unmapped_names.join("\n"))?;
        }
    }

    if json {
        let summary = serde_json::json!({
            "individuals": rel.indvs().len(),
            "nodes_built": graph.node_count(),
            "edges_built": graph.edge_count(),
            "nodes_pruned": pruned.node_count(),
            "edges_pruned": pruned.edge_count(),
            "unmapped": unmapped_names,
            "output": output_path,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !unmapped_names.is_empty() {
        eprintln!(
            "{} individual(s) could not be mapped: {}",
            unmapped_names.len(),
            unmapped_names.join(", ")
        );
    }

    Ok(())
}
