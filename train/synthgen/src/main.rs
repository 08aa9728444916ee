use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::{Context as _, bail};
use clap::Parser;
use scene::{Allocation, GenerationConfig, TaskType};
use tracing::info;

use crate::{generator::TaskGenerator, io::OutputWriter, record::TaskPair};

mod encode;
mod fonts;
mod frames;
mod generator;
mod geom;
mod io;
mod prompt;
mod record;
mod render;

/// Generate an object-counting task dataset.
#[derive(Parser, Debug)]
#[command(name = "synthgen", version)]
struct Cli {
    /// JSON file with generation settings; unset fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of tasks under the default shape policy.
    #[arg(long)]
    num_samples: Option<usize>,

    /// Generate a fixed number of tasks for every task type.
    #[arg(long)]
    by_task_type: bool,

    /// Tasks per type with --by-task-type.
    #[arg(long, default_value_t = 20)]
    tasks_per_type: usize,

    /// Total tasks, spread evenly over all task types.
    #[arg(long, conflicts_with_all = ["by_task_type", "num_samples"])]
    total_tasks: Option<usize>,

    /// Restrict generation to these task types (shape tags or "mixed").
    #[arg(long, value_delimiter = ',')]
    types: Vec<String>,

    /// Output directory.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Random seed for reproducibility.
    #[arg(long)]
    seed: Option<u64>,

    /// Disable ground-truth video generation.
    #[arg(long)]
    no_videos: bool,
}

enum Mode {
    Samples(usize),
    Allocated(Allocation),
}

fn load_config(cli: &Cli) -> anyhow::Result<GenerationConfig> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let f = File::open(path)
                .with_context(|| format!("failed to open config '{}'", path.display()))?;
            serde_json::from_reader(BufReader::new(f))
                .with_context(|| format!("failed to parse config '{}'", path.display()))?
        }
        None => GenerationConfig::default(),
    };
    if let Some(out) = &cli.output {
        cfg.output_dir = out.clone();
    }
    if cli.seed.is_some() {
        cfg.random_seed = cli.seed;
    }
    if cli.no_videos {
        cfg.generate_videos = false;
    }
    if let Some(n) = cli.num_samples {
        cfg.num_samples = n;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn select_mode(cli: &Cli, cfg: &GenerationConfig) -> anyhow::Result<Mode> {
    let types = if cli.types.is_empty() {
        TaskType::all_for(cfg)
    } else {
        cli.types
            .iter()
            .map(|t| TaskType::parse_for(t, cfg))
            .collect::<Result<Vec<_>, _>>()?
    };

    if let Some(total) = cli.total_tasks {
        Ok(Mode::Allocated(Allocation::even(total, &types)))
    } else if cli.by_task_type {
        Ok(Mode::Allocated(Allocation::fixed(cli.tasks_per_type, &types)))
    } else if cli.num_samples.is_some() || cfg.num_samples > 0 {
        Ok(Mode::Samples(cfg.num_samples))
    } else {
        bail!("one of --num-samples, --by-task-type or --total-tasks is required")
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    let mode = select_mode(&cli, &cfg)?;

    let mut writer = OutputWriter::create(&cfg.output_dir, &cfg.domain)?;
    let domain = cfg.domain.clone();
    let mut generator = TaskGenerator::new(cfg)?;

    let sink = |task: TaskPair| writer.write_task(&task);
    let produced = match mode {
        Mode::Samples(n) => {
            info!(n, "generating tasks");
            generator.generate_samples(n, sink)?
        }
        Mode::Allocated(alloc) => {
            info!(
                total = alloc.total(),
                types = alloc.per_type.len(),
                "generating tasks by type"
            );
            generator.generate_allocation(&alloc, &domain, sink)?
        }
    };

    writer.finalize()?;
    info!(
        produced,
        unique = generator.unique_count(),
        written = writer.written(),
        out = %writer.task_root().display(),
        "done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::{ConfigError, ShapeKind};

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("synthgen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn types_outside_vocabulary_are_rejected() {
        let cfg = GenerationConfig {
            object_types: vec![ShapeKind::Circle],
            ..GenerationConfig::default()
        };
        let err = select_mode(&cli(&["--total-tasks", "4", "--types", "circle,star"]), &cfg)
            .err()
            .unwrap();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::UnknownTaskType("star".into()))
        );
    }

    #[test]
    fn total_tasks_spread_over_selected_types() {
        let cfg = GenerationConfig::default();
        let Mode::Allocated(alloc) =
            select_mode(&cli(&["--total-tasks", "5", "--types", "circle,mixed"]), &cfg).unwrap()
        else {
            panic!("expected an allocation");
        };
        assert_eq!(
            alloc.per_type,
            vec![(TaskType::Shape(ShapeKind::Circle), 3), (TaskType::Mixed, 2)]
        );
    }
}
