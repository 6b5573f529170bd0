use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use sankey_tool::config::AppConfig;
use sankey_tool::pipeline;
use sankey_tool::sankey::{Aggregator, LevelSelector};

#[derive(Parser, Debug)]
#[command(about = "Aggregate a table into a Sankey diagram and emit the Plotly trace as JSON.")]
struct Args {
    /// Input table (.csv, .xlsx, .xls, .json, .parquet).
    input: PathBuf,

    /// Column for the first level (sorted by key).
    level1: String,

    /// Column for the second level.
    level2: String,

    /// Column for the third level.
    level3: String,

    /// Numeric column summed into link widths.
    value: String,

    /// Write the JSON here instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl Args {
    fn selector(&self) -> LevelSelector {
        LevelSelector::new(&self.level1, &self.level2, &self.level3, &self.value)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = AppConfig::from_env()?;
    let filename = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .context("input path has no file name")?;
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let diagram = pipeline::build_diagram(
        &bytes,
        filename,
        &args.selector(),
        &Aggregator::new(config.aggregate),
    )?;
    let text = serde_json::to_string_pretty(&diagram.to_plotly_json())?;

    match &args.out {
        Some(out) => {
            std::fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
            log::info!(
                "Wrote {} nodes and {} links to {}",
                diagram.node_count(),
                diagram.edges().len(),
                out.display()
            );
        }
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn positional_columns_and_out_flag() {
        let args = Args::try_parse_from([
            "sankey_export",
            "sales.csv",
            "region",
            "channel",
            "product",
            "revenue",
            "--out",
            "sankey.json",
        ])
        .unwrap();
        assert_eq!(args.input, PathBuf::from("sales.csv"));
        assert_eq!(args.out, Some(PathBuf::from("sankey.json")));
        assert_eq!(
            args.selector(),
            LevelSelector::new("region", "channel", "product", "revenue")
        );
    }

    #[test]
    fn out_defaults_to_stdout() {
        let args =
            Args::try_parse_from(["sankey_export", "t.parquet", "a", "b", "c", "v"]).unwrap();
        assert!(args.out.is_none());
    }

    #[test]
    fn missing_value_column_is_rejected() {
        let err = Args::try_parse_from(["sankey_export", "t.csv", "a", "b", "c"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
