use thiserror::Error;

use crate::data::loader::{self, LoadError};
use crate::sankey::{Aggregator, LevelSelector, SankeyDiagram, SankeyError};

/// Failure of the load-then-aggregate path; both sides pass through unchanged.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Aggregate(#[from] SankeyError),
}

/// Decode an uploaded file and aggregate it in one step.
pub fn build_diagram(
    bytes: &[u8],
    filename: &str,
    selector: &LevelSelector,
    aggregator: &Aggregator,
) -> Result<SankeyDiagram, PipelineError> {
    let table = loader::load(bytes, filename)?;
    Ok(aggregator.aggregate(&table, selector)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sankey::ColumnProblem;

    const CSV: &str = "L1,L2,L3,V\nA,X,P,10\nA,Y,P,5\nB,X,Q,3\n";

    #[test]
    fn csv_upload_to_diagram() {
        let selector = LevelSelector::new("L1", "L2", "L3", "V");
        let d = build_diagram(CSV.as_bytes(), "flows.csv", &selector, &Aggregator::default()).unwrap();
        assert_eq!(d.labels().len(), 7);
        assert_eq!(d.edges().len(), 8);
        assert_eq!(d.edges()[0].value, 15.0);
    }

    #[test]
    fn load_errors_pass_through() {
        let selector = LevelSelector::new("L1", "L2", "L3", "V");
        let err = build_diagram(b"", "flows.txt", &selector, &Aggregator::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Load(LoadError::UnsupportedFormat { .. })));
        assert_eq!(err.to_string(), "unsupported file type: flows.txt");
    }

    #[test]
    fn aggregate_errors_pass_through() {
        let selector = LevelSelector::new("L1", "L2", "L3", "L1");
        let err = build_diagram(CSV.as_bytes(), "flows.csv", &selector, &Aggregator::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Aggregate(SankeyError::InvalidColumn {
                problem: ColumnProblem::NotNumeric,
                ..
            })
        ));
    }

    #[test]
    fn header_only_csv_is_empty_table() {
        let selector = LevelSelector::new("L1", "L2", "L3", "V");
        let err = build_diagram(b"L1,L2,L3,V\n", "flows.csv", &selector, &Aggregator::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Aggregate(SankeyError::EmptyTable)));
    }
}
