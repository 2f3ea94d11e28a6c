use thiserror::Error;

use crate::analyzer::AnalyzeError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Analysis of '{file_name}' failed: {source}")]
    Analyze {
        file_name: String,
        #[source]
        source: AnalyzeError,
    },

    #[error("Saving '{file_name}' failed: {source}")]
    Store {
        file_name: String,
        #[source]
        source: StoreError,
    },
}
