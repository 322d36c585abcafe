//! Cohort file loading and the process-wide dataset.
//!
//! Both cohort files are read in full before a [`Dataset`] is returned;
//! a failure on either one fails the whole load.

use super::codebook::CodeBook;
use super::decoder::{DecodeStats, Decoder};
use crate::error::LoadError;
use crate::models::{Cohort, RawRecord, Record};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Locations of the two cohort files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub female: PathBuf,
    pub male: PathBuf,
}

impl From<&crate::config::DataConfig> for DataSources {
    fn from(config: &crate::config::DataConfig) -> Self {
        Self {
            female: PathBuf::from(&config.female_path),
            male: PathBuf::from(&config.male_path),
        }
    }
}

/// Counts reported after a load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub female_rows: usize,
    pub male_rows: usize,
    pub decode: DecodeStats,
}

impl LoadSummary {
    pub fn total_rows(&self) -> usize {
        self.female_rows + self.male_rows
    }
}

/// The decoded record set. Immutable once built; clones share storage.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[Record]>,
    summary: LoadSummary,
}

impl Dataset {
    /// Load and decode both cohort files.
    pub fn load(sources: &DataSources, decoder: &Decoder<'_>) -> Result<Self, LoadError> {
        info!(
            "Loading cohort files: {} and {}",
            sources.female.display(),
            sources.male.display()
        );

        let mut summary = LoadSummary::default();
        let mut records =
            load_cohort_file(&sources.female, Cohort::Female, decoder, &mut summary.decode)?;
        summary.female_rows = records.len();

        let male = load_cohort_file(&sources.male, Cohort::Male, decoder, &mut summary.decode)?;
        summary.male_rows = male.len();
        records.extend(male);

        if summary.decode.total_unknown() > 0 {
            warn!(
                "{} coded values were not in the code book and were left missing",
                summary.decode.total_unknown()
            );
        }
        info!(
            "Loaded {} records ({} female, {} male)",
            summary.total_rows(),
            summary.female_rows,
            summary.male_rows
        );

        Ok(Self::from_records(records, summary))
    }

    /// Wrap already-decoded records.
    pub fn from_records(records: Vec<Record>, summary: LoadSummary) -> Self {
        Self {
            records: records.into(),
            summary,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn summary(&self) -> &LoadSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records of one cohort.
    pub fn cohort_size(&self, cohort: Cohort) -> usize {
        self.records.iter().filter(|r| r.cohort == cohort).count()
    }
}

/// Load-once holder for the process-wide dataset.
#[derive(Debug, Default)]
pub struct SharedDataset {
    cell: OnceLock<Dataset>,
}

impl SharedDataset {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the dataset, loading it on first use.
    ///
    /// Later calls return the first successful load untouched. A failed load
    /// leaves the holder empty so the caller can retry.
    pub fn get_or_load(
        &self,
        sources: &DataSources,
        decoder: &Decoder<'_>,
    ) -> Result<&Dataset, LoadError> {
        if let Some(dataset) = self.cell.get() {
            debug!("Dataset already loaded");
            return Ok(dataset);
        }
        let dataset = Dataset::load(sources, decoder)?;
        Ok(self.cell.get_or_init(|| dataset))
    }

    pub fn get(&self) -> Option<&Dataset> {
        self.cell.get()
    }
}

/// Read one cohort file.
pub fn load_cohort_file(
    path: &Path,
    cohort: Cohort,
    decoder: &Decoder<'_>,
    stats: &mut DecodeStats,
) -> Result<Vec<Record>, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingFile(path.to_path_buf()));
    }
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = read_cohort(file, cohort, decoder, stats).map_err(|source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} {} rows from {}", records.len(), cohort, path.display());
    Ok(records)
}

/// Read one cohort from any CSV source with a header row.
pub fn read_cohort<R: Read>(
    reader: R,
    cohort: Cohort,
    decoder: &Decoder<'_>,
    stats: &mut DecodeStats,
) -> Result<Vec<Record>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<RawRecord>() {
        let raw = row?;
        records.push(decoder.decode(&raw, cohort, stats));
    }
    Ok(records)
}

/// Decode with the default code book and ceiling. Handy for tests and tools.
pub fn load_default(sources: &DataSources) -> Result<Dataset, LoadError> {
    let codebook = CodeBook::brfss_2024();
    Dataset::load(sources, &Decoder::new(&codebook))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(name)
    }

    fn fixture_sources() -> DataSources {
        DataSources {
            female: fixture("female_veterans_sample.csv"),
            male: fixture("male_veterans_sample.csv"),
        }
    }

    #[test]
    fn test_read_cohort_from_str() {
        let csv_text = "\
_STATE,_AGEG5YR,MENTHLTH,PHYSHLTH,ADDEPEV3,EXTRA
6.0,1.0,10,88,1,ignored
48,3,,2,2,ignored
";
        let book = CodeBook::brfss_2024();
        let mut stats = DecodeStats::default();
        let records = read_cohort(
            csv_text.as_bytes(),
            Cohort::Female,
            &Decoder::new(&book),
            &mut stats,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].region.as_deref(), Some("California"));
        assert_eq!(records[0].mental_health_days, Some(10.0));
        assert_eq!(records[0].physical_health_days, None);
        assert_eq!(records[0].depression.as_deref(), Some("Yes"));
        assert_eq!(records[1].region.as_deref(), Some("Texas"));
        assert_eq!(records[1].age_group.as_deref(), Some("30-34"));
        assert_eq!(records[1].mental_health_days, None);
        assert_eq!(records[1].income_group, None);
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let csv_text = "_STATE,MENTHLTH\nsix,10\n";
        let book = CodeBook::brfss_2024();
        let mut stats = DecodeStats::default();
        let result = read_cohort(
            csv_text.as_bytes(),
            Cohort::Male,
            &Decoder::new(&book),
            &mut stats,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_fixtures() {
        let dataset = load_default(&fixture_sources()).unwrap();

        assert_eq!(dataset.summary().female_rows, 6);
        assert_eq!(dataset.summary().male_rows, 5);
        assert_eq!(dataset.len(), 11);
        assert_eq!(dataset.cohort_size(Cohort::Female), 6);
        assert_eq!(dataset.cohort_size(Cohort::Male), 5);
        // One female row carries state code 3, which is not a state.
        assert_eq!(dataset.summary().decode.total_unknown(), 1);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let sources = DataSources {
            female: fixture("female_veterans_sample.csv"),
            male: fixture("does_not_exist.csv"),
        };
        let err = load_default(&sources).unwrap_err();
        assert!(matches!(err, LoadError::MissingFile(_)));
    }

    #[test]
    fn test_load_from_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let female = dir.path().join("female.csv");
        let male = dir.path().join("male.csv");
        let mut f = std::fs::File::create(&female).unwrap();
        writeln!(f, "_STATE,MENTHLTH").unwrap();
        writeln!(f, "1,3").unwrap();
        let mut m = std::fs::File::create(&male).unwrap();
        writeln!(m, "_STATE,MENTHLTH").unwrap();

        let dataset = load_default(&DataSources { female, male }).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].region.as_deref(), Some("Alabama"));
    }

    #[test]
    fn test_shared_dataset_loads_once() {
        let shared = SharedDataset::new();
        let book = CodeBook::brfss_2024();
        let decoder = Decoder::new(&book);

        let first = shared.get_or_load(&fixture_sources(), &decoder).unwrap().clone();
        let second = shared.get_or_load(&fixture_sources(), &decoder).unwrap();

        assert_eq!(first.records(), second.records());
        assert!(shared.get().is_some());
    }

    #[test]
    fn test_repeated_loads_are_identical() {
        let a = load_default(&fixture_sources()).unwrap();
        let b = load_default(&fixture_sources()).unwrap();
        assert_eq!(a.records(), b.records());
        assert_eq!(a.summary(), b.summary());
    }
}
