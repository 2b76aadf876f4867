//! Data sources: where named series come from.
//!
//! A source is read once per series; the windowing engine only ever sees
//! the resulting immutable snapshot. Failures surface as
//! [`WindowError::DataUnavailable`] so windowing never runs on missing data.

use super::{generate, DatasetKind, Noise};
use crate::core::{Series, SeriesPayload, WindowError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something that can hand out named series.
pub trait DataSource: Send + Sync {
    /// Fetch the series called `name`.
    fn fetch(&self, name: &str) -> Result<Arc<Series>, WindowError>;

    /// Names of all series this source can serve.
    fn names(&self) -> Vec<String>;
}

/// In-memory set of series, built once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    series: BTreeMap<String, Arc<Series>>,
}

impl DatasetStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate every built-in dataset.
    pub fn generate(seed: Option<u64>) -> Result<Self, WindowError> {
        let mut noise = Noise::new(seed)?;
        let mut store = Self::new();
        for kind in DatasetKind::ALL {
            store.insert(generate(kind, &mut noise)?);
        }
        tracing::info!(count = store.len(), seed = ?seed, "generated datasets");
        Ok(store)
    }

    /// Load every series a source can serve into memory.
    pub fn snapshot(source: &dyn DataSource) -> Result<Self, WindowError> {
        let mut store = Self::new();
        for name in source.names() {
            let series = source.fetch(&name)?;
            store.series.insert(name, series);
        }
        Ok(store)
    }

    /// Add a series under its own name, replacing any previous one.
    pub fn insert(&mut self, series: Series) {
        self.series
            .insert(series.name().to_string(), Arc::new(series));
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl DataSource for DatasetStore {
    fn fetch(&self, name: &str) -> Result<Arc<Series>, WindowError> {
        self.series
            .get(name)
            .cloned()
            .ok_or_else(|| WindowError::DataUnavailable(format!("unknown series '{name}'")))
    }

    fn names(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }
}

/// Reads `<dir>/<name>.json` files in the series payload format.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl DataSource for JsonFileSource {
    fn fetch(&self, name: &str) -> Result<Arc<Series>, WindowError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(WindowError::DataUnavailable(format!(
                "invalid series name '{name}'"
            )));
        }

        let path = self.path_for(name);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            WindowError::DataUnavailable(format!("could not read {path:?}: {e}"))
        })?;
        let payload: SeriesPayload = serde_json::from_str(&content).map_err(|e| {
            WindowError::DataUnavailable(format!("could not parse {path:?}: {e}"))
        })?;

        let series = Series::from_payload(name, payload).map_err(|e| match e {
            WindowError::InvalidArgument(msg) => WindowError::DataUnavailable(msg),
            other => other,
        })?;
        Ok(Arc::new(series))
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
                    .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AxisKind;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "signal-playground-source-{tag}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn small_series(name: &str) -> Series {
        let axis = vec![0.0, 0.5, 1.0];
        Series::new(
            name,
            AxisKind::Time,
            axis.clone(),
            [axis.clone(), axis.clone(), axis],
            ["a".to_string(), "b".to_string(), "c".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_store_fetch_and_unknown() {
        let mut store = DatasetStore::new();
        store.insert(small_series("tiny"));

        assert_eq!(store.fetch("tiny").unwrap().len(), 3);
        assert!(matches!(
            store.fetch("missing"),
            Err(WindowError::DataUnavailable(_))
        ));
        assert_eq!(store.names(), vec!["tiny".to_string()]);
    }

    #[test]
    fn test_generated_store_has_all_datasets() {
        let store = DatasetStore::generate(Some(1)).unwrap();
        assert_eq!(store.len(), DatasetKind::ALL.len());
        for kind in DatasetKind::ALL {
            assert!(store.fetch(kind.name()).is_ok());
        }
    }

    #[test]
    fn test_json_file_source() {
        let dir = temp_dir("json");
        let payload = serde_json::to_string(&small_series("tiny").to_payload()).unwrap();
        std::fs::write(dir.join("tiny.json"), payload).unwrap();
        std::fs::write(dir.join("broken.json"), "{not json").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
        std::fs::write(
            dir.join("short.json"),
            r#"{"data": {"time": [0.0, 1.0], "ch1": [1.0, 2.0], "ch2": [1.0], "ch3": [1.0, 2.0]},
                "labels": ["a", "b", "c"]}"#,
        )
        .unwrap();

        let source = JsonFileSource::new(&dir);
        assert_eq!(
            source.names(),
            vec!["broken".to_string(), "short".to_string(), "tiny".to_string()]
        );

        let series = source.fetch("tiny").unwrap();
        assert_eq!(series.name(), "tiny");
        assert_eq!(series.axis(), &[0.0, 0.5, 1.0]);

        assert!(matches!(
            source.fetch("broken"),
            Err(WindowError::DataUnavailable(_))
        ));
        // parses, but the channels are misaligned
        assert!(matches!(
            source.fetch("short"),
            Err(WindowError::DataUnavailable(ref m)) if m.contains("ch2")
        ));
        assert!(matches!(
            source.fetch("absent"),
            Err(WindowError::DataUnavailable(_))
        ));
        assert!(matches!(
            source.fetch("../etc"),
            Err(WindowError::DataUnavailable(_))
        ));

        assert!(DatasetStore::snapshot(&source).is_err());
        std::fs::remove_file(dir.join("broken.json")).unwrap();
        assert!(DatasetStore::snapshot(&source).is_err());
        std::fs::remove_file(dir.join("short.json")).unwrap();
        assert_eq!(DatasetStore::snapshot(&source).unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
