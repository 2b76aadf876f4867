//! Usage totals per dataset and per interaction.
//!
//! Totals are cumulative across runs: a log opened on a file starts from
//! what the last run saved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Session-level events that are not tied to one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    Slider,
    Reset,
    SessionOpened,
    SessionClosed,
    SessionEvicted,
}

impl Interaction {
    pub const ALL: [Interaction; 5] = [
        Interaction::Slider,
        Interaction::Reset,
        Interaction::SessionOpened,
        Interaction::SessionClosed,
        Interaction::SessionEvicted,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Interaction::Slider => "Slider changes",
            Interaction::Reset => "Resets",
            Interaction::SessionOpened => "Sessions opened",
            Interaction::SessionClosed => "Sessions closed",
            Interaction::SessionEvicted => "Sessions evicted",
        }
    }
}

/// How one dataset has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesUsage {
    /// Full payloads served
    pub served: u64,
    /// Windows computed over it
    pub windows: u64,
    /// Chart clicks that made it the active series
    pub clicks: u64,
}

impl SeriesUsage {
    fn activity(&self) -> u64 {
        self.served + self.windows + self.clicks
    }
}

/// Everything the log counts. This is also the persisted form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityTotals {
    #[serde(default)]
    pub series: BTreeMap<String, SeriesUsage>,
    #[serde(default)]
    pub interactions: BTreeMap<Interaction, u64>,
}

impl ActivityTotals {
    /// Usage of one dataset; zero if it was never touched.
    pub fn usage(&self, series: &str) -> SeriesUsage {
        self.series.get(series).copied().unwrap_or_default()
    }

    pub fn count(&self, interaction: Interaction) -> u64 {
        self.interactions.get(&interaction).copied().unwrap_or(0)
    }

    pub fn windows_computed(&self) -> u64 {
        self.series.values().map(|u| u.windows).sum()
    }

    pub fn clicks(&self) -> u64 {
        self.series.values().map(|u| u.clicks).sum()
    }

    /// Dataset with the most combined use, ties going to the first name.
    pub fn busiest_series(&self) -> Option<(&str, SeriesUsage)> {
        self.series
            .iter()
            .filter(|(_, usage)| usage.activity() > 0)
            .fold(None, |best: Option<(&str, SeriesUsage)>, (name, usage)| match best {
                Some((_, b)) if b.activity() >= usage.activity() => best,
                _ => Some((name.as_str(), *usage)),
            })
    }

    fn series_mut(&mut self, series: &str) -> &mut SeriesUsage {
        self.series.entry(series.to_string()).or_default()
    }
}

/// Totals as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedActivity {
    pub last_updated: DateTime<Utc>,
    #[serde(flatten)]
    pub totals: ActivityTotals,
}

/// Shared usage log. Handlers record into it concurrently.
#[derive(Debug)]
pub struct ActivityLog {
    totals: Mutex<ActivityTotals>,
    started: DateTime<Utc>,
    persist_path: Option<PathBuf>,
}

impl ActivityLog {
    /// In-memory log starting from zero.
    pub fn new() -> Self {
        Self::from_totals(ActivityTotals::default(), None)
    }

    /// Log backed by `path`, continuing from the totals saved there.
    pub fn open(path: PathBuf) -> Self {
        let totals = match Self::read_persisted(&path) {
            Some(persisted) => persisted.totals,
            None => {
                if path.exists() {
                    tracing::warn!("Ignoring unreadable activity file {:?}", path);
                }
                ActivityTotals::default()
            }
        };
        Self::from_totals(totals, Some(path))
    }

    fn from_totals(totals: ActivityTotals, persist_path: Option<PathBuf>) -> Self {
        Self {
            totals: Mutex::new(totals),
            started: Utc::now(),
            persist_path,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ActivityTotals> {
        // Counters stay usable even if a recording thread panicked.
        self.totals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_dataset_served(&self, series: &str) {
        self.lock().series_mut(series).served += 1;
    }

    pub fn record_window(&self, series: &str) {
        self.lock().series_mut(series).windows += 1;
    }

    pub fn record_click(&self, series: &str) {
        self.lock().series_mut(series).clicks += 1;
    }

    pub fn record(&self, interaction: Interaction) {
        self.record_many(interaction, 1);
    }

    pub fn record_many(&self, interaction: Interaction, count: u64) {
        if count > 0 {
            *self.lock().interactions.entry(interaction).or_insert(0) += count;
        }
    }

    /// Copy of the current totals.
    pub fn totals(&self) -> ActivityTotals {
        self.lock().clone()
    }

    pub fn uptime_secs(&self) -> u64 {
        (Utc::now() - self.started).num_seconds().max(0) as u64
    }

    /// Multi-line report for the end of `serve`.
    pub fn summary(&self) -> String {
        let totals = self.totals();
        let mut out = String::from("Activity:\n");
        out.push_str(&format!("  Windows computed: {}\n", totals.windows_computed()));
        out.push_str(&format!("  Clicks: {}\n", totals.clicks()));
        for interaction in Interaction::ALL {
            out.push_str(&format!(
                "  {}: {}\n",
                interaction.label(),
                totals.count(interaction)
            ));
        }
        if let Some((name, usage)) = totals.busiest_series() {
            out.push_str(&format!(
                "  Busiest dataset: {name} ({} served, {} windows, {} clicks)\n",
                usage.served, usage.windows, usage.clicks
            ));
        }
        out.push_str(&format!("  Uptime: {} seconds", self.uptime_secs()));
        out
    }

    /// Write the totals to the backing file, if any.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let persisted = PersistedActivity {
            last_updated: Utc::now(),
            totals: self.totals(),
        };
        let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Read saved totals without opening a log.
    pub fn read_persisted(path: &Path) -> Option<PersistedActivity> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "signal-playground-activity-{tag}-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_counts_per_series() {
        let log = ActivityLog::new();
        log.record_click("signal");
        log.record_click("signal");
        log.record_window("signal");
        log.record_window("fft");
        log.record_dataset_served("psd");

        let totals = log.totals();
        assert_eq!(
            totals.usage("signal"),
            SeriesUsage {
                served: 0,
                windows: 1,
                clicks: 2
            }
        );
        assert_eq!(totals.usage("fft").windows, 1);
        assert_eq!(totals.usage("psd").served, 1);
        assert_eq!(totals.usage("bandpass"), SeriesUsage::default());
        assert_eq!(totals.windows_computed(), 2);
        assert_eq!(totals.clicks(), 2);
    }

    #[test]
    fn test_interactions() {
        let log = ActivityLog::new();
        log.record(Interaction::SessionOpened);
        log.record(Interaction::Reset);
        log.record_many(Interaction::SessionEvicted, 3);
        log.record_many(Interaction::SessionClosed, 0);

        let totals = log.totals();
        assert_eq!(totals.count(Interaction::SessionOpened), 1);
        assert_eq!(totals.count(Interaction::Reset), 1);
        assert_eq!(totals.count(Interaction::SessionEvicted), 3);
        assert_eq!(totals.count(Interaction::Slider), 0);
        assert!(!totals.interactions.contains_key(&Interaction::SessionClosed));
    }

    #[test]
    fn test_busiest_series() {
        let log = ActivityLog::new();
        assert!(log.totals().busiest_series().is_none());

        log.record_window("accelerometer");
        log.record_click("signal");
        log.record_window("signal");
        let totals = log.totals();
        let (name, usage) = totals.busiest_series().unwrap();
        assert_eq!(name, "signal");
        assert_eq!(usage.clicks, 1);
    }

    #[test]
    fn test_summary_format() {
        let log = ActivityLog::new();
        log.record(Interaction::Reset);
        log.record_window("fft");
        let summary = log.summary();

        assert!(summary.contains("Windows computed: 1"));
        assert!(summary.contains("Resets: 1"));
        assert!(summary.contains("Busiest dataset: fft"));
        assert!(summary.contains("Uptime"));
    }

    #[test]
    fn test_totals_accumulate_across_runs() {
        let path = temp_path("runs");

        let log = ActivityLog::open(path.clone());
        log.record_dataset_served("signal");
        log.record(Interaction::SessionOpened);
        log.save().unwrap();

        let reopened = ActivityLog::open(path.clone());
        reopened.record_dataset_served("signal");
        reopened.save().unwrap();

        let persisted = ActivityLog::read_persisted(&path).unwrap();
        assert_eq!(persisted.totals.usage("signal").served, 2);
        assert_eq!(persisted.totals.count(Interaction::SessionOpened), 1);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["interactions"]["session_opened"], 1);
        assert!(json["last_updated"].is_string());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unreadable_file_starts_fresh() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{not json").unwrap();

        let log = ActivityLog::open(path.clone());
        assert_eq!(log.totals(), ActivityTotals::default());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let log = ActivityLog::new();
        log.record_click("signal");
        assert!(log.save().is_ok());
    }
}
