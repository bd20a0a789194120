//! Detection, logging, and renaming policy shared by every entity strategy.

/// How a strategy decides whether a source entity already exists in the
/// target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateDetection {
    /// Never treat entities as duplicates of one another; only raw id
    /// collisions trigger renaming.
    #[default]
    None,
    /// A source id that already exists in the target is a duplicate; the
    /// existing target entity wins.
    Identity,
    /// Use the type-specific similarity score; a best match scoring at or
    /// above the threshold is a duplicate.
    Fuzzy,
}

/// What to do when a duplicate is detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateLogging {
    /// Merge silently.
    #[default]
    None,
    /// Emit a log line and continue.
    Warning,
    /// Abort the merge with a descriptive error.
    Error,
}

/// How a colliding id is renamed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenamingStrategy {
    /// Prepend the source feed's assigned prefix on collision.
    #[default]
    Context,
    /// Reserved; currently identical to `Context`.
    Agency,
}

/// The three policy slots one entity strategy carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrategyPolicy {
    pub detection: DuplicateDetection,
    pub logging: DuplicateLogging,
    pub renaming: RenamingStrategy,
}

impl StrategyPolicy {
    pub fn new(detection: DuplicateDetection, logging: DuplicateLogging) -> Self {
        Self {
            detection,
            logging,
            renaming: RenamingStrategy::Context,
        }
    }
}

/// The fifteen GTFS filenames a policy can be scoped to, in the driver's
/// dependency order (§4.16 of the merge design).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GtfsFile {
    Agency,
    Area,
    Stop,
    Calendar,
    CalendarDate,
    Route,
    Shape,
    Trip,
    StopTime,
    Frequency,
    Transfer,
    Pathway,
    FareAttribute,
    FareRule,
    FeedInfo,
}

impl GtfsFile {
    pub const ALL_IN_DEPENDENCY_ORDER: [GtfsFile; 15] = [
        GtfsFile::Agency,
        GtfsFile::Area,
        GtfsFile::Stop,
        GtfsFile::Calendar,
        GtfsFile::CalendarDate,
        GtfsFile::Route,
        GtfsFile::Shape,
        GtfsFile::Trip,
        GtfsFile::StopTime,
        GtfsFile::Frequency,
        GtfsFile::Transfer,
        GtfsFile::Pathway,
        GtfsFile::FareAttribute,
        GtfsFile::FareRule,
        GtfsFile::FeedInfo,
    ];

    pub fn filename(self) -> &'static str {
        match self {
            GtfsFile::Agency => "agency.txt",
            GtfsFile::Area => "areas.txt",
            GtfsFile::Stop => "stops.txt",
            GtfsFile::Calendar => "calendar.txt",
            GtfsFile::CalendarDate => "calendar_dates.txt",
            GtfsFile::Route => "routes.txt",
            GtfsFile::Shape => "shapes.txt",
            GtfsFile::Trip => "trips.txt",
            GtfsFile::StopTime => "stop_times.txt",
            GtfsFile::Frequency => "frequencies.txt",
            GtfsFile::Transfer => "transfers.txt",
            GtfsFile::Pathway => "pathways.txt",
            GtfsFile::FareAttribute => "fare_attributes.txt",
            GtfsFile::FareRule => "fare_rules.txt",
            GtfsFile::FeedInfo => "feed_info.txt",
        }
    }

    pub fn from_filename(name: &str) -> Option<GtfsFile> {
        Self::ALL_IN_DEPENDENCY_ORDER
            .into_iter()
            .find(|f| f.filename() == name)
    }
}

/// Thresholds tuning auto-detection (§4.20) and the concurrent scorer
/// (§4.21). Has sensible defaults matching the merge design's defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoDetectThresholds {
    pub identity_overlap_threshold: f64,
    pub fuzzy_similarity_threshold: f64,
}

impl Default for AutoDetectThresholds {
    fn default() -> Self {
        Self {
            identity_overlap_threshold: 0.5,
            fuzzy_similarity_threshold: 0.5,
        }
    }
}

/// Top-level merge configuration: one [`StrategyPolicy`] per file, plus
/// auto-detection and concurrency tuning. Built by the CLI from parsed
/// flags, or used directly by library callers via [`Default`].
#[derive(Clone, Debug)]
pub struct MergeConfig {
    pub policies: std::collections::BTreeMap<GtfsFile, StrategyPolicy>,
    pub auto_detect: bool,
    pub auto_detect_thresholds: AutoDetectThresholds,
    /// Minimum number of fuzzy-scoring candidates before the concurrent
    /// scorer is used instead of a sequential scan (§4.21).
    pub concurrent_scorer_min_candidates: usize,
    pub concurrent_scorer_enabled: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        let mut policies = std::collections::BTreeMap::new();
        for file in GtfsFile::ALL_IN_DEPENDENCY_ORDER {
            policies.insert(file, StrategyPolicy::default());
        }
        Self {
            policies,
            auto_detect: false,
            auto_detect_thresholds: AutoDetectThresholds::default(),
            concurrent_scorer_min_candidates: 100,
            concurrent_scorer_enabled: true,
        }
    }
}

impl MergeConfig {
    pub fn policy_for(&self, file: GtfsFile) -> StrategyPolicy {
        self.policies.get(&file).copied().unwrap_or_default()
    }

    /// Applies `detection`/`logging` to every file's policy (the CLI's
    /// unscoped `--duplicateDetection=`/`--logging=` flags).
    pub fn set_all(&mut self, detection: DuplicateDetection, logging: DuplicateLogging) {
        for policy in self.policies.values_mut() {
            policy.detection = detection;
            policy.logging = logging;
        }
    }

    /// Applies `detection` to a single file's policy (the CLI's
    /// `--file=NAME --duplicateDetection=` scoping).
    pub fn set_detection_for(&mut self, file: GtfsFile, detection: DuplicateDetection) {
        self.policies.entry(file).or_default().detection = detection;
    }

    pub fn set_logging_for(&mut self, file: GtfsFile, logging: DuplicateLogging) {
        self.policies.entry(file).or_default().logging = logging;
    }
}
