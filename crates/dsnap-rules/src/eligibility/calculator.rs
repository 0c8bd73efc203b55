//! Disaster Gross Income Limit and allotment tables.
//!
//! Each table lists `(income limit, allotment)` pairs for household sizes
//! `1..=N` and extrapolates linearly past `N` using per-person increments.
//! Tables are selected per jurisdiction through [`TierTableRegistry`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Disaster, RegionCategory};

/// Ascending step table keyed by household size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierTable {
    limits: Vec<i64>,
    allotments: Vec<i64>,
    incremental_limit: i64,
    incremental_allotment: i64,
}

impl TierTable {
    /// Builds a table, rejecting empty tables and any column that decreases
    /// between consecutive household sizes.
    pub fn new(
        limits_and_allotments: &[(i64, i64)],
        incremental_limit: i64,
        incremental_allotment: i64,
    ) -> Result<Self, TierTableError> {
        if limits_and_allotments.is_empty() {
            return Err(TierTableError::Empty);
        }

        let (limits, allotments): (Vec<i64>, Vec<i64>) =
            limits_and_allotments.iter().copied().unzip();

        if let Some(size) = first_descent(&limits) {
            return Err(TierTableError::LimitsNotAscending { size });
        }
        if let Some(size) = first_descent(&allotments) {
            return Err(TierTableError::AllotmentsNotAscending { size });
        }

        Ok(Self {
            limits,
            allotments,
            incremental_limit,
            incremental_allotment,
        })
    }

    pub fn get_limit(&self, size_of_household: u32) -> i64 {
        self.lookup(&self.limits, self.incremental_limit, size_of_household)
    }

    pub fn get_allotment(&self, size_of_household: u32) -> i64 {
        self.lookup(
            &self.allotments,
            self.incremental_allotment,
            size_of_household,
        )
    }

    pub fn limit_and_allotment(&self, size_of_household: u32) -> (i64, i64) {
        (
            self.get_limit(size_of_household),
            self.get_allotment(size_of_household),
        )
    }

    /// Largest household size with an explicit row; bigger households extrapolate.
    pub fn tabulated_sizes(&self) -> u32 {
        u32::try_from(self.limits.len()).unwrap_or(u32::MAX)
    }

    fn lookup(&self, column: &[i64], increment: i64, size_of_household: u32) -> i64 {
        // Sizes below one are clamped; validated input never produces them.
        let size = size_of_household.max(1);
        let tabulated = self.tabulated_sizes();
        let last = column.last().copied().unwrap_or_default();
        if size > tabulated {
            return last.saturating_add(i64::from(size - tabulated).saturating_mul(increment));
        }
        column.get(size as usize - 1).copied().unwrap_or(last)
    }
}

/// Returns the 1-indexed household size at which `column` first decreases.
fn first_descent(column: &[i64]) -> Option<usize> {
    column
        .windows(2)
        .position(|pair| pair[0] > pair[1])
        .map(|index| index + 2)
}

/// Configuration error for a misordered or empty table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TierTableError {
    #[error("tier table must contain at least one household size")]
    Empty,
    #[error("limits must be in ascending order (decrease at household size {size})")]
    LimitsNotAscending { size: usize },
    #[error("allotments must be in ascending order (decrease at household size {size})")]
    AllotmentsNotAscending { size: usize },
}

/// Configuration error raised while resolving the table for a disaster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculatorError {
    #[error("no income and allotment table configured for jurisdiction {state}{}", region_suffix(.region))]
    UnknownJurisdiction {
        state: String,
        region: Option<RegionCategory>,
    },
    #[error(transparent)]
    Table(#[from] TierTableError),
}

fn region_suffix(region: &Option<RegionCategory>) -> String {
    match region {
        Some(region) => format!(" ({})", region.label()),
        None => String::new(),
    }
}

/// Lookup key for a jurisdiction table: a state/territory code plus an
/// optional region category for states that split their tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JurisdictionKey {
    pub state: String,
    pub region: Option<RegionCategory>,
}

impl JurisdictionKey {
    pub fn new(state: &str, region: Option<RegionCategory>) -> Self {
        Self {
            state: state.trim().to_ascii_uppercase(),
            region,
        }
    }
}

/// Jurisdiction-keyed table lookup with a dedicated DSED table and an
/// optional fallback for jurisdictions without an override.
#[derive(Debug, Clone)]
pub struct TierTableRegistry {
    dsed: TierTable,
    default: Option<TierTable>,
    jurisdictions: BTreeMap<JurisdictionKey, TierTable>,
}

impl TierTableRegistry {
    pub fn new(dsed: TierTable) -> Self {
        Self {
            dsed,
            default: None,
            jurisdictions: BTreeMap::new(),
        }
    }

    pub fn with_default(mut self, table: TierTable) -> Self {
        self.default = Some(table);
        self
    }

    pub fn with_jurisdiction(
        mut self,
        state: &str,
        region: Option<RegionCategory>,
        table: TierTable,
    ) -> Self {
        self.jurisdictions
            .insert(JurisdictionKey::new(state, region), table);
        self
    }

    /// The federal tables: a default table, overrides for Alaska (by region),
    /// Hawaii, Guam and the US Virgin Islands, and the DSED table.
    pub fn standard() -> Result<Self, TierTableError> {
        let registry = Self::new(TierTable::new(&DSED_TABLE, 419, 144)?)
            .with_default(TierTable::new(&DEFAULT_TABLE, 360, 144)?)
            .with_jurisdiction(
                "AK",
                Some(RegionCategory::Urban),
                TierTable::new(&AK_URBAN_TABLE, 450, 174)?,
            )
            .with_jurisdiction(
                "AK",
                Some(RegionCategory::Rural1),
                TierTable::new(&AK_RURAL1_TABLE, 450, 222)?,
            )
            .with_jurisdiction(
                "AK",
                Some(RegionCategory::Rural2),
                TierTable::new(&AK_RURAL2_TABLE, 450, 270)?,
            )
            .with_jurisdiction("HI", None, TierTable::new(&HI_TABLE, 415, 269)?)
            .with_jurisdiction("GU", None, TierTable::new(&GU_TABLE, 360, 213)?)
            .with_jurisdiction("VI", None, TierTable::new(&VI_TABLE, 360, 186)?);
        Ok(registry)
    }

    /// Resolves the table for a jurisdiction. DSED disasters always use the
    /// DSED table. States whose tables are split by region fail unless a
    /// known region is supplied; any other state falls back to the default.
    pub fn resolve(
        &self,
        state: &str,
        region: Option<RegionCategory>,
        uses_dsed: bool,
    ) -> Result<&TierTable, CalculatorError> {
        if uses_dsed {
            return Ok(&self.dsed);
        }

        let key = JurisdictionKey::new(state, region);
        if let Some(table) = self.jurisdictions.get(&key) {
            return Ok(table);
        }
        let statewide = JurisdictionKey::new(state, None);
        if let Some(table) = self.jurisdictions.get(&statewide) {
            return Ok(table);
        }

        let regional = self
            .jurisdictions
            .keys()
            .any(|candidate| candidate.state == key.state);
        match (&self.default, regional) {
            (Some(table), false) => Ok(table),
            _ => Err(CalculatorError::UnknownJurisdiction {
                state: key.state,
                region,
            }),
        }
    }

    pub fn for_disaster(&self, disaster: &Disaster) -> Result<&TierTable, CalculatorError> {
        self.resolve(&disaster.state, disaster.region_category, disaster.uses_dsed)
    }
}

const DEFAULT_TABLE: [(i64, i64); 8] = [
    (1728, 192),
    (2088, 353),
    (2448, 505),
    (2818, 642),
    (3208, 762),
    (3598, 914),
    (3958, 1011),
    (4318, 1155),
];

const AK_URBAN_TABLE: [(i64, i64); 8] = [
    (2427, 232),
    (2877, 425),
    (3327, 609),
    (3777, 773),
    (4227, 918),
    (4688, 1102),
    (5138, 1218),
    (5588, 1392),
];

const AK_RURAL1_TABLE: [(i64, i64); 8] = [
    (2427, 295),
    (2877, 542),
    (3327, 776),
    (3777, 986),
    (4227, 1171),
    (4688, 1405),
    (5138, 1553),
    (5588, 1775),
];

const AK_RURAL2_TABLE: [(i64, i64); 8] = [
    (2427, 360),
    (2877, 660),
    (3327, 945),
    (3777, 1200),
    (4227, 1425),
    (4688, 1711),
    (5138, 1891),
    (5588, 2161),
];

const HI_TABLE: [(i64, i64); 8] = [
    (2139, 358),
    (2553, 656),
    (2967, 940),
    (3381, 1193),
    (3797, 1417),
    (4247, 1701),
    (4661, 1880),
    (5075, 2148),
];

const GU_TABLE: [(i64, i64); 8] = [
    (1990, 283),
    (2350, 520),
    (2710, 745),
    (3087, 946),
    (3507, 1123),
    (3926, 1348),
    (4286, 1490),
    (4646, 1703),
];

const VI_TABLE: [(i64, i64); 8] = [
    (1592, 247),
    (1952, 454),
    (2312, 650),
    (2701, 825),
    (3091, 980),
    (3481, 1176),
    (3841, 1300),
    (4201, 1485),
];

const DSED_TABLE: [(i64, i64); 8] = [
    (2518, 192),
    (3281, 353),
    (3773, 505),
    (4448, 642),
    (4904, 762),
    (5481, 914),
    (5900, 1011),
    (6319, 1155),
];
