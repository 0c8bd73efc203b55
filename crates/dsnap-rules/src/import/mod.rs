//! Disaster policy import from administrator CSV exports.

mod parser;

use crate::eligibility::{
    ApplicationPeriod, Disaster, DisasterId, DisasterRecordError, RegionCategory,
};
use chrono::NaiveDate;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use parser::DisasterRow;

#[derive(Debug)]
pub enum DisasterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
    Record {
        id: DisasterId,
        source: DisasterRecordError,
    },
}

impl std::fmt::Display for DisasterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisasterImportError::Io(err) => write!(f, "failed to read disaster export: {}", err),
            DisasterImportError::Csv(err) => write!(f, "invalid disaster CSV data: {}", err),
            DisasterImportError::InvalidField { line, field, value } => write!(
                f,
                "line {}: '{}' is not a valid value for {}",
                line, value, field
            ),
            DisasterImportError::Record { id, source } => {
                write!(f, "disaster {} is inconsistent: {}", id, source)
            }
        }
    }
}

impl std::error::Error for DisasterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DisasterImportError::Io(err) => Some(err),
            DisasterImportError::Csv(err) => Some(err),
            DisasterImportError::InvalidField { .. } => None,
            DisasterImportError::Record { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for DisasterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for DisasterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads disaster records, one row per application period. Rows sharing an
/// `id` contribute additional periods to the disaster defined by the first.
pub struct DisasterCsvImporter;

impl DisasterCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Disaster>, DisasterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Disaster>, DisasterImportError> {
        let mut disasters: BTreeMap<DisasterId, Disaster> = BTreeMap::new();

        for (line, row) in parser::parse_rows(reader)? {
            let id = DisasterId(row.id);
            let period = period_from_row(line, &row)?;
            let disaster = match disasters.entry(id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(disaster_from_row(line, &row)?),
            };
            disaster.application_periods.extend(period);
        }

        disasters
            .into_values()
            .map(|disaster| match disaster.validate() {
                Ok(()) => Ok(disaster),
                Err(source) => Err(DisasterImportError::Record {
                    id: disaster.id,
                    source,
                }),
            })
            .collect()
    }
}

fn disaster_from_row(line: usize, row: &DisasterRow) -> Result<Disaster, DisasterImportError> {
    let region_category = match row.region_category.as_deref() {
        Some(raw) => Some(RegionCategory::parse(raw).ok_or_else(|| {
            invalid(line, "region_category", raw)
        })?),
        None => None,
    };

    Ok(Disaster {
        id: DisasterId(row.id),
        disaster_request_no: row.disaster_request_no.clone(),
        title: row.title.clone(),
        state: row.state.to_ascii_uppercase(),
        region_category,
        benefit_begin_date: date(line, "benefit_begin_date", &row.benefit_begin_date)?,
        benefit_end_date: date(line, "benefit_end_date", &row.benefit_end_date)?,
        residency_required: flag(line, "residency_required", &row.residency_required)?,
        uses_dsed: flag(line, "uses_DSED", &row.uses_dsed)?,
        allows_food_loss_alone: flag(line, "allows_food_loss_alone", &row.allows_food_loss_alone)?,
        application_periods: Vec::new(),
    })
}

fn period_from_row(
    line: usize,
    row: &DisasterRow,
) -> Result<Option<ApplicationPeriod>, DisasterImportError> {
    if !row.has_period() {
        return Ok(None);
    }

    Ok(Some(ApplicationPeriod {
        begin_date: required_date(line, "period_begin_date", &row.period_begin_date)?,
        end_date: required_date(line, "period_end_date", &row.period_end_date)?,
        registration_begin_date: required_date(
            line,
            "registration_begin_date",
            &row.registration_begin_date,
        )?,
        registration_end_date: required_date(
            line,
            "registration_end_date",
            &row.registration_end_date,
        )?,
        counties: row.county_names(),
    }))
}

fn required_date(
    line: usize,
    field: &'static str,
    value: &Option<String>,
) -> Result<NaiveDate, DisasterImportError> {
    match value {
        Some(raw) => date(line, field, raw),
        None => Err(invalid(line, field, "")),
    }
}

fn date(line: usize, field: &'static str, raw: &str) -> Result<NaiveDate, DisasterImportError> {
    parser::parse_date(raw).ok_or_else(|| invalid(line, field, raw))
}

fn flag(line: usize, field: &'static str, raw: &str) -> Result<bool, DisasterImportError> {
    parser::parse_flag(raw).ok_or_else(|| invalid(line, field, raw))
}

fn invalid(line: usize, field: &'static str, value: &str) -> DisasterImportError {
    DisasterImportError::InvalidField {
        line,
        field,
        value: value.to_string(),
    }
}
