//! Reference dataset store
//!
//! Loads the pincode table and the crop economics table once at startup and
//! serves exact-key lookups against them. There is no mutation API.

use crate::models::{CropEconomicsRecord, LocationRecord};
use crate::{AgriProfitError, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Read-only store of the two reference tables
#[derive(Debug, Clone)]
pub struct DatasetStore {
    locations: HashMap<String, LocationRecord>,
    /// Keyed by lowercase crop name
    economics: HashMap<String, CropEconomicsRecord>,
}

impl DatasetStore {
    /// Load both tables from CSV files
    #[instrument]
    pub fn load(pincodes_path: &Path, economics_path: &Path) -> Result<Self> {
        let pincodes = open(pincodes_path)?;
        let economics = open(economics_path)?;
        let store = Self::from_readers(pincodes, economics)?;

        info!(
            "Loaded {} pincodes and {} crop economics rows",
            store.locations.len(),
            store.economics.len()
        );
        Ok(store)
    }

    /// Load both tables from CSV readers
    pub fn from_readers<P: Read, E: Read>(pincodes: P, economics: E) -> Result<Self> {
        let locations = read_rows::<LocationRecord, _>(pincodes, "pincode")?;
        let economics = read_rows::<CropEconomicsRecord, _>(economics, "crop economics")?;
        Self::from_records(locations, economics)
    }

    /// Build the store from already parsed rows, validating them
    pub fn from_records(
        locations: Vec<LocationRecord>,
        economics: Vec<CropEconomicsRecord>,
    ) -> Result<Self> {
        if locations.is_empty() {
            return Err(AgriProfitError::dataset("Pincode table is empty"));
        }
        if economics.is_empty() {
            return Err(AgriProfitError::dataset("Crop economics table is empty"));
        }

        let mut location_index = HashMap::with_capacity(locations.len());
        for mut location in locations {
            location.pincode = location.pincode.trim().to_string();
            if !location.has_valid_coordinates() {
                return Err(AgriProfitError::dataset(format!(
                    "Pincode {} has invalid coordinates ({}, {})",
                    location.pincode, location.latitude, location.longitude
                )));
            }
            let pincode = location.pincode.clone();
            if location_index.insert(pincode.clone(), location).is_some() {
                return Err(AgriProfitError::dataset(format!(
                    "Duplicate pincode {pincode} in pincode table"
                )));
            }
        }

        let mut economics_index = HashMap::with_capacity(economics.len());
        for mut record in economics {
            record.crop_name = record.crop_name.trim().to_string();
            let values = [
                record.cost_per_hectare,
                record.expected_yield_per_hectare,
                record.market_price_per_unit,
            ];
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(AgriProfitError::dataset(format!(
                    "Crop {} has negative or non-numeric economics values",
                    record.crop_name
                )));
            }
            let key = record.crop_name.to_lowercase();
            if economics_index.insert(key, record).is_some() {
                return Err(AgriProfitError::dataset(
                    "Duplicate crop in crop economics table",
                ));
            }
        }

        Ok(Self {
            locations: location_index,
            economics: economics_index,
        })
    }

    /// Look up a location by exact pincode
    pub fn lookup_location(&self, pincode: &str) -> Result<LocationRecord> {
        self.locations.get(pincode).cloned().ok_or_else(|| {
            debug!("Pincode {} not in dataset", pincode);
            AgriProfitError::not_found(format!("Pincode {pincode} not found in the dataset."))
        })
    }

    /// Look up crop economics by name, ignoring case
    pub fn lookup_economics(&self, crop_name: &str) -> Result<CropEconomicsRecord> {
        self.economics
            .get(&crop_name.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| {
                AgriProfitError::not_found(format!(
                    "Profit/cost data not found for crop {crop_name}."
                ))
            })
    }

    /// All known pincodes, sorted
    #[must_use]
    pub fn pincodes(&self) -> Vec<String> {
        let mut pincodes: Vec<String> = self.locations.keys().cloned().collect();
        pincodes.sort();
        pincodes
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        AgriProfitError::dataset(format!("Failed to open {}: {e}", path.display()))
    })
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R, table: &str) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| {
            // +2: header line and 1-based numbering
            row.map_err(|e| {
                AgriProfitError::dataset(format!(
                    "Invalid row {} in {table} table: {e}",
                    index + 2
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PINCODES: &str = "\
pincode,district,state,latitude,longitude
613005,Thanjavur,Tamil Nadu,10.787,79.1378
495661,Janjgir-Champa,Chhattisgarh,22.0097,82.5776
";

    const ECONOMICS: &str = "\
crop,cost_per_hectare,expected_yield_per_hectare,market_price_per_unit
Maize,40000,30,2000
Chickpea,35000,15,5000
Paddy,55000,45,2100
";

    fn store() -> DatasetStore {
        DatasetStore::from_readers(PINCODES.as_bytes(), ECONOMICS.as_bytes()).unwrap()
    }

    #[test]
    fn test_lookup_location_returns_exact_pincode() {
        let store = store();
        for pincode in store.pincodes() {
            assert_eq!(store.lookup_location(&pincode).unwrap().pincode, pincode);
        }
        let location = store.lookup_location("613005").unwrap();
        assert_eq!(location.district, "Thanjavur");
        assert_eq!(location.state, "Tamil Nadu");
    }

    #[test]
    fn test_unknown_pincode_is_not_found() {
        let err = store().lookup_location("000000").unwrap_err();
        assert!(matches!(err, AgriProfitError::NotFound { .. }));
        assert!(err.user_message().contains("000000"));
    }

    #[test]
    fn test_lookup_economics_is_case_insensitive() {
        let store = store();
        assert_eq!(store.lookup_economics("maize").unwrap().crop_name, "Maize");
        assert_eq!(store.lookup_economics("PADDY").unwrap().cost_per_hectare, 55000.0);
        assert!(matches!(
            store.lookup_economics("quinoa"),
            Err(AgriProfitError::NotFound { .. })
        ));
    }

    #[test]
    fn test_pincodes_sorted() {
        let store = store();
        assert_eq!(store.pincodes(), vec!["495661", "613005"]);
    }

    #[test]
    fn test_duplicate_pincode_rejected() {
        let pincodes = format!("{PINCODES}613005,Thanjavur,Tamil Nadu,10.787,79.1378\n");
        let err = DatasetStore::from_readers(pincodes.as_bytes(), ECONOMICS.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Duplicate pincode 613005"));
    }

    #[test]
    fn test_bad_row_reports_line() {
        let economics = format!("{ECONOMICS}Wheat,abc,10,10\n");
        let err = DatasetStore::from_readers(PINCODES.as_bytes(), economics.as_bytes()).unwrap_err();
        assert!(matches!(err, AgriProfitError::Dataset { .. }));
        assert!(err.to_string().contains("row 5"));
    }

    #[test]
    fn test_negative_economics_rejected() {
        let economics = format!("{ECONOMICS}Wheat,-1,10,10\n");
        let err = DatasetStore::from_readers(PINCODES.as_bytes(), economics.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Wheat"));
    }

    #[test]
    fn test_empty_tables_rejected() {
        let header_only = "pincode,district,state,latitude,longitude\n";
        assert!(DatasetStore::from_readers(header_only.as_bytes(), ECONOMICS.as_bytes()).is_err());
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let pincodes_path = dir.path().join("pincodes.csv");
        let economics_path = dir.path().join("economics.csv");
        File::create(&pincodes_path)
            .unwrap()
            .write_all(PINCODES.as_bytes())
            .unwrap();
        File::create(&economics_path)
            .unwrap()
            .write_all(ECONOMICS.as_bytes())
            .unwrap();

        let store = DatasetStore::load(&pincodes_path, &economics_path).unwrap();
        assert_eq!(store.pincodes().len(), 2);

        let missing = DatasetStore::load(&dir.path().join("nope.csv"), &economics_path);
        assert!(matches!(missing, Err(AgriProfitError::Dataset { .. })));
    }
}
