//! Resolution of IATA codes to airline directory entries.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::loader::Row;
use crate::model::AirlineInfo;
use crate::services::backend::LeaderboardBackend;

/// Airline entries keyed by upper-cased IATA code, cached for one run.
#[derive(Debug, Clone, Default)]
pub struct AirlineLookup {
    by_code: HashMap<String, AirlineInfo>,
}

impl AirlineLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct upper-cased codes present in `rows`, sorted. Rows without a code are skipped.
    pub fn codes_in(rows: &[Row]) -> BTreeSet<String> {
        rows.iter()
            .filter_map(|row| row.get("airline_iata"))
            .map(str::to_uppercase)
            .collect()
    }

    /// Looks up every code not already cached, one request per code.
    ///
    /// # Errors
    ///
    /// Stops at the first code with no directory match and returns
    /// [`IngestError::UnknownAirline`] naming it.
    #[tracing::instrument(skip_all, fields(codes = codes.len()))]
    pub async fn resolve<B: LeaderboardBackend + ?Sized>(
        &mut self,
        backend: &B,
        codes: &BTreeSet<String>,
    ) -> Result<()> {
        for code in codes {
            let code = code.to_uppercase();
            if self.by_code.contains_key(&code) {
                continue;
            }
            let airline = backend
                .find_airline(&code)
                .await?
                .ok_or_else(|| IngestError::UnknownAirline(code.clone()))?;
            debug!(iata = %code, airline_id = %airline.id, name = %airline.name, "Airline resolved");
            self.by_code.insert(code, airline);
        }
        info!(resolved = self.by_code.len(), "Airline codes resolved");
        Ok(())
    }

    pub fn insert(&mut self, airline: AirlineInfo) {
        self.by_code.insert(airline.iata_code.to_uppercase(), airline);
    }

    /// Case-insensitive lookup.
    pub fn get(&self, iata_code: &str) -> Option<&AirlineInfo> {
        self.by_code.get(&iata_code.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
