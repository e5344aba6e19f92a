//! Estimation pipeline
//!
//! Turns `(pincode, land area)` into a [`Recommendation`]: resolve the
//! location, fetch the weather summary, score crops with the suitability
//! model, pick the top crops and price them with the economics table.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::EstimationConfig;
use crate::dataset::DatasetStore;
use crate::input::{LandArea, Pincode};
use crate::model::{FeatureVector, SuitabilityModel, rank_scores};
use crate::models::{CropAllocation, CropEconomicsRecord, Recommendation, SuitabilityScore};
use crate::weather::WeatherProvider;
use crate::{AgriProfitError, Result};

/// A crop chosen for the recommendation with its share of the land
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCrop {
    pub crop_name: String,
    pub score: f64,
    /// Fraction of the land, proportional to score among the selected crops
    pub fraction: f64,
}

/// Pick up to `top_k` crops, best first, whose score is strictly above
/// `min_suitability` and for which `is_priced` holds. `scores` may be in
/// any order. Fractions are the scores renormalized over the selection and
/// sum to 1.0.
pub fn select_crops<F>(
    scores: &[SuitabilityScore],
    top_k: usize,
    min_suitability: f64,
    is_priced: F,
) -> Result<Vec<SelectedCrop>>
where
    F: Fn(&str) -> bool,
{
    let mut ranking = scores.to_vec();
    rank_scores(&mut ranking);

    let mut chosen: Vec<&SuitabilityScore> = Vec::with_capacity(top_k);

    for candidate in &ranking {
        if chosen.len() == top_k {
            break;
        }
        if candidate.score <= min_suitability {
            break;
        }
        if !is_priced(&candidate.crop_name) {
            warn!(
                "Profit/cost data not found for {}, skipping it",
                candidate.crop_name
            );
            continue;
        }
        chosen.push(candidate);
    }

    if chosen.is_empty() {
        let best = ranking
            .first()
            .map(|s| format!("{} at {}", s.crop_name, s.format_percentage()))
            .unwrap_or_else(|| "none".to_string());
        return Err(AgriProfitError::no_suitable_crop(format!(
            "No crop scored above {min_suitability} (best: {best})"
        )));
    }

    let total: f64 = chosen.iter().map(|s| s.score).sum();
    Ok(chosen
        .into_iter()
        .map(|s| SelectedCrop {
            crop_name: s.crop_name.clone(),
            score: s.score,
            fraction: s.score / total,
        })
        .collect())
}

/// Cost, revenue and profit of one crop over its share of `land_area` hectares
#[must_use]
pub fn allocate(
    crop: &SelectedCrop,
    economics: &CropEconomicsRecord,
    land_area: f64,
) -> CropAllocation {
    let allocated_area = land_area * crop.fraction;
    let cost = economics.cost_per_hectare * allocated_area;
    let revenue = economics.revenue_per_hectare() * allocated_area;

    CropAllocation {
        crop_name: crop.crop_name.clone(),
        score: crop.score,
        fraction: crop.fraction,
        allocated_area,
        cost,
        revenue,
        profit: revenue - cost,
    }
}

/// The request pipeline over the shared, read-only collaborators
pub struct EstimationPipeline {
    store: Arc<DatasetStore>,
    weather: Arc<dyn WeatherProvider>,
    model: Arc<dyn SuitabilityModel>,
    policy: EstimationConfig,
}

impl EstimationPipeline {
    pub fn new(
        store: Arc<DatasetStore>,
        weather: Arc<dyn WeatherProvider>,
        model: Arc<dyn SuitabilityModel>,
        policy: EstimationConfig,
    ) -> Self {
        Self {
            store,
            weather,
            model,
            policy,
        }
    }

    #[must_use]
    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Validate raw inputs and run the pipeline
    pub async fn estimate(&self, pincode: &str, land_area: f64) -> Result<Recommendation> {
        let pincode = Pincode::parse(pincode)?;
        let land_area = LandArea::new(land_area)?;
        self.estimate_validated(&pincode, land_area).await
    }

    /// Run the pipeline for already validated inputs
    #[instrument(skip(self, pincode, land_area), fields(pincode = %pincode, land_area = land_area.hectares()))]
    pub async fn estimate_validated(
        &self,
        pincode: &Pincode,
        land_area: LandArea,
    ) -> Result<Recommendation> {
        let hectares = land_area.hectares();

        let location = self.store.lookup_location(pincode.as_str())?;
        debug!(
            "Resolved pincode {} to {} ({})",
            pincode,
            location.display_name(),
            location.format_coordinates()
        );

        let weather = self.weather.fetch_weather(&location).await?;

        let features = FeatureVector::new(&location, &weather, hectares);
        let mut ranked_crops = self.model.predict(&features)?;
        rank_scores(&mut ranked_crops);

        let selected = select_crops(
            &ranked_crops,
            self.policy.top_k,
            self.policy.min_suitability,
            |crop| self.store.lookup_economics(crop).is_ok(),
        )?;

        let allocations = selected
            .iter()
            .map(|crop| {
                let economics = self.store.lookup_economics(&crop.crop_name)?;
                Ok(allocate(crop, &economics, hectares))
            })
            .collect::<Result<Vec<CropAllocation>>>()?;

        let estimated_cost: f64 = allocations.iter().map(|a| a.cost).sum();
        let estimated_profit: f64 = allocations.iter().map(|a| a.profit).sum();
        let estimated_loan = estimated_cost * self.policy.loan_to_cost_ratio;

        let crop_ratio: BTreeMap<String, f64> = allocations
            .iter()
            .map(|a| (a.crop_name.clone(), a.fraction))
            .collect();

        info!(
            "Recommended {} for {:.2} ha at {}: cost {:.2}, profit {:.2}, loan {:.2}",
            allocations
                .iter()
                .map(|a| a.crop_name.as_str())
                .collect::<Vec<_>>()
                .join(" + "),
            hectares,
            pincode,
            estimated_cost,
            estimated_profit,
            estimated_loan
        );

        Ok(Recommendation {
            location,
            weather,
            ranked_crops,
            crop_ratio,
            allocations,
            land_area: hectares,
            estimated_cost,
            estimated_profit,
            estimated_loan,
        })
    }
}
