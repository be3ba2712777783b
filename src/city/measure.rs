//! Efficiency measures and the immutable catalog the policies choose from.

use serde::{Deserialize, Serialize};

/// An efficiency intervention that can be applied to a sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Unique key within a catalog.
    pub name: String,
    /// Budget deducted on each successful application (> 0).
    pub cost: f64,
    /// Energy-reduction strength in (0, 1) at zero adoption.
    pub effect: f64,
    /// Ceiling on cumulative adoption within one sector, in (0, 1].
    pub max_adoption: f64,
}

impl Measure {
    pub fn new(name: impl Into<String>, cost: f64, effect: f64, max_adoption: f64) -> Self {
        Self {
            name: name.into(),
            cost,
            effect,
            max_adoption,
        }
    }

    /// Reduction fraction when the sector is already at `adoption`.
    ///
    /// Returns diminish linearly as adoption approaches saturation.
    pub fn effective_effect(&self, adoption: f64) -> f64 {
        self.effect * (1.0 - adoption)
    }
}

/// Ordered, read-only list of available measures.
///
/// Enumeration order is significant: policies break ties in favour of the
/// first maximal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureCatalog {
    measures: Vec<Measure>,
}

impl MeasureCatalog {
    pub fn new(measures: Vec<Measure>) -> Self {
        Self { measures }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measure> {
        self.measures.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }
}

impl Default for MeasureCatalog {
    fn default() -> Self {
        Self::new(vec![
            Measure::new("LED", 15.0, 0.08, 1.0),
            Measure::new("Insulation", 25.0, 0.15, 0.9),
            Measure::new("Solar", 30.0, 0.20, 0.7),
            Measure::new("SmartMeter", 10.0, 0.05, 1.0),
            Measure::new("SmartHome", 6.0, 0.03, 0.8),
        ])
    }
}

impl<'a> IntoIterator for &'a MeasureCatalog {
    type Item = &'a Measure;
    type IntoIter = std::slice::Iter<'a, Measure>;

    fn into_iter(self) -> Self::IntoIter {
        self.measures.iter()
    }
}
