//! Building-stock sectors and the total per-sector mapping used throughout the model.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the three building-stock categories tracked independently for
/// energy consumption and price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Apartments,
    Houses,
    Public,
}

impl Sector {
    /// All sectors in enumeration order. Policies iterate sectors in this
    /// order, which makes it part of their tie-breaking rule.
    pub const ALL: [Sector; 3] = [Sector::Apartments, Sector::Houses, Sector::Public];

    /// Position of the sector in [`Sector::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Sector::Apartments => 0,
            Sector::Houses => 1,
            Sector::Public => 2,
        }
    }

    /// Baseline monthly consumption of a single building in this sector.
    pub const fn baseline_consumption(self) -> f64 {
        match self {
            Sector::Apartments => 250.0,
            Sector::Houses => 400.0,
            Sector::Public => 3000.0,
        }
    }

    /// Deterministic log-price drift per period.
    pub const fn price_growth(self) -> f64 {
        match self {
            Sector::Apartments => 0.04,
            Sector::Houses => 0.05,
            Sector::Public => 0.06,
        }
    }

    /// Price volatility before the configured volatility scale is applied.
    pub const fn base_volatility(self) -> f64 {
        match self {
            Sector::Apartments => 0.02,
            Sector::Houses => 0.03,
            Sector::Public => 0.04,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Sector::Apartments => "apartments",
            Sector::Houses => "houses",
            Sector::Public => "public",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A total mapping from [`Sector`] to `T`.
///
/// Backed by a fixed array so every sector always has a value and iteration
/// follows [`Sector::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SectorMap<T>([T; 3]);

impl<T> SectorMap<T> {
    /// Builds a map by evaluating `f` once per sector, in enumeration order.
    pub fn from_fn(mut f: impl FnMut(Sector) -> T) -> Self {
        Self(Sector::ALL.map(&mut f))
    }

    /// Iterates `(sector, value)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Sector, &T)> {
        Sector::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut()
    }
}

impl<T: Copy> SectorMap<T> {
    pub fn splat(value: T) -> Self {
        Self([value; 3])
    }
}

impl<T> Index<Sector> for SectorMap<T> {
    type Output = T;

    fn index(&self, sector: Sector) -> &T {
        &self.0[sector.index()]
    }
}

impl<T> IndexMut<Sector> for SectorMap<T> {
    fn index_mut(&mut self, sector: Sector) -> &mut T {
        &mut self.0[sector.index()]
    }
}
