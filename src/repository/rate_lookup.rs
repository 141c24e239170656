//! Distance-banded rate lookup shared by freight and assembly rates.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{AssemblyRate, FreightRate};

/// A versioned rate row covering an inclusive distance band.
pub trait BandedRate {
    /// Lower bound of the band, inclusive.
    fn km_from(&self) -> Decimal;
    /// Upper bound of the band, inclusive.
    fn km_to(&self) -> Decimal;
    /// First date the row applies.
    fn effective_date(&self) -> NaiveDate;

    /// Returns true if the distance falls inside the band.
    fn covers(&self, km: Decimal) -> bool {
        self.km_from() <= km && km <= self.km_to()
    }
}

impl BandedRate for FreightRate {
    fn km_from(&self) -> Decimal {
        self.km_from
    }

    fn km_to(&self) -> Decimal {
        self.km_to
    }

    fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }
}

impl BandedRate for AssemblyRate {
    fn km_from(&self) -> Decimal {
        self.km_from
    }

    fn km_to(&self) -> Decimal {
        self.km_to
    }

    fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }
}

/// Outcome of a banded lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandLookup<'a, T> {
    /// A row whose band contains the distance.
    InBand(&'a T),
    /// No band contains the distance; the most recent row was used instead.
    Fallback(&'a T),
    /// No row exists at all.
    Missing,
}

impl<'a, T> BandLookup<'a, T> {
    /// Returns the row, if any.
    pub fn rate(&self) -> Option<&'a T> {
        match self {
            BandLookup::InBand(rate) | BandLookup::Fallback(rate) => Some(rate),
            BandLookup::Missing => None,
        }
    }

    /// Returns true if the row came from the fallback path.
    pub fn is_fallback(&self) -> bool {
        matches!(self, BandLookup::Fallback(_))
    }
}

/// Finds the rate for a distance as of a date.
///
/// Rows effective after `as_of` are ignored. Among rows whose band covers
/// `km`, the latest effective date wins. If none covers it, the latest row
/// overall is returned as a fallback. Ties keep the first row in input order.
pub fn find_band<'a, T, I>(rates: I, km: Decimal, as_of: NaiveDate) -> BandLookup<'a, T>
where
    T: BandedRate + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut in_band: Option<&'a T> = None;
    let mut latest: Option<&'a T> = None;

    for rate in rates.into_iter().filter(|r| r.effective_date() <= as_of) {
        if latest.is_none_or(|l| rate.effective_date() > l.effective_date()) {
            latest = Some(rate);
        }
        if rate.covers(km) && in_band.is_none_or(|b| rate.effective_date() > b.effective_date()) {
            in_band = Some(rate);
        }
    }

    match (in_band, latest) {
        (Some(rate), _) => BandLookup::InBand(rate),
        (None, Some(rate)) => BandLookup::Fallback(rate),
        (None, None) => BandLookup::Missing,
    }
}
