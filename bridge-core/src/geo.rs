//! Geodetic to local tangent-plane linearization.
//!
//! Projects latitude/longitude onto a flat east/north plane anchored at a
//! fixed origin, using the meridional (north-south) and prime-vertical
//! (east-west) radii of curvature at the origin latitude. Accurate for the
//! few-kilometer ranges a small aircraft covers around its launch point.

use libm::{asin, cos, pow, sin, sqrt};

use crate::types::GeodeticOrigin;

/// Earth equatorial radius (m).
const EARTH_RADIUS_EQUATOR: f64 = 6_378_135.0;

/// Earth polar radius (m).
const EARTH_RADIUS_POLE: f64 = 6_356_750.0;

/// Error type for linearizer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinearizerError {
    /// `project`/`unproject` called before `init`.
    NotInitialized,
    /// `init` called a second time.
    AlreadyInitialized,
}

/// Projection parameters derived from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Projection {
    lat0_deg: f64,
    lon0_deg: f64,
    radius_ns: f64,
    radius_ew: f64,
}

impl Projection {
    fn new(lat0_deg: f64, lon0_deg: f64) -> Self {
        let a = EARTH_RADIUS_EQUATOR;
        let b = EARTH_RADIUS_POLE;
        let lat_rad = lat0_deg.to_radians();

        let a_cos = a * cos(lat_rad);
        let b_sin = b * sin(lat_rad);
        let denom = a_cos * a_cos + b_sin * b_sin;

        Self {
            lat0_deg,
            lon0_deg,
            radius_ns: (a * b) * (a * b) / pow(denom, 1.5),
            radius_ew: a * a / sqrt(denom),
        }
    }
}

/// Linearizer that is initialized once with a [`GeodeticOrigin`].
///
/// Using it before [`init`](Self::init) is a programming error and is
/// reported as [`LinearizerError::NotInitialized`]; callers gate on
/// [`is_initialized`](Self::is_initialized) instead.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeodeticLinearizer {
    projection: Option<Projection>,
}

impl GeodeticLinearizer {
    /// Create an uninitialized linearizer.
    #[must_use]
    pub const fn new() -> Self {
        Self { projection: None }
    }

    /// Create a linearizer already anchored at `origin`.
    #[must_use]
    pub fn with_origin(origin: &GeodeticOrigin) -> Self {
        Self {
            projection: Some(Projection::new(origin.latitude, origin.longitude)),
        }
    }

    /// Anchor the projection at `origin`. Only the first call succeeds.
    pub fn init(&mut self, origin: &GeodeticOrigin) -> Result<(), LinearizerError> {
        if self.projection.is_some() {
            return Err(LinearizerError::AlreadyInitialized);
        }
        self.projection = Some(Projection::new(origin.latitude, origin.longitude));
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.projection.is_some()
    }

    /// Project `(lat, lon)` in degrees to `(x east, y north)` in meters.
    pub fn project(&self, lat_deg: f64, lon_deg: f64) -> Result<(f64, f64), LinearizerError> {
        let p = self.projection.ok_or(LinearizerError::NotInitialized)?;

        let dlat = (lat_deg - p.lat0_deg).to_radians();
        let dlon = (lon_deg - p.lon0_deg).to_radians();

        let x = sin(dlon) * p.radius_ew * cos(p.lat0_deg.to_radians());
        let y = sin(dlat) * p.radius_ns;
        Ok((x, y))
    }

    /// Inverse of [`project`](Self::project).
    pub fn unproject(&self, x: f64, y: f64) -> Result<(f64, f64), LinearizerError> {
        let p = self.projection.ok_or(LinearizerError::NotInitialized)?;

        let dlon = asin(x / (p.radius_ew * cos(p.lat0_deg.to_radians())));
        let dlat = asin(y / p.radius_ns);
        Ok((dlat.to_degrees() + p.lat0_deg, dlon.to_degrees() + p.lon0_deg))
    }
}
