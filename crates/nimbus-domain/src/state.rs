//! Thermodynamic state of a gridbox.

/// A pair of values on the lower and upper faces of a gridbox along one
/// axis, as used for staggered (Arakawa-C) wind components.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FacePair {
    /// Value on the lower face.
    pub lower: f64,
    /// Value on the upper face.
    pub upper: f64,
}

impl FacePair {
    /// Construct from lower and upper face values.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// The same value on both faces.
    pub fn uniform(v: f64) -> Self {
        Self { lower: v, upper: v }
    }

    /// Mean of the two face values.
    pub fn centre(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    /// Linear interpolation at fractional position `frac` in `[0, 1]`
    /// between the lower (0) and upper (1) faces.
    pub fn interpolate(&self, frac: f64) -> f64 {
        self.lower + (self.upper - self.lower) * frac
    }
}

/// Thermodynamic and wind state of one gridbox.
///
/// Written by the dynamics coupling at coupling steps and read by motion
/// during transport. Winds are face-centred.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct State {
    /// Pressure [Pa].
    pub press: f64,
    /// Temperature [K].
    pub temp: f64,
    /// Vapour mass mixing ratio [kg/kg].
    pub qvap: f64,
    /// Condensate mass mixing ratio [kg/kg].
    pub qcond: f64,
    /// Vertical wind on the lower and upper z faces [m/s].
    pub wvel: FacePair,
    /// Eastward wind on the lower and upper x faces [m/s].
    pub uvel: FacePair,
    /// Northward wind on the lower and upper y faces [m/s].
    pub vvel: FacePair,
}

impl Default for State {
    /// Still air at 1000 hPa and 273.15 K, dry.
    fn default() -> Self {
        Self {
            press: 100_000.0,
            temp: 273.15,
            qvap: 0.0,
            qcond: 0.0,
            wvel: FacePair::default(),
            uvel: FacePair::default(),
            vvel: FacePair::default(),
        }
    }
}
