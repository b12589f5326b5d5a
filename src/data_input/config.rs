// src/data_input/config.rs
//
// Experiment records. Every section defaults to the recorded laboratory
// data, so a JSON file only needs to name what it overrides.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::data_analysis::interpolation::{Extrapolation, InterpolationKind};
use crate::data_analysis::physical_models::SteinhartHart;
use crate::data_analysis::uncertainty::{CoverageFactor, StdDevEstimator};
use crate::data_input::datasets::*;
use crate::data_input::measurement::Instrument;
use crate::error::{ReductionError, ReductionResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LabConfig {
    pub thermal_radiation: ThermalRadiationConfig,
    pub inverse_square: InverseSquareConfig,
    pub stefan_boltzmann: StefanBoltzmannConfig,
    pub speed_of_light: SpeedOfLightConfig,
}

impl LabConfig {
    /// Built-in datasets when `path` is None, otherwise the JSON file layered
    /// over them. The result is validated.
    pub fn load(path: Option<&Path>) -> ReductionResult<Self> {
        let config = match path {
            Some(path) => {
                let data = fs::read_to_string(path).map_err(|e| {
                    ReductionError::config(format!("failed to read config {}: {e}", path.display()))
                })?;
                debug!("loaded config {} ({} bytes)", path.display(), data.len());
                Self::from_json(&data).map_err(|e| e.context(path.display()))?
            }
            None => LabConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(data: &str) -> ReductionResult<Self> {
        serde_json::from_str::<LabConfig>(data)
            .map_err(|e| ReductionError::config(format!("failed to parse config: {e}")))
    }

    pub fn validate(&self) -> ReductionResult<()> {
        self.thermal_radiation.validate()?;
        self.inverse_square.validate()?;
        self.stefan_boltzmann.validate()?;
        self.speed_of_light.validate()
    }
}

fn check_instrument(section: &str, instrument: &Instrument) -> ReductionResult<()> {
    if !(instrument.resolution > 0.0) || !instrument.resolution.is_finite() {
        return Err(ReductionError::config(format!(
            "{section}.{}: resolution must be positive, got {}",
            instrument.name, instrument.resolution
        )));
    }
    Ok(())
}

fn check_lengths(section: &str, what: &str, left: usize, right: usize) -> ReductionResult<()> {
    if left != right {
        return Err(ReductionError::config(format!(
            "{section}: {what} have different lengths ({left} vs {right})"
        )));
    }
    Ok(())
}

fn check_min_len(section: &str, what: &str, len: usize, min: usize) -> ReductionResult<()> {
    if len < min {
        return Err(ReductionError::config(format!(
            "{section}: {what} needs at least {min} entries, got {len}"
        )));
    }
    Ok(())
}

/// Readings taken at one heater power setting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PowerLevelReadings {
    pub label: String,
    /// Thermistor reading while the voltages were taken.
    pub resistance_kohm: f64,
    pub voltages_mv: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThermalRadiationConfig {
    pub thermistor_resistance_ohm: Vec<f64>,
    pub thermistor_temperature_c: Vec<f64>,
    pub steinhart_hart: SteinhartHart,
    pub calibration: InterpolationKind,
    pub ambient_temperature_c: f64,
    pub voltmeter: Instrument,
    pub ohmmeter: Instrument,
    pub type_a_estimator: StdDevEstimator,
    /// Display resolution applied to interpolated temperatures; None keeps
    /// full precision.
    pub temperature_rounding_k: Option<f64>,
    pub faces: Vec<String>,
    /// Repeated black-face readings, one entry per power setting.
    pub repeatability: Vec<PowerLevelReadings>,
    /// One voltage per face, in `faces` order; the first face is the
    /// emissivity reference.
    pub face_readings: Vec<PowerLevelReadings>,
}

impl Default for ThermalRadiationConfig {
    fn default() -> Self {
        Self {
            thermistor_resistance_ohm: THERMISTOR_RESISTANCE_OHM.to_vec(),
            thermistor_temperature_c: (0..THERMISTOR_RESISTANCE_OHM.len())
                .map(|i| THERMISTOR_FIRST_TEMPERATURE_C + THERMISTOR_STEP_C * i as f64)
                .collect(),
            steinhart_hart: SteinhartHart::new(STEINHART_HART_A, STEINHART_HART_B, STEINHART_HART_C),
            calibration: InterpolationKind::CubicSpline,
            ambient_temperature_c: LESLIE_AMBIENT_C,
            voltmeter: Instrument::new("voltmeter", LESLIE_VOLTMETER_MV, "mV"),
            ohmmeter: Instrument::new("ohmmeter", LESLIE_OHMMETER_KOHM, "kΩ"),
            type_a_estimator: StdDevEstimator::Sample,
            temperature_rounding_k: Some(0.1),
            faces: LESLIE_FACES.iter().map(|f| f.to_string()).collect(),
            repeatability: LESLIE_REPEATABILITY
                .iter()
                .map(|(label, r, v)| PowerLevelReadings {
                    label: label.to_string(),
                    resistance_kohm: *r,
                    voltages_mv: v.to_vec(),
                })
                .collect(),
            face_readings: LESLIE_FACE_READINGS
                .iter()
                .map(|(label, r, v)| PowerLevelReadings {
                    label: label.to_string(),
                    resistance_kohm: *r,
                    voltages_mv: v.to_vec(),
                })
                .collect(),
        }
    }
}

impl ThermalRadiationConfig {
    pub fn validate(&self) -> ReductionResult<()> {
        const SECTION: &str = "thermal_radiation";
        check_lengths(
            SECTION,
            "thermistor resistances and temperatures",
            self.thermistor_resistance_ohm.len(),
            self.thermistor_temperature_c.len(),
        )?;
        check_min_len(
            SECTION,
            "thermistor table",
            self.thermistor_resistance_ohm.len(),
            self.calibration.min_points(),
        )?;
        check_instrument(SECTION, &self.voltmeter)?;
        check_instrument(SECTION, &self.ohmmeter)?;
        if let Some(step) = self.temperature_rounding_k {
            if !(step > 0.0) {
                return Err(ReductionError::config(format!(
                    "{SECTION}: temperature_rounding_k must be positive, got {step}"
                )));
            }
        }
        check_min_len(SECTION, "faces", self.faces.len(), 1)?;
        for level in &self.repeatability {
            check_min_len(
                SECTION,
                &format!("repeatability {}", level.label),
                level.voltages_mv.len(),
                2,
            )?;
        }
        for level in &self.face_readings {
            check_lengths(
                SECTION,
                &format!("faces and readings of {}", level.label),
                self.faces.len(),
                level.voltages_mv.len(),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InverseSquareConfig {
    pub distances_cm: Vec<f64>,
    pub voltages_mv: Vec<f64>,
    pub repeatability_mv: Vec<f64>,
    pub voltmeter: Instrument,
    pub tape: Instrument,
    pub type_a_estimator: StdDevEstimator,
    /// Interpolant drawn through voltage vs distance.
    pub smoothing: InterpolationKind,
}

impl Default for InverseSquareConfig {
    fn default() -> Self {
        Self {
            distances_cm: IR_DISTANCES_CM.to_vec(),
            voltages_mv: IR_VOLTAGES_MV.to_vec(),
            repeatability_mv: IR_REPEATABILITY_MV.to_vec(),
            voltmeter: Instrument::new("voltmeter", IR_VOLTMETER_MV, "mV"),
            tape: Instrument::new("tape", IR_TAPE_CM, "cm"),
            type_a_estimator: StdDevEstimator::Sample,
            smoothing: InterpolationKind::CubicSpline,
        }
    }
}

impl InverseSquareConfig {
    pub fn validate(&self) -> ReductionResult<()> {
        const SECTION: &str = "inverse_square";
        check_lengths(
            SECTION,
            "distances and voltages",
            self.distances_cm.len(),
            self.voltages_mv.len(),
        )?;
        check_min_len(
            SECTION,
            "distances",
            self.distances_cm.len(),
            self.smoothing.min_points(),
        )?;
        check_min_len(SECTION, "repeatability", self.repeatability_mv.len(), 2)?;
        check_instrument(SECTION, &self.voltmeter)?;
        check_instrument(SECTION, &self.tape)
    }
}

/// One row of the filament manufacturer's table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TungstenRow {
    /// R / R(300 K)
    pub relative_resistance: f64,
    pub temperature_k: f64,
    /// µΩ·cm
    pub resistivity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StefanBoltzmannConfig {
    /// Filament resistance at the ambient temperature.
    pub reference_resistance_ohm: f64,
    pub ambient_temperature_k: f64,
    pub voltages_v: Vec<f64>,
    pub currents_a: Vec<f64>,
    pub radiance_mv: Vec<f64>,
    pub tungsten_table: Vec<TungstenRow>,
    pub calibration: InterpolationKind,
    pub extrapolation: Extrapolation,
    pub voltmeter: Instrument,
    pub ammeter: Instrument,
    pub radiometer: Instrument,
    pub coverage_factor: CoverageFactor,
}

impl Default for StefanBoltzmannConfig {
    fn default() -> Self {
        Self {
            reference_resistance_ohm: LAMP_REFERENCE_RESISTANCE_OHM,
            ambient_temperature_k: LAMP_AMBIENT_K,
            voltages_v: LAMP_VOLTAGES_V.to_vec(),
            currents_a: LAMP_CURRENTS_A.to_vec(),
            radiance_mv: LAMP_RADIANCE_MV.to_vec(),
            tungsten_table: TUNGSTEN_TABLE
                .iter()
                .map(|&(relative_resistance, temperature_k, resistivity)| TungstenRow {
                    relative_resistance,
                    temperature_k,
                    resistivity,
                })
                .collect(),
            calibration: InterpolationKind::CubicSpline,
            extrapolation: Extrapolation::Extrapolate,
            voltmeter: Instrument::new("voltmeter", LAMP_VOLTMETER_V, "V"),
            ammeter: Instrument::new("ammeter", LAMP_AMMETER_A, "A"),
            radiometer: Instrument::new("radiometer", LAMP_RADIOMETER_MV, "mV"),
            coverage_factor: CoverageFactor::default(),
        }
    }
}

impl StefanBoltzmannConfig {
    pub fn validate(&self) -> ReductionResult<()> {
        const SECTION: &str = "stefan_boltzmann";
        check_lengths(
            SECTION,
            "voltages and currents",
            self.voltages_v.len(),
            self.currents_a.len(),
        )?;
        check_lengths(
            SECTION,
            "voltages and radiance readings",
            self.voltages_v.len(),
            self.radiance_mv.len(),
        )?;
        check_min_len(SECTION, "readings", self.voltages_v.len(), 2)?;
        check_min_len(
            SECTION,
            "tungsten table",
            self.tungsten_table.len(),
            self.calibration.min_points(),
        )?;
        if !(self.reference_resistance_ohm > 0.0) {
            return Err(ReductionError::config(format!(
                "{SECTION}: reference_resistance_ohm must be positive, got {}",
                self.reference_resistance_ohm
            )));
        }
        if !(self.coverage_factor.value() > 0.0) {
            return Err(ReductionError::config(format!(
                "{SECTION}: coverage_factor must be positive, got {}",
                self.coverage_factor.value()
            )));
        }
        check_instrument(SECTION, &self.voltmeter)?;
        check_instrument(SECTION, &self.ammeter)?;
        check_instrument(SECTION, &self.radiometer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeedOfLightConfig {
    pub time_offsets_s: Vec<f64>,
    pub distances_m: Vec<f64>,
    pub timebase: Instrument,
    pub tape: Instrument,
}

impl Default for SpeedOfLightConfig {
    fn default() -> Self {
        Self {
            time_offsets_s: PULSE_TIME_OFFSETS_S.to_vec(),
            distances_m: PULSE_DISTANCES_M.to_vec(),
            timebase: Instrument::new("oscilloscope", PULSE_TIMEBASE_S, "s"),
            tape: Instrument::new("tape", PULSE_TAPE_M, "m"),
        }
    }
}

impl SpeedOfLightConfig {
    pub fn validate(&self) -> ReductionResult<()> {
        const SECTION: &str = "speed_of_light";
        check_lengths(
            SECTION,
            "time offsets and distances",
            self.time_offsets_s.len(),
            self.distances_m.len(),
        )?;
        check_min_len(SECTION, "readings", self.time_offsets_s.len(), 2)?;
        check_instrument(SECTION, &self.timebase)?;
        check_instrument(SECTION, &self.tape)
    }
}
