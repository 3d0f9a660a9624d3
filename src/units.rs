//! Experiment and axis-unit codes from the main header.
//!
//! Unknown codes are kept as `Other(code)` rather than rejected: they only
//! label the data and never change how it decodes.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Experiment type (header byte 2) ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentType {
    General,
    GasChromatogram,
    Chromatogram,
    Hplc,
    FtIr,
    Nir,
    UvVis,
    XRayDiffraction,
    MassSpec,
    Nmr,
    Raman,
    Fluorescence,
    Atomic,
    DiodeArray,
    Other(u8),
}

impl ExperimentType {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::General,
            1 => Self::GasChromatogram,
            2 => Self::Chromatogram,
            3 => Self::Hplc,
            4 => Self::FtIr,
            5 => Self::Nir,
            7 => Self::UvVis,
            8 => Self::XRayDiffraction,
            9 => Self::MassSpec,
            10 => Self::Nmr,
            11 => Self::Raman,
            12 => Self::Fluorescence,
            13 => Self::Atomic,
            14 => Self::DiodeArray,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General => write!(f, "General SPC"),
            Self::GasChromatogram => write!(f, "Gas Chromatogram"),
            Self::Chromatogram => write!(f, "General Chromatogram"),
            Self::Hplc => write!(f, "HPLC Chromatogram"),
            Self::FtIr => write!(f, "FT-IR, FT-NIR, FT-Raman Spectrum"),
            Self::Nir => write!(f, "NIR Spectrum"),
            Self::UvVis => write!(f, "UV-VIS Spectrum"),
            Self::XRayDiffraction => write!(f, "X-ray Diffraction Spectrum"),
            Self::MassSpec => write!(f, "Mass Spectrum"),
            Self::Nmr => write!(f, "NMR Spectrum or FID"),
            Self::Raman => write!(f, "Raman Spectrum"),
            Self::Fluorescence => write!(f, "Fluorescence Spectrum"),
            Self::Atomic => write!(f, "Atomic Spectrum"),
            Self::DiodeArray => write!(f, "Chromatography Diode Array Spectra"),
            Self::Other(code) => write!(f, "Unknown experiment ({})", code),
        }
    }
}

// ─── X / Z axis units (header bytes 28 and 30) ──────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XUnit {
    Arbitrary,
    Wavenumber,
    Micrometers,
    Nanometers,
    Seconds,
    Minutes,
    Hertz,
    Kilohertz,
    Megahertz,
    MassToCharge,
    Ppm,
    Days,
    Years,
    RamanShift,
    ElectronVolts,
    CustomLabel,
    DiodeNumber,
    Channel,
    Degrees,
    Fahrenheit,
    Celsius,
    Kelvin,
    DataPoints,
    Milliseconds,
    Microseconds,
    Nanoseconds,
    Gigahertz,
    Centimeters,
    Meters,
    Millimeters,
    Hours,
    DoubleInterferogram,
    Other(u8),
}

impl XUnit {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Arbitrary,
            1 => Self::Wavenumber,
            2 => Self::Micrometers,
            3 => Self::Nanometers,
            4 => Self::Seconds,
            5 => Self::Minutes,
            6 => Self::Hertz,
            7 => Self::Kilohertz,
            8 => Self::Megahertz,
            9 => Self::MassToCharge,
            10 => Self::Ppm,
            11 => Self::Days,
            12 => Self::Years,
            13 => Self::RamanShift,
            14 => Self::ElectronVolts,
            15 => Self::CustomLabel,
            16 => Self::DiodeNumber,
            17 => Self::Channel,
            18 => Self::Degrees,
            19 => Self::Fahrenheit,
            20 => Self::Celsius,
            21 => Self::Kelvin,
            22 => Self::DataPoints,
            23 => Self::Milliseconds,
            24 => Self::Microseconds,
            25 => Self::Nanoseconds,
            26 => Self::Gigahertz,
            27 => Self::Centimeters,
            28 => Self::Meters,
            29 => Self::Millimeters,
            30 => Self::Hours,
            255 => Self::DoubleInterferogram,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for XUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Arbitrary => "Arbitrary",
            Self::Wavenumber => "Wavenumber (cm-1)",
            Self::Micrometers => "Micrometers (um)",
            Self::Nanometers => "Nanometers (nm)",
            Self::Seconds => "Seconds",
            Self::Minutes => "Minutes",
            Self::Hertz => "Hertz (Hz)",
            Self::Kilohertz => "Kilohertz (KHz)",
            Self::Megahertz => "Megahertz (MHz)",
            Self::MassToCharge => "Mass (M/z)",
            Self::Ppm => "Parts per million (PPM)",
            Self::Days => "Days",
            Self::Years => "Years",
            Self::RamanShift => "Raman Shift (cm-1)",
            Self::ElectronVolts => "eV",
            Self::CustomLabel => "XYZ text labels in fcatxt",
            Self::DiodeNumber => "Diode Number",
            Self::Channel => "Channel",
            Self::Degrees => "Degrees",
            Self::Fahrenheit => "Temperature (F)",
            Self::Celsius => "Temperature (C)",
            Self::Kelvin => "Temperature (K)",
            Self::DataPoints => "Data Points",
            Self::Milliseconds => "Milliseconds (mSec)",
            Self::Microseconds => "Microseconds (uSec)",
            Self::Nanoseconds => "Nanoseconds (nSec)",
            Self::Gigahertz => "Gigahertz (GHz)",
            Self::Centimeters => "Centimeters (cm)",
            Self::Meters => "Meters (m)",
            Self::Millimeters => "Millimeters (mm)",
            Self::Hours => "Hours",
            Self::DoubleInterferogram => "Double interferogram",
            Self::Other(code) => return write!(f, "Unknown unit ({})", code),
        };
        write!(f, "{}", label)
    }
}

// ─── Y axis units (header byte 29) ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YUnit {
    ArbitraryIntensity,
    Interferogram,
    Absorbance,
    KubelkaMunk,
    Counts,
    Volts,
    Degrees,
    Milliamps,
    Millimeters,
    Millivolts,
    LogReflectance,
    Percent,
    Intensity,
    RelativeIntensity,
    Energy,
    Decibel,
    Fahrenheit,
    Celsius,
    Kelvin,
    RefractiveIndex,
    ExtinctionCoefficient,
    Real,
    Imaginary,
    Complex,
    Transmission,
    Reflectance,
    ValleyPeaks,
    Emission,
    Other(u8),
}

impl YUnit {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::ArbitraryIntensity,
            1 => Self::Interferogram,
            2 => Self::Absorbance,
            3 => Self::KubelkaMunk,
            4 => Self::Counts,
            5 => Self::Volts,
            6 => Self::Degrees,
            7 => Self::Milliamps,
            8 => Self::Millimeters,
            9 => Self::Millivolts,
            10 => Self::LogReflectance,
            11 => Self::Percent,
            12 => Self::Intensity,
            13 => Self::RelativeIntensity,
            14 => Self::Energy,
            16 => Self::Decibel,
            19 => Self::Fahrenheit,
            20 => Self::Celsius,
            21 => Self::Kelvin,
            22 => Self::RefractiveIndex,
            23 => Self::ExtinctionCoefficient,
            24 => Self::Real,
            25 => Self::Imaginary,
            26 => Self::Complex,
            128 => Self::Transmission,
            129 => Self::Reflectance,
            130 => Self::ValleyPeaks,
            131 => Self::Emission,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for YUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ArbitraryIntensity => "Arbitrary Intensity",
            Self::Interferogram => "Interferogram",
            Self::Absorbance => "Absorbance",
            Self::KubelkaMunk => "Kubelka-Munk",
            Self::Counts => "Counts",
            Self::Volts => "Volts",
            Self::Degrees => "Degrees",
            Self::Milliamps => "Milliamps",
            Self::Millimeters => "Millimeters",
            Self::Millivolts => "Millivolts",
            Self::LogReflectance => "Log(1/R)",
            Self::Percent => "Percent",
            Self::Intensity => "Intensity",
            Self::RelativeIntensity => "Relative Intensity",
            Self::Energy => "Energy",
            Self::Decibel => "Decibel",
            Self::Fahrenheit => "Temperature (F)",
            Self::Celsius => "Temperature (C)",
            Self::Kelvin => "Temperature (K)",
            Self::RefractiveIndex => "Index of Refraction [N]",
            Self::ExtinctionCoefficient => "Extinction Coeff. [K]",
            Self::Real => "Real",
            Self::Imaginary => "Imaginary",
            Self::Complex => "Complex",
            Self::Transmission => "Transmission",
            Self::Reflectance => "Reflectance",
            Self::ValleyPeaks => "Arbitrary or Single Beam with Valley Peaks",
            Self::Emission => "Emission",
            Self::Other(code) => return write!(f, "Unknown unit ({})", code),
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(ExperimentType::from_u8(11), ExperimentType::Raman);
        assert_eq!(XUnit::from_u8(1), XUnit::Wavenumber);
        assert_eq!(XUnit::from_u8(255), XUnit::DoubleInterferogram);
        assert_eq!(YUnit::from_u8(2), YUnit::Absorbance);
        assert_eq!(YUnit::from_u8(128), YUnit::Transmission);
    }

    #[test]
    fn test_gaps_fall_back_to_other() {
        assert_eq!(ExperimentType::from_u8(6), ExperimentType::Other(6));
        assert_eq!(YUnit::from_u8(15), YUnit::Other(15));
        assert_eq!(XUnit::from_u8(31), XUnit::Other(31));
    }

    #[test]
    fn test_labels() {
        assert_eq!(XUnit::Wavenumber.to_string(), "Wavenumber (cm-1)");
        assert_eq!(YUnit::LogReflectance.to_string(), "Log(1/R)");
        assert_eq!(YUnit::Other(200).to_string(), "Unknown unit (200)");
        assert_eq!(ExperimentType::Nmr.to_string(), "NMR Spectrum or FID");
    }
}
