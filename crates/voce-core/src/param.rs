//! Parameter metadata for voice effect engines.
//!
//! Engines store parameter values as plain arrays and describe each slot
//! with a [`ParamDescriptor`] (continuous) or [`IntParamDescriptor`]
//! (stepped/enum-like). Hosts use the descriptors for display, validation,
//! default initialization, and normalized automation mapping.
//!
//! Indices past an engine's real parameter count resolve to the
//! [`unknown`](ParamDescriptor::unknown) sentinel rather than an error, so
//! a host can query a uniform slot count across heterogeneous engines.
//!
//! Fully `no_std` compatible; no heap allocation.

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB) - gain, shelf boost, level parameters.
    Decibels,
    /// Semitones relative to A440 - every frequency-like parameter, so
    /// keytracking stays an addition in pitch space.
    Semitones,
    /// Milliseconds (ms) - delay times.
    Milliseconds,
    /// Percentage (%) - mix, feedback, spread.
    Percent,
    /// No unit - dimensionless parameters.
    None,
}

impl ParamUnit {
    /// Unit suffix string for display.
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Semitones => " st",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Percent => "%",
            ParamUnit::None => "",
        }
    }
}

/// Metadata for one continuous (f32) parameter.
///
/// # Example
///
/// ```rust
/// use voce_core::ParamDescriptor;
///
/// let time = ParamDescriptor::time_ms("Time L", "TimeL", 0.0, 250.0, 50.0);
/// assert_eq!(time.clamp(500.0), 250.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full name for display (e.g., "Feedback", "Time L").
    pub name: &'static str,
    /// Short name for hardware displays, 8 characters or less.
    pub short_name: &'static str,
    /// Unit for formatting.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Value assigned at voice initialization.
    pub default: f32,
    /// Recommended increment for encoder control.
    pub step: f32,
    /// Hidden from generic host UI (e.g., stereo-only parameters of an
    /// engine running mono).
    pub hidden: bool,
}

impl ParamDescriptor {
    /// Time parameter in milliseconds.
    #[must_use]
    pub const fn time_ms(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Milliseconds,
            min,
            max,
            default,
            step: 1.0,
            hidden: false,
        }
    }

    /// Gain or shelf parameter in decibels.
    #[must_use]
    pub const fn gain_db(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Decibels,
            min,
            max,
            default,
            step: 0.5,
            hidden: false,
        }
    }

    /// Normalized 0..1 parameter displayed as a percentage.
    #[must_use]
    pub const fn percent(
        name: &'static str,
        short_name: &'static str,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Percent,
            min: 0.0,
            max: 1.0,
            default,
            step: 0.01,
            hidden: false,
        }
    }

    /// Frequency-like parameter in semitones relative to A440.
    #[must_use]
    pub const fn semitones(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Semitones,
            min,
            max,
            default,
            step: 0.1,
            hidden: false,
        }
    }

    /// Sentinel for indices past an engine's parameter count.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            name: "Unknown",
            short_name: "Unknown",
            unit: ParamUnit::None,
            min: 0.0,
            max: 1.0,
            default: 0.0,
            step: 0.01,
            hidden: false,
        }
    }

    /// Mark the parameter as hidden from generic UIs.
    #[must_use]
    pub const fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Clamp a value to this parameter's range.
    #[inline]
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Plain value to normalized 0..1.
    #[inline]
    #[must_use]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / range
    }

    /// Normalized 0..1 to plain value.
    #[inline]
    #[must_use]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }
}

/// Metadata for one stepped (i32) parameter, such as a mode selector or a
/// boolean switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntParamDescriptor {
    /// Full name for display (e.g., "Mode", "Stereo").
    pub name: &'static str,
    /// Short name for hardware displays.
    pub short_name: &'static str,
    /// Minimum allowed value.
    pub min: i32,
    /// Maximum allowed value.
    pub max: i32,
    /// Value assigned at voice initialization.
    pub default: i32,
    /// Hidden from generic host UI.
    pub hidden: bool,
}

impl IntParamDescriptor {
    /// Stepped selector over `count` choices, zero-based.
    #[must_use]
    pub const fn selector(
        name: &'static str,
        short_name: &'static str,
        count: i32,
        default: i32,
    ) -> Self {
        Self {
            name,
            short_name,
            min: 0,
            max: count - 1,
            default,
            hidden: false,
        }
    }

    /// On/off switch.
    #[must_use]
    pub const fn toggle(name: &'static str, short_name: &'static str, default: bool) -> Self {
        Self {
            name,
            short_name,
            min: 0,
            max: 1,
            default: default as i32,
            hidden: false,
        }
    }

    /// Sentinel for indices past an engine's parameter count.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            name: "Unknown",
            short_name: "Unknown",
            min: 0,
            max: 1,
            default: 0,
            hidden: false,
        }
    }

    /// Mark the parameter as hidden from generic UIs.
    #[must_use]
    pub const fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Clamp a value to this parameter's range.
    #[inline]
    #[must_use]
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}
