use compact_str::{CompactString, ToCompactString};

use super::IndicationError;

/// Selector of the zero-value indicator every category starts with.
pub const NO_INDICATOR: &str = "none";

/// A named overlay state. Names are stored lowercased and compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    selector: CompactString,
}

impl Indicator {
    pub fn new(name: &str) -> Self {
        Self {
            selector: name.to_lowercase().to_compact_string(),
        }
    }
    pub fn none() -> Self {
        Self::new(NO_INDICATOR)
    }
    pub fn selector(&self) -> &str {
        &self.selector
    }
    pub fn is_none(&self) -> bool {
        self.selector == NO_INDICATOR
    }
    pub fn matches(&self, name: &str) -> bool {
        self.selector.eq_ignore_ascii_case(name)
    }
}

/// A fixed-width group of mutually exclusive indicators.
///
/// Index `0` is always [`NO_INDICATOR`], and an indicator's index is the literal
/// value written into the category's bit field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: CompactString,
    bit_width: u8,
    indicators: Vec<Indicator>,
}

impl Category {
    pub fn new(name: &str, bit_width: u8) -> Result<Self, IndicationError> {
        if !(1..=8).contains(&bit_width) {
            return Err(IndicationError::InvalidBitWidth(bit_width));
        }
        Ok(Self {
            name: name.to_compact_string(),
            bit_width,
            indicators: vec![Indicator::none()],
        })
    }
    /// Builder-style [`Category::add_indicator`].
    pub fn with_indicator(mut self, name: &str) -> Result<Self, IndicationError> {
        self.add_indicator(name)?;
        Ok(self)
    }
    pub fn add_indicator(&mut self, name: &str) -> Result<&mut Self, IndicationError> {
        if self.contains(name) {
            return Err(IndicationError::DuplicateIndicator(name.to_lowercase()));
        }
        let max = self.max_indicators();
        if self.indicators.len() >= max {
            return Err(IndicationError::IndicatorOverflow {
                name: self.name.to_string(),
                bit_width: self.bit_width,
                max,
            });
        }
        self.indicators.push(Indicator::new(name));
        Ok(self)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn bit_width(&self) -> u8 {
        self.bit_width
    }
    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }
    /// Returns the indicator at `index`, falling back to the "none" indicator when out of range.
    pub fn at(&self, index: usize) -> &Indicator {
        self.indicators.get(index).unwrap_or(&self.indicators[0])
    }
    pub fn index_of(&self, name: &str) -> Result<usize, IndicationError> {
        self.indicators
            .iter()
            .position(|i| i.matches(name))
            .ok_or_else(|| IndicationError::NotFound(name.to_lowercase()))
    }
    pub fn contains(&self, name: &str) -> bool {
        self.indicators.iter().any(|i| i.matches(name))
    }
    /// Unshifted mask covering this category's field.
    pub(super) fn field_mask(&self) -> u32 {
        (1u32 << self.bit_width) - 1
    }
    fn max_indicators(&self) -> usize {
        1usize << self.bit_width
    }
}
