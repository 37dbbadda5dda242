use compact_str::{CompactString, ToCompactString};
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::{debug, warn};

use super::{
    CATEGORY_DEBUGGER, CATEGORY_QUERY, CATEGORY_SELECTION, Category, IndicationError,
    ViewportIndicator,
};

/// Where a category's field lives inside an overlay byte.
#[derive(Debug, Clone, Copy)]
struct FieldLayout {
    offset: u32,
    mask: u8,
}

/// Packs registered [`Category`]s into the 8 bits of an overlay byte.
///
/// A category's bit offset is `bit_width * registration_ordinal`, not the sum of the widths
/// registered before it. With equal-width categories (as in [`Self::viewport_default`]) the
/// two are the same; mixing widths can leave gaps, overlap fields, or push a field past
/// bit 7, and any of those is logged when the category is added.
///
/// Registration order decides the layout, so it must be identical on every run.
#[derive(Debug, Default, Clone)]
pub struct IndicationRegistry {
    categories: IndexMap<CompactString, Category>,
    bits_used: u8,
}

impl IndicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the layout used by every viewport overlay:
    ///
    /// | ordinal | category   | width | indicators                    |
    /// |---------|------------|-------|-------------------------------|
    /// | 0       | `one`      | 2     | `selected`                    |
    /// | 1       | `two`      | 2     | `searchresult`, `replacement` |
    /// | 2       | `debugger` | 2     | `bytepos1b`                   |
    pub fn viewport_default() -> Result<Self, IndicationError> {
        let selection = Category::new(CATEGORY_SELECTION, 2)?
            .with_indicator(ViewportIndicator::Selected.as_ref())?;
        let query = Category::new(CATEGORY_QUERY, 2)?
            .with_indicator(ViewportIndicator::SearchResult.as_ref())?
            .with_indicator(ViewportIndicator::Replacement.as_ref())?;
        let debugger = Category::new(CATEGORY_DEBUGGER, 2)?
            .with_indicator(ViewportIndicator::BytePos1b.as_ref())?;

        let registry = Self::new()
            .with_category(selection)?
            .with_category(query)?
            .with_category(debugger)?;
        debug!(
            "Indication registry ready: [{}], {} of 8 bits used",
            registry.categories.keys().join(", "),
            registry.bits_used
        );
        Ok(registry)
    }

    /// Builder-style [`Self::add_category`].
    pub fn with_category(mut self, category: Category) -> Result<Self, IndicationError> {
        self.add_category(category)?;
        Ok(self)
    }

    pub fn add_category(&mut self, category: Category) -> Result<&mut Self, IndicationError> {
        let available = 8 - self.bits_used;
        if category.bit_width() > available {
            return Err(IndicationError::CapacityExceeded {
                name: category.name().to_owned(),
                requested: category.bit_width(),
                available,
            });
        }
        if self.categories.contains_key(category.name()) {
            return Err(IndicationError::DuplicateCategory(category.name().to_owned()));
        }
        if let Some(dupe) = category
            .indicators()
            .iter()
            .filter(|i| !i.is_none())
            .find(|i| self.categories.values().any(|c| c.contains(i.selector())))
        {
            return Err(IndicationError::DuplicateIndicator(dupe.selector().to_owned()));
        }

        let ordinal = self.categories.len() as u32;
        let offset = category.bit_width() as u32 * ordinal;
        let wide_mask = category.field_mask() << offset;
        if wide_mask > 0xFF {
            warn!(
                "Category \"{}\" field ends at bit {}, indicators that don't fit a byte will be rejected",
                category.name(),
                offset + category.bit_width() as u32 - 1
            );
        }
        let overlapped = self
            .categories
            .values()
            .filter(|c| self.layout(c).is_ok_and(|l| l.mask & wide_mask as u8 != 0))
            .map(Category::name)
            .join(", ");
        if !overlapped.is_empty() {
            warn!(
                "Category \"{}\" overlaps the field(s) of: {overlapped}",
                category.name()
            );
        }

        self.bits_used += category.bit_width();
        self.categories
            .insert(category.name().to_compact_string(), category);
        Ok(self)
    }

    pub fn bits_used(&self) -> u8 {
        self.bits_used
    }

    /// Registered categories, in registration order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn category(&self, name: &str) -> Result<&Category, IndicationError> {
        self.categories
            .get(name)
            .ok_or_else(|| IndicationError::UnknownCategory(name.to_owned()))
    }

    /// Returns the first registered category containing an indicator named `name`.
    pub fn category_by_indicator_name(
        &self,
        name: impl AsRef<str>,
    ) -> Result<&Category, IndicationError> {
        let name = name.as_ref();
        self.categories
            .values()
            .find(|c| c.contains(name))
            .ok_or_else(|| IndicationError::NotFound(name.to_lowercase()))
    }

    /// Bit offset of `category`'s field within an overlay byte.
    pub fn bit_offset(&self, category: &Category) -> Result<u32, IndicationError> {
        self.layout(category).map(|l| l.offset)
    }

    /// Mask selecting `category`'s field within an overlay byte.
    pub fn mask(&self, category: &Category) -> Result<u8, IndicationError> {
        self.layout(category).map(|l| l.mask)
    }

    /// The overlay-byte value of `name` being set within `category`.
    pub fn packed_value(
        &self,
        category: &Category,
        name: impl AsRef<str>,
    ) -> Result<u8, IndicationError> {
        let name = name.as_ref();
        let layout = self.layout(category)?;
        let index = category.index_of(name)? as u32;
        u8::try_from(index << layout.offset).map_err(|_| IndicationError::FieldOverflow {
            category: category.name().to_owned(),
            indicator: name.to_owned(),
            offset: layout.offset,
        })
    }

    /// Zeroes the owning category's field in every cell currently set to exactly `name`.
    pub fn clear_indicator(
        &self,
        cells: &mut [u8],
        name: impl AsRef<str>,
    ) -> Result<(), IndicationError> {
        let name = name.as_ref();
        let category = self.category_by_indicator_name(name)?;
        let mask = self.mask(category)?;
        let value = self.packed_value(category, name)?;

        cells
            .iter_mut()
            .filter(|cell| **cell & mask == value)
            .for_each(|cell| *cell &= !mask);
        Ok(())
    }

    /// For every cell, clears the owning category's field of `name`, then sets it to
    /// `name` wherever `predicate(original_cell, index)` holds.
    ///
    /// The predicate always sees the cell value from before this call touched it.
    pub fn clear_and_set_if<F>(
        &self,
        cells: &mut [u8],
        name: impl AsRef<str>,
        mut predicate: F,
    ) -> Result<(), IndicationError>
    where
        F: FnMut(u8, usize) -> bool,
    {
        let name = name.as_ref();
        let category = self.category_by_indicator_name(name)?;
        let mask = self.mask(category)?;
        let value = self.packed_value(category, name)?;

        for (index, cell) in cells.iter_mut().enumerate() {
            let original = *cell;
            *cell &= !mask;
            if predicate(original, index) {
                *cell |= value;
            }
        }
        Ok(())
    }

    /// Index stored in `category`'s field of `cell`.
    pub fn field_value(&self, category: &Category, cell: u8) -> Result<usize, IndicationError> {
        let layout = self.layout(category)?;
        Ok(((cell & layout.mask) as u32 >> layout.offset) as usize)
    }

    /// Selector of whichever indicator `cell` holds for `category`.
    ///
    /// Field values with no matching indicator resolve to the "none" selector.
    pub fn css_selector_for<'a>(
        &self,
        category: &'a Category,
        cell: u8,
    ) -> Result<&'a str, IndicationError> {
        let index = self.field_value(category, cell)?;
        Ok(category.at(index).selector())
    }

    /// Space-separated selectors of every category with an indicator set in `cell`.
    pub fn css_selectors(&self, cell: u8) -> String {
        self.categories
            .values()
            .filter_map(|c| self.css_selector_for(c, cell).ok())
            .filter(|s| *s != super::NO_INDICATOR)
            .join(" ")
    }

    fn layout(&self, category: &Category) -> Result<FieldLayout, IndicationError> {
        let ordinal = self
            .categories
            .get_index_of(category.name())
            .ok_or_else(|| IndicationError::UnknownCategory(category.name().to_owned()))?
            as u32;
        let offset = category.bit_width() as u32 * ordinal;
        let mask = ((category.field_mask() << offset) & 0xFF) as u8;
        Ok(FieldLayout { offset, mask })
    }
}
