//! Filter selection and route-parameter normalization.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A filterable dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDimension {
    /// Category ids (OR within the dimension).
    Category,
    /// Brand names.
    Brand,
    /// Price range buckets such as `"0-50"`.
    PriceRange,
    /// On-sale flag; holds at most the single value `"1"`.
    OnSale,
    /// Product status; holds at most one value.
    Status,
}

impl FilterDimension {
    /// All dimensions, in display order.
    pub const ALL: [FilterDimension; 5] = [
        FilterDimension::Category,
        FilterDimension::Brand,
        FilterDimension::PriceRange,
        FilterDimension::OnSale,
        FilterDimension::Status,
    ];

    /// Route-parameter key this dimension is read from.
    pub fn param_key(&self) -> &'static str {
        match self {
            FilterDimension::Category => "category",
            FilterDimension::Brand => "brand",
            FilterDimension::PriceRange => "price",
            FilterDimension::OnSale => "on_sale",
            FilterDimension::Status => "status",
        }
    }

    /// Facet key the API reports counts under.
    pub fn facet_key(&self) -> &'static str {
        match self {
            FilterDimension::Category => "category",
            FilterDimension::Brand => "brand",
            FilterDimension::PriceRange => "price_range",
            FilterDimension::OnSale => "on_sale",
            FilterDimension::Status => "status",
        }
    }

    /// Look up a dimension by facet key or route-parameter key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.facet_key() == key || d.param_key() == key)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FilterDimension::Category => "Category",
            FilterDimension::Brand => "Brand",
            FilterDimension::PriceRange => "Price",
            FilterDimension::OnSale => "On Sale",
            FilterDimension::Status => "Status",
        }
    }

    /// Whether the dimension holds at most one value.
    pub fn is_single_valued(&self) -> bool {
        matches!(self, FilterDimension::OnSale | FilterDimension::Status)
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.param_key())
    }
}

/// A raw navigation parameter: routers hand back either a string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// All non-blank values, trimmed, in order.
    pub fn values(&self) -> Vec<String> {
        let raw: Vec<&String> = match self {
            ParamValue::Single(s) => vec![s],
            ParamValue::Many(v) => v.iter().collect(),
        };
        raw.into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// First non-blank value.
    pub fn first(&self) -> Option<String> {
        self.values().into_iter().next()
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Single(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Single(s)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        ParamValue::Many(v)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(v: Vec<&str>) -> Self {
        ParamValue::Many(v.into_iter().map(str::to_string).collect())
    }
}

/// Untyped navigation parameters; a missing key means "absent".
pub type RouteParams = HashMap<String, ParamValue>;

/// Active filter selections.
///
/// Equality is by value set: insertion order and duplicate selections do not
/// matter, and a dimension with no values is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelection(BTreeMap<FilterDimension, BTreeSet<String>>);

/// Value stored for the on-sale flag.
pub(crate) const ON_SALE_FLAG: &str = "1";

impl FilterSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize raw route parameters into a selection.
    ///
    /// Malformed input never fails: unknown keys are ignored, blank strings
    /// are dropped, and the on-sale flag only accepts truthy strings.
    pub fn from_route_params(params: &RouteParams) -> Self {
        let mut selection = Self::new();

        for dimension in FilterDimension::ALL {
            let Some(raw) = params.get(dimension.param_key()) else {
                continue;
            };

            match dimension {
                FilterDimension::OnSale => {
                    if raw.first().is_some_and(|v| is_truthy(&v)) {
                        selection.set_on_sale(true);
                    }
                }
                FilterDimension::Status => {
                    if let Some(status) = raw.first() {
                        selection.select(dimension, status);
                    }
                }
                _ => {
                    for value in raw.values() {
                        selection.select(dimension, value);
                    }
                }
            }
        }

        selection
    }

    /// Builder form of [`select`](Self::select).
    pub fn with(mut self, dimension: FilterDimension, value: impl Into<String>) -> Self {
        self.select(dimension, value);
        self
    }

    /// Add a value. Single-valued dimensions replace their previous value.
    pub fn select(&mut self, dimension: FilterDimension, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let values = self.0.entry(dimension).or_default();
        if dimension.is_single_valued() {
            values.clear();
        }
        values.insert(value.to_string());
    }

    /// Remove a value; returns whether it was selected.
    pub fn deselect(&mut self, dimension: FilterDimension, value: &str) -> bool {
        let Some(values) = self.0.get_mut(&dimension) else {
            return false;
        };
        let removed = values.remove(value);
        if values.is_empty() {
            self.0.remove(&dimension);
        }
        removed
    }

    /// Select the value if absent, deselect it if present.
    pub fn toggle(&mut self, dimension: FilterDimension, value: &str) {
        if !self.deselect(dimension, value) {
            self.select(dimension, value);
        }
    }

    /// Drop every value of a dimension.
    pub fn clear_dimension(&mut self, dimension: FilterDimension) {
        self.0.remove(&dimension);
    }

    /// Set or clear the on-sale flag.
    pub fn set_on_sale(&mut self, on_sale: bool) {
        if on_sale {
            self.select(FilterDimension::OnSale, ON_SALE_FLAG);
        } else {
            self.clear_dimension(FilterDimension::OnSale);
        }
    }

    /// Whether the on-sale flag is set.
    pub fn on_sale(&self) -> bool {
        self.contains(FilterDimension::OnSale, ON_SALE_FLAG)
    }

    /// Selected values of a dimension, sorted.
    pub fn values(&self, dimension: FilterDimension) -> Vec<String> {
        self.0
            .get(&dimension)
            .map(|v| v.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether a specific value is selected.
    pub fn contains(&self, dimension: FilterDimension, value: &str) -> bool {
        self.0.get(&dimension).is_some_and(|v| v.contains(value))
    }

    /// Whether no filter is applied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of selected values across dimensions.
    pub fn active_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Iterate over `(dimension, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (FilterDimension, &str)> {
        self.0
            .iter()
            .flat_map(|(d, values)| values.iter().map(move |v| (*d, v.as_str())))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
