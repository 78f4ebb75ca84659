//! Fixed industry taxonomy shared by the whole pipeline.

/// Label used whenever an event does not resolve to an industry.
///
/// Every derived view takes its default from here (or from the one
/// configured override), never from a local literal.
pub const DEFAULT_INDUSTRY: &str = "General";

/// Industry label of the sentinel returned by extremum selection on empty input.
pub const NO_DATA_INDUSTRY: &str = "N/A";

pub const INDUSTRIES: &[&str] = &[
    "Agriculture",
    "Apparel Textiles",
    "Banking Finance",
    "Chemicals",
    "Construction",
    "Education",
    "Energy",
    "Exports",
    "Fisheries",
    "Food Beverages",
    "Forestry",
    "Government Services",
    "Healthcare",
    "Hospitality",
    "Ict Tech",
    "Import Trade",
    "Insurance",
    "Logistics",
    "Manufacturing",
    "Media Communications",
    "Mining",
    "Pharmaceuticals",
    "Real Estate",
    "Retail",
    "Tourism",
    "Transportation",
];
