use std::collections::BTreeMap;

/// Field accumulator with an explicit zero default. Zeroing over the
/// requested field set up front means a district with no data still
/// reports a complete totals mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTotals {
    values: BTreeMap<String, f64>,
}

impl FieldTotals {
    pub fn zeroed(fields: &[String]) -> Self {
        Self {
            values: fields.iter().map(|field| (field.clone(), 0.0)).collect(),
        }
    }

    /// Add into a field, inserting the zero default first if needed.
    pub fn add(&mut self, field: &str, amount: f64) {
        *self.values.entry(field.to_string()).or_insert(0.0) += amount;
    }

    /// Add into a field and round the running value, keeping long sums of
    /// small contributions from drifting.
    pub fn add_rounded(&mut self, field: &str, amount: f64, digits: i32) {
        let slot = self.values.entry(field.to_string()).or_insert(0.0);
        *slot = round_to(*slot + amount, digits);
    }

    /// Value for a field, zero when absent.
    pub fn get(&self, field: &str) -> f64 {
        self.values.get(field).copied().unwrap_or(0.0)
    }

    pub fn into_map(self) -> BTreeMap<String, f64> {
        self.values
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}
