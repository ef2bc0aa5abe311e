use crate::config::GapCategory;
use crate::plan::DistrictTotals;

/// Apply a uniform vote swing to every district and category pair.
///
/// A positive swing moves vote share toward the minority field, a negative
/// swing toward the majority field. Each district's total for the pair is
/// preserved exactly; the transfer is clamped so neither side leaves
/// [0, total]. A zero swing reproduces the input.
pub fn apply_swing(
    districts: &[DistrictTotals],
    categories: &[GapCategory],
    swing: f64,
) -> Vec<DistrictTotals> {
    if swing == 0.0 {
        return districts.to_vec();
    }

    districts
        .iter()
        .map(|district| {
            let mut swung = district.clone();
            for category in categories {
                let majority = district.get(&category.majority_field);
                let minority = district.get(&category.minority_field);
                let total = majority + minority;
                if total == 0.0 {
                    continue;
                }

                let minority_after = (minority + swing * total).clamp(0.0, total);
                swung = swung
                    .with_value(&category.minority_field, minority_after)
                    .with_value(&category.majority_field, total - minority_after);
            }
            swung
        })
        .collect()
}
