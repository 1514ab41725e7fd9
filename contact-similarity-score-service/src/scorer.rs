use crate::distance::similarity;
use contact_similarity::dto::Record;

const FIRST_NAME_WEIGHT: f64 = 2.0;
const LAST_NAME_WEIGHT: f64 = 2.0;
const EMAIL_WEIGHT: f64 = 3.0;
const ZIP_CODE_WEIGHT: f64 = 2.0;
const ADDRESS_WEIGHT: f64 = 2.0;
const TOTAL_WEIGHT: f64 =
    FIRST_NAME_WEIGHT + LAST_NAME_WEIGHT + EMAIL_WEIGHT + ZIP_CODE_WEIGHT + ADDRESS_WEIGHT;

/// Upper bound of [`match_score`].
pub const MAX_SCORE: u32 = 1000;

///
/// Aggregate similarity of two records in `[0, MAX_SCORE]`.
///
/// Each field contributes its full weight on byte equality, otherwise
/// `similarity * weight`. The weighted sum is rescaled and truncated toward zero.
///
pub fn match_score(a: &Record, b: &Record) -> u32 {
    let raw = field_score(&a.first_name, &b.first_name, FIRST_NAME_WEIGHT)
        + field_score(&a.last_name, &b.last_name, LAST_NAME_WEIGHT)
        + field_score(&a.email, &b.email, EMAIL_WEIGHT)
        + field_score(&a.zip_code, &b.zip_code, ZIP_CODE_WEIGHT)
        + field_score(&a.address, &b.address, ADDRESS_WEIGHT);
    (raw * MAX_SCORE as f64 / TOTAL_WEIGHT) as u32
}

#[inline]
fn field_score(a: &str, b: &str, weight: f64) -> f64 {
    if a == b {
        weight
    } else {
        similarity(a, b) * weight
    }
}
