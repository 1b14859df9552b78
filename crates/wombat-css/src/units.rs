//! [CSS Values § 6 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)

use crate::error::CssError;

/// "1in = 2.54cm = 96px", scaled by the actual resolution.
const CM_PER_INCH: f64 = 2.54;

/// Convert a length such as `12pt` or `50%` to pixels.
///
/// `dpi` scales the absolute units. Percentages resolve to
/// `value / 100 * percentage + origin`; `em` and `ex` need `em_size`, and
/// `ex` is taken as half an `em`. A number without a unit is already in
/// pixels. Surrounding whitespace is ignored and an empty spec is zero.
///
/// # Errors
///
/// Returns [`CssError::MissingPercentage`] or [`CssError::MissingEmSize`] when
/// a relative unit cannot be resolved, and [`CssError::NotANumber`] when the
/// part before the unit is not a number.
pub fn units(
    spec: &str,
    dpi: f64,
    percentage: Option<f64>,
    origin: f64,
    em_size: Option<f64>,
) -> Result<f64, CssError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Ok(0.0);
    }

    let em = || em_size.ok_or_else(|| CssError::MissingEmSize(spec.to_owned()));
    let (number, scale, shift) = if let Some(number) = spec.strip_suffix("px") {
        (number, 1.0, 0.0)
    } else if let Some(number) = spec.strip_suffix("ex") {
        (number, em()? * 0.5, 0.0)
    } else if let Some(number) = spec.strip_suffix("mm") {
        (number, dpi / (CM_PER_INCH * 10.0), 0.0)
    } else if let Some(number) = spec.strip_suffix("cm") {
        (number, dpi / CM_PER_INCH, 0.0)
    } else if let Some(number) = spec.strip_suffix("in") {
        (number, dpi, 0.0)
    } else if let Some(number) = spec.strip_suffix("pc") {
        (number, dpi / 6.0, 0.0)
    } else if let Some(number) = spec.strip_suffix("pt") {
        (number, dpi / 72.0, 0.0)
    } else if let Some(number) = spec.strip_suffix("em") {
        (number, em()?, 0.0)
    } else if let Some(number) = spec.strip_suffix('Q') {
        (number, dpi / (CM_PER_INCH * 40.0), 0.0)
    } else if let Some(number) = spec.strip_suffix('%') {
        let percentage =
            percentage.ok_or_else(|| CssError::MissingPercentage(spec.to_owned()))?;
        (number, percentage / 100.0, origin)
    } else {
        (spec, 1.0, 0.0)
    };

    Ok(parse_number(number)? * scale + shift)
}

/// Parse a CSS number; `null` reads as zero.
///
/// # Errors
///
/// Returns [`CssError::NotANumber`] for anything that is not a finite number.
pub fn parse_number(text: &str) -> Result<f64, CssError> {
    let text = text.trim();
    if text == "null" {
        return Ok(0.0);
    }
    text.parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| CssError::NotANumber(text.to_owned()))
}
