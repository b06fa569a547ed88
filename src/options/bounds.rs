use crate::error::MapError;
use crate::kind::{FieldKind, FloatKind, Numeric};

/// Inclusive numeric interval `[lower, upper]`.
///
/// Both bounds share one Rust numeric type. Integer fields need integer
/// bounds; floating fields accept either form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    lower: Numeric,
    upper: Numeric,
}

impl Bounds {
    pub fn new<N: Into<Numeric>>(lower: N, upper: N) -> Self {
        Self { lower: lower.into(), upper: upper.into() }
    }

    pub fn lower(&self) -> Numeric { self.lower }
    pub fn upper(&self) -> Numeric { self.upper }

    pub fn check(&self, kind: &FieldKind, field: &str) -> Result<(), MapError> {
        let bad = |message: String| MapError::config(field, format!("option Bounds: {message}"));

        match kind.unwrap_optional() {
            FieldKind::Int(int_kind) => {
                if !self.lower.is_int() {
                    return Err(bad(format!("type error, expected integer bounds for field of type {int_kind}")));
                }
                for (label, bound) in [("lower", self.lower), ("upper", self.upper)] {
                    if let Numeric::Int(v) = bound {
                        if !int_kind.contains(v) {
                            return Err(bad(format!(
                                "{label} = {v} is out of limits of type {int_kind} [{} : {}]",
                                int_kind.min(),
                                int_kind.max()
                            )));
                        }
                    }
                }
            }
            FieldKind::Float(float_kind) => {
                for (label, bound) in [("lower", self.lower), ("upper", self.upper)] {
                    let v = bound.as_f64();
                    if v.is_nan() {
                        return Err(bad(format!("{label} is not a number")));
                    }
                    if !float_kind.contains(v) {
                        return Err(bad(format!(
                            "{label} = {bound} is out of limits of type {float_kind} [{:e} : {:e}]",
                            -float_kind.max(),
                            float_kind.max()
                        )));
                    }
                }
            }
            other => {
                return Err(bad(format!(
                    "can only be applied to integer or floating point fields, not {other}"
                )));
            }
        }

        if !self.lower.le(self.upper) {
            return Err(bad(format!("upper = {} is less than lower = {}", self.upper, self.lower)));
        }
        Ok(())
    }

    pub fn contains(&self, value: Numeric) -> bool {
        self.lower.le(value) && value.le(self.upper)
    }

    /// Value-time check for a field of `kind`. `f32` fields compare in `f32`,
    /// so a bound written as an `f64` literal still admits its own rounding.
    pub fn validate(&self, value: Numeric, kind: &FieldKind, field: &str) -> Result<(), MapError> {
        let is_f32 = matches!(kind.unwrap_optional(), FieldKind::Float(FloatKind::F32));
        let effective = if is_f32 { self.narrowed() } else { *self };
        if effective.contains(value) {
            return Ok(());
        }
        let shown = match value {
            Numeric::Float(x) if is_f32 => (x as f32).to_string(),
            other => other.to_string(),
        };
        Err(MapError::validation(
            field,
            shown,
            format!("is out of bounds [{}, {}]", self.lower, self.upper),
        ))
    }

    fn narrowed(&self) -> Bounds {
        let round = |n: Numeric| Numeric::Float(n.as_f64() as f32 as f64);
        Bounds { lower: round(self.lower), upper: round(self.upper) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldValue;
    use proptest::prelude::*;

    fn check<F: FieldValue>(bounds: Bounds) -> Result<(), MapError> {
        bounds.check(&F::kind(), "Shape.strokeWidth")
    }

    #[test]
    fn integer_bound_on_float_field_is_legal() {
        assert!(check::<f32>(Bounds::new(0, 10)).is_ok());
        assert!(check::<Option<f64>>(Bounds::new(-1, 1)).is_ok());
    }

    #[test]
    fn float_bound_on_integer_field_is_rejected() {
        let err = check::<i32>(Bounds::new(0.0, 10.0)).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("expected integer bounds"), "{err}");
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        for err in [
            check::<String>(Bounds::new(0, 1)).unwrap_err(),
            check::<bool>(Bounds::new(0, 1)).unwrap_err(),
            check::<Vec<i32>>(Bounds::new(0, 1)).unwrap_err(),
        ] {
            assert!(err.is_config());
            assert_eq!(err.field(), Some("Shape.strokeWidth"));
        }
    }

    #[test]
    fn bounds_outside_type_limits_name_the_bound() {
        let err = check::<u8>(Bounds::new(0, 300)).unwrap_err();
        assert!(err.to_string().contains("upper = 300 is out of limits of type u8 [0 : 255]"), "{err}");

        let err = check::<u32>(Bounds::new(-1, 5)).unwrap_err();
        assert!(err.to_string().contains("lower = -1 is out of limits of type u32"), "{err}");

        let err = check::<f32>(Bounds::new(0.0, 1e39)).unwrap_err();
        assert!(err.to_string().contains("is out of limits of type f32"), "{err}");
        assert!(err.to_string().starts_with("bad configuration for 'Shape.strokeWidth': option Bounds: upper ="), "{err}");

        assert!(check::<f64>(Bounds::new(f64::NAN, 1.0)).is_err());
    }

    #[test]
    fn u64_extremes_compare_exactly() {
        let bounds = Bounds::new(0u64, u64::MAX - 1);
        assert!(check::<u64>(bounds).is_ok());
        assert!(bounds.validate(Numeric::from(u64::MAX - 1), &u64::kind(), "n").is_ok());
        assert!(bounds.validate(Numeric::from(u64::MAX), &u64::kind(), "n").is_err());
    }

    #[test]
    fn stroke_width_scenario_message() {
        let bounds = Bounds::new(0, 100);
        assert!(bounds.validate(Numeric::Int(2), &i32::kind(), "strokeWidth").is_ok());
        let err = bounds.validate(Numeric::Int(500), &i32::kind(), "strokeWidth").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "value 500 for 'strokeWidth' is out of bounds [0, 100]");
    }

    #[test]
    fn f32_fields_compare_in_f32() {
        let bounds = Bounds::new(0.0, 0.1);
        assert!(check::<f32>(bounds).is_ok());
        assert!(bounds.validate(Numeric::from(0.1f32), &f32::kind(), "opacity").is_ok());
        assert!(bounds.validate(Numeric::from(0.0f32), &Option::<f32>::kind(), "opacity").is_ok());

        let err = bounds.validate(Numeric::from(0.2f32), &f32::kind(), "opacity").unwrap_err();
        assert_eq!(err.to_string(), "value 0.2 for 'opacity' is out of bounds [0, 0.1]");

        // f64 fields keep full width: the f32 rounding of 0.1 lies above 0.1
        assert!(bounds.validate(Numeric::from(0.1f32), &f64::kind(), "opacity").is_err());
        assert!(bounds.validate(Numeric::from(0.1f64), &f64::kind(), "opacity").is_ok());
    }

    proptest! {
        #[test]
        fn membership_matches_interval(a in any::<i32>(), b in any::<i32>(), v in any::<i32>()) {
            let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
            let bounds = Bounds::new(lower, upper);
            prop_assert!(check::<i32>(bounds).is_ok());
            let ok = bounds.validate(Numeric::from(v), &i32::kind(), "x").is_ok();
            prop_assert_eq!(ok, lower <= v && v <= upper);
        }

        #[test]
        fn inverted_bounds_never_register(a in any::<i64>(), b in any::<i64>()) {
            prop_assume!(a != b);
            let (lower, upper) = if a > b { (a, b) } else { (b, a) };
            let err = check::<i64>(Bounds::new(lower, upper)).unwrap_err();
            prop_assert!(err.is_config());
        }

        #[test]
        fn float_membership_matches_interval(a in -1e6f64..1e6, b in -1e6f64..1e6, v in -2e6f64..2e6) {
            let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
            let bounds = Bounds::new(lower, upper);
            prop_assert!(check::<f64>(bounds).is_ok());
            prop_assert_eq!(bounds.contains(Numeric::from(v)), lower <= v && v <= upper);
        }
    }
}
