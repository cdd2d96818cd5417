//! Validation helpers shared by every settings section

pub use crate::error::ValidationError;

/// A settings section that can check and merge itself
pub trait ConfigSection: Default {
    /// Returns every problem found; an empty list is never returned as `Err`
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Values from `other` take precedence
    fn merge(&mut self, other: Self);

    fn section_name(&self) -> &'static str;
}

pub struct Validator;

impl Validator {
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        } else {
            Ok(())
        }
    }

    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Fails if any two values in `values` are equal
    pub fn distinct<T>(values: &[(&str, T)], field: &str) -> Result<(), ValidationError>
    where
        T: PartialEq + std::fmt::Display + Copy,
    {
        for (i, (name_a, a)) in values.iter().enumerate() {
            for (name_b, b) in &values[i + 1..] {
                if a == b {
                    return Err(ValidationError::with_value(
                        field,
                        format!("{} and {} share the same value", name_a, name_b),
                        a,
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
