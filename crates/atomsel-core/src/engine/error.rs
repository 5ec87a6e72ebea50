use super::spatial::SpatialError;

pub use crate::core::select::error::SelectionError;

impl From<SpatialError> for SelectionError {
    fn from(err: SpatialError) -> Self {
        let value = match &err {
            SpatialError::NonFiniteCoordinate { index } => format!("atom {index}"),
            SpatialError::InvalidRadius(radius) => radius.to_string(),
            SpatialError::RadiusExceedsIndex { requested, .. } => requested.to_string(),
        };
        SelectionError::InvalidValue {
            value,
            message: err.to_string(),
            position: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spatial_failures_become_invalid_values() {
        let err: SelectionError = SpatialError::NonFiniteCoordinate { index: 4 }.into();
        assert_eq!(
            err,
            SelectionError::InvalidValue {
                value: "atom 4".into(),
                message: "Coordinate of atom 4 is not finite".into(),
                position: None,
            }
        );
    }
}
