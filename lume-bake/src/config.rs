use lume_core::{LumeError, LumeResult};

/// Tunables for vertex collapse.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BakeConfig {
    /// Per-component tolerance for positions, normals and texcoords.
    pub error_tolerance: f32,
    /// The discretization box is padded by `margin_factor * error_tolerance`.
    pub margin_factor: f32,
    /// Upper bound on cells along the longest side of the grid.
    pub max_grid_size: usize,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            error_tolerance: 1e-5,
            margin_factor: 10.0,
            max_grid_size: 1024 * 1024,
        }
    }
}

impl BakeConfig {
    pub fn with_tolerance(error_tolerance: f32) -> Self {
        Self {
            error_tolerance,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> LumeResult<()> {
        if !self.error_tolerance.is_finite() || self.error_tolerance < 0.0 {
            return Err(LumeError::InvalidInput(format!(
                "error tolerance must be finite and non-negative, got {}",
                self.error_tolerance
            )));
        }
        if !self.margin_factor.is_finite() || self.margin_factor < 0.0 {
            return Err(LumeError::InvalidInput(format!(
                "margin factor must be finite and non-negative, got {}",
                self.margin_factor
            )));
        }
        if self.max_grid_size == 0 {
            return Err(LumeError::InvalidInput("grid size cap must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(BakeConfig::default().validate().is_ok());
        assert!(BakeConfig::with_tolerance(0.0).validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(BakeConfig::with_tolerance(-1.0).validate().is_err());
        assert!(BakeConfig::with_tolerance(f32::NAN).validate().is_err());
        let cfg = BakeConfig {
            max_grid_size: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
