use serde::{Deserialize, Serialize};
use tessera_imgproc::filter::{InclusionKernel, Kernel2d, Stride};

use crate::error::ActionError;

/// What a filter definition does to an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// Windowed median.
    #[serde(rename = "median")]
    Median,
    /// Windowed minimum.
    #[serde(rename = "minimum")]
    Minimum,
    /// Windowed maximum.
    #[serde(rename = "maximum")]
    Maximum,
    /// Windowed lower quartile.
    #[serde(rename = "25%_quantile")]
    Quantile25,
    /// Windowed upper quartile.
    #[serde(rename = "75%_quantile")]
    Quantile75,
    /// Weighted average, cell values scaled by the factor.
    #[serde(rename = "smoothing")]
    Smoothing,
    /// Derivative kernel applied to the single channel version of the image.
    #[serde(rename = "edge_detection")]
    EdgeDetection,
    /// Passed through unchanged.
    #[serde(rename = "custom")]
    Custom,
}

impl FilterKind {
    /// Whether the kind maps onto a rank filter.
    pub fn is_rank(&self) -> bool {
        matches!(
            self,
            FilterKind::Median
                | FilterKind::Minimum
                | FilterKind::Maximum
                | FilterKind::Quantile25
                | FilterKind::Quantile75
        )
    }
}

fn default_sampling_rate() -> [usize; 2] {
    [1, 1]
}

fn default_factor() -> f32 {
    1.0
}

/// Settings of a filter definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Grid size as `[rows, cols]`.
    pub size: [usize; 2],
    /// Output stride as `[y, x]`.
    #[serde(default = "default_sampling_rate")]
    pub spatial_sampling_rate: [usize; 2],
    /// Normalization factor of smoothing kernels.
    #[serde(default = "default_factor")]
    pub factor: f32,
    /// The filter kind.
    #[serde(rename = "type")]
    pub kind: FilterKind,
}

/// One cell of a filter grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterCell {
    /// Kernel weight of linear filters.
    #[serde(default)]
    pub value: f32,
    /// Rank filters leave disabled cells out of the window.
    #[serde(default)]
    pub disabled: bool,
}

/// A user-authored filter: a grid of cells plus settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    /// How the grid is interpreted.
    pub settings: FilterSettings,
    /// Row-major grid of cells.
    pub grid: Vec<Vec<FilterCell>>,
}

impl FilterDefinition {
    /// Parse a definition from its JSON form.
    ///
    /// # Example
    ///
    /// ```
    /// use tessera_actions::{FilterDefinition, FilterKind};
    ///
    /// let definition = FilterDefinition::from_json(
    ///     r#"{
    ///         "settings": {"size": [1, 3], "spatial_sampling_rate": [1, 2], "factor": 1.0, "type": "median"},
    ///         "grid": [[{"value": 1, "disabled": false}, {"value": 1, "disabled": true}, {"value": 1, "disabled": false}]]
    ///     }"#,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(definition.settings.kind, FilterKind::Median);
    /// assert_eq!(definition.inclusion_kernel().unwrap().num_included(), 2);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ActionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The output stride from the spatial sampling rate.
    pub fn stride(&self) -> Stride {
        let [y, x] = self.settings.spatial_sampling_rate;
        Stride::new(y, x)
    }

    /// Check the grid is `settings.size` cells large.
    pub fn check_grid(&self) -> Result<(), ActionError> {
        let rows = self.grid.len();
        let cols = self.grid.first().map_or(0, Vec::len);
        if [rows, cols] != self.settings.size {
            return Err(ActionError::GridShapeMismatch {
                expected: self.settings.size,
                got: [rows, cols],
            });
        }
        Ok(())
    }

    /// The linear kernel: cell values, times the factor for smoothing kernels.
    pub fn linear_kernel(&self) -> Result<Kernel2d, ActionError> {
        self.check_grid()?;
        let scale = match self.settings.kind {
            FilterKind::Smoothing => self.settings.factor,
            _ => 1.0,
        };
        let rows: Vec<Vec<f32>> = self
            .grid
            .iter()
            .map(|row| row.iter().map(|cell| cell.value * scale).collect())
            .collect();
        Ok(Kernel2d::from_rows(&rows)?)
    }

    /// The rank window: enabled cells included at unit weight.
    pub fn inclusion_kernel(&self) -> Result<InclusionKernel, ActionError> {
        self.check_grid()?;
        let rows: Vec<Vec<Option<f32>>> = self
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| (!cell.disabled).then_some(1.0))
                    .collect()
            })
            .collect();
        Ok(InclusionKernel::from_rows(&rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_imgproc::FilterError;

    fn cell(value: f32, disabled: bool) -> FilterCell {
        FilterCell { value, disabled }
    }

    fn definition(kind: FilterKind, factor: f32, grid: Vec<Vec<FilterCell>>) -> FilterDefinition {
        FilterDefinition {
            settings: FilterSettings {
                size: [grid.len(), grid.first().map_or(0, Vec::len)],
                spatial_sampling_rate: [2, 3],
                factor,
                kind,
            },
            grid,
        }
    }

    #[test]
    fn test_kind_names() -> Result<(), ActionError> {
        let kinds: Vec<FilterKind> = serde_json::from_str(
            r#"["median", "minimum", "maximum", "25%_quantile", "75%_quantile",
                "smoothing", "edge_detection", "custom"]"#,
        )?;
        assert_eq!(kinds.iter().filter(|k| k.is_rank()).count(), 5);
        assert_eq!(kinds[3], FilterKind::Quantile25);
        assert_eq!(
            serde_json::to_string(&FilterKind::Quantile75)?,
            r#""75%_quantile""#
        );
        assert!(serde_json::from_str::<FilterKind>(r#""blur""#).is_err());
        Ok(())
    }

    #[test]
    fn test_smoothing_kernel_is_scaled() -> Result<(), ActionError> {
        let def = definition(FilterKind::Smoothing, 0.5, vec![vec![cell(2.0, true); 3]; 3]);
        let kernel = def.linear_kernel()?;
        assert!(kernel.weights().iter().all(|&w| w == 1.0));
        assert_eq!(def.stride(), Stride::new(2, 3));
        Ok(())
    }

    #[test]
    fn test_edge_kernel_ignores_factor() -> Result<(), ActionError> {
        let row = vec![cell(-1.0, false), cell(0.0, false), cell(1.0, false)];
        let def = definition(FilterKind::EdgeDetection, 0.1, vec![row]);
        assert_eq!(def.linear_kernel()?.weights(), &[-1.0, 0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_disabled_cells_are_excluded() -> Result<(), ActionError> {
        let def = definition(
            FilterKind::Median,
            1.0,
            vec![
                vec![cell(0.0, true), cell(0.0, false), cell(0.0, true)],
                vec![cell(0.0, false), cell(0.0, false), cell(0.0, false)],
                vec![cell(0.0, true), cell(0.0, false), cell(0.0, true)],
            ],
        );
        let window = def.inclusion_kernel()?;
        assert_eq!(window.num_included(), 5);
        assert!(window.taps().iter().all(|tap| tap.weight == 1.0));
        Ok(())
    }

    #[test]
    fn test_grid_errors() {
        let mut def = definition(FilterKind::Smoothing, 1.0, vec![vec![cell(1.0, false); 3]; 3]);
        def.settings.size = [3, 5];
        assert!(matches!(
            def.linear_kernel(),
            Err(ActionError::GridShapeMismatch {
                expected: [3, 5],
                got: [3, 3]
            })
        ));

        let even = definition(FilterKind::Minimum, 1.0, vec![vec![cell(1.0, false); 2]; 2]);
        assert!(matches!(
            even.inclusion_kernel(),
            Err(ActionError::Filter(FilterError::EvenKernelDimensions { .. }))
        ));
    }
}
