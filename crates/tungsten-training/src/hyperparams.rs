use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};

/// An inclusive integer range with a stride, one axis of the search grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl ParamRange {
    pub fn validate(&self, name: &str) -> TrainingResult<()> {
        if self.min == 0 {
            return Err(TrainingError::InvalidGrid(format!("{name}.min must be >= 1")));
        }
        if self.step == 0 {
            return Err(TrainingError::InvalidGrid(format!("{name}.step must be >= 1")));
        }
        Ok(())
    }

    /// Values in enumeration order. Empty when `min > max`.
    pub fn values(&self) -> impl Iterator<Item = u32> {
        (self.min..=self.max).step_by(self.step.max(1) as usize)
    }

    pub fn count(&self) -> usize {
        self.values().count()
    }

    /// Floor midpoint of the range.
    pub fn average(&self) -> u32 {
        (self.min + self.max) / 2
    }
}

/// Derived hyperparameter midpoint, used to size the exploratory run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AverageParams {
    pub layers: u32,
    pub neurons: u32,
}

/// One candidate configuration, with its stable 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub index: u32,
    pub layers: u32,
    pub neurons: u32,
}

/// Parameters handed to a [`Trainer`](crate::Trainer) for one fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub max_iter: u32,
    pub layers: u32,
    pub neurons: u32,
}

/// The 2-D search space: layer count crossed with neuron count.
///
/// Cells are enumerated layers-outer, neurons-inner so candidate indices are
/// stable and reproducible across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperparameterGrid {
    pub layers: ParamRange,
    pub neurons: ParamRange,
}

impl HyperparameterGrid {
    pub fn validate(&self) -> TrainingResult<()> {
        self.layers.validate("layers")?;
        self.neurons.validate("neurons")?;
        Ok(())
    }

    pub fn average(&self) -> AverageParams {
        AverageParams {
            layers: self.layers.average(),
            neurons: self.neurons.average(),
        }
    }

    /// All candidate cells in the fixed enumeration order, indices from 1.
    pub fn cells(&self) -> Vec<GridCell> {
        let mut cells = Vec::with_capacity(self.cell_count());
        let mut index = 1;
        for layers in self.layers.values() {
            for neurons in self.neurons.values() {
                cells.push(GridCell { index, layers, neurons });
                index += 1;
            }
        }
        cells
    }

    pub fn cell_count(&self) -> usize {
        self.layers.count() * self.neurons.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: u32, max: u32, step: u32) -> ParamRange {
        ParamRange { min, max, step }
    }

    #[test]
    fn test_cells_enumerated_layers_outer() {
        let grid = HyperparameterGrid {
            layers: range(1, 2, 1),
            neurons: range(10, 30, 10),
        };
        let cells = grid.cells();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells.len(), grid.cell_count());
        let expected = [(1, 1, 10), (2, 1, 20), (3, 1, 30), (4, 2, 10), (5, 2, 20), (6, 2, 30)];
        for (cell, (index, layers, neurons)) in cells.iter().zip(expected) {
            assert_eq!((cell.index, cell.layers, cell.neurons), (index, layers, neurons));
        }
    }

    #[test]
    fn test_cells_empty_when_min_exceeds_max() {
        let grid = HyperparameterGrid {
            layers: range(3, 1, 1),
            neurons: range(2, 2, 1),
        };
        assert!(grid.cells().is_empty());
        assert_eq!(grid.cell_count(), 0);
    }

    #[test]
    fn test_average_uses_floor_midpoint() {
        let grid = HyperparameterGrid {
            layers: range(1, 4, 1),
            neurons: range(10, 25, 5),
        };
        let avg = grid.average();
        assert_eq!(avg.layers, 2);
        assert_eq!(avg.neurons, 17);
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let grid = HyperparameterGrid {
            layers: range(1, 3, 0),
            neurons: range(2, 2, 1),
        };
        assert!(grid.validate().is_err());
    }
}
