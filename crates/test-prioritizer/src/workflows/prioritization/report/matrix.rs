use super::super::domain::{Priority, TestId};
use super::super::registry::Factor;
use super::ReportData;
use serde::Serialize;
use std::collections::BTreeMap;

/// One axis of the matrix: a scoring factor and its value range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixAxis {
    pub factor: String,
    pub display_name: String,
    pub min_value: u32,
    pub max_value: u32,
}

impl MatrixAxis {
    fn from_factor(factor: &Factor) -> Self {
        Self {
            factor: factor.key.clone(),
            display_name: factor.display_name.clone(),
            min_value: factor.min_value,
            max_value: factor.max_value,
        }
    }
}

/// A test placed by its values for the two chosen factors. The weighted
/// score sizes the bubble and the tier colours it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixPoint {
    pub id: TestId,
    pub name: String,
    pub priority: Priority,
    pub priority_label: &'static str,
    pub x: u32,
    pub y: u32,
    pub weighted_score: u32,
}

/// Matrix cell with the number of tests sharing one `(x, y)` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub x: u32,
    pub y: u32,
    pub count: usize,
}

/// Bubble-chart series comparing every test on two factors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrioritizationMatrix {
    pub title: String,
    pub x_axis: MatrixAxis,
    pub y_axis: MatrixAxis,
    /// Points in ranked order.
    pub points: Vec<MatrixPoint>,
    /// Occupied cells, ordered by x then y.
    pub cells: Vec<MatrixCell>,
}

impl ReportData {
    /// Plot the ranked tests on two factors. Both keys must be scoring
    /// factors of the catalog the report was built from; they may coincide.
    pub fn matrix(
        &self,
        x_factor: &str,
        y_factor: &str,
    ) -> Result<PrioritizationMatrix, MatrixError> {
        let axis = |key: &str| {
            self.factors
                .iter()
                .find(|factor| factor.key == key)
                .map(MatrixAxis::from_factor)
                .ok_or_else(|| MatrixError::UnknownFactor(key.to_string()))
        };
        let x_axis = axis(x_factor)?;
        let y_axis = axis(y_factor)?;

        let points: Vec<MatrixPoint> = self
            .ranked
            .iter()
            .filter_map(|scored| {
                let values = &scored.record.factor_values;
                let x = *values.get(&x_axis.factor)?;
                let y = *values.get(&y_axis.factor)?;
                Some(MatrixPoint {
                    id: scored.record.id,
                    name: scored.record.name.clone(),
                    priority: scored.priority,
                    priority_label: scored.priority.label(),
                    x,
                    y,
                    weighted_score: scored.weighted_score,
                })
            })
            .collect();

        let mut occupancy: BTreeMap<(u32, u32), usize> = BTreeMap::new();
        for point in &points {
            *occupancy.entry((point.x, point.y)).or_default() += 1;
        }
        let cells = occupancy
            .into_iter()
            .map(|((x, y), count)| MatrixCell { x, y, count })
            .collect();

        Ok(PrioritizationMatrix {
            title: format!(
                "Test Prioritization Matrix: {} vs {}",
                x_axis.display_name, y_axis.display_name
            ),
            x_axis,
            y_axis,
            points,
            cells,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("factor '{0}' is not in the catalog")]
    UnknownFactor(String),
}
