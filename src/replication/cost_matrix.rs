use crate::classifiers::ClassifierError;

/// Square misclassification-cost table; entry `(actual, predicted)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl CostMatrix {
    /// Zero costs on the diagonal, one everywhere else.
    pub fn new(size: usize) -> Self {
        let mut cells = vec![1.0; size * size];
        for i in 0..size {
            cells[i * size + i] = 0.0;
        }
        Self { size, cells }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ClassifierError> {
        let size = rows.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != size) {
            return Err(ClassifierError::SchemaMismatch(format!(
                "cost matrix row has {} entries, expected {size}",
                bad.len()
            )));
        }
        Ok(Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Absolute-error costs `|actual - predicted|`, the usual ordinal table.
    pub fn absolute(size: usize) -> Self {
        let cells = (0..size)
            .flat_map(|i| (0..size).map(move |j| (i as f64 - j as f64).abs()))
            .collect();
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), ClassifierError> {
        if row >= self.size || col >= self.size {
            return Err(ClassifierError::AttributeIndexOutOfBounds {
                index: row.max(col),
                len: self.size,
            });
        }
        self.cells[row * self.size + col] = value;
        Ok(())
    }
}
