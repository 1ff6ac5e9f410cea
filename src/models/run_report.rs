use crate::error::Warning;

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub rows_before: usize,
    pub removed_rows: usize,
    /// Column name and total for every summed column, in SumSpec order.
    pub totals: Vec<(String, f64)>,
    pub totals_appended: bool,
    /// Sort keys that resolved, primary first.
    pub sorted_by: Vec<String>,
    pub warnings: Vec<Warning>,
    pub elapsed_secs: f64,
}

impl RunReport {
    pub fn rows_after(&self) -> usize {
        self.rows_before - self.removed_rows + usize::from(self.totals_appended)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
