use crate::matrices::matrix_errors::MatrixError;
use crate::symbolic::symbolic_vectors::ExprMatrix;

/// Assembles a block-partitioned matrix.
///
/// Each inner vector is one block-row: its blocks are joined left to right, then
/// the block-rows are stacked top to bottom. Absent blocks have to be passed as
/// explicit zero-shaped matrices.
///
/// # Example
/// ```
/// use RustedMatrixSys::matrices::block_matrix::block_matrix;
/// use RustedMatrixSys::symbolic::symbolic_vectors::ExprMatrix;
/// let m = block_matrix(&[
///     vec![ExprMatrix::zeros(2, 3), ExprMatrix::zeros(2, 2)],
///     vec![ExprMatrix::zeros(1, 3), ExprMatrix::zeros(1, 2)],
/// ]).unwrap();
/// assert_eq!(m.shape(), (3, 5));
/// ```
pub fn block_matrix(blocks: &[Vec<ExprMatrix>]) -> Result<ExprMatrix, MatrixError> {
    // block-columns must line up, not just the total width of each block-row
    if let Some(first) = blocks.first() {
        let widths: Vec<usize> = first.iter().map(ExprMatrix::ncols).collect();
        for row in &blocks[1..] {
            let row_widths: Vec<usize> = row.iter().map(ExprMatrix::ncols).collect();
            if row_widths != widths {
                return Err(MatrixError::DimensionMismatch {
                    context: "block columns".to_string(),
                    expected: (row.len(), widths.iter().sum()),
                    found: (row.len(), row_widths.iter().sum()),
                });
            }
        }
    }
    let rows = blocks
        .iter()
        .map(|row| ExprMatrix::hstack(row))
        .collect::<Result<Vec<_>, _>>()?;
    ExprMatrix::vstack(&rows)
}
