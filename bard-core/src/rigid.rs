use crate::{Result, TransformError};
use nalgebra::{IsometryMatrix3, Matrix3, Matrix4, Point3, Rotation3, Vector3};

/// Builds a matrix from row-major data, the layout used in configuration
/// files and recorded tracker output.
pub fn matrix_from_rows(rows: [[f64; 4]; 4]) -> Matrix4<f64> {
    Matrix4::from_fn(|r, c| rows[r][c])
}

/// The inverse of [`matrix_from_rows`].
pub fn matrix_to_rows(matrix: &Matrix4<f64>) -> [[f64; 4]; 4] {
    let mut rows = [[0.0; 4]; 4];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = matrix[(r, c)];
        }
    }
    rows
}

/// Builds a matrix from dynamically shaped row-major data.
///
/// Fails with [`TransformError::MalformedMatrix`] unless there are exactly
/// four rows of four values.
pub fn matrix_from_nested(rows: &[Vec<f64>]) -> Result<Matrix4<f64>> {
    let malformed = |cols| TransformError::MalformedMatrix {
        rows: rows.len(),
        cols,
    };
    if rows.len() != 4 {
        return Err(malformed(rows.first().map_or(0, Vec::len)));
    }
    if let Some(row) = rows.iter().find(|row| row.len() != 4) {
        return Err(malformed(row.len()));
    }
    Ok(Matrix4::from_fn(|r, c| rows[r][c]))
}

/// Create a homogeneous rigid transform from rotation and translation.
pub fn rigid_from_parts(translation: Vector3<f64>, rotation: Rotation3<f64>) -> Matrix4<f64> {
    IsometryMatrix3::from_parts(translation.into(), rotation).to_homogeneous()
}

/// Checks that the matrix is a rotation plus translation, within `epsilon`.
///
/// The graph accepts any matrix, so this is only useful for diagnostics.
pub fn is_rigid(matrix: &Matrix4<f64>, epsilon: f64) -> bool {
    if matrix.iter().any(|n| !n.is_finite()) {
        return false;
    }
    let bottom = [matrix[(3, 0)], matrix[(3, 1)], matrix[(3, 2)], matrix[(3, 3)] - 1.0];
    if bottom.iter().any(|n| n.abs() > epsilon) {
        return false;
    }
    let rotation: Matrix3<f64> = matrix.fixed_slice::<3, 3>(0, 0).into_owned();
    let orthonormality = (rotation.transpose() * rotation - Matrix3::identity()).norm();
    orthonormality <= epsilon && (rotation.determinant() - 1.0).abs() <= epsilon
}

/// Applies the transform to a point.
///
/// Returns `None` if the point is mapped to infinity, which can't happen
/// with a rigid transform.
pub fn transform_point(matrix: &Matrix4<f64>, point: &Point3<f64>) -> Option<Point3<f64>> {
    Point3::from_homogeneous(matrix * point.to_homogeneous())
}
