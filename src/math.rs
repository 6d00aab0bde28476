use ndarray::{Array1, LinalgScalar};
use num_traits::{Float, FromPrimitive};

/// First and centred second moments of a paired sample `(x, y)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CentredMoments<E> {
    pub mean_x: E,
    pub mean_y: E,
    /// Sum of squared deviations of `x` from its mean
    pub sxx: E,
    /// Sum of squared deviations of `y` from its mean
    pub syy: E,
    /// Sum of products of the deviations of `x` and `y`
    pub sxy: E,
}

/// Compute the means and centred sums of squares and cross-products of `x` and `y`
///
/// Returns `None` when either array is empty or the two have different lengths.
///
/// # Examples
///
/// ```
/// use beer_lambert::math::centred_moments;
/// use ndarray::arr1;
///
/// let x = arr1(&[1., 2., 3.]);
/// let y = arr1(&[2., 4., 6.]);
/// let moments = centred_moments(&x, &y).unwrap();
///
/// assert_eq!(moments.mean_x, 2.);
/// assert_eq!(moments.sxx, 2.);
/// assert_eq!(moments.sxy, 4.);
/// ```
pub fn centred_moments<E: Float + FromPrimitive + LinalgScalar>(
    x: &Array1<E>,
    y: &Array1<E>,
) -> Option<CentredMoments<E>> {
    if x.len() != y.len() {
        return None;
    }
    let mean_x = x.mean()?;
    let mean_y = y.mean()?;

    let dx = x.mapv(|xi| xi - mean_x);
    let dy = y.mapv(|yi| yi - mean_y);

    Some(CentredMoments {
        mean_x,
        mean_y,
        sxx: dx.dot(&dx),
        syy: dy.dot(&dy),
        sxy: dx.dot(&dy),
    })
}

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace<E: Float>(start: E, end: E, n: usize) -> Array1<E> {
    Array1::linspace(start, end, n)
}
